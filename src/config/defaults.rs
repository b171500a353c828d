//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

pub fn r#true() -> bool {
    true
}

// ============================================================================
// [site] Section Defaults
// ============================================================================

pub mod site {
    pub fn title() -> String {
        "TITLE".into()
    }

    pub fn url() -> String {
        "/".into()
    }

    pub fn author() -> String {
        "?".into()
    }

    pub fn language() -> String {
        "en".into()
    }
}

// ============================================================================
// [build] Section Defaults
// ============================================================================

pub mod build {
    use std::path::PathBuf;

    pub fn source() -> PathBuf {
        "pages".into()
    }

    pub fn destination() -> PathBuf {
        "public".into()
    }

    pub fn shared() -> PathBuf {
        "shared".into()
    }

    pub fn process_filetypes() -> Vec<String> {
        vec![".md".into()]
    }

    pub fn num_news() -> usize {
        8
    }

    pub fn toc_depth() -> u8 {
        2
    }

    pub mod converter {
        pub fn command() -> Vec<String> {
            vec!["pandoc".into()]
        }

        pub fn timeout() -> u64 {
            60
        }
    }
}

// ============================================================================
// Aggregate Sections Defaults
// ============================================================================

pub mod theme {
    pub fn name() -> String {
        "default".into()
    }
}

pub mod front {
    pub fn heading() -> String {
        "Newest Entries:".into()
    }
}
