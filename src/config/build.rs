//! `[build]` section configuration.
//!
//! Contains build settings: directories, processed file types, rendering
//! options and the external converter.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ============================================================================
// Main BuildConfig
// ============================================================================

/// `[build]` section in mkweb.toml - build pipeline configuration.
///
/// # Example
/// ```toml
/// [build]
/// source = "pages"         # Source directory
/// destination = "public"   # Output directory
/// static = "static"        # Copied verbatim, optional
/// num_news = 8             # Front page entries
///
/// [build.converter]
/// command = ["pandoc"]
/// timeout = 60
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Document source directory.
    #[serde(default = "defaults::build::source")]
    #[educe(Default = defaults::build::source())]
    pub source: PathBuf,

    /// Build output directory.
    #[serde(default = "defaults::build::destination")]
    #[educe(Default = defaults::build::destination())]
    pub destination: PathBuf,

    /// Static files directory. When unset, non-processed files of
    /// `source` are copied instead.
    #[serde(rename = "static")]
    pub static_dir: Option<PathBuf>,

    /// Shared resources: `themes/<name>/` and `plugins/<name>/`.
    #[serde(default = "defaults::build::shared")]
    #[educe(Default = defaults::build::shared())]
    pub shared: PathBuf,

    /// Extensions (with leading dot) of documents to convert.
    #[serde(default = "defaults::build::process_filetypes")]
    #[educe(Default = defaults::build::process_filetypes())]
    pub process_filetypes: Vec<String>,

    /// Maximum number of entries on the front page.
    #[serde(default = "defaults::build::num_news")]
    #[educe(Default = defaults::build::num_news())]
    pub num_news: usize,

    /// Parallel renders, 0 means one per CPU.
    pub jobs: usize,

    #[serde(default = "defaults::build::toc_depth")]
    #[educe(Default = defaults::build::toc_depth())]
    pub toc_depth: u8,

    /// Render math as MathML.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub math: bool,

    /// External document converter.
    pub converter: ConverterConfig,
}

impl BuildConfig {
    /// Whether a file's extension is one of `process_filetypes`.
    pub fn is_processed(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.process_filetypes
                    .iter()
                    .any(|ft| ft.trim_start_matches('.') == ext)
            })
    }
}

// ============================================================================
// Sub-configurations
// ============================================================================

/// `[build.converter]` section - the external document converter.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct ConverterConfig {
    /// Command and leading arguments, e.g. `["pandoc"]`.
    #[serde(default = "defaults::build::converter::command")]
    #[educe(Default = defaults::build::converter::command())]
    pub command: Vec<String>,

    /// Per-invocation timeout in seconds.
    #[serde(default = "defaults::build::converter::timeout")]
    #[educe(Default = defaults::build::converter::timeout())]
    pub timeout: u64,
}

/// One `[[path_map]]` entry: rewrites the first segment of in-document links.
///
/// # Example
/// ```toml
/// [[path_map]]
/// base = "blog"
/// url = "articles/"
///
/// [[path_map]]
/// base = "files"
/// url = "https://cdn.example.com/"
/// absolute = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathMapRule {
    pub base: String,
    pub url: String,
    /// Use `url` as is instead of prefixing it with `site.url`.
    #[serde(default)]
    pub absolute: bool,
}
