//! Document metadata.
//!
//! A [`Document`] is a source file (path relative to the source root) and
//! the [`FrontMatter`] found at its head. Every field of the front-matter is
//! optional; consumers check presence where they need a field.

pub mod date;
mod extract;

pub use extract::extract;
#[cfg(test)]
pub use extract::parse_front_matter;

use chrono::{Datelike, NaiveDateTime};
use serde_yaml::Value;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Errors while extracting front-matter. All of them abort the collection pass.
#[derive(Debug, Error)]
pub enum MetaError {
    #[error("failed to read `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("front-matter of `{0}` is not terminated by `---` or `...`")]
    Unterminated(PathBuf),

    #[error("malformed front-matter in `{0}`")]
    Yaml(PathBuf, #[source] serde_yaml::Error),

    #[error("front-matter of `{0}` is not a mapping")]
    NotAMapping(PathBuf),

    #[error("`{field}` in `{path}` must be a string or a list of strings")]
    InvalidList { path: PathBuf, field: String },
}

/// Structured front-matter with explicit presence per field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrontMatter {
    pub title: Option<String>,
    /// Already normalized, see [`date::normalize`].
    pub date: Option<NaiveDateTime>,
    /// Deduplicated, in order of appearance.
    pub tags: Option<Vec<String>>,
    pub summary: Option<String>,
    /// `extensions:` or the older `plugins:` key.
    pub extensions: Option<Vec<String>>,
    /// Every other key, kept opaque.
    pub extra: BTreeMap<String, Value>,
}

impl FrontMatter {
    /// Year of the normalized date, if dated.
    pub fn year(&self) -> Option<i32> {
        self.date.map(|d| d.year())
    }

    /// Date used for ordering, the sentinel when undated.
    pub fn date_or_sentinel(&self) -> NaiveDateTime {
        self.date.unwrap_or_else(date::sentinel)
    }

    pub fn tags(&self) -> &[String] {
        self.tags.as_deref().unwrap_or_default()
    }

    pub fn extensions(&self) -> &[String] {
        self.extensions.as_deref().unwrap_or_default()
    }
}

/// An indexed source document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Relative to the source root.
    pub path: PathBuf,
    pub meta: FrontMatter,
}

impl Document {
    pub fn new(path: impl Into<PathBuf>, meta: FrontMatter) -> Self {
        Self {
            path: path.into(),
            meta,
        }
    }
}

/// Swap the extension of a relative source path for `.html`.
pub fn html_path(path: &Path) -> PathBuf {
    path.with_extension("html")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_path() {
        assert_eq!(html_path(Path::new("blog/post.md")), PathBuf::from("blog/post.html"));
        assert_eq!(html_path(Path::new("index.markdown")), PathBuf::from("index.html"));
    }

    #[test]
    fn test_front_matter_accessors_when_absent() {
        let meta = FrontMatter::default();
        assert!(meta.tags().is_empty());
        assert!(meta.extensions().is_empty());
        assert_eq!(meta.year(), None);
        assert_eq!(meta.date_or_sentinel(), date::sentinel());
    }

    #[test]
    fn test_year_from_date() {
        let meta = FrontMatter {
            date: Some(date::normalize(&Value::String("2021-06-30 23:59".into()))),
            ..Default::default()
        };
        assert_eq!(meta.year(), Some(2021));
    }
}
