//! Aggregate views computed from the frozen Metadata Index.
//!
//! - **lists**: HTML fragments injected into every page
//! - **overview**: synthetic tag, year, front page and sitemap documents
//! - **redirect**: `index.html` redirects for directories without one
//!
//! Everything here is a pure function of the index and the configuration,
//! except writing redirects.

pub mod lists;
pub mod overview;
pub mod redirect;

use crate::compiler::links::LinkRewriter;
use crate::config::SiteConfig;
use crate::meta::{Document, html_path};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ListError {
    #[error("`{0}` has no title, which is required to list it")]
    MissingTitle(PathBuf),
}

/// Title of a listed document.
pub fn title_of(doc: &Document) -> Result<&str, ListError> {
    doc.meta
        .title
        .as_deref()
        .ok_or_else(|| ListError::MissingTitle(doc.path.clone()))
}

/// File stem of a tag's overview page. Path separators are percent-escaped,
/// and `%` itself too, so distinct tags never share a file.
pub fn tag_slug(tag: &str) -> String {
    let mut slug = String::with_capacity(tag.len());
    for c in tag.chars() {
        match c {
            '%' => slug.push_str("%25"),
            '/' => slug.push_str("%2F"),
            '\\' => slug.push_str("%5C"),
            c => slug.push(c),
        }
    }
    slug
}

/// URLs of pages and overview pages.
#[derive(Debug, Clone)]
pub struct Urls<'a> {
    site_url: &'a str,
    /// Final component of the source directory, the first segment of a
    /// page's root-relative link.
    source_name: String,
    rewriter: LinkRewriter<'a>,
}

impl<'a> Urls<'a> {
    pub fn new(config: &'a SiteConfig) -> Self {
        let source_name = config
            .build
            .source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::with_parts(&config.site.url, source_name, LinkRewriter::new(config))
    }

    pub fn with_parts(
        site_url: &'a str,
        source_name: impl Into<String>,
        rewriter: LinkRewriter<'a>,
    ) -> Self {
        Self {
            site_url,
            source_name: source_name.into(),
            rewriter,
        }
    }

    /// Link to the rendered page of a source document (relative path).
    ///
    /// `<source>/<page>.html` goes through the path map first; without a
    /// matching rule the page hangs off the site URL.
    pub fn page(&self, rel: &Path) -> String {
        let rel_html = to_url_path(&html_path(rel));
        let rooted = format!("{}/{rel_html}", self.source_name);
        self.rewriter
            .rewrite_root(&rooted)
            .unwrap_or_else(|| format!("{}{rel_html}", self.site_url))
    }

    pub fn tag(&self, tag: &str) -> String {
        format!(
            "{}tag/{}.html",
            self.site_url,
            urlencoding::encode(&tag_slug(tag))
        )
    }

    pub fn year(&self, year: i32) -> String {
        format!("{}year/{year}.html", self.site_url)
    }

    pub fn sitemap(&self) -> String {
        format!("{}sitemap.html", self.site_url)
    }
}

/// Forward slashes regardless of platform.
fn to_url_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
