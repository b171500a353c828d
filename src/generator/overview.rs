//! Synthetic documents: tag and year overviews, the front page and the sitemap.
//!
//! They are plain markdown with a front-matter header, written to the scratch
//! arena and rendered like any authored page.

use super::lists::sorted_pages;
use super::{ListError, Urls, tag_slug, title_of};
use crate::config::{SiteConfig, SortDirection, SortKey};
use crate::index::MetadataIndex;
use crate::meta::{Document, date};
use serde::Serialize;
use std::fmt::Write;
use std::path::PathBuf;

/// A generated markdown document and where its page goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticDoc {
    /// Relative file name inside the scratch arena, e.g. `tag/rust.md`.
    pub name: PathBuf,
    /// Relative to the destination directory, e.g. `tag/rust.html`.
    pub output: PathBuf,
    pub content: String,
}

impl SyntheticDoc {
    fn new(stem: &str, title: &str, byline: &Byline<'_>) -> Self {
        Self {
            name: PathBuf::from(format!("{stem}.md")),
            output: PathBuf::from(format!("{stem}.html")),
            content: header(title, byline),
        }
    }
}

/// Site-wide header fields of every synthetic document.
#[derive(Debug, Clone, Copy)]
pub struct Byline<'a> {
    pub author: &'a str,
    pub language: &'a str,
}

impl<'a> Byline<'a> {
    pub fn new(config: &'a SiteConfig) -> Self {
        Self {
            author: &config.site.author,
            language: &config.site.language,
        }
    }
}

#[derive(Serialize)]
struct Header<'a> {
    title: &'a str,
    author: &'a str,
    date: &'a str,
    language: &'a str,
}

/// Front-matter block. The date is fixed so the page only changes with its
/// listing.
fn header(title: &str, byline: &Byline<'_>) -> String {
    let header = Header {
        title,
        author: byline.author,
        date: "2000-01-01",
        language: byline.language,
    };
    let yaml = serde_yaml::to_string(&header).unwrap_or_default();
    format!("---\n{yaml}---\n\n")
}

/// `- [title](link)` lines sorted by title; equal titles keep index order.
fn link_lines(doc: &mut SyntheticDoc, entries: &[&Document], urls: &Urls<'_>) -> Result<(), ListError> {
    let mut titled = entries
        .iter()
        .map(|d| Ok((title_of(d)?, *d)))
        .collect::<Result<Vec<_>, ListError>>()?;
    titled.sort_by(|a, b| a.0.cmp(b.0));

    for (title, entry) in titled {
        let _ = writeln!(doc.content, "- [{title}]({})", urls.page(&entry.path));
    }
    Ok(())
}

/// One `tag/<name>` document per tag.
pub fn tag_overviews(
    index: &MetadataIndex,
    urls: &Urls<'_>,
    byline: &Byline<'_>,
) -> Result<Vec<SyntheticDoc>, ListError> {
    index
        .tag_names()
        .map(|tag| {
            let stem = format!("tag/{}", tag_slug(tag));
            let mut doc = SyntheticDoc::new(&stem, &format!("Tag Overview: {tag}"), byline);
            link_lines(&mut doc, &index.tagged(tag), urls)?;
            Ok(doc)
        })
        .collect()
}

/// One `year/<yyyy>` document per year.
pub fn year_overviews(
    index: &MetadataIndex,
    urls: &Urls<'_>,
    byline: &Byline<'_>,
) -> Result<Vec<SyntheticDoc>, ListError> {
    index
        .years()
        .map(|year| {
            let stem = format!("year/{year}");
            let mut doc = SyntheticDoc::new(&stem, &format!("Year Overview: {year}"), byline);
            link_lines(&mut doc, &index.in_year(year), urls)?;
            Ok(doc)
        })
        .collect()
}

/// The `index` page: the `limit` newest documents, newest first. Documents
/// sharing a date keep index order; undated ones count as 2000-01-01.
pub fn front_page(
    index: &MetadataIndex,
    urls: &Urls<'_>,
    byline: &Byline<'_>,
    heading: &str,
    limit: usize,
) -> Result<SyntheticDoc, ListError> {
    let mut doc = SyntheticDoc::new("index", "Contents", byline);
    let _ = write!(doc.content, "{heading}\n\n");

    let mut newest: Vec<&Document> = index.documents().iter().collect();
    newest.sort_by(|a, b| b.meta.date_or_sentinel().cmp(&a.meta.date_or_sentinel()));

    for entry in newest.into_iter().take(limit) {
        let _ = writeln!(
            doc.content,
            "  - `{}` : [{}]({})",
            date::format_day(&entry.meta.date_or_sentinel()),
            title_of(entry)?,
            urls.page(&entry.path)
        );
        if let Some(summary) = &entry.meta.summary {
            let _ = write!(doc.content, "\n    {summary}\n");
        }
        doc.content.push('\n');
    }
    Ok(doc)
}

/// `sitemap` page listing every document in page-list order.
pub fn sitemap(
    index: &MetadataIndex,
    urls: &Urls<'_>,
    byline: &Byline<'_>,
    key: SortKey,
    direction: SortDirection,
) -> Result<SyntheticDoc, ListError> {
    let mut doc = SyntheticDoc::new("sitemap", "Sitemap", byline);
    for entry in sorted_pages(index, key, direction) {
        let _ = writeln!(
            doc.content,
            " - `{}` [{}]({})",
            date::format_day(&entry.meta.date_or_sentinel()),
            title_of(entry)?,
            urls.page(&entry.path)
        );
    }
    Ok(doc)
}
