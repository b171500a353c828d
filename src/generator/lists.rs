//! HTML fragment List Generators.

use super::{ListError, Urls, title_of};
use crate::config::{SortDirection, SortKey};
use crate::index::MetadataIndex;
use crate::meta::{Document, FrontMatter};
use std::cmp::Ordering;
use std::fmt::Write;

/// Sorted, deduplicated `<ul>` of tag links.
pub fn tag_list<'t>(tags: impl IntoIterator<Item = &'t str>, urls: &Urls<'_>) -> String {
    let mut tags: Vec<&str> = tags.into_iter().collect();
    tags.sort_unstable();
    tags.dedup();

    let mut html = String::from("<ul>");
    for tag in tags {
        let _ = write!(html, "<li><a href=\"{}\">{tag}</a></li>", urls.tag(tag));
    }
    html.push_str("</ul>");
    html
}

/// Every tag of the site.
pub fn global_tag_list(index: &MetadataIndex, urls: &Urls<'_>) -> String {
    tag_list(index.tag_names(), urls)
}

/// The tags of one page, `None` when it has none.
pub fn page_tag_list(meta: &FrontMatter, urls: &Urls<'_>) -> Option<String> {
    let tags = meta.tags();
    (!tags.is_empty()).then(|| tag_list(tags.iter().map(String::as_str), urls))
}

/// Year links, newest first.
pub fn year_list(index: &MetadataIndex, urls: &Urls<'_>) -> String {
    let mut html = String::from("<br>");
    for year in index.years().rev() {
        let _ = write!(html, "<a href=\"{}\">{year}</a> ", urls.year(year));
    }
    html
}

/// Documents having `key`, sorted by it. Equal keys keep index order in both
/// directions.
pub fn sorted_pages(
    index: &MetadataIndex,
    key: SortKey,
    direction: SortDirection,
) -> Vec<&Document> {
    let mut docs: Vec<&Document> = index
        .documents()
        .iter()
        .filter(|doc| match key {
            SortKey::Title => doc.meta.title.is_some(),
            SortKey::Date => doc.meta.date.is_some(),
        })
        .collect();

    let by_key = |a: &&Document, b: &&Document| -> Ordering {
        match key {
            SortKey::Title => a.meta.title.cmp(&b.meta.title),
            SortKey::Date => a.meta.date.cmp(&b.meta.date),
        }
    };
    match direction {
        SortDirection::Ascending => docs.sort_by(by_key),
        SortDirection::Descending => docs.sort_by(|a, b| by_key(b, a)),
    }
    docs
}

/// Settings of the global page list.
#[derive(Debug, Clone, Copy)]
pub struct PageListOptions {
    pub key: SortKey,
    pub direction: SortDirection,
    /// 0 is unlimited.
    pub num_entries: usize,
    /// Link to the sitemap when entries were cut.
    pub more_link: bool,
}

/// `<ul>` of page links, sorted and capped.
pub fn page_list(
    index: &MetadataIndex,
    options: &PageListOptions,
    urls: &Urls<'_>,
) -> Result<String, ListError> {
    let docs = sorted_pages(index, options.key, options.direction);
    let limit = match options.num_entries {
        0 => docs.len(),
        n => n.min(docs.len()),
    };

    let mut html = String::from("<ul>");
    for doc in &docs[..limit] {
        let _ = write!(
            html,
            "<li><a href=\"{}\">{}</a></li>",
            urls.page(&doc.path),
            title_of(doc)?
        );
    }
    html.push_str("</ul>");

    if options.more_link && limit < docs.len() {
        let _ = write!(
            html,
            "<div id=\"morelink\"><a href=\"{}\">...</a></div>",
            urls.sitemap()
        );
    }
    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::links::LinkRewriter;
    use crate::index::tests::doc;
    use crate::meta::FrontMatter;

    fn urls() -> Urls<'static> {
        Urls::with_parts("/", "pages", LinkRewriter::with_rules(&[], "/"))
    }

    fn titles(docs: &[&Document]) -> Vec<String> {
        docs.iter()
            .map(|d| d.meta.title.clone().unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_tag_list_sorted_and_unique() {
        let html = tag_list(["web", "rust", "web", "art"], &urls());
        assert_eq!(
            html,
            "<ul><li><a href=\"/tag/art.html\">art</a></li>\
             <li><a href=\"/tag/rust.html\">rust</a></li>\
             <li><a href=\"/tag/web.html\">web</a></li></ul>"
        );
    }

    #[test]
    fn test_page_tag_list() {
        let d = doc("a.md", "A", None, &["zeta", "alpha"]);
        let html = page_tag_list(&d.meta, &urls()).unwrap();
        assert!(html.find("alpha").unwrap() < html.find("zeta").unwrap());

        assert_eq!(page_tag_list(&FrontMatter::default(), &urls()), None);
    }

    #[test]
    fn test_year_list_newest_first() {
        let index = MetadataIndex::from_documents([
            doc("a.md", "A", Some("2019-01-01 00:00"), &[]),
            doc("b.md", "B", Some("2023-01-01 00:00"), &[]),
            doc("c.md", "C", Some("2021-01-01 00:00"), &[]),
        ]);
        assert_eq!(
            year_list(&index, &urls()),
            "<br><a href=\"/year/2023.html\">2023</a> \
             <a href=\"/year/2021.html\">2021</a> \
             <a href=\"/year/2019.html\">2019</a> "
        );
    }

    #[test]
    fn test_date_sort_is_stable_both_ways() {
        let index = MetadataIndex::from_documents([
            doc("1.md", "first", Some("2020-05-05 10:00"), &[]),
            doc("2.md", "early", Some("2019-01-01 00:00"), &[]),
            doc("3.md", "second", Some("2020-05-05 10:00"), &[]),
            doc("4.md", "undated", None, &[]),
        ]);

        let asc = sorted_pages(&index, SortKey::Date, SortDirection::Ascending);
        assert_eq!(titles(&asc), ["early", "first", "second"]);

        let desc = sorted_pages(&index, SortKey::Date, SortDirection::Descending);
        assert_eq!(titles(&desc), ["first", "second", "early"]);
    }

    #[test]
    fn test_title_sort_skips_untitled() {
        let mut untitled = doc("u.md", "", None, &[]);
        untitled.meta.title = None;
        let index = MetadataIndex::from_documents([
            doc("b.md", "Beta", None, &[]),
            untitled,
            doc("a.md", "Alpha", None, &[]),
        ]);
        let docs = sorted_pages(&index, SortKey::Title, SortDirection::Ascending);
        assert_eq!(titles(&docs), ["Alpha", "Beta"]);
    }

    #[test]
    fn test_page_list_cap_and_more_link() {
        let index = MetadataIndex::from_documents([
            doc("c.md", "C", None, &[]),
            doc("a.md", "A", None, &[]),
            doc("b.md", "B", None, &[]),
        ]);
        let mut options = PageListOptions {
            key: SortKey::Title,
            direction: SortDirection::Ascending,
            num_entries: 2,
            more_link: true,
        };

        let html = page_list(&index, &options, &urls()).unwrap();
        assert_eq!(
            html,
            "<ul><li><a href=\"/a.html\">A</a></li><li><a href=\"/b.html\">B</a></li></ul>\
             <div id=\"morelink\"><a href=\"/sitemap.html\">...</a></div>"
        );

        options.num_entries = 0;
        let html = page_list(&index, &options, &urls()).unwrap();
        assert!(html.contains("/c.html"));
        assert!(!html.contains("morelink"));
    }

    #[test]
    fn test_page_list_by_date_requires_title() {
        let mut untitled = doc("u.md", "", Some("2020-01-01 00:00"), &[]);
        untitled.meta.title = None;
        let index = MetadataIndex::from_documents([untitled]);
        let options = PageListOptions {
            key: SortKey::Date,
            direction: SortDirection::Ascending,
            num_entries: 0,
            more_link: false,
        };

        let err = page_list(&index, &options, &urls()).unwrap_err();
        assert!(matches!(err, ListError::MissingTitle(_)));
    }
}
