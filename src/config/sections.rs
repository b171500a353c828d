//! Theme and aggregate page sections.
//!
//! `[theme]`, `[tags]`, `[years]`, `[pagelist]`, `[sitemap]`, `[social]`,
//! `[menu]` and `[front]`.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[theme]` section - which `<shared>/themes/<name>/` to render with.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeConfig {
    #[serde(default = "defaults::theme::name")]
    #[educe(Default = defaults::theme::name())]
    pub name: String,

    /// CSS background for the site title block.
    pub site_title_background: Option<String>,

    pub copyright: Option<String>,
}

/// `[tags]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TagsConfig {
    /// Generate the global tag list and the `tag/<name>.html` pages.
    pub enable: bool,
    /// Inject each page's own tag list.
    pub page_tags: bool,
}

/// `[years]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct YearsConfig {
    pub enable: bool,
}

/// Field the global page list is sorted by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Title,
    Date,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// `[pagelist.sort]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SortConfig {
    pub key: SortKey,
    pub direction: SortDirection,
}

/// `[pagelist]` section - the global list of pages.
///
/// # Example
/// ```toml
/// [pagelist]
/// enable = true
/// num_entries = 10
///
/// [pagelist.sort]
/// key = "date"
/// direction = "descending"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PageListConfig {
    pub enable: bool,
    /// Cap on listed pages, 0 is unlimited.
    pub num_entries: usize,
    pub sort: SortConfig,
}

/// `[sitemap]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SitemapConfig {
    pub enable: bool,
}

/// `[social]` and `[menu]` sections: an HTML fragment injected verbatim.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FragmentConfig {
    pub enable: bool,
    pub content: String,
}

impl FragmentConfig {
    /// The fragment, if enabled and non-empty.
    pub fn fragment(&self) -> Option<&str> {
        (self.enable && !self.content.is_empty()).then_some(self.content.as_str())
    }
}

/// `[front]` section - the `index.html` front page.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct FrontConfig {
    #[serde(default = "defaults::front::heading")]
    #[educe(Default = defaults::front::heading())]
    pub heading: String,
}
