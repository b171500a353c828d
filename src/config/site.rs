//! `[site]` section configuration.
//!
//! Site identity injected into every rendered page.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[site]` section in mkweb.toml - basic site metadata.
///
/// # Example
/// ```toml
/// [site]
/// title = "My Blog"
/// subtitle = "notes and such"
/// url = "https://example.com/"
/// author = "Alice"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct SiteSection {
    /// Site title, also used as the page title prefix.
    #[serde(default = "defaults::site::title")]
    #[educe(Default = defaults::site::title())]
    pub title: String,

    /// Optional subtitle shown below the title.
    pub subtitle: Option<String>,

    /// Base URL every generated link is prefixed with.
    /// Should end with `/`.
    #[serde(default = "defaults::site::url")]
    #[educe(Default = defaults::site::url())]
    pub url: String,

    /// Author of the synthetic overview pages.
    #[serde(default = "defaults::site::author")]
    #[educe(Default = defaults::site::author())]
    pub author: String,

    #[serde(default = "defaults::site::language")]
    #[educe(Default = defaults::site::language())]
    pub language: String,
}

#[cfg(test)]
mod tests {
    use super::super::SiteConfig;

    #[test]
    fn test_site_section_full() {
        let config = r#"
            [site]
            title = "Notes"
            subtitle = "a weblog"
            url = "https://example.com/"
            author = "Alice"
            language = "de"
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert_eq!(config.site.title, "Notes");
        assert_eq!(config.site.subtitle.as_deref(), Some("a weblog"));
        assert_eq!(config.site.url, "https://example.com/");
        assert_eq!(config.site.author, "Alice");
        assert_eq!(config.site.language, "de");
    }

    #[test]
    fn test_site_section_defaults() {
        let config: SiteConfig = toml::from_str("[site]").unwrap();

        assert_eq!(config.site.title, "TITLE");
        assert_eq!(config.site.subtitle, None);
        assert_eq!(config.site.url, "/");
        assert_eq!(config.site.author, "?");
        assert_eq!(config.site.language, "en");
    }

    #[test]
    fn test_unknown_field_rejection() {
        let config = r#"
            [site]
            title = "Test"
            description = "not a site field"
        "#;
        let result: Result<SiteConfig, _> = toml::from_str(config);

        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn test_site_section_unicode() {
        let config = r#"
            [site]
            title = "Blög 🚀"
            author = "René"
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert_eq!(config.site.title, "Blög 🚀");
        assert_eq!(config.site.author, "René");
    }
}
