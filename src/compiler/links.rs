//! Link Rewriter.
//!
//! Root-relative link and image targets whose first path segment matches a
//! `[[path_map]]` base get that segment replaced by the rule's URL:
//!
//! ```text
//! blog/post1.html  + { base = "blog", url = "articles/" }  + site "https://x/"
//!   => https://x/articles/post1.html
//! ```

use super::tree::Node;
use crate::config::{PathMapRule, SiteConfig};

#[derive(Debug, Clone, Copy)]
pub struct LinkRewriter<'a> {
    rules: &'a [PathMapRule],
    site_url: &'a str,
}

impl<'a> LinkRewriter<'a> {
    pub fn new(config: &'a SiteConfig) -> Self {
        Self::with_rules(&config.path_map, &config.site.url)
    }

    pub fn with_rules(rules: &'a [PathMapRule], site_url: &'a str) -> Self {
        Self { rules, site_url }
    }

    /// Rewrite the first segment of `link`. `None` when no rule applies or
    /// the link has a single segment.
    pub fn rewrite_root(&self, link: &str) -> Option<String> {
        let (first, rest) = link.split_once('/')?;
        let rule = self.rules.iter().find(|rule| rule.base == first)?;

        Some(if rule.absolute {
            format!("{}{rest}", rule.url)
        } else {
            format!("{}{}{rest}", self.site_url, rule.url)
        })
    }

    /// Rewrite every link and image target in `node`, returns how many changed.
    pub fn rewrite(&self, node: &mut Node) -> usize {
        let mut changed = 0;
        node.for_each_target(&mut |url| {
            if let Some(new) = self.rewrite_root(url) {
                *url = new;
                changed += 1;
            }
        });
        changed
    }
}
