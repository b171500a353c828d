//! The external document converter.
//!
//! Two modes are needed: reading a source document into a [`DocTree`], and
//! rendering a (rewritten) tree to a standalone HTML page. [`PandocConverter`]
//! implements both through the `pandoc` command line.

use super::tree::DocTree;
use crate::config::SiteConfig;
use crate::utils::exec::{self, ExecError};
use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;

/// Failure of one document. Reported and collected, never fatal for the run.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to read the document tree of `{path}`")]
    Tree {
        path: PathBuf,
        #[source]
        source: ExecError,
    },

    #[error("converter produced an unreadable tree for `{path}`")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to render `{path}`")]
    Render {
        path: PathBuf,
        #[source]
        source: ExecError,
    },

    #[error("failed to prepare `{path}`")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// HTML fragments shared by every page, computed once before rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalFragments {
    pub tags: Option<String>,
    pub years: Option<String>,
    pub pages: Option<String>,
}

/// One unit of rendering work.
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    pub input: &'a Path,
    pub output: &'a Path,
    /// This page's own tag list.
    pub page_tags: Option<&'a str>,
    /// Extensions the page references.
    pub extensions: &'a [String],
}

pub trait Converter: Sync {
    /// Parse `input` into its structural representation.
    fn read_tree(&self, input: &Path) -> Result<DocTree, DocumentError>;

    /// Render `tree` to `request.output`.
    fn render(&self, tree: &DocTree, request: &RenderRequest<'_>) -> Result<(), DocumentError>;
}

// ============================================================================
// Pandoc
// ============================================================================

/// Site-wide `-V`/`-M` values and theme files, resolved once.
#[derive(Debug, Clone)]
pub struct PandocConverter {
    command: Vec<String>,
    timeout: Duration,
    template: PathBuf,
    style: PathBuf,
    footer: PathBuf,
    plugins_dir: PathBuf,
    toc_depth: u8,
    math: bool,
    site_title: String,
    site_url: String,
    site_subtitle: Option<String>,
    social: Option<String>,
    menu: Option<String>,
    page_tags: bool,
    title_background: Option<String>,
    copyright: Option<String>,
    fragments: GlobalFragments,
}

impl PandocConverter {
    pub fn new(config: &SiteConfig, fragments: GlobalFragments) -> Self {
        let non_empty = |s: &Option<String>| s.clone().filter(|s| !s.is_empty());

        Self {
            command: config.build.converter.command.clone(),
            timeout: Duration::from_secs(config.build.converter.timeout),
            template: config.template(),
            style: config.style(),
            footer: config.footer(),
            plugins_dir: config.plugins_dir(),
            toc_depth: config.build.toc_depth,
            math: config.build.math,
            site_title: config.site.title.clone(),
            site_url: config.site.url.clone(),
            site_subtitle: non_empty(&config.site.subtitle),
            social: config.social.fragment().map(str::to_owned),
            menu: config.menu.fragment().map(str::to_owned),
            page_tags: config.tags.page_tags,
            title_background: non_empty(&config.theme.site_title_background),
            copyright: non_empty(&config.theme.copyright),
            fragments,
        }
    }

    /// Command line for render mode, without the command itself.
    fn render_args(&self, request: &RenderRequest<'_>) -> Vec<OsString> {
        let mut args = Args::default();

        args.push("-f").push("json");
        args.push("-t").push("html5");
        args.push("-o").push(request.output);
        args.push("-H").push(&self.style);
        if self.footer.is_file() {
            args.push("-A").push(&self.footer);
        }
        args.push("-M").push(format!("title-prefix={}", self.site_title));
        args.var("siteurl", Some(&self.site_url));
        args.var("sitetitle", Some(&self.site_title));
        args.push("--template").push(&self.template);
        args.push("--standalone");
        args.push("--preserve-tabs");
        args.push("--toc");
        args.push(format!("--toc-depth={}", self.toc_depth));
        if self.math {
            args.push("--mathml");
        }

        args.var("sitesubtitle", self.site_subtitle.as_ref());
        args.var("globaltags", self.fragments.tags.as_ref());
        args.var("globalyears", self.fragments.years.as_ref());
        args.var("social", self.social.as_ref());
        args.var("menu", self.menu.as_ref());
        if self.page_tags {
            args.var("pagetags", request.page_tags.filter(|t| !t.is_empty()));
        }
        args.var("globalpagelist", self.fragments.pages.as_ref());

        for ext in request.extensions {
            let style = self.plugins_dir.join(ext).join("style.html");
            if style.is_file() {
                args.push("-H").push(style);
            }
        }

        args.var("sitetitle-background", self.title_background.as_ref());
        args.var("copyright", self.copyright.as_ref());

        args.0
    }
}

impl Converter for PandocConverter {
    fn read_tree(&self, input: &Path) -> Result<DocTree, DocumentError> {
        let output = crate::exec!(timeout=Some(self.timeout); &self.command; "-t", "json", input)
            .map_err(|source| DocumentError::Tree {
                path: input.to_path_buf(),
                source,
            })?;

        DocTree::from_json(&output.stdout).map_err(|source| DocumentError::Json {
            path: input.to_path_buf(),
            source,
        })
    }

    fn render(&self, tree: &DocTree, request: &RenderRequest<'_>) -> Result<(), DocumentError> {
        let json = tree.to_json().map_err(|source| DocumentError::Json {
            path: request.input.to_path_buf(),
            source,
        })?;

        let cmd = exec::internal::to_cmd_vec(&self.command);
        exec::exec(&cmd, &self.render_args(request), Some(&json), Some(self.timeout))
            .map_err(|source| DocumentError::Render {
                path: request.input.to_path_buf(),
                source,
            })?;
        Ok(())
    }
}

/// Argument list builder.
#[derive(Default)]
struct Args(Vec<OsString>);

impl Args {
    fn push(&mut self, arg: impl Into<OsString>) -> &mut Self {
        self.0.push(arg.into());
        self
    }

    /// `-V name=value`, skipped for `None`.
    fn var(&mut self, name: &str, value: Option<impl AsRef<str>>) {
        if let Some(value) = value {
            self.push("-V").push(format!("{name}={}", value.as_ref()));
        }
    }
}
