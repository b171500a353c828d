//! Site configuration management for `mkweb.toml`.
//!
//! # Sections
//!
//! | Section        | Purpose                                          |
//! |----------------|--------------------------------------------------|
//! | `[site]`       | Site metadata (title, subtitle, url, author)     |
//! | `[build]`      | Directories, processed file types, converter     |
//! | `[[path_map]]` | Link rewrite rules, applied in order             |
//! | `[theme]`      | Theme name and page decorations                  |
//! | `[tags]`       | Global tag list, tag pages, per-page tags        |
//! | `[years]`      | Global year list and year pages                  |
//! | `[pagelist]`   | Global page list                                 |
//! | `[sitemap]`    | `sitemap.html`                                   |
//! | `[social]`     | Injected social links fragment                   |
//! | `[menu]`       | Injected menu fragment                           |
//! | `[front]`      | Front page                                       |
//!
//! Relative paths are resolved against the directory holding the config file.
//!
//! # Example
//!
//! ```toml
//! [site]
//! title = "My Blog"
//! url = "https://example.com/"
//!
//! [build]
//! source = "pages"
//! destination = "public"
//!
//! [[path_map]]
//! base = "blog"
//! url = "articles/"
//!
//! [tags]
//! enable = true
//! ```

mod build;
pub mod defaults;
mod error;
mod sections;
mod site;

pub use build::{BuildConfig, PathMapRule};
pub use error::ConfigError;
pub use sections::{FragmentConfig, SortDirection, SortKey};

use build::ConverterConfig;
use sections::{
    FrontConfig, PageListConfig, SitemapConfig, TagsConfig, ThemeConfig, YearsConfig,
};
use site::SiteSection;

use crate::cli::Cli;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing mkweb.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    pub site: SiteSection,
    pub build: BuildConfig,
    pub path_map: Vec<PathMapRule>,
    pub theme: ThemeConfig,
    pub tags: TagsConfig,
    pub years: YearsConfig,
    pub pagelist: PageListConfig,
    pub sitemap: SitemapConfig,
    pub social: FragmentConfig,
    pub menu: FragmentConfig,
    pub front: FrontConfig,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
            .with_context(|| format!("Failed to parse `{}`", path.display()))
    }

    /// Load the config named on the command line, apply CLI overrides,
    /// resolve paths and validate.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut config = Self::from_path(&cli.config)?;
        config.config_path = Self::normalize_path(&cli.config);
        config.update_with_cli(cli);
        config.update_path_with_root();
        config.validate()?;
        Ok(config)
    }

    /// Directory holding the config file, base of all relative paths.
    pub fn get_root(&self) -> &Path {
        self.config_path.parent().unwrap_or(Path::new("./"))
    }

    /// `<shared>/themes/<name>`
    pub fn theme_dir(&self) -> PathBuf {
        self.build.shared.join("themes").join(&self.theme.name)
    }

    pub fn template(&self) -> PathBuf {
        self.theme_dir().join("template.html")
    }

    pub fn style(&self) -> PathBuf {
        self.theme_dir().join("style.html")
    }

    pub fn footer(&self) -> PathBuf {
        self.theme_dir().join("footer.html")
    }

    /// The shared theme files every rendered page depends on.
    pub fn theme_dependencies(&self) -> [PathBuf; 3] {
        [self.style(), self.template(), self.footer()]
    }

    /// Required theme files that do not exist. The footer is optional.
    pub fn missing_theme_files(&self) -> Vec<PathBuf> {
        [self.style(), self.template()]
            .into_iter()
            .filter(|path| !path.is_file())
            .collect()
    }

    /// `<shared>/plugins`
    pub fn plugins_dir(&self) -> PathBuf {
        self.build.shared.join("plugins")
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &Cli) {
        if let Some(pandoc) = &cli.pandoc {
            let bin = pandoc.to_string_lossy().into_owned();
            match self.build.converter.command.first_mut() {
                Some(first) => *first = bin,
                None => self.build.converter.command.push(bin),
            }
        }
        Self::update_option(&mut self.build.jobs, cli.jobs.as_ref());
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Resolve every directory relative to the config file and normalize to absolute paths
    fn update_path_with_root(&mut self) {
        let root = self.get_root().to_path_buf();

        self.build.source = Self::normalize_path(&root.join(&self.build.source));
        self.build.destination = Self::normalize_path(&root.join(&self.build.destination));
        if let Some(static_dir) = &self.build.static_dir {
            self.build.static_dir = Some(Self::normalize_path(&root.join(static_dir)));
        }

        // shared resources may live in the home directory
        let shared = self.build.shared.to_string_lossy();
        let expanded = PathBuf::from(shellexpand::tilde(&shared).into_owned());
        self.build.shared = Self::normalize_path(&root.join(expanded));
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    pub fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            // For non-existent paths, manually make them absolute
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Validate the resolved configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.build.source.is_dir() {
            return Err(ConfigError::SourceNotDir(self.build.source.clone()));
        }

        if let Some(index) = self.path_map.iter().position(|rule| rule.base.is_empty()) {
            return Err(ConfigError::EmptyPathMapBase(index + 1));
        }

        Self::check_converter_installed(&self.build.converter)
    }

    /// The converter program must resolve on `PATH` (or be a path to it).
    fn check_converter_installed(converter: &ConverterConfig) -> Result<(), ConfigError> {
        let Some(cmd) = converter.command.first() else {
            return Err(ConfigError::EmptyConverter);
        };

        which::which(cmd).map_err(|source| ConfigError::ConverterMissing {
            command: cmd.clone(),
            source,
        })?;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
