//! Command-line interface definitions.
//!
//! Defines all CLI arguments using clap.

use clap::Parser;
use std::path::PathBuf;

/// mkweb static site generator CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config file path (default: mkweb.toml)
    #[arg(short = 'C', long, default_value = "mkweb.toml")]
    pub config: PathBuf,

    /// Only process this source file, or the files directly inside this source directory
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Copy static files (always done for a full build)
    #[arg(long)]
    pub copy: bool,

    /// Converter binary to use instead of the configured one
    #[arg(long)]
    pub pandoc: Option<PathBuf>,

    /// Number of parallel renders (0: one per CPU)
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

impl Cli {
    /// Whether this run is restricted to `--file`.
    pub fn is_partial(&self) -> bool {
        self.file.is_some()
    }

    /// Whether static files should be copied in this run.
    pub fn should_copy(&self) -> bool {
        self.copy || !self.is_partial()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["mkweb"]);
        assert_eq!(cli.config, PathBuf::from("mkweb.toml"));
        assert!(!cli.is_partial());
        assert!(cli.should_copy());
        assert_eq!(cli.jobs, None);
    }

    #[test]
    fn test_partial_run_copies_only_on_request() {
        let cli = Cli::parse_from(["mkweb", "--file", "pages/blog"]);
        assert!(cli.is_partial());
        assert!(!cli.should_copy());

        let cli = Cli::parse_from(["mkweb", "-f", "pages/blog", "--copy"]);
        assert!(cli.should_copy());
    }

    #[test]
    fn test_config_override() {
        let cli = Cli::parse_from(["mkweb", "-C", "site/other.toml"]);
        assert_eq!(cli.config, PathBuf::from("site/other.toml"));
    }
}
