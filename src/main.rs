//! mkweb - A static site generator driving pandoc.

mod build;
mod cli;
mod compiler;
mod config;
mod generator;
mod index;
mod logger;
mod meta;
mod scratch;
mod utils;

use anyhow::{Result, bail};
use build::build_site;
use clap::Parser;
use cli::Cli;
use compiler::convert::PandocConverter;
use config::SiteConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = SiteConfig::load(&cli)?;

    let report = build_site(&config, &cli, |fragments| {
        PandocConverter::new(&config, fragments)
    })?;

    log!(
        "build";
        "{} rendered, {} skipped, {} ignored",
        report.rendered,
        report.skipped,
        report.ignored
    );

    if !report.is_success() {
        bail!("{} document(s) failed to render", report.failures.len());
    }
    Ok(())
}
