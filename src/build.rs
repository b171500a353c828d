//! Site building orchestration.
//!
//! # Architecture
//!
//! ```text
//! build_site()
//!     │
//!     ├── Collecting            walk source, extract front-matter (fatal on error)
//!     ├── Indexed               MetadataIndex frozen
//!     ├── GeneratingAggregates  global fragments, synthetic docs → Scratch
//!     ├── RenderingDocuments    render_documents() + copy_static()
//!     ├── EmittingRedirects     emit_redirects() (best effort)
//!     └── Done
//! ```
//!
//! A `--file` run still indexes the whole source tree (pages show the global
//! lists) but renders only the selected documents, without aggregates or
//! redirects.

use crate::{
    cli::Cli,
    compiler::{
        SourceTree,
        assets::copy_static,
        convert::{Converter, GlobalFragments},
        links::LinkRewriter,
        output_path,
        pages::{BuildReport, RenderContext, RenderJob, render_documents},
        walk_source,
    },
    config::SiteConfig,
    generator::{
        ListError, Urls,
        lists::{PageListOptions, global_tag_list, page_list, page_tag_list, year_list},
        overview::{self, Byline, SyntheticDoc},
        redirect::emit_redirects,
    },
    index::MetadataIndex,
    log,
    scratch::Scratch,
};
use anyhow::{Context, Result, bail};
use std::{
    fmt,
    path::{Path, PathBuf},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    Collecting,
    Indexed,
    GeneratingAggregates,
    RenderingDocuments,
    EmittingRedirects,
    Done,
}

impl fmt::Display for BuildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Collecting => "collecting",
            Self::Indexed => "indexed",
            Self::GeneratingAggregates => "generating-aggregates",
            Self::RenderingDocuments => "rendering-documents",
            Self::EmittingRedirects => "emitting-redirects",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Run the whole pipeline.
///
/// The converter needs the global fragments, so it is created by
/// `make_converter` once they are known. Returns the report of the render
/// stage; per-document failures are in it, everything else is an `Err`.
pub fn build_site<C, F>(config: &SiteConfig, cli: &Cli, make_converter: F) -> Result<BuildReport>
where
    C: Converter,
    F: FnOnce(GlobalFragments) -> C,
{
    enter(BuildState::Collecting);
    let source = &config.build.source;
    let tree = walk_source(source)?;
    let index = MetadataIndex::collect(&tree, &config.build)
        .with_context(|| format!("Failed to collect metadata from `{}`", source.display()))?;

    enter(BuildState::Indexed);
    if index.is_empty() {
        log!("warn"; "no documents with front-matter in `{}`", source.display());
    } else {
        log!("build"; "{} documents indexed", index.len());
    }
    report_extensions(config, &index);

    enter(BuildState::GeneratingAggregates);
    let urls = Urls::new(config);
    let fragments = global_fragments(config, &index, &urls)?;
    let converter = make_converter(fragments);

    let selection = match &cli.file {
        Some(target) => select_files(&tree, source, target)?,
        None => tree.files.clone(),
    };
    let (mut jobs, ignored) = plan_jobs(config, &tree, &index, &urls, &selection);

    // scratch lives until every synthetic document is rendered
    let scratch = Scratch::new()?;
    log!("build"; "scratch area `{}`", scratch.path().display());
    if !cli.is_partial() {
        for doc in synthetic_documents(config, &index, &urls)? {
            let input = scratch.write(&doc.name, &doc.content, index.newest())?;
            jobs.push(RenderJob::new(input, config.build.destination.join(&doc.output)));
        }
    }

    enter(BuildState::RenderingDocuments);
    for missing in config.missing_theme_files() {
        log!("warn"; "theme file `{}` not found", missing.display());
    }
    let deps = config.theme_dependencies();
    let ctx = RenderContext {
        converter: &converter,
        rewriter: LinkRewriter::new(config),
        deps: &deps,
    };
    let mut report = render_documents(&jobs, &ctx, config.build.jobs)?;
    report.ignored = ignored;
    drop(scratch);

    if cli.should_copy() {
        let copied = copy_static(config)?;
        log!("build"; "{copied} static files copied");
    }

    if !cli.is_partial() {
        enter(BuildState::EmittingRedirects);
        emit_redirects(&config.build.destination, &config.site.url);
    }

    enter(BuildState::Done);
    Ok(report)
}

fn enter(state: BuildState) {
    log!("state"; "{state}");
}

/// Log referenced extensions, warn about those without a plugin directory.
fn report_extensions(config: &SiteConfig, index: &MetadataIndex) {
    if index.extensions().is_empty() {
        return;
    }
    let names: Vec<&str> = index.extensions().iter().map(String::as_str).collect();
    log!("build"; "extensions: {}", names.join(", "));

    let plugins = config.plugins_dir();
    for ext in names {
        if !plugins.join(ext).is_dir() {
            log!("warn"; "extension `{ext}` has no directory in `{}`", plugins.display());
        }
    }
}

/// Fragments shared by every page, only those enabled.
pub fn global_fragments(
    config: &SiteConfig,
    index: &MetadataIndex,
    urls: &Urls<'_>,
) -> Result<GlobalFragments, ListError> {
    let pages = if config.pagelist.enable {
        let options = PageListOptions {
            key: config.pagelist.sort.key,
            direction: config.pagelist.sort.direction,
            num_entries: config.pagelist.num_entries,
            more_link: config.sitemap.enable,
        };
        Some(page_list(index, &options, urls)?)
    } else {
        None
    };

    Ok(GlobalFragments {
        tags: config.tags.enable.then(|| global_tag_list(index, urls)),
        years: config.years.enable.then(|| year_list(index, urls)),
        pages,
    })
}

/// Tag and year overviews (when enabled), the front page and the sitemap
/// (when enabled).
fn synthetic_documents(
    config: &SiteConfig,
    index: &MetadataIndex,
    urls: &Urls<'_>,
) -> Result<Vec<SyntheticDoc>> {
    let byline = Byline::new(config);
    let mut docs = Vec::new();

    if config.tags.enable {
        docs.extend(overview::tag_overviews(index, urls, &byline)?);
    }
    if config.years.enable {
        docs.extend(overview::year_overviews(index, urls, &byline)?);
    }
    docs.push(overview::front_page(
        index,
        urls,
        &byline,
        &config.front.heading,
        config.build.num_news,
    )?);
    if config.sitemap.enable {
        let sort = &config.pagelist.sort;
        docs.push(overview::sitemap(index, urls, &byline, sort.key, sort.direction)?);
    }
    Ok(docs)
}

/// Files selected by `--file`: the file itself, or the files directly
/// inside the directory. The target must be inside `source`.
fn select_files(tree: &SourceTree, source: &Path, target: &Path) -> Result<Vec<PathBuf>> {
    let canonical = target
        .canonicalize()
        .with_context(|| format!("`{}` not found", target.display()))?;
    let source_root = source
        .canonicalize()
        .with_context(|| format!("`{}` not found", source.display()))?;
    let Ok(rel) = canonical.strip_prefix(&source_root) else {
        bail!(
            "`{}` is not inside the source directory `{}`",
            target.display(),
            source.display()
        );
    };

    let path = source.join(rel);
    if canonical.is_dir() {
        Ok(tree
            .files
            .iter()
            .filter(|file| file.parent() == Some(path.as_path()))
            .cloned()
            .collect())
    } else {
        Ok(vec![path])
    }
}

/// Render jobs for `files`; unprocessed files are logged and counted.
fn plan_jobs(
    config: &SiteConfig,
    tree: &SourceTree,
    index: &MetadataIndex,
    urls: &Urls<'_>,
    files: &[PathBuf],
) -> (Vec<RenderJob>, usize) {
    let mut jobs = Vec::with_capacity(files.len());
    let mut ignored = 0;

    for file in files {
        let Some(output) = output_path(config, file) else {
            log!("ignore"; "{}", file.display());
            ignored += 1;
            continue;
        };

        let mut job = RenderJob::new(file, output);
        let rel = file.strip_prefix(&tree.root).unwrap_or(file);
        if let Some(meta) = index.get(rel) {
            if config.tags.page_tags {
                job.page_tags = page_tag_list(meta, urls);
            }
            job.extensions = meta.extensions().to_vec();
        }
        jobs.push(job);
    }
    (jobs, ignored)
}
