//! Document rendering.
//!
//! Each [`RenderJob`] is independent: it reads only its input and the frozen
//! global data, and writes only its output. Jobs fan out over a bounded rayon
//! pool; a failing job is recorded in the [`BuildReport`] and the others go on.

use super::convert::{Converter, DocumentError, RenderRequest};
use super::links::LinkRewriter;
use super::needs_rebuild;
use crate::log;
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::{
    error::Error,
    fs,
    path::{Path, PathBuf},
};

/// One document to (maybe) render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub page_tags: Option<String>,
    pub extensions: Vec<String>,
}

impl RenderJob {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            ..Default::default()
        }
    }

    fn request(&self) -> RenderRequest<'_> {
        RenderRequest {
            input: &self.input,
            output: &self.output,
            page_tags: self.page_tags.as_deref(),
            extensions: &self.extensions,
        }
    }
}

/// Shared, read-only inputs of every render.
pub struct RenderContext<'a> {
    pub converter: &'a dyn Converter,
    pub rewriter: LinkRewriter<'a>,
    /// Theme files every output depends on.
    pub deps: &'a [PathBuf],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Rendered,
    Skipped,
}

/// Per-run tally.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub rendered: usize,
    pub skipped: usize,
    pub ignored: usize,
    pub failures: Vec<DocumentError>,
}

impl BuildReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Render `jobs` on a pool of `threads` workers (0: one per CPU).
///
/// Only failing to build the pool is an error; document failures end up in
/// the report.
pub fn render_documents(
    jobs: &[RenderJob],
    ctx: &RenderContext<'_>,
    threads: usize,
) -> Result<BuildReport> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .context("Failed to create render thread pool")?;

    let results: Vec<_> = pool.install(|| {
        jobs.par_iter()
            .map(|job| process_document(job, ctx))
            .collect()
    });

    let mut report = BuildReport::default();
    for result in results {
        match result {
            Ok(Outcome::Rendered) => report.rendered += 1,
            Ok(Outcome::Skipped) => report.skipped += 1,
            Err(err) => {
                log!("error"; "{}", error_chain(&err));
                report.failures.push(err);
            }
        }
    }
    Ok(report)
}

/// Render a single document unless its output is fresh.
fn process_document(job: &RenderJob, ctx: &RenderContext<'_>) -> Result<Outcome, DocumentError> {
    if !needs_rebuild(&job.input, &job.output, ctx.deps) {
        log!("skip"; "{}", job.output.display());
        return Ok(Outcome::Skipped);
    }

    log!("render"; "{}", job.output.display());
    ensure_parent(&job.output)?;

    let mut tree = ctx.converter.read_tree(&job.input)?;
    ctx.rewriter.rewrite(&mut tree.root);
    ctx.converter.render(&tree, &job.request())?;

    Ok(Outcome::Rendered)
}

fn ensure_parent(path: &Path) -> Result<(), DocumentError> {
    match path.parent() {
        Some(parent) => fs::create_dir_all(parent).map_err(|source| DocumentError::Io {
            path: parent.to_path_buf(),
            source,
        }),
        None => Ok(()),
    }
}

/// `error: cause: cause`, for single-line logging.
pub fn error_chain(err: &dyn Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
