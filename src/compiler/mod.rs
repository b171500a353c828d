//! Source discovery, staleness checks and document rendering.
//!
//! - **tree**: Abstract Document Tree parsed from the converter
//! - **links**: root-relative link rewriting over a tree
//! - **convert**: the external converter (pandoc)
//! - **pages**: rendering documents, in parallel
//! - **assets**: copying static files
//!
//! # Build Flow
//!
//! ```text
//! walk_source() ──► MetadataIndex ──► render_documents() ──► copy_static()
//!       │                                   │
//!       ▼                                   ▼
//!   SourceTree                     read_tree → rewrite → render
//! ```

pub mod assets;
pub mod convert;
pub mod links;
pub mod pages;
pub mod tree;

use crate::config::SiteConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

// ============================================================================
// Discovery
// ============================================================================

/// Files to ignore during directory traversal
const IGNORED_FILES: &[&str] = &[".DS_Store"];

/// Every file below the source root, in discovery order.
#[derive(Debug, Clone, Default)]
pub struct SourceTree {
    pub root: PathBuf,
    /// Absolute paths, sorted by file name within each directory.
    pub files: Vec<PathBuf>,
    /// Newest modification time of any file or directory seen.
    pub newest: Option<SystemTime>,
}

/// Walk `root` once. Unreadable entries are errors: an index built from a
/// partial walk would produce silently incomplete lists.
pub fn walk_source(root: &Path) -> Result<SourceTree> {
    let mut tree = SourceTree {
        root: root.to_path_buf(),
        ..Default::default()
    };

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk `{}`", root.display()))?;

        if let Some(modified) = entry.metadata().ok().and_then(|m| m.modified().ok()) {
            tree.newest = tree.newest.max(Some(modified));
        }

        let name = entry.file_name().to_str().unwrap_or_default();
        if entry.file_type().is_file() && !IGNORED_FILES.contains(&name) {
            tree.files.push(entry.into_path());
        }
    }

    Ok(tree)
}

/// Collect all files from a directory recursively.
pub fn collect_all_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name().to_str().unwrap_or_default();
            !IGNORED_FILES.contains(&name)
        })
        .map(walkdir::DirEntry::into_path)
        .collect()
}

/// Destination of a source file, `None` when its type is not processed.
///
/// `pages/blog/post.md` → `public/blog/post.html`
pub fn output_path(config: &SiteConfig, source: &Path) -> Option<PathBuf> {
    if !config.build.is_processed(source) {
        return None;
    }
    let rel = source.strip_prefix(&config.build.source).ok()?;
    Some(config.build.destination.join(rel).with_extension("html"))
}

// ============================================================================
// Staleness
// ============================================================================

pub fn mtime(path: &Path) -> Option<SystemTime> {
    path.metadata().ok()?.modified().ok()
}

/// Whether `output` must be regenerated from `input`.
///
/// A missing input never needs a rebuild. A missing output always does.
/// Otherwise the output is stale when it is older than the input or any of
/// `deps` (missing dependencies are ignored). Configuration changes are not
/// tracked.
pub fn needs_rebuild(input: &Path, output: &Path, deps: &[PathBuf]) -> bool {
    let Some(input_time) = mtime(input) else {
        return false;
    };
    let Some(output_time) = mtime(output) else {
        return true;
    };

    if output_time < input_time {
        return true;
    }

    deps.iter()
        .filter_map(|dep| mtime(dep))
        .any(|dep_time| output_time < dep_time)
}
