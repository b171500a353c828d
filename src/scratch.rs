//! Temporary arena for synthetic documents.
//!
//! Generated markdown is written here, rendered through the normal document
//! path and removed when the [`Scratch`] is dropped, on every exit path.

use anyhow::{Context, Result};
use std::{
    fs::{self, File},
    path::{Path, PathBuf},
    time::SystemTime,
};
use tempfile::TempDir;

#[derive(Debug)]
pub struct Scratch {
    dir: TempDir,
}

impl Scratch {
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("mkweb-")
            .tempdir()
            .context("Failed to create scratch directory")?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `content` to `name` (relative) and backdate it to `mtime`.
    pub fn write(&self, name: &Path, content: &str, mtime: Option<SystemTime>) -> Result<PathBuf> {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create `{}`", parent.display()))?;
        }
        fs::write(&path, content)
            .with_context(|| format!("Failed to write `{}`", path.display()))?;

        if let Some(mtime) = mtime {
            File::options()
                .write(true)
                .open(&path)
                .and_then(|file| file.set_modified(mtime))
                .with_context(|| format!("Failed to set mtime of `{}`", path.display()))?;
        }
        Ok(path)
    }
}
