//! Static file copying.
//!
//! With `[build] static` set (and different from `source`), that directory is
//! mirrored into the destination. Otherwise every file of `source` whose type
//! is not processed is copied next to the rendered pages.

use super::{collect_all_files, needs_rebuild};
use crate::config::SiteConfig;
use crate::log;
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

/// Copy static files, returns how many were copied.
pub fn copy_static(config: &SiteConfig) -> Result<usize> {
    let build = &config.build;
    let (root, files) = match &build.static_dir {
        Some(dir) if *dir != build.source => {
            if !dir.is_dir() {
                log!("warn"; "static directory `{}` not found, nothing copied", dir.display());
                return Ok(0);
            }
            (dir.as_path(), collect_all_files(dir))
        }
        _ => {
            let files = collect_all_files(&build.source)
                .into_iter()
                .filter(|f| !build.is_processed(f))
                .collect();
            (build.source.as_path(), files)
        }
    };

    let copied: Vec<bool> = files
        .par_iter()
        .map(|file| copy_file(root, file, &build.destination))
        .collect::<Result<_>>()?;

    Ok(copied.into_iter().filter(|&c| c).count())
}

/// Copy `file` (below `root`) to the same relative place under `dest`,
/// unless the copy is already current.
fn copy_file(root: &Path, file: &Path, dest: &Path) -> Result<bool> {
    let rel = file
        .strip_prefix(root)
        .with_context(|| format!("`{}` is outside `{}`", file.display(), root.display()))?;
    let target: PathBuf = dest.join(rel);

    if !needs_rebuild(file, &target, &[]) {
        return Ok(false);
    }

    log!("copy"; "{}", rel.display());
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create `{}`", parent.display()))?;
    }
    fs::copy(file, &target)
        .with_context(|| format!("Failed to copy `{}`", file.display()))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn site(dir: &Path) -> SiteConfig {
        let mut config = SiteConfig::default();
        config.build.source = dir.join("pages");
        config.build.destination = dir.join("public");
        fs::create_dir_all(dir.join("pages/img")).unwrap();
        fs::write(dir.join("pages/index.md"), "# hi").unwrap();
        fs::write(dir.join("pages/img/logo.png"), "png").unwrap();
        config
    }

    #[test]
    fn test_copy_source_skips_processed_types() {
        let dir = TempDir::new().unwrap();
        let config = site(dir.path());

        assert_eq!(copy_static(&config).unwrap(), 1);
        assert!(dir.path().join("public/img/logo.png").is_file());
        assert!(!dir.path().join("public/index.md").exists());
    }

    #[test]
    fn test_copy_is_incremental() {
        let dir = TempDir::new().unwrap();
        let config = site(dir.path());

        assert_eq!(copy_static(&config).unwrap(), 1);
        assert_eq!(copy_static(&config).unwrap(), 0);
    }

    #[test]
    fn test_copy_static_dir() {
        let dir = TempDir::new().unwrap();
        let mut config = site(dir.path());
        fs::create_dir_all(dir.path().join("static/css")).unwrap();
        fs::write(dir.path().join("static/css/site.css"), "body{}").unwrap();
        config.build.static_dir = Some(dir.path().join("static"));

        assert_eq!(copy_static(&config).unwrap(), 1);
        assert!(dir.path().join("public/css/site.css").is_file());
        assert!(!dir.path().join("public/img/logo.png").exists());
    }

    #[test]
    fn test_missing_static_dir_is_not_fatal() {
        let dir = TempDir::new().unwrap();
        let mut config = site(dir.path());
        config.build.static_dir = Some(dir.path().join("nope"));

        assert_eq!(copy_static(&config).unwrap(), 0);
    }
}
