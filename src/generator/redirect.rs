//! Redirect pages for output directories without an `index.html`.

use crate::log;
use std::{fs, path::Path};
use walkdir::WalkDir;

fn redirect_html(target: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html><head><meta http-equiv=\"refresh\" content=\"0;url={target}\"></head><body></body></html>\n"
    )
}

/// Give every directory below `destination` (itself included) that lacks an
/// `index.html` one that redirects to `site_url`. Write failures are logged
/// and skipped. Returns the number of redirects written.
pub fn emit_redirects(destination: &Path, site_url: &str) -> usize {
    let html = redirect_html(site_url);
    let mut written = 0;

    for entry in WalkDir::new(destination)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_dir())
    {
        let index = entry.path().join("index.html");
        if index.exists() {
            continue;
        }
        match fs::write(&index, &html) {
            Ok(()) => {
                log!("redir"; "{}", index.display());
                written += 1;
            }
            Err(err) => log!("warn"; "could not write `{}`: {err}", index.display()),
        }
    }
    written
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_redirects_only_where_missing() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("blog/2024")).unwrap();
        fs::create_dir_all(root.join("tag")).unwrap();
        fs::write(root.join("index.html"), "front").unwrap();
        fs::write(root.join("tag/index.html"), "tags").unwrap();

        assert_eq!(emit_redirects(root, "https://x/"), 2);

        assert_eq!(fs::read_to_string(root.join("index.html")).unwrap(), "front");
        assert_eq!(fs::read_to_string(root.join("tag/index.html")).unwrap(), "tags");
        let redirect = fs::read_to_string(root.join("blog/2024/index.html")).unwrap();
        assert!(redirect.contains("content=\"0;url=https://x/\""));
        assert!(root.join("blog/index.html").is_file());
    }

    #[test]
    fn test_second_pass_writes_nothing() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("a/b")).unwrap();

        assert_eq!(emit_redirects(dir.path(), "/"), 3);
        assert_eq!(emit_redirects(dir.path(), "/"), 0);
    }

    #[test]
    fn test_missing_destination_is_ignored() {
        let dir = TempDir::new().unwrap();
        assert_eq!(emit_redirects(&dir.path().join("none"), "/"), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_unwritable_directory_is_skipped() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let locked = dir.path().join("locked");
        fs::create_dir_all(&locked).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

        // root may write anyway; only the count of the writable dirs is fixed
        let written = emit_redirects(dir.path(), "/");
        assert!(written >= 1);
        assert!(dir.path().join("index.html").is_file());

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
    }
}
