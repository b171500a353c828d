//! Front-matter extraction.
//!
//! The front-matter block is YAML between a leading `---` line and the next
//! `---` (or `...`) line. Blank lines before the opening marker are allowed.

use super::{FrontMatter, MetaError, date};
use crate::config::BuildConfig;
use serde_yaml::{Mapping, Value};
use std::{fs, path::Path};

/// Extract the front-matter of `path`.
///
/// Returns `Ok(None)` for file types that are not processed and for
/// documents without (or with an empty) front-matter block.
pub fn extract(path: &Path, build: &BuildConfig) -> Result<Option<FrontMatter>, MetaError> {
    if !build.is_processed(path) {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|e| MetaError::Io(path.to_path_buf(), e))?;
    parse_front_matter(&content, path)
}

/// Parse the front-matter at the head of `content`. `path` only labels errors.
pub fn parse_front_matter(content: &str, path: &Path) -> Result<Option<FrontMatter>, MetaError> {
    let Some(block) = split_block(content, path)? else {
        return Ok(None);
    };
    if block.trim().is_empty() {
        return Ok(None);
    }

    let value: Value =
        serde_yaml::from_str(&block).map_err(|e| MetaError::Yaml(path.to_path_buf(), e))?;
    match value {
        Value::Null => Ok(None),
        Value::Mapping(map) => from_mapping(map, path).map(Some),
        _ => Err(MetaError::NotAMapping(path.to_path_buf())),
    }
}

/// The raw YAML text between the markers, `None` without an opening marker.
fn split_block(content: &str, path: &Path) -> Result<Option<String>, MetaError> {
    let mut lines = content.lines().skip_while(|line| line.trim().is_empty());

    match lines.next() {
        Some(first) if first.trim_end() == "---" => {}
        _ => return Ok(None),
    }

    let mut block = String::new();
    for line in lines {
        let marker = line.trim_end();
        if marker == "---" || marker == "..." {
            return Ok(Some(block));
        }
        block.push_str(line);
        block.push('\n');
    }
    Err(MetaError::Unterminated(path.to_path_buf()))
}

fn from_mapping(map: Mapping, path: &Path) -> Result<FrontMatter, MetaError> {
    let mut meta = FrontMatter::default();

    for (key, value) in map {
        let key = match key {
            Value::String(s) => s,
            other => scalar_to_string(&other).unwrap_or_default(),
        };
        match key.as_str() {
            "title" => meta.title = scalar_to_string(&value),
            "summary" => meta.summary = scalar_to_string(&value),
            "date" => meta.date = Some(date::normalize(&value)),
            "tags" => meta.tags = string_list(&value, &key, path)?,
            "extensions" | "plugins" => {
                if let Some(list) = string_list(&value, &key, path)? {
                    let extensions = meta.extensions.get_or_insert_with(Vec::new);
                    for ext in list {
                        if !extensions.contains(&ext) {
                            extensions.push(ext);
                        }
                    }
                }
            }
            _ => {
                meta.extra.insert(key, value);
            }
        }
    }

    Ok(meta)
}

/// A scalar as text. `None` for null, sequences and mappings.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

/// A scalar or a sequence of scalars, deduplicated in order.
fn string_list(value: &Value, field: &str, path: &Path) -> Result<Option<Vec<String>>, MetaError> {
    let invalid = || MetaError::InvalidList {
        path: path.to_path_buf(),
        field: field.to_owned(),
    };

    let items = match value {
        Value::Null => return Ok(None),
        Value::Sequence(seq) => seq
            .iter()
            .map(|item| scalar_to_string(item).ok_or_else(invalid))
            .collect::<Result<Vec<_>, _>>()?,
        Value::Mapping(_) => return Err(invalid()),
        scalar => vec![scalar_to_string(scalar).ok_or_else(invalid)?],
    };

    let mut list: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        if !list.contains(&item) {
            list.push(item);
        }
    }
    Ok(Some(list))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn parse(content: &str) -> Result<Option<FrontMatter>, MetaError> {
        parse_front_matter(content, Path::new("test.md"))
    }

    #[test]
    fn test_parse_full_front_matter() {
        let doc = "---\n\
                   title: Hello\n\
                   date: 2024-03-01 14:30\n\
                   tags: [rust, web]\n\
                   summary: A first post\n\
                   extensions: [mermaid]\n\
                   author: Alice\n\
                   ---\n\
                   # Body\n";
        let meta = parse(doc).unwrap().unwrap();

        assert_eq!(meta.title.as_deref(), Some("Hello"));
        assert_eq!(date::format(&meta.date.unwrap()), "2024-03-01 14:30");
        assert_eq!(meta.tags(), ["rust", "web"]);
        assert_eq!(meta.summary.as_deref(), Some("A first post"));
        assert_eq!(meta.extensions(), ["mermaid"]);
        assert_eq!(meta.extra.get("author"), Some(&Value::String("Alice".into())));
    }

    #[test]
    fn test_no_front_matter() {
        assert_eq!(parse("# Just a heading\n\ntext").unwrap(), None);
        assert_eq!(parse("").unwrap(), None);
    }

    #[test]
    fn test_empty_front_matter_is_none() {
        assert_eq!(parse("---\n---\nbody").unwrap(), None);
        assert_eq!(parse("---\n~\n---\nbody").unwrap(), None);
    }

    #[test]
    fn test_leading_blank_lines_and_dots_terminator() {
        let meta = parse("\n\n---\ntitle: Dots\n...\nbody").unwrap().unwrap();
        assert_eq!(meta.title.as_deref(), Some("Dots"));
    }

    #[test]
    fn test_unterminated_block() {
        let err = parse("---\ntitle: Open\nno end here\n").unwrap_err();
        assert!(matches!(err, MetaError::Unterminated(_)));
    }

    #[test]
    fn test_malformed_yaml() {
        let err = parse("---\ntitle: [broken\n---\n").unwrap_err();
        assert!(matches!(err, MetaError::Yaml(..)));
    }

    #[test]
    fn test_not_a_mapping() {
        let err = parse("---\n- a\n- b\n---\n").unwrap_err();
        assert!(matches!(err, MetaError::NotAMapping(_)));
    }

    #[test]
    fn test_scalar_tag_and_number_title() {
        let meta = parse("---\ntitle: 1984\ntags: books\n---\n").unwrap().unwrap();
        assert_eq!(meta.title.as_deref(), Some("1984"));
        assert_eq!(meta.tags(), ["books"]);
    }

    #[test]
    fn test_duplicate_tags_collapse() {
        let meta = parse("---\ntags: [a, b, a, 3]\n---\n").unwrap().unwrap();
        assert_eq!(meta.tags(), ["a", "b", "3"]);
    }

    #[test]
    fn test_nested_tag_rejected() {
        let err = parse("---\ntags: [a, {b: c}]\n---\n").unwrap_err();
        assert!(matches!(err, MetaError::InvalidList { ref field, .. } if field == "tags"));
    }

    #[test]
    fn test_legacy_plugins_key() {
        let meta = parse("---\nplugins: [katex]\nextensions: [katex, mermaid]\n---\n")
            .unwrap()
            .unwrap();
        assert_eq!(meta.extensions(), ["katex", "mermaid"]);
    }

    #[test]
    fn test_bare_year_date() {
        let meta = parse("---\ndate: 2019\n---\n").unwrap().unwrap();
        assert_eq!(meta.year(), Some(2019));
    }

    #[test]
    fn test_extract_skips_unprocessed_types() {
        let dir = TempDir::new().unwrap();
        let image = dir.path().join("logo.png");
        fs::write(&image, "---\ntitle: not really\n---\n").unwrap();

        let build = BuildConfig::default();
        assert_eq!(extract(&image, &build).unwrap(), None);
    }

    #[test]
    fn test_extract_reads_processed_file() {
        let dir = TempDir::new().unwrap();
        let page = dir.path().join("page.md");
        fs::write(&page, "---\ntitle: Page\n---\ntext").unwrap();

        let meta = extract(&page, &BuildConfig::default()).unwrap().unwrap();
        assert_eq!(meta.title.as_deref(), Some("Page"));
    }

    #[test]
    fn test_extract_missing_file() {
        let err = extract(&PathBuf::from("/nonexistent/page.md"), &BuildConfig::default());
        assert!(matches!(err, Err(MetaError::Io(..))));
    }
}
