//! Metadata Index.
//!
//! Built once from a [`SourceTree`] and read-only afterwards. Documents are
//! stored in discovery order; the tag and year maps refer to them by
//! position, so every listed entry also exists in the path map and list
//! order within a tag or year is discovery order.

use crate::compiler::SourceTree;
use crate::config::BuildConfig;
use crate::meta::{self, Document, FrontMatter, MetaError};
use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    path::{Path, PathBuf},
    time::SystemTime,
};

#[derive(Debug, Default)]
pub struct MetadataIndex {
    documents: Vec<Document>,
    by_path: HashMap<PathBuf, usize>,
    tags: BTreeMap<String, Vec<usize>>,
    years: BTreeMap<i32, Vec<usize>>,
    extensions: BTreeSet<String>,
    newest: Option<SystemTime>,
}

impl MetadataIndex {
    /// Extract every file of `tree`. The first extraction error aborts.
    pub fn collect(tree: &SourceTree, build: &BuildConfig) -> Result<Self, MetaError> {
        let mut index = Self {
            newest: tree.newest,
            ..Default::default()
        };

        for file in &tree.files {
            let Some(meta) = meta::extract(file, build)? else {
                continue;
            };
            let rel = file.strip_prefix(&tree.root).unwrap_or(file);
            index.insert(Document::new(rel, meta));
        }

        Ok(index)
    }

    /// Index already extracted documents, in the given order.
    #[cfg(test)]
    pub fn from_documents(documents: impl IntoIterator<Item = Document>) -> Self {
        let mut index = Self::default();
        for doc in documents {
            index.insert(doc);
        }
        index
    }

    fn insert(&mut self, doc: Document) {
        let pos = self.documents.len();

        for tag in doc.meta.tags() {
            self.tags.entry(tag.clone()).or_default().push(pos);
        }
        if let Some(year) = doc.meta.year() {
            self.years.entry(year).or_default().push(pos);
        }
        self.extensions
            .extend(doc.meta.extensions().iter().cloned());

        self.by_path.insert(doc.path.clone(), pos);
        self.documents.push(doc);
    }

    /// All indexed documents, in discovery order.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn get(&self, rel: &Path) -> Option<&FrontMatter> {
        self.by_path.get(rel).map(|&pos| &self.documents[pos].meta)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Tag names in ascending order.
    pub fn tag_names(&self) -> impl Iterator<Item = &str> {
        self.tags.keys().map(String::as_str)
    }

    /// Documents carrying `tag`, in discovery order.
    pub fn tagged(&self, tag: &str) -> Vec<&Document> {
        self.resolve(self.tags.get(tag))
    }

    /// Years in ascending order.
    pub fn years(&self) -> impl DoubleEndedIterator<Item = i32> + '_ {
        self.years.keys().copied()
    }

    /// Documents dated in `year`, in discovery order.
    pub fn in_year(&self, year: i32) -> Vec<&Document> {
        self.resolve(self.years.get(&year))
    }

    /// Extensions referenced by any document.
    pub fn extensions(&self) -> &BTreeSet<String> {
        &self.extensions
    }

    /// Newest modification time in the source tree at collection time.
    pub fn newest(&self) -> Option<SystemTime> {
        self.newest
    }

    fn resolve(&self, positions: Option<&Vec<usize>>) -> Vec<&Document> {
        positions
            .map(|list| list.iter().map(|&pos| &self.documents[pos]).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::compiler::walk_source;
    use crate::meta::date;
    use serde_yaml::Value;
    use std::fs;
    use tempfile::TempDir;

    /// Build a document for tests, `date` in `YYYY-MM-DD HH:MM`.
    pub(crate) fn doc(path: &str, title: &str, date: Option<&str>, tags: &[&str]) -> Document {
        let meta = FrontMatter {
            title: Some(title.to_string()),
            date: date.map(|d| date::normalize(&Value::String(d.to_string()))),
            tags: (!tags.is_empty()).then(|| tags.iter().map(|t| t.to_string()).collect()),
            ..Default::default()
        };
        Document::new(path, meta)
    }

    fn paths(docs: &[&Document]) -> Vec<String> {
        docs.iter().map(|d| d.path.display().to_string()).collect()
    }

    #[test]
    fn test_tag_lists_keep_discovery_order() {
        let index = MetadataIndex::from_documents([
            doc("z.md", "Zed", None, &["rust"]),
            doc("a.md", "Alpha", None, &["rust", "web"]),
            doc("m.md", "Mid", None, &["web"]),
        ]);

        assert_eq!(index.tag_names().collect::<Vec<_>>(), ["rust", "web"]);
        assert_eq!(paths(&index.tagged("rust")), ["z.md", "a.md"]);
        assert_eq!(paths(&index.tagged("web")), ["a.md", "m.md"]);
        assert!(index.tagged("absent").is_empty());
    }

    #[test]
    fn test_every_tagged_document_is_indexed_by_path() {
        let index = MetadataIndex::from_documents([
            doc("a.md", "A", None, &["x", "y"]),
            doc("b.md", "B", None, &["y"]),
        ]);
        for tag in index.tag_names() {
            for d in index.tagged(tag) {
                assert!(index.get(&d.path).is_some());
            }
        }
    }

    #[test]
    fn test_each_document_in_exactly_one_year() {
        let index = MetadataIndex::from_documents([
            doc("a.md", "A", Some("2020-01-01 00:00"), &[]),
            doc("b.md", "B", Some("2021-12-31 23:59"), &[]),
            doc("c.md", "C", Some("2020-06-15 12:00"), &[]),
            doc("d.md", "D", None, &[]),
        ]);

        assert_eq!(index.years().collect::<Vec<_>>(), [2020, 2021]);
        assert_eq!(paths(&index.in_year(2020)), ["a.md", "c.md"]);
        assert_eq!(paths(&index.in_year(2021)), ["b.md"]);

        for d in index.documents() {
            let hits = index
                .years()
                .filter(|&y| index.in_year(y).iter().any(|e| e.path == d.path))
                .count();
            let expected = usize::from(d.meta.date.is_some());
            assert_eq!(hits, expected, "{}", d.path.display());
        }
    }

    #[test]
    fn test_collect_from_tree() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("blog")).unwrap();
        fs::write(
            root.join("blog/first.md"),
            "---\ntitle: First\ndate: 2023-05-01 10:00\ntags: [intro]\nextensions: [katex]\n---\nbody",
        )
        .unwrap();
        fs::write(root.join("plain.md"), "no front-matter").unwrap();
        fs::write(root.join("logo.png"), "---\ntitle: nope\n---\n").unwrap();

        let tree = walk_source(root).unwrap();
        let index = MetadataIndex::collect(&tree, &BuildConfig::default()).unwrap();

        assert_eq!(index.len(), 1);
        let meta = index.get(Path::new("blog/first.md")).unwrap();
        assert_eq!(meta.title.as_deref(), Some("First"));
        assert_eq!(paths(&index.tagged("intro")), ["blog/first.md"]);
        assert_eq!(index.in_year(2023).len(), 1);
        assert!(index.extensions().contains("katex"));
        assert_eq!(index.newest(), tree.newest);
    }

    #[test]
    fn test_collect_aborts_on_bad_front_matter() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.md"), "---\ntitle: ok\n---\n").unwrap();
        fs::write(dir.path().join("b.md"), "---\ntitle: [bad\n---\n").unwrap();

        let tree = walk_source(dir.path()).unwrap();
        let result = MetadataIndex::collect(&tree, &BuildConfig::default());
        assert!(matches!(result, Err(MetaError::Yaml(..))));
    }
}
