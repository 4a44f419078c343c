//! Storage role
//!
//! Serves raw file contents by name from a root directory, keeping the most
//! recently loaded files in a FIFO cache. A file that cannot be read is
//! answered with an empty reply.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::cache::FifoCache;
use super::sanitize::sanitize;
use super::Source;
use crate::config::Settings;
use crate::error::Result;

/// File server backed by a directory
#[derive(Debug)]
pub struct Storage {
    /// Backing store root
    root: PathBuf,
    /// Sanitized file name -> content
    cache: FifoCache<String, String>,
}

impl Storage {
    pub fn new(root: impl Into<PathBuf>, cache_capacity: usize) -> Self {
        Self {
            root: root.into(),
            cache: FifoCache::new(cache_capacity),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.data_path.clone(), settings.cache_capacity)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn cache(&self) -> &FifoCache<String, String> {
        &self.cache
    }

    /// Answer one request: the file's content, or empty if unavailable
    pub fn work(&mut self, file_name: &str) -> String {
        let name = sanitize(file_name);
        let root = &self.root;

        debug!(requested = file_name, file = %name, hit = self.cache.contains(&name), "storage request");

        match self
            .cache
            .get_or_load(name, |name| fs::read_to_string(root.join(name)))
        {
            Ok(content) => content,
            Err(e) => {
                warn!(file = file_name, error = %e, "cannot read file");
                String::new()
            }
        }
    }
}

impl Source for Storage {
    fn fetch(&mut self, id: &str) -> Result<String> {
        Ok(self.work(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn storage_with(files: &[(&str, &str)]) -> (TempDir, Storage) {
        let dir = TempDir::new().unwrap();
        for (name, content) in files {
            fs::write(dir.path().join(name), content).unwrap();
        }
        let storage = Storage::new(dir.path(), 2);
        (dir, storage)
    }

    fn cached(storage: &Storage) -> Vec<&str> {
        storage.cache().keys().map(String::as_str).collect()
    }

    #[test]
    fn test_starts_with_empty_cache() {
        let (_dir, storage) = storage_with(&[]);
        assert!(storage.cache().is_empty());
    }

    #[test]
    fn test_reads_and_caches() {
        let (_dir, mut storage) = storage_with(&[("foo", "test")]);

        assert_eq!(storage.work("foo"), "test");
        assert_eq!(cached(&storage), vec!["foo"]);
        assert_eq!(storage.cache().get(&"foo".to_string()), Some(&"test".to_string()));
    }

    #[test]
    fn test_serves_hits_from_cache() {
        let (dir, mut storage) = storage_with(&[("foo", "old")]);
        storage.work("foo");

        fs::write(dir.path().join("foo"), "new").unwrap();
        assert_eq!(storage.work("foo"), "old");
    }

    #[test]
    fn test_evicts_oldest() {
        let (_dir, mut storage) =
            storage_with(&[("bar", "test1"), ("baz", "test2"), ("foo", "test3")]);

        storage.work("bar");
        storage.work("baz");
        assert_eq!(storage.work("foo"), "test3");

        assert_eq!(cached(&storage), vec!["baz", "foo"]);
    }

    #[test]
    fn test_missing_file_is_empty_and_uncached() {
        let (_dir, mut storage) = storage_with(&[("foo", "test")]);
        storage.work("foo");

        assert_eq!(storage.work("nope.csv"), "");
        assert_eq!(cached(&storage), vec!["foo"]);
    }

    #[test]
    fn test_traversal_stays_inside_root() {
        let outer = TempDir::new().unwrap();
        fs::write(outer.path().join("secret.csv"), "a\n1\n").unwrap();
        let inner = outer.path().join("data");
        fs::create_dir(&inner).unwrap();
        let mut storage = Storage::new(&inner, 2);

        assert_eq!(storage.work("../secret.csv"), "");
    }

    #[test]
    fn test_source_never_fails() {
        let (_dir, mut storage) = storage_with(&[("t.csv", "a\n1\n")]);
        assert_eq!(storage.fetch("t.csv").unwrap(), "a\n1\n");
        assert_eq!(storage.fetch("missing.csv").unwrap(), "");
    }
}
