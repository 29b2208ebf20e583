use crate::model::ContentDigest;
use ahash::AHashMap;
use std::path::{Path, PathBuf};

/// Preserve-side digest → relative paths, in scan order.
#[derive(Debug, Default)]
pub struct HashIndex {
    paths_by_digest: AHashMap<ContentDigest, Vec<PathBuf>>,
}

impl HashIndex {
    pub fn insert(&mut self, digest: ContentDigest, relative_path: PathBuf) {
        self.paths_by_digest
            .entry(digest)
            .or_default()
            .push(relative_path);
    }

    pub fn contains(&self, digest: &ContentDigest) -> bool {
        self.paths_by_digest.contains_key(digest)
    }

    pub fn paths(&self, digest: &ContentDigest) -> &[PathBuf] {
        self.paths_by_digest
            .get(digest)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The first preserve path recorded with this content.
    pub fn canonical(&self, digest: &ContentDigest) -> Option<&Path> {
        self.paths(digest).first().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.paths_by_digest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths_by_digest.is_empty()
    }
}

/// Preserve-side relative path → digest.
#[derive(Debug, Default)]
pub struct PathIndex {
    digest_by_path: AHashMap<PathBuf, ContentDigest>,
}

impl PathIndex {
    pub fn insert(&mut self, relative_path: PathBuf, digest: ContentDigest) {
        self.digest_by_path.insert(relative_path, digest);
    }

    pub fn get(&self, relative_path: &Path) -> Option<&ContentDigest> {
        self.digest_by_path.get(relative_path)
    }

    pub fn contains(&self, relative_path: &Path) -> bool {
        self.digest_by_path.contains_key(relative_path)
    }

    pub fn len(&self) -> usize {
        self.digest_by_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digest_by_path.is_empty()
    }
}
