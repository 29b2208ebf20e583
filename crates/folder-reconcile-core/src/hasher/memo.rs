use super::HashProvider;
use crate::error::HashFailure;
use crate::model::ContentDigest;
use dashmap::DashMap;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::UNIX_EPOCH;
use tracing::trace;

/// Reuses digests for files whose path, size and mtime have not changed.
/// Lives only as long as the session holding it.
pub struct MemoizingHasher {
    inner: Arc<dyn HashProvider>,
    digests: DashMap<String, ContentDigest>,
}

impl MemoizingHasher {
    pub fn new(inner: Arc<dyn HashProvider>) -> Self {
        Self {
            inner,
            digests: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.digests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }

    pub fn clear(&self) {
        self.digests.clear();
    }
}

/// Sub-second mtime precision so rewrites within the same second still miss.
fn cache_key(file: &Path) -> io::Result<String> {
    let canonical_path = fs::canonicalize(file)?.to_string_lossy().into_owned();
    let metadata = fs::metadata(file)?;
    let modified = metadata
        .modified()?
        .duration_since(UNIX_EPOCH)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    Ok(format!(
        "{}|{}|{}.{}",
        canonical_path,
        metadata.len(),
        modified.as_secs(),
        modified.subsec_nanos()
    ))
}

impl HashProvider for MemoizingHasher {
    fn digest(&self, path: &Path) -> Result<ContentDigest, HashFailure> {
        let key = match cache_key(path) {
            Ok(key) => key,
            Err(e) => return Err(HashFailure::new(path, e)),
        };

        if let Some(hit) = self.digests.get(&key) {
            trace!("Found digest for {} in memo", path.display());
            return Ok(hit.value().clone());
        }

        let digest = self.inner.digest(path)?;
        trace!("No digest for {} in memo, adding", path.display());
        self.digests.insert(key, digest.clone());
        Ok(digest)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
