use super::HashProvider;
use crate::error::HashFailure;
use crate::model::ContentDigest;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

/// In-process streaming SHA-256.
pub struct NativeSha256;

impl HashProvider for NativeSha256 {
    fn digest(&self, path: &Path) -> Result<ContentDigest, HashFailure> {
        hash_file(path).map_err(|e| HashFailure::new(path, e))
    }

    fn name(&self) -> &str {
        "native-sha256"
    }
}

fn hash_file(path: &Path) -> io::Result<ContentDigest> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    io::copy(&mut reader, &mut hasher)?;
    Ok(ContentDigest::from_bytes(&hasher.finalize()))
}

pub fn sha256_bytes(data: &[u8]) -> ContentDigest {
    ContentDigest::from_bytes(&Sha256::digest(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    #[test]
    fn test_empty_input_produces_known_hash() {
        assert_eq!(sha256_bytes(b"").as_str(), EMPTY_SHA256);
    }

    #[test]
    fn test_file_digest_matches_bytes_digest() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hello.txt");
        fs::write(&path, "hello world").unwrap();

        let digest = NativeSha256.digest(&path).unwrap();
        assert_eq!(digest, sha256_bytes(b"hello world"));
        assert_eq!(
            digest.as_str(),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_missing_file_is_failure() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.bin");
        let failure = NativeSha256.digest(&path).unwrap_err();
        assert_eq!(failure.path, path);
        assert!(!failure.cause.is_empty());
    }
}
