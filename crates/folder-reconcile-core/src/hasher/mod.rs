pub mod command;
pub mod memo;
pub mod native;

use crate::config::{HashBackendKind, HashConfig};
use crate::error::{Error, HashFailure};
use crate::model::ContentDigest;
use crate::platform;
use std::path::Path;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info};

pub use command::{CommandHasher, CommandTool};
pub use memo::MemoizingHasher;
pub use native::NativeSha256;

/// Computes content digests. Implementations never panic or propagate
/// errors past a single file; every problem becomes a [`HashFailure`].
pub trait HashProvider: Send + Sync {
    fn digest(&self, path: &Path) -> Result<ContentDigest, HashFailure>;

    fn name(&self) -> &str;
}

static SELECTED_BACKEND: OnceLock<Arc<dyn HashProvider>> = OnceLock::new();

/// Returns the process-wide backend, resolving it from `config` on first use.
/// Later calls ignore `config` and return the cached choice.
pub fn select_backend(config: &HashConfig) -> Result<Arc<dyn HashProvider>, Error> {
    if let Some(backend) = SELECTED_BACKEND.get() {
        return Ok(Arc::clone(backend));
    }
    let resolved = resolve_backend(config)?;
    let backend = SELECTED_BACKEND.get_or_init(|| resolved);
    info!("Using '{}' hash backend", backend.name());
    Ok(Arc::clone(backend))
}

/// Builds a backend from configuration without caching it.
pub fn resolve_backend(config: &HashConfig) -> Result<Arc<dyn HashProvider>, Error> {
    let backend: Arc<dyn HashProvider> = match config.backend {
        HashBackendKind::Native => Arc::new(NativeSha256),
        HashBackendKind::System => Arc::new(system_command_hasher()?),
        HashBackendKind::Sha256sum => Arc::new(CommandHasher::locate(CommandTool::Sha256sum)?),
        HashBackendKind::Shasum => Arc::new(CommandHasher::locate(CommandTool::Shasum)?),
        HashBackendKind::Certutil => Arc::new(CommandHasher::locate(CommandTool::Certutil)?),
        HashBackendKind::SevenZip => match &config.seven_zip_path {
            Some(exe) if exe.is_file() => {
                Arc::new(CommandHasher::new(CommandTool::SevenZip, exe.clone()))
            }
            Some(exe) => {
                return Err(Error::BackendUnavailable(format!(
                    "7-Zip executable '{}' does not exist",
                    exe.display()
                )))
            }
            None => Arc::new(CommandHasher::locate(CommandTool::SevenZip)?),
        },
    };

    if config.memoize {
        debug!("Memoizing digests for '{}'", backend.name());
        return Ok(Arc::new(MemoizingHasher::new(backend)));
    }
    Ok(backend)
}

fn system_command_hasher() -> Result<CommandHasher, Error> {
    let candidates = platform::system_hash_tools();
    for tool in candidates {
        if let Ok(hasher) = CommandHasher::locate(*tool) {
            return Ok(hasher);
        }
    }
    Err(Error::BackendUnavailable(format!(
        "none of {:?} found on PATH",
        candidates
            .iter()
            .map(|tool| tool.program())
            .collect::<Vec<_>>()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_resolve_native_by_default() {
        let backend = resolve_backend(&HashConfig::default()).unwrap();
        assert_eq!(backend.name(), "native-sha256");
    }

    #[test]
    fn test_resolve_memoized() {
        let config = HashConfig {
            memoize: true,
            ..HashConfig::default()
        };
        let backend = resolve_backend(&config).unwrap();
        assert_eq!(backend.name(), "native-sha256");
    }

    #[test]
    fn test_missing_seven_zip_path_is_unavailable() {
        let config = HashConfig {
            backend: HashBackendKind::SevenZip,
            seven_zip_path: Some(PathBuf::from("/definitely/not/here/7z.exe")),
            memoize: false,
        };
        match resolve_backend(&config) {
            Err(Error::BackendUnavailable(msg)) => assert!(msg.contains("7z.exe")),
            Err(other) => panic!("unexpected error: {:?}", other),
            Ok(_) => panic!("expected missing 7-Zip to fail"),
        }
    }

    #[test]
    fn test_select_backend_is_cached() {
        let first = select_backend(&HashConfig::default()).unwrap();
        let bogus = HashConfig {
            backend: HashBackendKind::SevenZip,
            seven_zip_path: Some(PathBuf::from("/definitely/not/here/7z.exe")),
            memoize: false,
        };
        let second = select_backend(&bogus).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }
}
