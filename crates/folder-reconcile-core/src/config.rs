use crate::error::Error;
use config::{Config, ConfigError, Environment, File as ConfigFile, Source};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_RENAME_MARKER: char = '\'';

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub preserve_root: Option<PathBuf>,
    pub cleanup_root: Option<PathBuf>,
    pub ignore_patterns: Vec<String>,
    pub rename_marker: char,
    pub hash: HashConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            preserve_root: None,
            cleanup_root: None,
            ignore_patterns: Vec::new(),
            rename_marker: DEFAULT_RENAME_MARKER,
            hash: HashConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HashConfig {
    pub backend: HashBackendKind,
    pub seven_zip_path: Option<PathBuf>,
    pub memoize: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HashBackendKind {
    #[default]
    Native,
    /// Whatever standard digest utility the host platform ships.
    System,
    Sha256sum,
    Shasum,
    Certutil,
    SevenZip,
}

impl std::str::FromStr for HashBackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "native" => Ok(HashBackendKind::Native),
            "system" => Ok(HashBackendKind::System),
            "sha256sum" => Ok(HashBackendKind::Sha256sum),
            "shasum" => Ok(HashBackendKind::Shasum),
            "certutil" => Ok(HashBackendKind::Certutil),
            "seven-zip" | "7z" => Ok(HashBackendKind::SevenZip),
            other => Err(format!("unknown hash backend '{}'", other)),
        }
    }
}

/// Loads `Config.*` from the working directory (if present), then
/// `RECONCILE_*` environment variables on top.
pub fn load_configuration() -> Result<AppConfig, Error> {
    load_with(ConfigFile::with_name("Config").required(false))
}

/// Same layering as [`load_configuration`], but the file is given explicitly
/// and must exist.
pub fn load_configuration_from(path: &Path) -> Result<AppConfig, Error> {
    load_with(ConfigFile::from(path))
}

fn load_with<S>(file: S) -> Result<AppConfig, Error>
where
    S: Source + Send + Sync + 'static,
{
    let builder = Config::builder()
        .add_source(file)
        .add_source(
            Environment::with_prefix("RECONCILE")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;
    let config = builder.try_deserialize::<AppConfig>()?;
    validate_marker(config.rename_marker)?;
    Ok(config)
}

/// A marker that is a separator or a dot would change the directory layout or
/// the extension instead of the file stem.
pub fn validate_marker(marker: char) -> Result<(), ConfigError> {
    if marker == '.' || marker == '/' || marker == '\\' || marker.is_control() {
        return Err(ConfigError::Message(format!(
            "rename_marker {:?} is not allowed",
            marker
        )));
    }
    Ok(())
}

/// True when either directory is the other or lies beneath it.
pub fn directories_overlap(a: &Path, b: &Path) -> bool {
    a.starts_with(b) || b.starts_with(a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_overlap_with_subdirectory() {
        assert!(directories_overlap(
            Path::new("/home/user"),
            Path::new("/home/user/docs")
        ));
        assert!(directories_overlap(
            Path::new("/home/user/docs"),
            Path::new("/home/user")
        ));
        assert!(directories_overlap(Path::new("/a"), Path::new("/a")));
    }

    #[test]
    fn test_overlap_siblings_and_prefix_names() {
        assert!(!directories_overlap(
            Path::new("/home/user/photos"),
            Path::new("/home/user/docs")
        ));
        // Component-wise comparison, not string prefix
        assert!(!directories_overlap(
            Path::new("/data/archive"),
            Path::new("/data/archive2")
        ));
    }

    #[test]
    fn test_load_configuration_from_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Config.toml");
        fs::write(
            &path,
            r#"
preserve_root = "/srv/a"
cleanup_root = "/srv/b"
ignore_patterns = ["**/.git/**"]
rename_marker = "_"

[hash]
backend = "seven-zip"
seven_zip_path = "C:/Tools/7z.exe"
"#,
        )
        .unwrap();

        let config = load_configuration_from(&path).unwrap();
        assert_eq!(config.preserve_root, Some(PathBuf::from("/srv/a")));
        assert_eq!(config.cleanup_root, Some(PathBuf::from("/srv/b")));
        assert_eq!(config.ignore_patterns, vec!["**/.git/**".to_string()]);
        assert_eq!(config.rename_marker, '_');
        assert_eq!(config.hash.backend, HashBackendKind::SevenZip);
        assert!(!config.hash.memoize);
    }

    #[test]
    fn test_defaults_when_file_is_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Config.toml");
        fs::write(&path, "").unwrap();

        let config = load_configuration_from(&path).unwrap();
        assert!(config.preserve_root.is_none());
        assert_eq!(config.rename_marker, DEFAULT_RENAME_MARKER);
        assert_eq!(config.hash.backend, HashBackendKind::Native);
    }

    #[test]
    fn test_bad_marker_in_file_is_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Config.toml");
        fs::write(&path, "rename_marker = \"/\"\n").unwrap();

        match load_configuration_from(&path) {
            Err(Error::Config(err)) => assert!(err.to_string().contains("rename_marker")),
            Err(other) => panic!("unexpected error: {:?}", other),
            Ok(config) => panic!("marker accepted: {:?}", config.rename_marker),
        }
    }

    #[test]
    fn test_missing_explicit_file_is_config_error() {
        let dir = tempdir().unwrap();
        let result = load_configuration_from(&dir.path().join("absent.toml"));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_marker_validation() {
        assert!(validate_marker('\'').is_ok());
        assert!(validate_marker('~').is_ok());
        assert!(validate_marker('.').is_err());
        assert!(validate_marker('/').is_err());
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!("7z".parse::<HashBackendKind>(), Ok(HashBackendKind::SevenZip));
        assert_eq!(
            "SHA256SUM".parse::<HashBackendKind>(),
            Ok(HashBackendKind::Sha256sum)
        );
        assert!("md5".parse::<HashBackendKind>().is_err());
    }
}
