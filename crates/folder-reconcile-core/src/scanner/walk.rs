use crate::error::Error;
use crate::model::FileEntry;
use glob::{MatchOptions, Pattern};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, trace};
use walkdir::WalkDir;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Recursive listing of regular files under a root.
///
/// Entries come back sorted by file name within each directory so that the
/// scan order, and every tie-break that depends on it, is the same on every
/// filesystem. Symlinks are neither followed nor listed.
pub struct TreeScanner {
    ignore_patterns: Vec<Pattern>,
}

impl TreeScanner {
    pub fn new(ignore_globs: &[String]) -> Self {
        let ignore_patterns = ignore_globs
            .iter()
            .filter_map(|glob| match Pattern::new(glob) {
                Ok(p) => Some(p),
                Err(e) => {
                    error!("Invalid glob pattern '{}': {}", glob, e);
                    None
                }
            })
            .collect();
        Self { ignore_patterns }
    }

    /// Patterns see only the path below the root, never its ancestors. A
    /// pattern without a separator also matches the bare file name.
    fn is_ignored(&self, relative: &Path) -> bool {
        let file_name = relative.file_name().map(Path::new);
        self.ignore_patterns.iter().any(|pattern| {
            pattern.matches_path_with(relative, MATCH_OPTIONS)
                || file_name.is_some_and(|name| pattern.matches_path_with(name, MATCH_OPTIONS))
        })
    }

    /// Any unreadable directory or entry fails the whole scan.
    pub fn scan(&self, root: &Path, cancel: &AtomicBool) -> Result<Vec<FileEntry>, Error> {
        let mut files = Vec::new();

        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                if entry.depth() == 0 {
                    return true;
                }
                match entry.path().strip_prefix(root) {
                    Ok(relative) => !self.is_ignored(relative),
                    Err(_) => true,
                }
            });

        for entry in walker {
            if cancel.load(Ordering::Relaxed) {
                return Err(Error::Cancelled);
            }

            let entry = entry.map_err(|source| Error::Scan {
                path: source
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.to_path_buf()),
                source,
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let relative_path = match entry.path().strip_prefix(root) {
                Ok(relative) => relative.to_path_buf(),
                Err(_) => continue,
            };
            trace!("Found {}", relative_path.display());

            files.push(FileEntry {
                relative_path,
                absolute_path: entry.into_path(),
            });
        }

        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn relative_paths(entries: &[FileEntry]) -> Vec<PathBuf> {
        entries.iter().map(|e| e.relative_path.clone()).collect()
    }

    #[test]
    fn test_scan_nested_tree_in_name_order() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("b/deep")).unwrap();
        fs::create_dir_all(root.join("a")).unwrap();
        fs::write(root.join("b/deep/z.txt"), "z").unwrap();
        fs::write(root.join("a/y.txt"), "y").unwrap();
        fs::write(root.join("top.txt"), "t").unwrap();
        fs::write(root.join("empty.txt"), "").unwrap();

        let cancel = AtomicBool::new(false);
        let entries = TreeScanner::new(&[]).scan(root, &cancel).unwrap();

        assert_eq!(
            relative_paths(&entries),
            vec![
                PathBuf::from("a/y.txt"),
                PathBuf::from("b/deep/z.txt"),
                PathBuf::from("empty.txt"),
                PathBuf::from("top.txt"),
            ]
        );
        for entry in &entries {
            assert_eq!(entry.absolute_path, root.join(&entry.relative_path));
        }
    }

    #[test]
    fn test_scan_empty_root() {
        let dir = tempdir().unwrap();
        let cancel = AtomicBool::new(false);
        let entries = TreeScanner::new(&[]).scan(dir.path(), &cancel).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_ignore_patterns() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("keep")).unwrap();
        fs::create_dir_all(root.join("cache")).unwrap();
        fs::write(root.join("keep/a.txt"), "a").unwrap();
        fs::write(root.join("keep/b.tmp"), "b").unwrap();
        fs::write(root.join("cache/c.txt"), "c").unwrap();

        let patterns = vec![
            "*.tmp".to_string(),
            "cache".to_string(),
            "[invalid".to_string(),
        ];
        let cancel = AtomicBool::new(false);
        let entries = TreeScanner::new(&patterns).scan(root, &cancel).unwrap();
        assert_eq!(relative_paths(&entries), vec![PathBuf::from("keep/a.txt")]);
    }

    #[test]
    fn test_patterns_do_not_see_root_ancestors() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("backups").join("cleanup");
        fs::create_dir_all(root.join("docs")).unwrap();
        fs::write(root.join("docs/report.txt"), "r").unwrap();

        let patterns = vec!["*backups*".to_string(), "*cleanup*".to_string()];
        let cancel = AtomicBool::new(false);
        let entries = TreeScanner::new(&patterns).scan(&root, &cancel).unwrap();
        assert_eq!(relative_paths(&entries), vec![PathBuf::from("docs/report.txt")]);
    }

    #[test]
    fn test_star_does_not_cross_separators() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src/build")).unwrap();
        fs::write(root.join("src/build/out.o"), "o").unwrap();
        fs::write(root.join("src/main.c"), "c").unwrap();

        let patterns = vec!["src*out.o".to_string(), "**/build/**".to_string()];
        let cancel = AtomicBool::new(false);
        let entries = TreeScanner::new(&patterns).scan(root, &cancel).unwrap();
        assert_eq!(relative_paths(&entries), vec![PathBuf::from("src/main.c")]);
    }

    #[test]
    fn test_missing_root_is_scan_failure() {
        let dir = tempdir().unwrap();
        let cancel = AtomicBool::new(false);
        let result = TreeScanner::new(&[]).scan(&dir.path().join("missing"), &cancel);
        assert!(matches!(result, Err(Error::Scan { .. })));
    }

    #[test]
    fn test_cancelled_scan() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        let cancel = AtomicBool::new(true);
        let result = TreeScanner::new(&[]).scan(dir.path(), &cancel);
        assert!(matches!(result, Err(Error::Cancelled)));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_are_not_listed() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("real.txt"), "r").unwrap();
        std::os::unix::fs::symlink(root.join("real.txt"), root.join("link.txt")).unwrap();

        let cancel = AtomicBool::new(false);
        let entries = TreeScanner::new(&[]).scan(root, &cancel).unwrap();
        assert_eq!(relative_paths(&entries), vec![PathBuf::from("real.txt")]);
    }
}
