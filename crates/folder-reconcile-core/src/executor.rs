use crate::error::ExecutionFailure;
use crate::model::{MovePair, PlanKind};
use crate::progress::{ProgressReporter, ProgressTicker};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone)]
pub struct ExecutionReport {
    pub kind: PlanKind,
    pub attempted: usize,
    pub succeeded: usize,
    pub failures: Vec<ExecutionFailure>,
}

impl ExecutionReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

#[derive(Debug, Clone)]
pub enum ExecutionOutcome {
    /// The plan category was empty; nothing touched the filesystem.
    NothingToDo(PlanKind),
    Completed(ExecutionReport),
}

impl ExecutionOutcome {
    pub fn report(&self) -> Option<&ExecutionReport> {
        match self {
            ExecutionOutcome::NothingToDo(_) => None,
            ExecutionOutcome::Completed(report) => Some(report),
        }
    }

    pub fn message(&self) -> String {
        match self {
            ExecutionOutcome::NothingToDo(kind) => format!("Nothing to do: no {}", kind),
            ExecutionOutcome::Completed(report) => format!(
                "{}: {} succeeded, {} failed",
                report.kind,
                report.succeeded,
                report.failed()
            ),
        }
    }
}

/// Remove each file. Failures are collected and the batch keeps going.
pub fn execute_deletions(paths: &[PathBuf], reporter: &dyn ProgressReporter) -> ExecutionOutcome {
    run_batch(PlanKind::Deletions, paths, reporter, |path| {
        fs::remove_file(path).map_err(|e| ExecutionFailure {
            path: path.clone(),
            cause: e.to_string(),
        })?;
        debug!("deleted: {}", path.display());
        Ok(())
    })
}

/// Move each source to its destination, creating parent directories first.
pub fn execute_moves(
    kind: PlanKind,
    pairs: &[MovePair],
    reporter: &dyn ProgressReporter,
) -> ExecutionOutcome {
    run_batch(kind, pairs, reporter, |pair| {
        move_file(&pair.source, &pair.destination).map_err(|e| ExecutionFailure {
            path: pair.source.clone(),
            cause: e.to_string(),
        })?;
        debug!(
            "moved: {} -> {}",
            pair.source.display(),
            pair.destination.display()
        );
        Ok(())
    })
}

fn run_batch<T>(
    kind: PlanKind,
    items: &[T],
    reporter: &dyn ProgressReporter,
    op: impl Fn(&T) -> Result<(), ExecutionFailure>,
) -> ExecutionOutcome {
    if items.is_empty() {
        info!("Nothing to do: no {}", kind);
        return ExecutionOutcome::NothingToDo(kind);
    }

    reporter.on_execute_start(kind, items.len());
    let label = kind.progress_label();
    let ticker = ProgressTicker::new(reporter, items.len(), &format!("{}: 0/{}", label, items.len()));

    let mut report = ExecutionReport {
        kind,
        attempted: items.len(),
        succeeded: 0,
        failures: Vec::new(),
    };

    for (index, item) in items.iter().enumerate() {
        match op(item) {
            Ok(()) => report.succeeded += 1,
            Err(failure) => {
                error!("{}", failure);
                report.failures.push(failure);
            }
        }
        ticker.tick(index + 1, || format!("{}: {}/{}", label, index + 1, items.len()));
    }
    ticker.finish(&format!("Completed: {}/{}", items.len(), items.len()));

    info!(
        "{} executed: {} succeeded, {} failed",
        kind,
        report.succeeded,
        report.failed()
    );
    reporter.on_execute_complete(&report);
    ExecutionOutcome::Completed(report)
}

/// Rename when possible, otherwise copy and remove the source (for moves
/// across filesystems). An existing destination is overwritten.
pub fn move_file(source: &Path, destination: &Path) -> io::Result<()> {
    if let Some(parent) = destination.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    if destination.exists() {
        warn!(
            "Destination '{}' already exists and will be overwritten",
            destination.display()
        );
    }

    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            if !source.is_file() {
                return Err(rename_err);
            }
            debug!(
                "rename of '{}' failed ({}), copying instead",
                source.display(),
                rename_err
            );
            fs::copy(source, destination)?;
            fs::remove_file(source)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::SilentReporter;
    use tempfile::tempdir;

    #[test]
    fn test_move_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src.txt");
        fs::write(&src, "data").unwrap();
        let dst = dir.path().join("a/b/c/dst.txt");

        move_file(&src, &dst).unwrap();
        assert!(!src.exists());
        assert_eq!(fs::read_to_string(&dst).unwrap(), "data");
    }

    #[test]
    fn test_move_overwrites_existing_destination() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("new.txt");
        let dst = dir.path().join("old.txt");
        fs::write(&src, "new").unwrap();
        fs::write(&dst, "old").unwrap();

        move_file(&src, &dst).unwrap();
        assert_eq!(fs::read_to_string(&dst).unwrap(), "new");
    }

    #[test]
    fn test_move_missing_source_fails() {
        let dir = tempdir().unwrap();
        let result = move_file(&dir.path().join("gone"), &dir.path().join("dst"));
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_batches_are_nothing_to_do() {
        let deletions = execute_deletions(&[], &SilentReporter);
        assert!(matches!(
            deletions,
            ExecutionOutcome::NothingToDo(PlanKind::Deletions)
        ));
        assert!(deletions.report().is_none());

        let moves = execute_moves(PlanKind::NewMoves, &[], &SilentReporter);
        assert!(matches!(moves, ExecutionOutcome::NothingToDo(PlanKind::NewMoves)));
        assert_eq!(moves.message(), "Nothing to do: no new file moves");
    }

    #[test]
    fn test_deletion_failures_do_not_stop_batch() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        fs::write(&a, "a").unwrap();
        fs::write(&b, "b").unwrap();
        let missing = dir.path().join("missing.txt");

        let outcome = execute_deletions(&[a.clone(), missing.clone(), b.clone()], &SilentReporter);
        let report = outcome.report().unwrap();
        assert_eq!(report.attempted, 3);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.failures[0].path, missing);
        assert!(!a.exists());
        assert!(!b.exists());
        assert_eq!(outcome.message(), "duplicate deletions: 2 succeeded, 1 failed");
    }
}
