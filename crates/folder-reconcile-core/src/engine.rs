use crate::config::{self, AppConfig, DEFAULT_RENAME_MARKER};
use crate::error::Error;
use crate::hasher::HashProvider;
use crate::index::{HashIndex, PathIndex};
use crate::model::{
    ClassificationRow, ContentDigest, Disposition, FileEntry, MovePair, PrepareStats,
    ReconciliationPlan, Side,
};
use crate::progress::{ProgressReporter, ProgressTicker, ResultSink};
use crate::rename;
use crate::scanner::TreeScanner;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub ignore_patterns: Vec<String>,
    pub rename_marker: char,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            ignore_patterns: Vec::new(),
            rename_marker: DEFAULT_RENAME_MARKER,
        }
    }
}

impl From<&AppConfig> for EngineOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            ignore_patterns: config.ignore_patterns.clone(),
            rename_marker: config.rename_marker,
        }
    }
}

/// Classifies every cleanup file against the preserve tree.
pub struct ReconciliationEngine {
    hasher: Arc<dyn HashProvider>,
    options: EngineOptions,
    cancel_token: Arc<AtomicBool>,
}

struct PreserveIndexes {
    by_digest: HashIndex,
    by_path: PathIndex,
}

impl ReconciliationEngine {
    pub fn new(hasher: Arc<dyn HashProvider>) -> Self {
        Self {
            hasher,
            options: EngineOptions::default(),
            cancel_token: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn hasher(&self) -> &Arc<dyn HashProvider> {
        &self.hasher
    }

    /// Setting the token stops the current `prepare` between two files.
    pub fn cancel_token(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel_token)
    }

    fn check_cancelled(&self) -> Result<(), Error> {
        if self.cancel_token.load(Ordering::Relaxed) {
            return Err(Error::Cancelled);
        }
        Ok(())
    }

    /// Build a fresh plan:
    /// 1. Scan both trees completely
    /// 2. Hash the preserve tree into digest and path indexes
    /// 3. Hash and classify each cleanup file against those indexes
    ///
    /// Rows go to `sink` as they are produced: preserve rows first, then
    /// cleanup rows, both in scan order.
    pub fn prepare(
        &self,
        preserve_root: Option<&Path>,
        cleanup_root: Option<&Path>,
        reporter: &dyn ProgressReporter,
        sink: &mut dyn ResultSink,
    ) -> Result<ReconciliationPlan, Error> {
        let (preserve_root, cleanup_root) = validate_roots(preserve_root, cleanup_root)?;
        self.cancel_token.store(false, Ordering::Relaxed);
        reporter.on_prepare_start();
        sink.clear();
        let prepare_start = Instant::now();

        // Phase 1: Scan
        info!("Scanning preserve and cleanup folders...");
        let scan_start = Instant::now();
        let scanner = TreeScanner::new(&self.options.ignore_patterns);
        let preserve_files = scanner.scan(preserve_root, &self.cancel_token)?;
        let cleanup_files = scanner.scan(cleanup_root, &self.cancel_token)?;
        let scan_duration = scan_start.elapsed();
        reporter.on_scan_complete(
            preserve_files.len(),
            cleanup_files.len(),
            scan_duration.as_secs_f64(),
        );
        debug!(
            "Scan completed in {:.2}s: {} preserve files, {} cleanup files",
            scan_duration.as_secs_f64(),
            preserve_files.len(),
            cleanup_files.len(),
        );

        // Phase 2 and 3: Hash and classify
        let hash_start = Instant::now();
        let total = preserve_files.len() + cleanup_files.len();
        let ticker = ProgressTicker::new(
            reporter,
            total,
            &format!("Building hash tables: 0/{}", total),
        );
        let mut plan = ReconciliationPlan::default();

        let indexes = self.index_preserve(&preserve_files, &ticker, sink, &mut plan)?;
        debug!(
            "Indexed {} distinct digests over {} preserve paths",
            indexes.by_digest.len(),
            indexes.by_path.len(),
        );

        let offset = preserve_files.len();
        for (index, entry) in cleanup_files.iter().enumerate() {
            self.check_cancelled()?;

            match self.hasher.digest(&entry.absolute_path) {
                Ok(digest) => {
                    let disposition =
                        self.classify(entry, &digest, &indexes, preserve_root, &mut plan);
                    let row = ClassificationRow {
                        side: Side::Cleanup,
                        relative_path: entry.relative_path.clone(),
                        absolute_path: entry.absolute_path.clone(),
                        digest: Some(digest),
                        disposition,
                    };
                    sink.push(&row);
                    plan.rows.push(row);
                }
                Err(failure) => {
                    warn!("Skipping cleanup file: {}", failure);
                    plan.skipped.push(failure);
                }
            }

            ticker.tick(offset + index + 1, || {
                format!("Processing cleanup: {}/{}", index + 1, cleanup_files.len())
            });
        }
        ticker.finish(&format!("Completed: {}/{}", total, total));
        let hash_duration = hash_start.elapsed();

        plan.stats = PrepareStats {
            scan_duration,
            hash_duration,
            preserve_files: preserve_files.len(),
            cleanup_files: cleanup_files.len(),
        };

        let summary = plan.summary();
        info!(
            "Ready to process: {} files to delete, {} files to rename and move, {} new files to move, {} reference files",
            summary.deletions, summary.rename_moves, summary.new_moves, summary.reference_copies,
        );
        if summary.skipped > 0 {
            warn!(
                "{} cleanup files could not be hashed and are left out of the plan",
                summary.skipped
            );
        }
        reporter.on_prepare_complete(&summary, prepare_start.elapsed().as_secs_f64());

        Ok(plan)
    }

    /// Every preserve file becomes a reference row; only hashed ones are indexed.
    fn index_preserve(
        &self,
        preserve_files: &[FileEntry],
        ticker: &ProgressTicker<'_>,
        sink: &mut dyn ResultSink,
        plan: &mut ReconciliationPlan,
    ) -> Result<PreserveIndexes, Error> {
        let mut indexes = PreserveIndexes {
            by_digest: HashIndex::default(),
            by_path: PathIndex::default(),
        };

        for (index, entry) in preserve_files.iter().enumerate() {
            self.check_cancelled()?;

            let digest = match self.hasher.digest(&entry.absolute_path) {
                Ok(digest) => {
                    indexes
                        .by_digest
                        .insert(digest.clone(), entry.relative_path.clone());
                    indexes
                        .by_path
                        .insert(entry.relative_path.clone(), digest.clone());
                    Some(digest)
                }
                Err(failure) => {
                    warn!("Preserve file left out of the indexes: {}", failure);
                    None
                }
            };

            let row = ClassificationRow {
                side: Side::Preserve,
                relative_path: entry.relative_path.clone(),
                absolute_path: entry.absolute_path.clone(),
                digest,
                disposition: Disposition::ReferenceCopy,
            };
            sink.push(&row);
            plan.rows.push(row);

            ticker.tick(index + 1, || {
                format!("Hashing preserve: {}/{}", index + 1, preserve_files.len())
            });
        }

        Ok(indexes)
    }

    /// Content match wins over path match; the operation lands in `plan`.
    fn classify(
        &self,
        entry: &FileEntry,
        digest: &ContentDigest,
        indexes: &PreserveIndexes,
        preserve_root: &Path,
        plan: &mut ReconciliationPlan,
    ) -> Disposition {
        if let Some(matched) = indexes.by_digest.canonical(digest) {
            plan.deletions.push(entry.absolute_path.clone());
            return Disposition::DuplicateContent {
                matched_preserve_path: matched.to_path_buf(),
            };
        }

        if indexes.by_path.contains(&entry.relative_path) {
            let proposed_rename =
                rename::marked_name(&entry.relative_path, self.options.rename_marker);
            plan.rename_moves.push(MovePair::new(
                &entry.absolute_path,
                preserve_root.join(&proposed_rename),
            ));
            return Disposition::ConflictingPath { proposed_rename };
        }

        plan.new_moves.push(MovePair::new(
            &entry.absolute_path,
            preserve_root.join(&entry.relative_path),
        ));
        Disposition::NewFile
    }
}

/// Both roots must be set, be existing directories, and not contain each other.
pub fn validate_roots<'a>(
    preserve_root: Option<&'a Path>,
    cleanup_root: Option<&'a Path>,
) -> Result<(&'a Path, &'a Path), Error> {
    let preserve = preserve_root.ok_or(Error::RootNotSet(Side::Preserve))?;
    let cleanup = cleanup_root.ok_or(Error::RootNotSet(Side::Cleanup))?;

    let preserve_canonical = canonical_dir(preserve)?;
    let cleanup_canonical = canonical_dir(cleanup)?;

    if config::directories_overlap(&preserve_canonical, &cleanup_canonical) {
        return Err(Error::OverlappingRoots {
            preserve: preserve.to_path_buf(),
            cleanup: cleanup.to_path_buf(),
        });
    }

    Ok((preserve, cleanup))
}

fn canonical_dir(path: &Path) -> Result<PathBuf, Error> {
    let canonical = path.canonicalize().map_err(|e| Error::InvalidRoot {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    if !canonical.is_dir() {
        return Err(Error::InvalidRoot {
            path: path.to_path_buf(),
            reason: "not a directory".to_string(),
        });
    }
    Ok(canonical)
}
