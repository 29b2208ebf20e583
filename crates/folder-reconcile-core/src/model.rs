use crate::error::HashFailure;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Which of the two trees a file or root belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Preserve,
    Cleanup,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Preserve => f.write_str("Preserve"),
            Side::Cleanup => f.write_str("Cleanup"),
        }
    }
}

/// A regular file found under a scanned root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub relative_path: PathBuf,
    pub absolute_path: PathBuf,
}

/// Lowercase hex SHA-256 of a file's bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ContentDigest(String);

impl ContentDigest {
    pub const HEX_LEN: usize = 64;

    /// Accepts exactly 64 hex characters in either case.
    pub fn parse(candidate: &str) -> Option<Self> {
        if candidate.len() == Self::HEX_LEN && candidate.chars().all(|c| c.is_ascii_hexdigit()) {
            Some(ContentDigest(candidate.to_ascii_lowercase()))
        } else {
            None
        }
    }

    pub(crate) fn from_bytes(bytes: &[u8]) -> Self {
        ContentDigest(bytes.iter().map(|b| format!("{:02x}", b)).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Classification outcome for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    ReferenceCopy,
    DuplicateContent { matched_preserve_path: PathBuf },
    ConflictingPath { proposed_rename: PathBuf },
    NewFile,
}

impl Disposition {
    pub fn description(&self) -> String {
        match self {
            Disposition::ReferenceCopy => "Reference copy".to_string(),
            Disposition::DuplicateContent {
                matched_preserve_path,
            } => format!("Delete (duplicate of {})", matched_preserve_path.display()),
            Disposition::ConflictingPath { proposed_rename } => format!(
                "Move with rename to {} (path exists, content differs)",
                proposed_rename.display()
            ),
            Disposition::NewFile => "Move (new file to preserve folder)".to_string(),
        }
    }
}

/// One line of the results table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRow {
    pub side: Side,
    pub relative_path: PathBuf,
    pub absolute_path: PathBuf,
    /// `None` only for preserve files that could not be hashed.
    pub digest: Option<ContentDigest>,
    pub disposition: Disposition,
}

impl ClassificationRow {
    pub fn display_path(&self) -> String {
        self.relative_path.display().to_string()
    }

    pub fn digest_hex(&self) -> &str {
        self.digest.as_ref().map(ContentDigest::as_str).unwrap_or("")
    }

    pub fn action(&self) -> String {
        self.disposition.description()
    }

    /// The `(path, digest, action)` triple handed to result sinks and exports.
    pub fn display_fields(&self) -> DisplayRow {
        DisplayRow {
            path: self.display_path(),
            digest: self.digest_hex().to_string(),
            action: self.action(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayRow {
    pub path: String,
    pub digest: String,
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePair {
    pub source: PathBuf,
    pub destination: PathBuf,
}

impl MovePair {
    pub fn new(source: impl AsRef<Path>, destination: impl AsRef<Path>) -> Self {
        Self {
            source: source.as_ref().to_path_buf(),
            destination: destination.as_ref().to_path_buf(),
        }
    }
}

/// One of the three independently executable plan categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanKind {
    Deletions,
    RenameMoves,
    NewMoves,
}

impl PlanKind {
    pub fn progress_label(&self) -> &'static str {
        match self {
            PlanKind::Deletions => "Deleting",
            PlanKind::RenameMoves => "Moving renamed",
            PlanKind::NewMoves => "Moving new",
        }
    }
}

impl fmt::Display for PlanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanKind::Deletions => f.write_str("duplicate deletions"),
            PlanKind::RenameMoves => f.write_str("moves with rename"),
            PlanKind::NewMoves => f.write_str("new file moves"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanSummary {
    pub deletions: usize,
    pub rename_moves: usize,
    pub new_moves: usize,
    pub reference_copies: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PrepareStats {
    pub scan_duration: Duration,
    pub hash_duration: Duration,
    pub preserve_files: usize,
    pub cleanup_files: usize,
}

/// Pending operations derived from one `prepare` call.
#[derive(Debug, Clone, Default)]
pub struct ReconciliationPlan {
    pub deletions: Vec<PathBuf>,
    pub rename_moves: Vec<MovePair>,
    pub new_moves: Vec<MovePair>,
    /// Preserve rows first, then cleanup rows, both in scan order.
    pub rows: Vec<ClassificationRow>,
    /// Cleanup files left out of the plan because hashing failed.
    pub skipped: Vec<HashFailure>,
    pub stats: PrepareStats,
}

impl ReconciliationPlan {
    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            deletions: self.deletions.len(),
            rename_moves: self.rename_moves.len(),
            new_moves: self.new_moves.len(),
            reference_copies: self
                .rows
                .iter()
                .filter(|row| row.disposition == Disposition::ReferenceCopy)
                .count(),
            skipped: self.skipped.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.deletions.is_empty() && self.rename_moves.is_empty() && self.new_moves.is_empty()
    }

    pub fn len_of(&self, kind: PlanKind) -> usize {
        match kind {
            PlanKind::Deletions => self.deletions.len(),
            PlanKind::RenameMoves => self.rename_moves.len(),
            PlanKind::NewMoves => self.new_moves.len(),
        }
    }
}
