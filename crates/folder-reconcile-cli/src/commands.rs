use clap::{Parser, Subcommand};
use folder_reconcile_core::config::HashBackendKind;
use folder_reconcile_core::SortColumn;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "folder-reconcile")]
#[command(
    about = "Fold a cleanup folder into a preserve folder by content and path",
    long_about = None
)]
pub struct Cli {
    /// Read settings from this file instead of ./Config.*
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Folder whose files are kept as the reference (Folder A)
    #[arg(long, global = true, value_name = "DIR")]
    pub preserve: Option<PathBuf>,

    /// Folder whose files are deleted or moved into the preserve folder (Folder B)
    #[arg(long, global = true, value_name = "DIR")]
    pub cleanup: Option<PathBuf>,

    /// Hashing backend: native, system, sha256sum, shasum, certutil, seven-zip
    #[arg(long, global = true, value_name = "BACKEND")]
    pub hash_backend: Option<HashBackendKind>,

    /// Do not ask for confirmation before changing files
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Classify every file and print the results table
    Plan {
        /// Sort by a column (path, digest, action); repeat to toggle direction
        #[arg(long = "sort", value_name = "COLUMN")]
        sort: Vec<SortColumn>,

        /// Write the displayed rows to a CSV file for review
        #[arg(long, value_name = "FILE")]
        csv: Option<PathBuf>,
    },
    /// Delete cleanup files whose content already exists in the preserve folder
    Delete,
    /// Move cleanup files that clash by path, renaming them with the marker
    MoveRenamed,
    /// Move cleanup files that have no counterpart in the preserve folder
    MoveNew,
    /// Run delete, move-renamed and move-new in that order
    Apply,
    /// Print configuration values
    PrintConfig,
}
