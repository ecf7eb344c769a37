//! Error types for the audit pipeline.
//!
//! Almost everything here degrades in place: bad files are skipped, bad
//! fields become absent. The only conditions worth an error type are the
//! missing input directory and failing to write the finished report.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuditError {
    /// The weekly snapshot directory does not exist; nothing to audit.
    #[error("missing snapshot directory {}; create weekly JSON first", .0.display())]
    MissingDataDir(PathBuf),

    /// Failed to read the snapshot directory or write the report.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AuditError>;
