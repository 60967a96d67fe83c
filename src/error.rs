//! Error types for archive decoding.
//!
//! Two tiers: `ArchiveError` is fatal for the whole invocation (the buffer
//! is not a readable archive), while `PairError` covers one descriptor/data
//! pair and is logged and swallowed by the orchestrator so a single corrupt
//! file never aborts the batch.

use std::io;
use thiserror::Error;

/// Fatal, archive-level failure. There is no partial result to salvage.
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("not a valid ZIP archive: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Failure while processing a single descriptor/data pair.
#[derive(Error, Debug)]
pub enum PairError {
    #[error("no data file paired with {descriptor}")]
    MissingData { descriptor: String },
    #[error("payload size mismatch: expected {expected} bytes, got {got}")]
    SizeMismatch { expected: usize, got: usize },
    #[error("unusable point dimensions (XPTS={xpts}, YPTS={ypts})")]
    BadDimensions { xpts: usize, ypts: usize },
    #[error("declared channel layout exceeds addressable payload size")]
    OversizedLayout,
    #[error("archive entry unreadable: {0}")]
    Entry(#[from] zip::result::ZipError),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
