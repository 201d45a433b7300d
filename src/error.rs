//! Error types for the PDF xref library

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the PDF xref library
#[derive(Error, Debug)]
pub enum Error {
    /// IO error other than reaching the end of the file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The line after `startxref` is not an offset
    #[error("unable to parse startxref: {0}")]
    InvalidStartXref(String),

    /// The `/Size` value is not a positive integer
    #[error("unable to parse /Size: {0}")]
    InvalidSize(String),

    /// No `startxref` was found in the trailer block
    #[error("no startxref in trailer")]
    MissingStartXref,

    /// No `/Size` was found in the trailer block
    #[error("no /Size in trailer")]
    MissingSize,

    /// The line at `startxref` is not the `xref` keyword
    #[error("should be xref, found {0:?}")]
    NotXrefTable(String),

    /// Malformed subsection header
    #[error("unable to read xref subsection {0}")]
    InvalidSubsection(String),

    /// Malformed entry line
    #[error("unable to read xref entry {0}")]
    InvalidEntry(String),

    /// The line at an entry's offset is not an object start line
    #[error("should start with a reference object, found {0:?}")]
    NotAnObject(String),

    /// No entry for the requested object number and generation
    #[error("no entry found for object {object_number} {generation}")]
    EntryNotFound { object_number: u64, generation: u32 },

    /// The xref table has no entries to pick from
    #[error("xref table has no entries")]
    EmptyXrefTable,
}

impl Error {
    /// True for lookup misses, which callers may treat as "absent" rather than fatal
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::EntryNotFound { .. })
    }
}
