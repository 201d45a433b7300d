//! PDF Xref Library
//!
//! Reads the trailing structural metadata of a PDF file and uses it to pull
//! single indirect objects out of the file without parsing the rest of it.
//! This library provides functionality to:
//! - Locate the trailer block and read `startxref` and `/Size`
//! - Walk a classical cross-reference table into location records
//! - Look up an object by number and generation
//! - Copy the raw `N G obj ... endobj` bytes of that object
//!
//! # Example
//!
//! ```no_run
//! use pdf_xref::pdf::{find_xref_entry, read_object, PdfFile};
//!
//! let file = PdfFile::open("document.pdf").expect("Failed to open PDF");
//! let trailer = file.trailer().expect("Failed to read trailer");
//! let entries = trailer.list_xref_entries().expect("Failed to read xref table");
//!
//! let entry = find_xref_entry(&entries, 1, 0).expect("No object 1");
//! let object = read_object(entry, file.source()).expect("Failed to read object");
//! print!("{}", String::from_utf8_lossy(&object.data));
//! ```

pub mod error;
pub mod pdf;

// Re-export commonly used items
pub use error::{Error, Result};
