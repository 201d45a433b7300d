//! PDF trailer, xref table and object reading

pub mod file;
pub mod object;
pub mod reader;
pub mod trailer;
pub mod xref;

// Re-export commonly used items
pub use file::PdfFile;
pub use object::{read_object, RawObject};
pub use reader::{dump_at, LineScanner, OffsetReader, ReadAt};
pub use trailer::{read_trailer, Trailer, TAIL_WINDOW};
pub use xref::{find_xref_entry, lookup_xref_entry, XrefEntry};
