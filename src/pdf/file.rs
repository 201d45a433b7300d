//! Opening a PDF file for trailer and object reading

use std::fs::File;
use std::path::{Path, PathBuf};

use log::info;

use super::trailer::{read_trailer, Trailer};
use crate::error::{Error, Result};

/// A PDF file opened once for positional reads
///
/// Trailers read from it borrow the handle, so they cannot outlive it.
#[derive(Debug)]
pub struct PdfFile {
    path: PathBuf,
    file: File,
    len: u64,
}

impl PdfFile {
    /// Open `path` and record its length
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }

        let file = File::open(path)?;
        let len = file.metadata()?.len();
        info!("Opened {} ({} bytes)", path.display(), len);

        Ok(Self {
            path: path.to_path_buf(),
            file,
            len,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File length in bytes
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Underlying handle, usable as a [`ReadAt`](super::ReadAt) source
    pub fn source(&self) -> &File {
        &self.file
    }

    /// Locate and parse the trailer at the end of the file
    pub fn trailer(&self) -> Result<Trailer<'_, File>> {
        read_trailer(&self.file, self.len)
    }
}
