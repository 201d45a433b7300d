//! Trailer location and parsing
//!
//! Only the tail of the file is read. The trailer keyword, `/Size` and
//! `startxref` must all fall inside the last [`TAIL_WINDOW`] bytes; a
//! trailer dictionary large enough to push `trailer` out of that window is
//! still scanned for `startxref`, but its `/Size` may be missed.

use std::fmt;
use std::io::Read;

use log::{debug, warn};
use memchr::memmem;

use super::reader::{display_line, parse_decimal, LineScanner, OffsetReader, ReadAt};
use crate::error::{Error, Result};

/// Number of bytes read from the end of the file when looking for the trailer
pub const TAIL_WINDOW: u64 = 1024;

const TRAILER_KEYWORD: &[u8] = b"trailer";
const START_XREF_KEYWORD: &[u8] = b"startxref";
const SIZE_KEY: &[u8] = b"/Size ";

/// Parsed trailer of a PDF file
///
/// Borrows the byte source it was read from, so the xref table can be read
/// lazily with [`Trailer::list_xref_entries`].
pub struct Trailer<'a, R: ?Sized> {
    /// Offset of the xref table
    pub start_xref: Option<u64>,
    /// Declared number of objects, including object 0
    pub size: Option<u64>,
    /// Verbatim trailer block, starting at the `trailer` keyword when found
    pub raw: Vec<u8>,
    source: &'a R,
}

impl<'a, R: ReadAt + ?Sized> Trailer<'a, R> {
    /// Byte source this trailer was read from
    pub fn source(&self) -> &'a R {
        self.source
    }
}

impl<R: ?Sized> fmt::Debug for Trailer<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Trailer")
            .field("start_xref", &self.start_xref)
            .field("size", &self.size)
            .field("raw_len", &self.raw.len())
            .finish_non_exhaustive()
    }
}

/// Locate and parse the trailer in the last [`TAIL_WINDOW`] bytes of `source`
///
/// `file_size` is the total length of the source. Files shorter than the
/// window are read whole.
pub fn read_trailer<R: ReadAt + ?Sized>(source: &R, file_size: u64) -> Result<Trailer<'_, R>> {
    let window_start = file_size.saturating_sub(TAIL_WINDOW);
    let mut block = Vec::with_capacity((file_size - window_start) as usize);
    OffsetReader::new(source, window_start)
        .take(file_size - window_start)
        .read_to_end(&mut block)?;

    debug!("Read {} byte tail block at offset {}", block.len(), window_start);

    match memmem::find(&block, TRAILER_KEYWORD) {
        Some(pos) => {
            debug!("Found trailer keyword at offset {}", window_start + pos as u64);
            block.drain(..pos);
        }
        None => warn!(
            "No trailer keyword in the last {} bytes, scanning the whole block",
            block.len()
        ),
    }

    let (start_xref, size) = scan_trailer_block(&block)?;
    debug!("Trailer startxref={:?} size={:?}", start_xref, size);

    Ok(Trailer {
        start_xref,
        size,
        raw: block,
        source,
    })
}

/// Pull `startxref` and `/Size` out of the trailer block, line by line
fn scan_trailer_block(block: &[u8]) -> Result<(Option<u64>, Option<u64>)> {
    let mut scanner = LineScanner::new(block);
    let mut start_xref = None;
    let mut size = None;

    while let Some(line) = scanner.next_line()? {
        if line.starts_with(START_XREF_KEYWORD) {
            // The offset sits on the following line
            let value = scanner.next_line()?.unwrap_or_default();
            let offset = parse_decimal(value)
                .ok_or_else(|| Error::InvalidStartXref(display_line(value)))?;
            start_xref = Some(offset);
            continue;
        }

        if let Some(pos) = memmem::find(line, SIZE_KEY) {
            let value = &line[pos + SIZE_KEY.len()..];
            match parse_decimal(value) {
                Some(n) if n > 0 => size = Some(n),
                _ => return Err(Error::InvalidSize(display_line(value))),
            }
        }
    }

    Ok((start_xref, size))
}
