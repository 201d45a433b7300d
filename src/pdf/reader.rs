//! Positioned reading over random-access byte sources
//!
//! The trailer block, the xref table and object bodies are all scanned line
//! by line starting somewhere in the middle of the file. [`OffsetReader`]
//! turns any [`ReadAt`] source into a forward-only [`Read`] stream starting
//! at a given offset, and [`LineScanner`] splits such a stream into lines.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::str::FromStr;

use log::debug;

/// Random-access byte source
///
/// `read_at` fills `buf` from absolute position `offset` and returns the
/// number of bytes read. Reading at or past the end returns `Ok(0)`.
pub trait ReadAt {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize>;
}

impl ReadAt for [u8] {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        let start = match usize::try_from(offset) {
            Ok(start) if start < self.len() => start,
            _ => return Ok(0),
        };
        let n = buf.len().min(self.len() - start);
        buf[..n].copy_from_slice(&self[start..start + n]);
        Ok(n)
    }
}

impl ReadAt for Vec<u8> {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        self.as_slice().read_at(buf, offset)
    }
}

impl ReadAt for File {
    #[cfg(unix)]
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        std::os::unix::fs::FileExt::read_at(self, buf, offset)
    }

    #[cfg(windows)]
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        std::os::windows::fs::FileExt::seek_read(self, buf, offset)
    }
}

impl<T: ReadAt + ?Sized> ReadAt for &T {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        (**self).read_at(buf, offset)
    }
}

/// Sequential reader over a [`ReadAt`] source, starting at an arbitrary offset
///
/// Each `read` is a positioned read at the current cursor; the cursor then
/// advances by the number of bytes actually returned. The end of the source
/// shows up as `Ok(0)`, and a short final read is ordinary data.
pub struct OffsetReader<'a, R: ?Sized> {
    source: &'a R,
    offset: u64,
}

impl<'a, R: ReadAt + ?Sized> OffsetReader<'a, R> {
    pub fn new(source: &'a R, offset: u64) -> Self {
        Self { source, offset }
    }

    /// Absolute position of the next byte to be read
    pub fn position(&self) -> u64 {
        self.offset
    }
}

impl<R: ReadAt + ?Sized> Read for OffsetReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.source.read_at(buf, self.offset)?;
        self.offset += n as u64;
        Ok(n)
    }
}

/// Splits a byte stream into lines
///
/// Lines are yielded without their `\n` terminator and without one trailing
/// `\r`, so `\n` and `\r\n` files scan the same. A last line with no
/// terminator is still yielded.
pub struct LineScanner<R> {
    inner: BufReader<R>,
    line: Vec<u8>,
}

impl<R: Read> LineScanner<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner: BufReader::new(inner),
            line: Vec::new(),
        }
    }

    /// Next line, or `None` once the stream is exhausted
    pub fn next_line(&mut self) -> io::Result<Option<&[u8]>> {
        self.line.clear();
        if self.inner.read_until(b'\n', &mut self.line)? == 0 {
            return Ok(None);
        }
        if self.line.last() == Some(&b'\n') {
            self.line.pop();
        }
        if self.line.last() == Some(&b'\r') {
            self.line.pop();
        }
        Ok(Some(&self.line))
    }
}

/// Copy everything from `offset` to the end of `source` into `out`
///
/// Returns the number of bytes copied.
pub fn dump_at<R, W>(source: &R, offset: u64, out: &mut W) -> io::Result<u64>
where
    R: ReadAt + ?Sized,
    W: Write + ?Sized,
{
    let mut reader = OffsetReader::new(source, offset);
    let copied = io::copy(&mut reader, out)?;
    debug!("Dumped {} bytes from offset {} to {}", copied, offset, reader.position());
    Ok(copied)
}

/// Printable form of a scanned line for error messages
pub(crate) fn display_line(line: &[u8]) -> String {
    String::from_utf8_lossy(line).into_owned()
}

/// Parse a whole field as a base-10 number
pub(crate) fn parse_decimal<T: FromStr>(field: &[u8]) -> Option<T> {
    std::str::from_utf8(field).ok()?.parse().ok()
}
