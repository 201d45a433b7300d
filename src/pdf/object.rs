//! Raw indirect object extraction

use log::{debug, warn};

use super::reader::{display_line, LineScanner, OffsetReader, ReadAt};
use super::xref::XrefEntry;
use crate::error::{Error, Result};

const OBJ_SUFFIX: &[u8] = b"obj";
const END_OBJ: &[u8] = b"endobj";

/// Bytes of one indirect object, from its `N G obj` line through `endobj`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawObject {
    /// Object lines, each followed by a single `\n`
    pub data: Vec<u8>,
    /// False when the file ended before an `endobj` line was seen
    pub terminated: bool,
}

/// Copy the object that `entry` points at out of `source`
///
/// The line at the entry's offset must end with `obj`. Lines are copied up
/// to and including the first one equal to `endobj` (ignoring case), with
/// line endings normalized to `\n`. Running out of data first is not an
/// error; the partial object comes back with `terminated` unset.
pub fn read_object<R: ReadAt + ?Sized>(entry: &XrefEntry, source: &R) -> Result<RawObject> {
    let mut scanner = LineScanner::new(OffsetReader::new(source, entry.byte_offset));

    let first = scanner.next_line()?.unwrap_or_default();
    if !first.ends_with(OBJ_SUFFIX) {
        return Err(Error::NotAnObject(display_line(first)));
    }

    let mut data = Vec::new();
    push_line(&mut data, first);

    let mut terminated = false;
    while let Some(line) = scanner.next_line()? {
        push_line(&mut data, line);
        if line.eq_ignore_ascii_case(END_OBJ) {
            terminated = true;
            break;
        }
    }

    if terminated {
        debug!(
            "Read object {} {} ({} bytes) at offset {}",
            entry.object_number,
            entry.generation,
            data.len(),
            entry.byte_offset
        );
    } else {
        warn!(
            "Object {} {} at offset {} has no endobj before end of file",
            entry.object_number, entry.generation, entry.byte_offset
        );
    }

    Ok(RawObject { data, terminated })
}

fn push_line(data: &mut Vec<u8>, line: &[u8]) {
    data.extend_from_slice(line);
    data.push(b'\n');
}
