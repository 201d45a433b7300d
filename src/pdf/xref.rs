//! Classical cross-reference table reading and lookup

use log::{debug, trace, warn};

use super::reader::{display_line, parse_decimal, LineScanner, OffsetReader, ReadAt};
use super::trailer::Trailer;
use crate::error::{Error, Result};

const XREF_KEYWORD: &[u8] = b"xref";

/// One row of the cross-reference table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XrefEntry {
    /// Absolute position of the object's `N G obj` line
    pub byte_offset: u64,
    /// Subsection start plus the entry's position within the subsection
    pub object_number: u64,
    pub generation: u32,
    /// `n` entries are in use, anything else is free
    pub in_use: bool,
}

/// Current subsection while walking the table
#[derive(Default)]
struct Subsection {
    first: u64,
    count: u64,
    pos: u64,
}

impl<'a, R: ReadAt + ?Sized> Trailer<'a, R> {
    /// Read the xref table at `startxref`
    ///
    /// Stops once `/Size` entries have been read, which also keeps the scan
    /// from running into the `trailer` keyword after the table. Lines beyond
    /// the declared count of a subsection are skipped. Entries are returned
    /// in table order.
    pub fn list_xref_entries(&self) -> Result<Vec<XrefEntry>> {
        let start_xref = self.start_xref.ok_or(Error::MissingStartXref)?;
        let size = self.size.ok_or(Error::MissingSize)?;

        let mut scanner = LineScanner::new(OffsetReader::new(self.source(), start_xref));
        let first_line = scanner.next_line()?.unwrap_or_default();
        if first_line != XREF_KEYWORD {
            return Err(Error::NotXrefTable(display_line(first_line)));
        }

        let mut entries = Vec::new();
        let mut subsection = Subsection::default();
        let mut total = 0u64;

        while let Some(line) = scanner.next_line()? {
            if total == size {
                break;
            }

            let fields: Vec<&[u8]> = line.splitn(3, |&b| b == b' ').collect();

            if fields.len() == 2 {
                subsection = parse_subsection(&fields)?;
                debug!(
                    "Xref subsection starting at object {} with {} entries",
                    subsection.first, subsection.count
                );
                continue;
            }

            if subsection.pos == subsection.count {
                warn!(
                    "Skipping xref line past the end of its subsection: {:?}",
                    display_line(line)
                );
                continue;
            }

            let mut entry = parse_entry(&fields)?;
            entry.object_number = subsection
                .first
                .checked_add(subsection.pos)
                .ok_or_else(|| {
                    Error::InvalidSubsection(format!("object number {} overflows", subsection.first))
                })?;
            trace!("{:?}", entry);

            entries.push(entry);
            subsection.pos += 1;
            total += 1;
        }

        debug!("Read {} xref entries of {} declared", entries.len(), size);
        Ok(entries)
    }
}

fn parse_subsection(fields: &[&[u8]]) -> Result<Subsection> {
    let first: u64 = parse_decimal(fields[0])
        .ok_or_else(|| Error::InvalidSubsection(format!("offset {:?}", display_line(fields[0]))))?;
    let count: u64 = parse_decimal(fields[1])
        .ok_or_else(|| Error::InvalidSubsection(format!("count {:?}", display_line(fields[1]))))?;

    // Every object number in the subsection must fit in a u64
    if first.checked_add(count).is_none() {
        return Err(Error::InvalidSubsection(format!(
            "{} {} runs past the largest object number",
            first, count
        )));
    }

    Ok(Subsection {
        first,
        count,
        pos: 0,
    })
}

/// Parse `<offset> <generation> <n|f>`; the object number is filled in by the caller
fn parse_entry(fields: &[&[u8]]) -> Result<XrefEntry> {
    if fields.len() != 3 {
        let line = fields.join(&b' ');
        return Err(Error::InvalidEntry(format!("line {:?}", display_line(&line))));
    }

    let byte_offset = parse_decimal(fields[0])
        .ok_or_else(|| Error::InvalidEntry(format!("offset {:?}", display_line(fields[0]))))?;
    let generation = parse_decimal(fields[1])
        .ok_or_else(|| Error::InvalidEntry(format!("generation {:?}", display_line(fields[1]))))?;

    Ok(XrefEntry {
        byte_offset,
        object_number: 0,
        generation,
        in_use: fields[2].starts_with(b"n"),
    })
}

/// First entry in table order matching `object_number` and `generation`
pub fn lookup_xref_entry(
    entries: &[XrefEntry],
    object_number: u64,
    generation: u32,
) -> Option<&XrefEntry> {
    entries
        .iter()
        .find(|e| e.object_number == object_number && e.generation == generation)
}

/// Like [`lookup_xref_entry`], but a miss is an [`Error::EntryNotFound`]
pub fn find_xref_entry(
    entries: &[XrefEntry],
    object_number: u64,
    generation: u32,
) -> Result<&XrefEntry> {
    lookup_xref_entry(entries, object_number, generation).ok_or(Error::EntryNotFound {
        object_number,
        generation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::read_trailer;

    /// Build a file whose xref table body is `table`, with a matching trailer
    fn pdf_with_table(table: &str, size: u64) -> Vec<u8> {
        let mut data = b"%PDF-1.4\n".to_vec();
        let start_xref = data.len();
        data.extend_from_slice(b"xref\n");
        data.extend_from_slice(table.as_bytes());
        data.extend_from_slice(
            format!("trailer\n<<\n/Size {}\n>>\nstartxref\n{}\n%%EOF\n", size, start_xref).as_bytes(),
        );
        data
    }

    fn entries_of(data: &Vec<u8>) -> Result<Vec<XrefEntry>> {
        read_trailer(data, data.len() as u64)?.list_xref_entries()
    }

    fn entry(byte_offset: u64, object_number: u64, generation: u32, in_use: bool) -> XrefEntry {
        XrefEntry {
            byte_offset,
            object_number,
            generation,
            in_use,
        }
    }

    #[test]
    fn test_single_subsection() {
        let data = pdf_with_table(
            "0 3\n0000000000 65535 f \n0000000017 00000 n \n0000000081 00002 n \n",
            3,
        );
        let entries = entries_of(&data).unwrap();

        assert_eq!(
            entries,
            vec![
                entry(0, 0, 65535, false),
                entry(17, 1, 0, true),
                entry(81, 2, 2, true),
            ]
        );
    }

    #[test]
    fn test_subsections_reanchor_numbering() {
        let data = pdf_with_table(
            "0 1\n0000000000 65535 f \n3 2\n0000000025 00000 n \n0000000099 00000 n \n",
            3,
        );
        let numbers: Vec<u64> = entries_of(&data)
            .unwrap()
            .iter()
            .map(|e| e.object_number)
            .collect();

        assert_eq!(numbers, vec![0, 3, 4]);
    }

    #[test]
    fn test_crlf_entries() {
        let data = pdf_with_table("0 2\r\n0000000000 65535 f\r\n0000000009 00000 n\r\n", 2);
        let entries = entries_of(&data).unwrap();

        assert_eq!(entries.len(), 2);
        assert!(entries[1].in_use);
        assert_eq!(entries[1].byte_offset, 9);
    }

    #[test]
    fn test_stops_at_declared_size() {
        // Size covers only the first two entries
        let data = pdf_with_table(
            "0 3\n0000000000 65535 f \n0000000017 00000 n \n0000000081 00000 n \n",
            2,
        );
        let entries = entries_of(&data).unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_skips_lines_past_subsection_count() {
        let data = pdf_with_table(
            "0 1\n0000000000 65535 f \n0000000017 00000 n \n1 1\n0000000040 00000 n \n",
            2,
        );
        let entries = entries_of(&data).unwrap();

        assert_eq!(entries, vec![entry(0, 0, 65535, false), entry(40, 1, 0, true)]);
    }

    #[test]
    fn test_not_n_means_free() {
        let data = pdf_with_table("0 2\n0000000000 65535 x \n0000000017 00000 N \n", 2);
        let entries = entries_of(&data).unwrap();
        assert!(!entries[0].in_use);
        assert!(!entries[1].in_use);
    }

    #[test]
    fn test_not_xref() {
        // startxref points at the header line instead of the table
        let data = b"%PDF-1.4\nxref\n0 1\n0000000000 65535 f \ntrailer\n<<\n/Size 1\n>>\nstartxref\n0\n%%EOF\n"
            .to_vec();

        let err = entries_of(&data).unwrap_err();
        assert!(matches!(err, Error::NotXrefTable(ref line) if line == "%PDF-1.4"));
    }

    #[test]
    fn test_invalid_subsection() {
        let data = pdf_with_table("0 x\n0000000000 65535 f \n", 1);
        assert!(matches!(entries_of(&data), Err(Error::InvalidSubsection(_))));
    }

    #[test]
    fn test_subsection_object_number_overflow() {
        let data = pdf_with_table(
            "18446744073709551615 2\n0000000000 00000 n \n0000000000 00000 n \n",
            2,
        );
        assert!(matches!(entries_of(&data), Err(Error::InvalidSubsection(_))));
    }

    #[test]
    fn test_subsection_at_largest_object_number() {
        let data = pdf_with_table("18446744073709551614 1\n0000000009 00000 n \n", 1);
        let entries = entries_of(&data).unwrap();
        assert_eq!(entries, vec![entry(9, u64::MAX - 1, 0, true)]);
    }

    #[test]
    fn test_invalid_entry_offset() {
        let data = pdf_with_table("0 1\n00000000zz 65535 f \n", 1);
        assert!(matches!(entries_of(&data), Err(Error::InvalidEntry(_))));
    }

    #[test]
    fn test_invalid_entry_generation() {
        let data = pdf_with_table("0 1\n0000000000 6553x f \n", 1);
        assert!(matches!(entries_of(&data), Err(Error::InvalidEntry(_))));
    }

    #[test]
    fn test_entry_with_one_field() {
        let data = pdf_with_table("0 1\n0000000000\n", 1);
        assert!(matches!(entries_of(&data), Err(Error::InvalidEntry(_))));
    }

    #[test]
    fn test_missing_trailer_fields() {
        let data = b"xref\n0 1\n0000000000 65535 f \ntrailer\n<<\n>>\n".to_vec();
        let trailer = read_trailer(&data, data.len() as u64).unwrap();
        assert!(matches!(trailer.list_xref_entries(), Err(Error::MissingStartXref)));

        let data = b"xref\n0 1\n0000000000 65535 f \ntrailer\n<<\n>>\nstartxref\n0\n".to_vec();
        let trailer = read_trailer(&data, data.len() as u64).unwrap();
        assert!(matches!(trailer.list_xref_entries(), Err(Error::MissingSize)));
    }

    #[test]
    fn test_parsing_twice_is_identical() {
        let data = pdf_with_table("0 2\n0000000000 65535 f \n0000000017 00000 n \n", 2);
        let first = read_trailer(&data, data.len() as u64).unwrap();
        let second = read_trailer(&data, data.len() as u64).unwrap();

        assert_eq!(first.start_xref, second.start_xref);
        assert_eq!(first.size, second.size);
        assert_eq!(first.raw, second.raw);
        assert_eq!(
            first.list_xref_entries().unwrap(),
            second.list_xref_entries().unwrap()
        );
    }

    #[test]
    fn test_lookup_hit_and_miss() {
        let entries = vec![entry(10, 4, 0, true), entry(20, 5, 0, true), entry(30, 5, 1, true)];

        assert_eq!(lookup_xref_entry(&entries, 5, 0), Some(&entries[1]));
        assert_eq!(lookup_xref_entry(&entries, 5, 1), Some(&entries[2]));
        assert_eq!(lookup_xref_entry(&entries, 6, 0), None);

        let err = find_xref_entry(&entries, 6, 0).unwrap_err();
        assert!(err.is_not_found());
        assert!(matches!(
            err,
            Error::EntryNotFound {
                object_number: 6,
                generation: 0
            }
        ));
    }

    #[test]
    fn test_lookup_returns_first_duplicate() {
        let entries = vec![entry(10, 5, 0, true), entry(99, 5, 0, true)];
        assert_eq!(find_xref_entry(&entries, 5, 0).unwrap().byte_offset, 10);
    }
}
