//! Types for writing STRING files
//!

use binrw::BinWrite;
use byteorder::WriteBytesExt;
use std::io::{Cursor, Write};
use tracing::{instrument, warn};

use crate::error::Result;
use crate::layout::StringLayout;
use crate::types::{EntryRecord, StringFile, StringFileHeader, VariantRecord};

/// STRING file generator
///
/// ```
/// # fn doit() -> swg_string::error::Result<()>
/// # {
/// use swg_string::{LocaleStringId, StringEntry, StringFile, StringFileWriter};
///
/// let mut file = StringFile::default();
/// file.insert(LocaleStringId(42), StringEntry::new(vec![], 0, "Hi".into()));
///
/// // We use a buffer here, though you'd normally use a `File`
/// let buf = StringFileWriter::new(Vec::new()).write(&file)?;
/// assert_eq!(buf.len(), 25);
///
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
pub struct StringFileWriter<W: Write> {
    inner: W,
}

impl<W: Write> StringFileWriter<W> {
    /// Wrap the writer the file will be written to
    pub fn new(inner: W) -> StringFileWriter<W> {
        StringFileWriter { inner }
    }

    /// Plan the layout of `file` and write it.
    ///
    /// The header and record table are encoded in memory first, nothing reaches the inner writer
    /// unless the whole file could be laid out. The entry count written is always the number of
    /// entries in `file`.
    #[instrument(skip_all, err, fields(entries = file.len()))]
    pub fn write(mut self, file: &StringFile) -> Result<W> {
        let entry_count = file.derived_entry_count()?;
        if entry_count != file.entry_count {
            warn!(
                stored = file.entry_count,
                entry_count, "entry count doesn't match the entries, writing the number of entries"
            );
        }

        let layout = StringLayout::plan(file)?;

        let mut table = Cursor::new(Vec::with_capacity(layout.table_end as usize));
        StringFileHeader {
            magic: file.magic.0,
            version: file.version,
            entry_count,
        }
        .write(&mut table)?;

        for ((id, entry), offsets) in file.iter().zip(&layout.entries) {
            EntryRecord {
                id: id.0,
                slots: entry.variants.len() as u16 + 1,
                flags_produced: entry.flags_produced,
                offset: offsets.base,
            }
            .write(&mut table)?;

            for (variant, offset) in entry.variants.iter().zip(&offsets.variants) {
                VariantRecord {
                    flags_consumed: variant.flags_consumed,
                    flags_produced: variant.flags_produced,
                    offset: *offset,
                }
                .write(&mut table)?;
            }
        }

        debug_assert_eq!(table.position(), layout.table_end as u64);

        let mut pool = Vec::with_capacity((layout.pool_end - layout.table_end) as usize);
        for (_, entry) in file.iter() {
            pool.write_all(entry.text.as_bytes())?;
            pool.write_u8(0u8)?;

            for variant in &entry.variants {
                pool.write_all(variant.text.as_bytes())?;
                pool.write_u8(0u8)?;
            }
        }

        self.inner.write_all(table.get_ref())?;
        self.inner.write_all(&pool)?;
        self.inner.flush()?;

        Ok(self.inner)
    }
}

impl StringFile {
    /// Encode this file into a new buffer
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        StringFileWriter::new(Vec::new()).write(self)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::{assert_eq, assert_str_eq};
    use tracing_test::traced_test;

    use crate::error::{Error, Result};
    use crate::types::{LocaleStringId, Magic, StringEntry, StringFile, StringVariant};
    use crate::write::StringFileWriter;

    #[traced_test]
    #[test]
    fn empty_write() -> Result<()> {
        #[rustfmt::skip]
        let expected = vec![
            0x53, 0x54, 0x52, 0x0B, 0x00, 0x00,
        ];

        let actual = StringFile::default().to_bytes()?;

        assert_str_eq!(format!("{:02X?}", actual), format!("{:02X?}", expected));

        Ok(())
    }

    #[traced_test]
    #[test]
    fn single_entry_write() -> Result<()> {
        #[rustfmt::skip]
        let expected = vec![
            // Header
            0x53, 0x54, 0x52, 0x0B, 0x01, 0x00,
            // Entry
            0x2A, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x01, 0x00,
            0x00, 0x00,
            0x16, 0x00, 0x00, 0x00,
            // Strings
            0x48, 0x69, 0x00,
        ];

        let mut file = StringFile::new(Magic::STR, 11);
        file.insert(LocaleStringId(42), StringEntry::new(vec![], 0, "Hi".into()));

        let actual = StringFileWriter::new(Vec::new()).write(&file)?;

        assert_eq!(actual.len(), 25);
        assert_str_eq!(format!("{:02X?}", actual), format!("{:02X?}", expected));

        Ok(())
    }

    #[traced_test]
    #[test]
    fn variant_write() -> Result<()> {
        #[rustfmt::skip]
        let expected = vec![
            // Header
            0x53, 0x54, 0x52, 0x0A, 0x01, 0x00,
            // Entry
            0x05, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x02, 0x00,
            0x03, 0x00,
            0x24, 0x00, 0x00, 0x00,
            // Variant
            0x07, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x01, 0x00,
            0x27, 0x00, 0x00, 0x00,
            // Strings
            0x48, 0x69, 0x00,
            0x59, 0x6F, 0x00,
        ];

        let mut file = StringFile::new(Magic::STR, 10);
        file.insert(
            LocaleStringId(5),
            StringEntry::new(vec![StringVariant::new(7, 1, "Yo".into())], 3, "Hi".into()),
        );

        let actual = file.to_bytes()?;

        assert_str_eq!(format!("{:02X?}", actual), format!("{:02X?}", expected));

        Ok(())
    }

    #[traced_test]
    #[test]
    fn stale_entry_count_is_replaced() -> Result<()> {
        let mut file = StringFile::default();
        file.insert(LocaleStringId(1), StringEntry::new(vec![], 0, "a".into()));
        file.entry_count = 9;

        let actual = file.to_bytes()?;

        assert_eq!(&actual[4..6], &[0x01, 0x00]);
        assert!(logs_contain("entry count doesn't match"));

        Ok(())
    }

    #[traced_test]
    #[test]
    fn unknown_version_is_written_quietly() -> Result<()> {
        let mut file = StringFile::new(Magic::STR, 0x63);
        file.insert(LocaleStringId(1), StringEntry::new(vec![], 0, "a".into()));

        let actual = file.to_bytes()?;

        assert_eq!(actual[3], 0x63);
        assert!(!logs_contain("unrecognized string file version"));

        Ok(())
    }

    #[traced_test]
    #[test]
    fn nothing_written_on_invalid_document() {
        let mut file = StringFile::default();
        file.insert(LocaleStringId(1), StringEntry::new(vec![], 0, "a".into()));
        file.insert(LocaleStringId(2), StringEntry::new(vec![], 0, "b\0".into()));

        let mut out = Vec::new();
        let result = StringFileWriter::new(&mut out).write(&file);

        assert!(matches!(result, Err(Error::EmbeddedNul { .. })));
        assert!(out.is_empty());
    }
}
