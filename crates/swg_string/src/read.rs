//! Types for reading STRING files
//!

use binrw::{BinRead, BinResult};
use bon::Builder;
use indexmap::IndexMap;
use std::{
    fmt,
    io::{Cursor, Read, Seek},
};
use tracing::{debug, instrument, warn};

use crate::error::{Error, Result};
use crate::types::{
    EntryRecord, FormatProfile, LocaleStringId, Magic, StringEntry, StringFile, StringFileHeader,
    StringVariant, VariantRecord,
};

/// How the reader handles a locale string id that appears more than once
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateKeys {
    /// Keep the entry read last, at the position of the first occurrence
    #[default]
    LastWins,
    /// Fail with [`Error::DuplicateLocaleId`]
    Reject,
}

/// Options for how a STRING file should be read
#[derive(Debug, Default, Clone, Copy, Builder)]
pub struct StringFileReaderOptions {
    /// Policy for repeated locale string ids
    #[builder(default)]
    pub duplicate_keys: DuplicateKeys,
}

/// Data quality problem the reader recovered from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadAnomaly {
    /// A string offset points at or beyond the end of the file, the text was left empty
    OffsetOutOfRange {
        /// Entry the string belongs to
        id: LocaleStringId,
        /// Variant index, or `None` for the base string
        variant: Option<usize>,
        /// The offending offset
        offset: u32,
        /// Size of the file
        stream_len: u64,
    },
    /// The file ended before the string's terminator, the bytes up to the end were kept
    Unterminated {
        /// Entry the string belongs to
        id: LocaleStringId,
        /// Variant index, or `None` for the base string
        variant: Option<usize>,
        /// Offset the string starts at
        offset: u32,
    },
    /// The string isn't valid UTF-8, invalid sequences were replaced with U+FFFD
    InvalidUtf8 {
        /// Entry the string belongs to
        id: LocaleStringId,
        /// Variant index, or `None` for the base string
        variant: Option<usize>,
        /// Offset the string starts at
        offset: u32,
    },
}

impl fmt::Display for ReadAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (id, variant) = match self {
            ReadAnomaly::OffsetOutOfRange { id, variant, .. } => (id, variant),
            ReadAnomaly::Unterminated { id, variant, .. } => (id, variant),
            ReadAnomaly::InvalidUtf8 { id, variant, .. } => (id, variant),
        };
        match variant {
            Some(index) => write!(f, "variant {} of {}: ", index, id)?,
            None => write!(f, "{}: ", id)?,
        }

        match self {
            ReadAnomaly::OffsetOutOfRange {
                offset, stream_len, ..
            } => write!(
                f,
                "string offset {} is beyond the end of the file ({} bytes)",
                offset, stream_len
            ),
            ReadAnomaly::Unterminated { offset, .. } => {
                write!(f, "string at offset {} has no terminator", offset)
            }
            ReadAnomaly::InvalidUtf8 { offset, .. } => {
                write!(f, "string at offset {} is not valid utf-8", offset)
            }
        }
    }
}

/// STRING file reader
///
/// ```no_run
/// use std::io::prelude::*;
///
/// fn list_entries(reader: impl Read + Seek) -> swg_string::error::Result<()> {
///     let strings = swg_string::StringFileReader::new(reader)?;
///
///     for (id, entry) in strings.file().iter() {
///         println!("{}: {}", id, entry.text);
///     }
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct StringFileReader {
    file: StringFile,
    anomalies: Vec<ReadAnomaly>,
}

impl StringFileReader {
    /// Read a STRING file and parse its entries.
    pub fn new<R: Read + Seek>(reader: R) -> Result<StringFileReader> {
        Self::with_options(reader, StringFileReaderOptions::default())
    }

    /// Read a STRING file and return only the parsed document.
    pub fn decode<R: Read + Seek>(reader: R) -> Result<StringFile> {
        Ok(Self::new(reader)?.into_file())
    }

    /// Read a STRING file using the given options.
    ///
    /// The whole stream is loaded into memory once, strings are then resolved from that buffer.
    /// Truncation inside the header or record table aborts the read. A damaged string only affects
    /// that one string and is reported through [`StringFileReader::anomalies`].
    #[instrument(skip_all, err)]
    pub fn with_options<R: Read + Seek>(
        mut reader: R,
        options: StringFileReaderOptions,
    ) -> Result<StringFileReader> {
        reader.rewind()?;
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;

        let mut cursor = Cursor::new(data.as_slice());
        let header = read_fixed(&mut cursor, "header", |r| StringFileHeader::read(r))?;
        let magic = Magic(header.magic);
        if magic != Magic::STR {
            debug!(%magic, "unexpected magic, keeping it as read");
        }
        if !FormatProfile::is_known_version(header.version) {
            warn!(
                version = header.version,
                "unrecognized string file version, assuming standard layout"
            );
        }

        let mut table = TableReader {
            cursor,
            data: &data,
            anomalies: Vec::new(),
        };

        let entries = match FormatProfile::for_version(header.version) {
            FormatProfile::Standard => table.read_entries(header.entry_count, options)?,
        };

        debug!(
            entries = entries.len(),
            anomalies = table.anomalies.len(),
            "read string file"
        );

        Ok(StringFileReader {
            anomalies: table.anomalies,
            file: StringFile {
                magic,
                version: header.version,
                entry_count: header.entry_count,
                entries,
            },
        })
    }

    /// Number of entries contained in this file.
    pub fn len(&self) -> usize {
        self.file.len()
    }

    /// Whether this file contains no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get a reference to the parsed document
    pub fn file(&self) -> &StringFile {
        &self.file
    }

    /// Data quality problems found while reading
    pub fn anomalies(&self) -> &[ReadAnomaly] {
        &self.anomalies
    }

    /// Try to get an entry by its locale string id
    pub fn by_id(&self, id: impl Into<LocaleStringId>) -> Option<&StringEntry> {
        self.file.get(id)
    }

    /// Take the parsed document
    pub fn into_file(self) -> StringFile {
        self.file
    }

    /// Take the parsed document along with the anomalies found while reading it
    pub fn into_parts(self) -> (StringFile, Vec<ReadAnomaly>) {
        (self.file, self.anomalies)
    }
}

fn read_fixed<R: Read + Seek, T>(
    reader: &mut R,
    section: &'static str,
    read: impl FnOnce(&mut R) -> BinResult<T>,
) -> Result<T> {
    let position = reader.stream_position()?;
    read(reader).map_err(|e| {
        if e.is_eof() {
            Error::Truncated { section, position }
        } else {
            e.into()
        }
    })
}

struct TableReader<'a> {
    cursor: Cursor<&'a [u8]>,
    data: &'a [u8],
    anomalies: Vec<ReadAnomaly>,
}

impl TableReader<'_> {
    fn read_entries(
        &mut self,
        count: u16,
        options: StringFileReaderOptions,
    ) -> Result<IndexMap<LocaleStringId, StringEntry>> {
        let mut entries = IndexMap::with_capacity(count as usize);

        for _ in 0..count {
            let record = read_fixed(&mut self.cursor, "entry record", |r| EntryRecord::read(r))?;
            let id = LocaleStringId(record.id);
            let text = self.read_string(record.offset, id, None);

            let mut variants = Vec::with_capacity(record.variant_count() as usize);
            for index in 0..record.variant_count() as usize {
                let variant = read_fixed(&mut self.cursor, "variant record", |r| VariantRecord::read(r))?;
                let variant_text = self.read_string(variant.offset, id, Some(index));
                variants.push(StringVariant::new(
                    variant.flags_consumed,
                    variant.flags_produced,
                    variant_text,
                ));
            }

            if options.duplicate_keys == DuplicateKeys::Reject && entries.contains_key(&id) {
                return Err(Error::DuplicateLocaleId(id));
            }

            let entry = StringEntry::new(variants, record.flags_produced, text);
            if entries.insert(id, entry).is_some() {
                debug!(%id, "duplicate locale string id, keeping the last entry");
            }
        }

        Ok(entries)
    }

    /// Resolve the NUL terminated string at `offset`.
    fn read_string(&mut self, offset: u32, id: LocaleStringId, variant: Option<usize>) -> String {
        let data = self.data;
        let Some(tail) = data.get(offset as usize..).filter(|tail| !tail.is_empty()) else {
            self.report(ReadAnomaly::OffsetOutOfRange {
                id,
                variant,
                offset,
                stream_len: data.len() as u64,
            });
            return String::new();
        };

        let bytes = match tail.iter().position(|&b| b == 0) {
            Some(end) => &tail[..end],
            None => {
                self.report(ReadAnomaly::Unterminated {
                    id,
                    variant,
                    offset,
                });
                tail
            }
        };

        match std::str::from_utf8(bytes) {
            Ok(text) => text.to_owned(),
            Err(_) => {
                self.report(ReadAnomaly::InvalidUtf8 {
                    id,
                    variant,
                    offset,
                });
                String::from_utf8_lossy(bytes).into_owned()
            }
        }
    }

    fn report(&mut self, anomaly: ReadAnomaly) {
        warn!("possible string file corruption, {}", anomaly);
        self.anomalies.push(anomaly);
    }
}
