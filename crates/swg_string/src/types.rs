//! Base types for structure of STRING file.

use binrw::{BinRead, BinWrite};
use derive_more::derive::{Constructor, Deref, Display, From, Into};
use indexmap::IndexMap;
use std::{fmt, str::FromStr};
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Version written by clients 1.9 through 1.17
pub const VERSION_LEGACY: u8 = 10;

/// Version written by clients 1.18 and later
pub const VERSION_CURRENT: u8 = 11;

/// Field widths of the record table for a file version.
///
/// Both known versions share the same widths. They are kept behind this type so a reader or
/// writer never hardcodes a size that may differ between versions.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FormatProfile {
    /// Layout used by versions 10 and 11
    #[default]
    Standard,
}

impl FormatProfile {
    /// Select the profile used for a file version, unknown versions use the standard layout
    pub fn for_version(version: u8) -> FormatProfile {
        match version {
            VERSION_LEGACY | VERSION_CURRENT => FormatProfile::Standard,
            _ => FormatProfile::Standard,
        }
    }

    /// Whether `version` is one the game is known to write
    pub const fn is_known_version(version: u8) -> bool {
        matches!(version, VERSION_LEGACY | VERSION_CURRENT)
    }

    /// Size of the file header
    pub const fn header_len(self) -> u32 {
        match self {
            FormatProfile::Standard => 3 + 1 + 2,
        }
    }

    /// Size of an entry record, including its locale string id
    pub const fn entry_record_len(self) -> u32 {
        match self {
            FormatProfile::Standard => 8 + 2 + 2 + 4,
        }
    }

    /// Size of a variant record
    pub const fn variant_record_len(self) -> u32 {
        match self {
            FormatProfile::Standard => 8 + 2 + 4,
        }
    }
}

/// Three byte signature at the start of every STRING file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deref)]
pub struct Magic(pub [u8; 3]);

impl Magic {
    /// The signature written by the game, "STR"
    pub const STR: Magic = Magic(*b"STR");
}

impl Default for Magic {
    fn default() -> Self {
        Magic::STR
    }
}

impl fmt::Display for Magic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

/// Opaque identifier of a localized string
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Into,
)]
pub struct LocaleStringId(pub u64);

impl LocaleStringId {
    /// The id the game uses for both an invalid and a blank string
    pub const INVALID: LocaleStringId = LocaleStringId(0);
}

/// Error returned when a locale string id can't be parsed from text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unable to convert \"{0}\" to a locale string id")]
pub struct ParseLocaleStringIdError(pub String);

impl FromStr for LocaleStringId {
    type Err = ParseLocaleStringIdError;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("invalid") || s.eq_ignore_ascii_case("blank") {
            return Ok(LocaleStringId::INVALID);
        }

        s.parse::<u64>()
            .map(LocaleStringId)
            .map_err(|_| ParseLocaleStringIdError(s.to_string()))
    }
}

/// Alternate rendering of an entry's string
#[derive(Constructor, Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", deny_unknown_fields))]
pub struct StringVariant {
    /// Condition under which this variant applies
    pub flags_consumed: u64,

    /// Opaque flags
    pub flags_produced: u16,

    /// The localized text
    #[cfg_attr(feature = "serde", serde(rename = "string"))]
    pub text: String,
}

/// Localized string with its variants
#[derive(Constructor, Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", deny_unknown_fields))]
pub struct StringEntry {
    /// Variants in the order they are stored
    #[cfg_attr(feature = "serde", serde(default))]
    pub variants: Vec<StringVariant>,

    /// Opaque flags
    pub flags_produced: u16,

    /// The base localized text
    #[cfg_attr(feature = "serde", serde(rename = "string"))]
    pub text: String,
}

/// In memory representation of a STRING file
///
/// String offsets are not part of this type, they are derived by [`crate::layout::StringLayout`]
/// every time the file is written.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", deny_unknown_fields))]
pub struct StringFile {
    /// File signature, recorded as read
    pub magic: Magic,

    /// File version
    pub version: u8,

    /// Entry count as read from the header or JSON. Writing always uses the number of entries.
    pub entry_count: u16,

    /// Entries in table order
    #[cfg_attr(
        feature = "serde",
        serde(rename = "stringMap", with = "crate::json::string_map")
    )]
    pub entries: IndexMap<LocaleStringId, StringEntry>,
}

impl Default for StringFile {
    fn default() -> Self {
        Self::new(Magic::STR, VERSION_CURRENT)
    }
}

impl StringFile {
    /// Create an empty file
    pub fn new(magic: Magic, version: u8) -> StringFile {
        StringFile {
            magic,
            version,
            entry_count: 0,
            entries: IndexMap::new(),
        }
    }

    /// Insert an entry, keeping the position of an existing entry with the same id.
    ///
    /// The stored entry count follows the number of entries.
    pub fn insert(&mut self, id: impl Into<LocaleStringId>, entry: StringEntry) -> Option<StringEntry> {
        let previous = self.entries.insert(id.into(), entry);
        self.entry_count = u16::try_from(self.entries.len()).unwrap_or(u16::MAX);
        previous
    }

    /// Number of entries contained in this file.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether this file contains no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Try to get an entry by its locale string id
    pub fn get(&self, id: impl Into<LocaleStringId>) -> Option<&StringEntry> {
        self.entries.get(&id.into())
    }

    /// Iterate over the entries in table order
    pub fn iter(&self) -> indexmap::map::Iter<'_, LocaleStringId, StringEntry> {
        self.entries.iter()
    }

    /// The layout profile matching this file's version
    pub fn profile(&self) -> FormatProfile {
        FormatProfile::for_version(self.version)
    }

    /// Entry count that will be written to the header
    pub fn derived_entry_count(&self) -> Result<u16> {
        u16::try_from(self.entries.len()).map_err(|_| Error::TooManyEntries(self.entries.len()))
    }
}

/// STRING file header
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq)]
#[brw(little)]
pub struct StringFileHeader {
    /// Signature, "STR" for every known file
    pub magic: [u8; 3],

    /// Format version
    pub version: u8,

    /// Number of entry records in the table
    pub entry_count: u16,
}

/// Fixed-width record describing an entry
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq)]
#[brw(little)]
pub struct EntryRecord {
    /// Locale string id of the entry
    pub id: u64,

    /// Number of variant records that follow, plus one for the base string
    pub slots: u16,

    /// Opaque flags
    pub flags_produced: u16,

    /// Offset of the base string from the start of the file
    pub offset: u32,
}

impl EntryRecord {
    /// Number of variant records following this record
    pub fn variant_count(&self) -> u16 {
        self.slots.saturating_sub(1)
    }
}

/// Fixed-width record describing a variant
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq)]
#[brw(little)]
pub struct VariantRecord {
    /// Condition under which this variant applies
    pub flags_consumed: u64,

    /// Opaque flags
    pub flags_produced: u16,

    /// Offset of the variant string from the start of the file
    pub offset: u32,
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use binrw::BinRead;
    use binrw::BinWrite;
    use pretty_assertions::assert_eq;

    use crate::error::Result;
    use crate::types::{
        EntryRecord, FormatProfile, LocaleStringId, StringFileHeader, VariantRecord,
    };

    #[test]
    fn read_header() -> Result<()> {
        #[rustfmt::skip]
        let mut input = Cursor::new(vec![
            0x53, 0x54, 0x52,
            0x0B,
            0x02, 0x01,
        ]);

        let expected = StringFileHeader {
            magic: *b"STR",
            version: 11,
            entry_count: 0x0102,
        };

        assert_eq!(StringFileHeader::read(&mut input)?, expected);

        Ok(())
    }

    #[test]
    fn write_entry_record() -> Result<()> {
        #[rustfmt::skip]
        let expected = vec![
            0x2A, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x03, 0x00,
            0x05, 0x00,
            0x16, 0x00, 0x00, 0x00,
        ];

        let record = EntryRecord {
            id: 42,
            slots: 3,
            flags_produced: 5,
            offset: 22,
        };

        let mut actual = Vec::new();
        record.write(&mut Cursor::new(&mut actual))?;

        assert_eq!(actual, expected);
        assert_eq!(record.variant_count(), 2);

        Ok(())
    }

    #[test]
    fn read_variant_record() -> Result<()> {
        #[rustfmt::skip]
        let mut input = Cursor::new(vec![
            0x07, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x80,
            0x01, 0x00,
            0x20, 0x00, 0x00, 0x00,
        ]);

        let expected = VariantRecord {
            flags_consumed: 0x8000_0000_0000_0007,
            flags_produced: 1,
            offset: 32,
        };

        assert_eq!(VariantRecord::read(&mut input)?, expected);

        Ok(())
    }

    #[test]
    fn zero_slots_have_no_variants() {
        let record = EntryRecord {
            slots: 0,
            ..Default::default()
        };

        assert_eq!(record.variant_count(), 0);
    }

    #[test]
    fn profile_matches_record_sizes() -> Result<()> {
        let profile = FormatProfile::for_version(10);

        let mut header = Vec::new();
        StringFileHeader::default().write(&mut Cursor::new(&mut header))?;
        let mut entry = Vec::new();
        EntryRecord::default().write(&mut Cursor::new(&mut entry))?;
        let mut variant = Vec::new();
        VariantRecord::default().write(&mut Cursor::new(&mut variant))?;

        assert_eq!(header.len() as u32, profile.header_len());
        assert_eq!(entry.len() as u32, profile.entry_record_len());
        assert_eq!(variant.len() as u32, profile.variant_record_len());
        assert_eq!(FormatProfile::for_version(11), profile);

        Ok(())
    }

    #[test]
    fn parse_locale_string_id() {
        assert_eq!("1234".parse::<LocaleStringId>(), Ok(LocaleStringId(1234)));
        assert_eq!("18446744073709551615".parse::<LocaleStringId>(), Ok(LocaleStringId(u64::MAX)));
        assert_eq!("Invalid".parse::<LocaleStringId>(), Ok(LocaleStringId::INVALID));
        assert_eq!("blank".parse::<LocaleStringId>(), Ok(LocaleStringId::INVALID));
        assert!("greeting".parse::<LocaleStringId>().is_err());
        assert!("-1".parse::<LocaleStringId>().is_err());
        assert!("".parse::<LocaleStringId>().is_err());
        assert_eq!(LocaleStringId(77).to_string(), "77");
    }
}
