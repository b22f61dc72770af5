//! Offset planning for writing STRING files
//!
//! The record table stores an absolute offset for every string. Those offsets depend on the size
//! of the whole table and on the encoded length of every string before it, so they are computed
//! from scratch right before writing and handed to the writer as a [`StringLayout`].

use derive_more::derive::Index;
use tracing::{instrument, trace};

use crate::error::{Error, Result};
use crate::types::{LocaleStringId, StringFile};

/// Planned string offsets of a single entry
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EntryOffsets {
    /// Offset of the base string
    pub base: u32,

    /// Offsets of the variant strings, in variant order
    pub variants: Vec<u32>,
}

/// Planned layout of a [`StringFile`]
///
/// Indexing a layout by entry position returns that entry's [`EntryOffsets`].
#[derive(Debug, Default, Clone, PartialEq, Eq, Index)]
pub struct StringLayout {
    /// Position where the record table ends and the string pool begins
    pub table_end: u32,

    /// Total size of the file
    pub pool_end: u32,

    /// Offsets of every entry in table order
    #[index]
    pub entries: Vec<EntryOffsets>,
}

impl StringLayout {
    /// Plan the offsets of every string in `file`.
    ///
    /// Strings are placed in table order, each entry's base string directly followed by its
    /// variants. Lengths are measured in encoded UTF-8 bytes plus one for the terminator.
    #[instrument(skip_all, err, fields(entries = file.len()))]
    pub fn plan(file: &StringFile) -> Result<StringLayout> {
        file.derived_entry_count()?;
        let profile = file.profile();

        let mut table_end = profile.header_len() as u64;
        for (id, entry) in file.iter() {
            if entry.variants.len() >= u16::MAX as usize {
                return Err(Error::TooManyVariants {
                    id: *id,
                    count: entry.variants.len(),
                });
            }

            table_end += profile.entry_record_len() as u64
                + profile.variant_record_len() as u64 * entry.variants.len() as u64;
        }
        let table_end = u32::try_from(table_end).map_err(|_| Error::LayoutOverflow)?;

        let mut cursor = table_end;
        let mut entries = Vec::with_capacity(file.len());
        for (id, entry) in file.iter() {
            let base = place(&mut cursor, *id, None, &entry.text)?;

            let variants = entry
                .variants
                .iter()
                .enumerate()
                .map(|(index, variant)| place(&mut cursor, *id, Some(index), &variant.text))
                .collect::<Result<Vec<_>>>()?;

            entries.push(EntryOffsets { base, variants });
        }

        trace!(table_end, pool_end = cursor, "planned string layout");

        Ok(StringLayout {
            table_end,
            pool_end: cursor,
            entries,
        })
    }

    /// Number of entries in this layout
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether this layout has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn place(cursor: &mut u32, id: LocaleStringId, variant: Option<usize>, text: &str) -> Result<u32> {
    if text.as_bytes().contains(&0) {
        return Err(Error::EmbeddedNul { id, variant });
    }

    let offset = *cursor;
    let size = u32::try_from(text.len() + 1).map_err(|_| Error::LayoutOverflow)?;
    *cursor = cursor.checked_add(size).ok_or(Error::LayoutOverflow)?;

    Ok(offset)
}
