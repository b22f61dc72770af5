//! This library handles reading from and creating localized **STRING** files used by *Star Wars Galaxies*.
//!
//! # STRING Format Documentation
//!
//! The STRING format is a custom binary format that stores localized strings keyed by a 64-bit locale
//! string id. Every entry carries a base string and an optional list of variants, each of which is
//! selected by a set of consumed flags the game evaluates at runtime. STRING files are typically
//! identified with the `.string` extension.
//!
//! ## File Structure
//!
//! A STRING file consists of a header, followed by a table of fixed-width records, and a string pool.
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Magic number           | 3 bytes: "STR"                                             |
//! | 0x0003         | Version                | 1 byte: 10 for client 1.9-1.17, 11 for 1.18+               |
//! | 0x0004         | Entry Count            | 2 bytes: The number of entries in the record table         |
//!
//! ### Entry Records
//!
//! After the header, the record table contains `Entry Count` entries. Each entry has the following
//! structure and is directly followed by its variant records:
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | Locale String Id       | 8 bytes: Opaque identifier of the string                |
//! | 0x0008         | Slots                  | 2 bytes: Number of variants plus one for the base string|
//! | 0x000A         | Flags Produced         | 2 bytes: Opaque flags                                   |
//! | 0x000C         | String Offset          | 4 bytes: Offset of the base string from file start      |
//!
//! ### Variant Records
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | Flags Consumed         | 8 bytes: Condition under which the variant applies      |
//! | 0x0008         | Flags Produced         | 2 bytes: Opaque flags                                   |
//! | 0x000A         | String Offset          | 4 bytes: Offset of the variant string from file start   |
//!
//! ### String Pool
//!
//! The string pool follows the record table. Strings are stored as NUL terminated UTF-8 in table
//! order: every entry's base string followed by the strings of its variants. Offsets are never
//! stored in [`types::StringFile`]; they are planned by [`layout::StringLayout`] on every write.
//!
//! ## Additional Information
//!
//! - **File Extension**: `.string`
//! - **Endianness**: Little-endian for all multi-byte integers
//!

pub mod error;
#[cfg(feature = "serde")]
pub mod json;
pub mod layout;
pub mod read;
pub mod types;
pub mod write;

pub use layout::StringLayout;
pub use read::StringFileReader;
pub use types::{LocaleStringId, StringEntry, StringFile, StringVariant};
pub use write::StringFileWriter;
