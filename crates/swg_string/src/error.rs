//! Error types that can be emitted from this library
//!

use miette::Diagnostic;
use thiserror::Error;

use crate::types::LocaleStringId;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent warpper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent warpper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    /// Transparent warpper for [`serde_json::Error`]
    #[cfg(feature = "serde")]
    #[error(transparent)]
    #[diagnostic(help("the JSON document must match the layout produced by the binary to JSON conversion"))]
    JsonError(#[from] serde_json::Error),

    /// The stream ended while reading a fixed-width field
    #[error("string file truncated while reading {section} at byte {position}")]
    Truncated {
        /// Which structure was being read
        section: &'static str,
        /// Stream position where the structure started
        position: u64,
    },

    /// Locale string id appeared twice while duplicates are rejected
    #[error("duplicate locale string id {0}")]
    DuplicateLocaleId(LocaleStringId),

    /// A string contains the NUL byte used as terminator in the string pool
    #[error("string for locale string id {id} contains an embedded nul byte")]
    EmbeddedNul {
        /// Entry the string belongs to
        id: LocaleStringId,
        /// Variant index, or `None` for the base string
        variant: Option<usize>,
    },

    /// More entries than the 16-bit entry count can describe
    #[error("{0} entries can't be stored, the maximum is {max}", max = u16::MAX)]
    TooManyEntries(usize),

    /// More variants than the 16-bit slot count can describe
    #[error("{count} variants for locale string id {id} can't be stored, the maximum is {max}", max = u16::MAX - 1)]
    TooManyVariants {
        /// Entry holding the variants
        id: LocaleStringId,
        /// Number of variants
        count: usize,
    },

    /// The planned layout doesn't fit in 32-bit offsets
    #[error("string pool exceeds the 32-bit offset range")]
    LayoutOverflow,
}

/// Broad class of an [`Error`], used by callers to pick how to present it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The binary file is malformed beyond what the reader tolerates
    Structural,
    /// The JSON text is malformed or has the wrong shape
    Json,
    /// The document can't be laid out as a binary file
    Document,
    /// The underlying stream failed
    Io,
}

impl Error {
    /// Classify this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::IOError(_) => ErrorCategory::Io,
            Error::BinRWError(binrw::Error::Io(_)) => ErrorCategory::Io,
            Error::BinRWError(_) => ErrorCategory::Structural,
            #[cfg(feature = "serde")]
            Error::JsonError(e) if e.is_io() => ErrorCategory::Io,
            #[cfg(feature = "serde")]
            Error::JsonError(_) => ErrorCategory::Json,
            Error::Truncated { .. } | Error::DuplicateLocaleId(_) => ErrorCategory::Structural,
            Error::EmbeddedNul { .. }
            | Error::TooManyEntries(_)
            | Error::TooManyVariants { .. }
            | Error::LayoutOverflow => ErrorCategory::Document,
        }
    }
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
