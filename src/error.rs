//! Error type shared by every conversion, width and XML helper.
//!
//! Only the `Strict` policies produce [`Error::Decode`], [`Error::Encode`] and
//! [`Error::ControlChar`]; under `Replace` or `Ignore` the same conditions are
//! absorbed into the output. [`Error::UnsupportedEncoding`] is always
//! reported.

use thiserror::Error;

/// Failure raised by a `textkit` operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The encoding name is not known to the codec registry.
    #[error("unsupported encoding: {0:?}")]
    UnsupportedEncoding(String),

    /// Bytes could not be decoded under the strict error policy.
    #[error("cannot decode byte at offset {offset} as {encoding}")]
    Decode {
        /// Canonical name of the codec that failed.
        encoding: String,
        /// Offset of the first byte that could not be decoded.
        offset: usize,
    },

    /// A character has no representation in the target encoding.
    #[error("cannot encode {character:?} at offset {offset} as {encoding}")]
    Encode {
        encoding: String,
        character: char,
        /// Byte offset of `character` in the source text.
        offset: usize,
    },

    /// A control character was met under the strict control-character policy.
    #[error("control character U+{codepoint:04X} has no defined display width")]
    ControlChar { codepoint: u32 },

    /// The value handed over was of the wrong kind.
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// Base64 payload was malformed.
    #[error("invalid base64 data at offset {offset}")]
    InvalidBase64 { offset: usize },
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
