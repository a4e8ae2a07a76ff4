//! Text helpers for programs that meet byte strings of unknown provenance.
//!
//! The crate converts between bytes and text under explicit error policies,
//! guesses encodings, measures terminal display width (wide CJK characters,
//! combining marks and control codes included), wraps and pads text by that
//! width, and escapes text for XML.
//!
//! Every operation is a pure function. The width tables are built once on
//! first use and are safe to share between threads.
//!
//! ```
//! use textkit::{ControlCharPolicy, ConvertOptions, text_width, to_bytes, wrap};
//!
//! let bytes = to_bytes("café", &ConvertOptions::new("latin-1")).unwrap();
//! assert_eq!(bytes.as_ref(), b"caf\xE9");
//! assert_eq!(text_width("日本語", ControlCharPolicy::Replace).unwrap(), 6);
//! assert_eq!(wrap("日本語 テキスト", 8), ["日本語", "テキスト"]);
//! ```

#[macro_use]
mod macros;

pub mod controls;
pub mod convert;
pub mod display;
pub mod error;
pub mod guess;
pub mod intervals;
pub mod policy;
pub mod utf8;
pub mod xml;

pub use controls::process_control_chars;
pub use convert::{
    ConvertOptions, Converted, Displayable, EncodingName, Input, canonical_encoding, convert_bytes,
    convert_text, error_to_bytes, error_to_text, is_valid_encoding, str_eq, to_bytes, to_text,
};
pub use display::{
    Align, PadOptions, WrapOptions, bytes_width, chop_to_width, codepoint_width, display_width, fill,
    pad_bytes_to_width, pad_to_width, text_width, text_width_le, wrap,
};
pub use error::{Error, Result};
pub use guess::{
    Detection, EncodingDetector, EncodingGuesser, NoDetector, guess_encoding,
};
#[cfg(feature = "detect")]
pub use guess::{ChardetngDetector, EVIDENCE_BYTES};
pub use policy::{ControlCharPolicy, ErrorPolicy, NonTextPolicy, ParsePolicyError};
pub use xml::{
    XmlOptions, bytes_in_encoding_to_xml, bytes_to_xml, guess_encoding_to_xml, html_entities_unescape,
    is_valid_xml_bytes, text_to_xml, xml_to_bytes, xml_to_bytes_in_encoding, xml_to_text,
};
