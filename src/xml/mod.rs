//! Making text safe to embed in XML, and reading it back.
//!
//! [`text_to_xml`] escapes markup characters, applies a [`ControlCharPolicy`]
//! and encodes the result, writing numeric character references for anything
//! the target encoding cannot hold. [`xml_to_text`] decodes and resolves
//! references again, but characters dropped or replaced by the control
//! policy cannot be recovered.
//!
//! [`bytes_to_xml`] and [`xml_to_bytes`] are unrelated: they carry opaque
//! binary data through XML as base64, byte for byte.

use std::borrow::Cow;

use crate::{
    ControlCharPolicy, ConvertOptions, ErrorPolicy, Result,
    controls::{is_xml_control, process_control_chars},
    convert::{Unmappable, decode, encode, lookup},
    guess::guess_encoding,
    to_bytes, to_text,
};

pub mod base64;
pub mod entities;

pub use entities::html_entities_unescape;

/// Options for [`text_to_xml`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XmlOptions<'e> {
    /// Encoding of the produced bytes.
    pub encoding: &'e str,
    /// Also escape `"` for use inside a double-quoted attribute value.
    pub attribute: bool,
    pub control_chars: ControlCharPolicy,
}

impl Default for XmlOptions<'_> {
    fn default() -> Self {
        Self {
            encoding: "utf-8",
            attribute: false,
            control_chars: ControlCharPolicy::default(),
        }
    }
}

impl<'e> XmlOptions<'e> {
    #[must_use]
    pub fn new(encoding: &'e str) -> Self {
        Self {
            encoding,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn attribute(mut self, attribute: bool) -> Self {
        self.attribute = attribute;
        self
    }

    #[must_use]
    pub fn control_chars(mut self, policy: ControlCharPolicy) -> Self {
        self.control_chars = policy;
        self
    }
}

fn escape(text: &str, attribute: bool) -> Cow<'_, str> {
    let special = |c: char| matches!(c, '&' | '<' | '>') || (attribute && c == '"');
    if !text.contains(special) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 16);
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    Cow::Owned(out)
}

/// Escape `text` for XML and encode it.
///
/// Characters the target encoding cannot represent become `&#N;`
/// references, so encoding itself never fails.
///
/// # Errors
/// Returns [`Error::UnsupportedEncoding`](crate::Error::UnsupportedEncoding)
/// for an unknown encoding, or
/// [`Error::ControlChar`](crate::Error::ControlChar) under
/// [`ControlCharPolicy::Strict`].
///
/// # Examples
///
/// ```
/// use textkit::{XmlOptions, text_to_xml};
///
/// let xml = text_to_xml("Test: <\"&\">", &XmlOptions::default()).unwrap();
/// assert_eq!(xml, b"Test: &lt;\"&amp;\"&gt;");
/// let attr = text_to_xml("\"é\"", &XmlOptions::new("ascii").attribute(true)).unwrap();
/// assert_eq!(attr, b"&quot;&#233;&quot;");
/// ```
pub fn text_to_xml(text: &str, options: &XmlOptions<'_>) -> Result<Vec<u8>> {
    let codec = lookup(options.encoding)?;
    let cleaned = process_control_chars(text, options.control_chars)?;
    let escaped = escape(&cleaned, options.attribute);
    Ok(encode(codec, &escaped, Unmappable::CharRef)?.into_owned())
}

/// Decode XML character data and resolve its references.
///
/// # Errors
/// Returns [`Error::UnsupportedEncoding`](crate::Error::UnsupportedEncoding),
/// or [`Error::Decode`](crate::Error::Decode) under [`ErrorPolicy::Strict`].
///
/// # Examples
///
/// ```
/// use textkit::{ErrorPolicy, xml_to_text};
///
/// let text = xml_to_text(b"caf&#233; &amp; cr&egrave;me", "ascii", ErrorPolicy::Strict).unwrap();
/// assert_eq!(text, "café & crème");
/// ```
pub fn xml_to_text(xml: &[u8], encoding: &str, errors: ErrorPolicy) -> Result<String> {
    let text = to_text(xml, &ConvertOptions::new(encoding).errors(errors))?;
    Ok(html_entities_unescape(&text).into_owned())
}

/// Base64-encode binary data for embedding in XML.
#[must_use]
pub fn bytes_to_xml(bytes: &[u8]) -> Vec<u8> { base64::encode(bytes).into_bytes() }

/// Recover binary data written by [`bytes_to_xml`].
///
/// # Errors
/// Returns [`Error::InvalidBase64`](crate::Error::InvalidBase64) for
/// malformed input.
pub fn xml_to_bytes(xml: &[u8]) -> Result<Vec<u8>> { base64::decode(xml) }

/// `true` if `bytes` decode strictly as `encoding` and contain no control
/// characters that XML forbids.
///
/// # Errors
/// Returns [`Error::UnsupportedEncoding`](crate::Error::UnsupportedEncoding).
pub fn is_valid_xml_bytes(bytes: &[u8], encoding: &str) -> Result<bool> {
    let codec = lookup(encoding)?;
    Ok(decode(codec, bytes, ErrorPolicy::Strict).is_ok_and(|text| !text.contains(is_xml_control)))
}

/// [`text_to_xml`] for a byte string in `input_encoding`.
///
/// # Errors
/// As [`text_to_xml`], plus decode errors for `bytes` under
/// [`ErrorPolicy::Strict`].
pub fn bytes_in_encoding_to_xml(
    bytes: &[u8],
    input_encoding: &str,
    errors: ErrorPolicy,
    options: &XmlOptions<'_>,
) -> Result<Vec<u8>> {
    let text = to_text(bytes, &ConvertOptions::new(input_encoding).errors(errors))?;
    text_to_xml(&text, options)
}

/// [`text_to_xml`] for a byte string of unknown encoding.
///
/// The encoding is guessed with [`guess_encoding`] and malformed input is
/// replaced.
///
/// # Errors
/// As [`text_to_xml`].
pub fn guess_encoding_to_xml(bytes: &[u8], options: &XmlOptions<'_>) -> Result<Vec<u8>> {
    let encoding = guess_encoding(bytes)?;
    log::debug!("converting {} byte(s) of {encoding} to xml", bytes.len());
    bytes_in_encoding_to_xml(bytes, encoding.as_str(), ErrorPolicy::Replace, options)
}

/// Decode XML in `input_encoding` and re-encode the text as
/// `output_encoding`.
///
/// # Errors
/// Returns [`Error::UnsupportedEncoding`](crate::Error::UnsupportedEncoding)
/// for either encoding, or decode and encode errors under
/// [`ErrorPolicy::Strict`].
pub fn xml_to_bytes_in_encoding(
    xml: &[u8],
    input_encoding: &str,
    errors: ErrorPolicy,
    output_encoding: &str,
) -> Result<Vec<u8>> {
    let text = xml_to_text(xml, input_encoding, errors)?;
    Ok(to_bytes(text.as_str(), &ConvertOptions::new(output_encoding).errors(errors))?.into_owned())
}
