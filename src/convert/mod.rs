//! Conversions between byte strings and text.
//!
//! A value handed to the converters is an [`Input`]: text, bytes, or some
//! other [`Displayable`] value. Text passes through [`to_text`] untouched and
//! bytes pass through [`to_bytes`] untouched; only the opposite kind is
//! decoded or encoded. Nothing here re-encodes bytes that are already bytes,
//! so `to_bytes(to_text(x))` only reproduces `x` when `x` was already in the
//! requested encoding.

use std::{borrow::Cow, fmt};

mod codec;

pub use codec::{EncodingName, canonical_encoding};
pub(crate) use codec::{Unmappable, decode, encode, lookup};

use crate::{Error, ErrorPolicy, NonTextPolicy, Result};

/// A value that is neither text nor bytes but can describe itself.
///
/// [`NonTextPolicy::SimpleRepr`] uses [`Displayable::display_text`] and falls
/// back to the `Debug` form when it returns `None`.
pub trait Displayable: fmt::Debug {
    /// Plain text rendering of the value, if it has one.
    fn display_text(&self) -> Option<String> { None }
}

macro_rules! displayable_via_to_string {
    ($($ty:ty),+ $(,)?) => {
        $(impl Displayable for $ty {
            fn display_text(&self) -> Option<String> { Some(self.to_string()) }
        })+
    };
}

displayable_via_to_string!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char,
);

impl<T: Displayable> Displayable for Option<T> {
    fn display_text(&self) -> Option<String> { self.as_ref().and_then(Displayable::display_text) }
}

/// Anything the converters accept.
#[derive(Debug, Clone, Copy)]
pub enum Input<'a> {
    Text(&'a str),
    Bytes(&'a [u8]),
    Other(&'a dyn Displayable),
}

impl Input<'_> {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Bytes(_) => "bytes",
            Self::Other(_) => "non-text value",
        }
    }
}

impl<'a> From<&'a str> for Input<'a> {
    fn from(text: &'a str) -> Self { Self::Text(text) }
}

impl<'a> From<&'a String> for Input<'a> {
    fn from(text: &'a String) -> Self { Self::Text(text) }
}

impl<'a> From<&'a [u8]> for Input<'a> {
    fn from(bytes: &'a [u8]) -> Self { Self::Bytes(bytes) }
}

impl<'a> From<&'a Vec<u8>> for Input<'a> {
    fn from(bytes: &'a Vec<u8>) -> Self { Self::Bytes(bytes) }
}

impl<'a, const N: usize> From<&'a [u8; N]> for Input<'a> {
    fn from(bytes: &'a [u8; N]) -> Self { Self::Bytes(bytes) }
}

impl<'a> From<&'a dyn Displayable> for Input<'a> {
    fn from(value: &'a dyn Displayable) -> Self { Self::Other(value) }
}

/// Settings shared by every conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertOptions<'e> {
    /// Encoding label; resolved with [`canonical_encoding`].
    pub encoding: &'e str,
    pub errors: ErrorPolicy,
    pub non_text: NonTextPolicy,
}

impl Default for ConvertOptions<'_> {
    fn default() -> Self {
        Self {
            encoding: "utf-8",
            errors: ErrorPolicy::default(),
            non_text: NonTextPolicy::default(),
        }
    }
}

impl<'e> ConvertOptions<'e> {
    /// Default options for `encoding`.
    #[must_use]
    pub fn new(encoding: &'e str) -> Self {
        Self {
            encoding,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn errors(mut self, errors: ErrorPolicy) -> Self {
        self.errors = errors;
        self
    }

    #[must_use]
    pub fn non_text(mut self, non_text: NonTextPolicy) -> Self {
        self.non_text = non_text;
        self
    }
}

/// Result of a dynamic conversion.
#[derive(Debug)]
pub enum Converted<'a> {
    Text(Cow<'a, str>),
    Bytes(Cow<'a, [u8]>),
    /// A non-text input returned as-is under [`NonTextPolicy::Passthrough`].
    Passthrough(&'a dyn Displayable),
}

impl<'a> Converted<'a> {
    #[must_use]
    pub fn into_text(self) -> Option<Cow<'a, str>> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_bytes(self) -> Option<Cow<'a, [u8]>> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }
}

/// Apply `policy` to a non-text value. `None` means pass it through.
fn render_non_text(value: &dyn Displayable, policy: NonTextPolicy) -> Result<Option<String>> {
    Ok(match policy {
        NonTextPolicy::Empty => Some(String::new()),
        NonTextPolicy::Passthrough => None,
        NonTextPolicy::SimpleRepr => Some(value.display_text().unwrap_or_else(|| format!("{value:?}"))),
        NonTextPolicy::Repr => Some(format!("{value:?}")),
        NonTextPolicy::Strict => {
            return Err(Error::TypeMismatch {
                expected: "text or bytes",
                found: "non-text value",
            });
        }
    })
}

/// Convert any [`Input`] to text, honouring every [`NonTextPolicy`].
///
/// # Errors
/// Returns [`Error::UnsupportedEncoding`], [`Error::Decode`] under
/// [`ErrorPolicy::Strict`], or [`Error::TypeMismatch`] under
/// [`NonTextPolicy::Strict`].
pub fn convert_text<'a>(input: impl Into<Input<'a>>, options: &ConvertOptions<'_>) -> Result<Converted<'a>> {
    match input.into() {
        Input::Text(text) => Ok(Converted::Text(Cow::Borrowed(text))),
        Input::Bytes(bytes) => {
            let codec = lookup(options.encoding)?;
            decode(codec, bytes, options.errors).map(Converted::Text)
        }
        Input::Other(value) => Ok(match render_non_text(value, options.non_text)? {
            Some(text) => Converted::Text(Cow::Owned(text)),
            None => Converted::Passthrough(value),
        }),
    }
}

/// Convert any [`Input`] to bytes, honouring every [`NonTextPolicy`].
///
/// Bytes are returned unchanged, without re-encoding.
///
/// # Errors
/// Returns [`Error::UnsupportedEncoding`], [`Error::Encode`] under
/// [`ErrorPolicy::Strict`], or [`Error::TypeMismatch`] under
/// [`NonTextPolicy::Strict`].
pub fn convert_bytes<'a>(input: impl Into<Input<'a>>, options: &ConvertOptions<'_>) -> Result<Converted<'a>> {
    match input.into() {
        Input::Bytes(bytes) => Ok(Converted::Bytes(Cow::Borrowed(bytes))),
        Input::Text(text) => {
            let codec = lookup(options.encoding)?;
            encode(codec, text, options.errors.into()).map(Converted::Bytes)
        }
        Input::Other(value) => {
            let Some(text) = render_non_text(value, options.non_text)? else {
                return Ok(Converted::Passthrough(value));
            };
            let codec = lookup(options.encoding)?;
            let bytes = encode(codec, &text, options.errors.into())?.into_owned();
            Ok(Converted::Bytes(Cow::Owned(bytes)))
        }
    }
}

fn passthrough_mismatch(expected: &'static str) -> Error {
    Error::TypeMismatch {
        expected,
        found: "non-text value",
    }
}

/// Convert text or bytes to text.
///
/// Text is returned unchanged; bytes are decoded with `options.encoding`.
///
/// # Errors
/// As [`convert_text`]; additionally [`Error::TypeMismatch`] when
/// [`NonTextPolicy::Passthrough`] would hand back a non-text value.
///
/// # Examples
///
/// ```
/// use textkit::{ConvertOptions, ErrorPolicy, to_text};
///
/// let opts = ConvertOptions::new("utf-8");
/// assert_eq!(to_text(b"caf\xC3\xA9", &opts).unwrap(), "café");
/// assert_eq!(to_text(b"caf\xE9", &opts).unwrap(), "caf\u{FFFD}");
/// assert!(to_text(b"caf\xE9", &opts.errors(ErrorPolicy::Strict)).is_err());
/// ```
pub fn to_text<'a>(input: impl Into<Input<'a>>, options: &ConvertOptions<'_>) -> Result<Cow<'a, str>> {
    convert_text(input, options)?
        .into_text()
        .ok_or_else(|| passthrough_mismatch("text"))
}

/// Convert text or bytes to bytes.
///
/// # Errors
/// As [`convert_bytes`]; additionally [`Error::TypeMismatch`] when
/// [`NonTextPolicy::Passthrough`] would hand back a non-text value.
///
/// # Examples
///
/// ```
/// use textkit::{ConvertOptions, to_bytes};
///
/// let latin1 = to_bytes("café", &ConvertOptions::new("latin-1")).unwrap();
/// assert_eq!(latin1.as_ref(), b"caf\xE9");
/// ```
pub fn to_bytes<'a>(input: impl Into<Input<'a>>, options: &ConvertOptions<'_>) -> Result<Cow<'a, [u8]>> {
    convert_bytes(input, options)?
        .into_bytes()
        .ok_or_else(|| passthrough_mismatch("bytes"))
}

/// Render an error and its chain of sources as `outer: inner: root`.
#[must_use]
pub fn error_to_text(err: &(dyn std::error::Error + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let message = cause.to_string();
        if !message.is_empty() && !out.ends_with(&message) {
            out.push_str(": ");
            out.push_str(&message);
        }
        source = cause.source();
    }
    out
}

/// [`error_to_text`] encoded with `options`.
///
/// # Errors
/// Returns [`Error::UnsupportedEncoding`] or, under
/// [`ErrorPolicy::Strict`], [`Error::Encode`].
pub fn error_to_bytes(err: &(dyn std::error::Error + 'static), options: &ConvertOptions<'_>) -> Result<Vec<u8>> {
    let text = error_to_text(err);
    let codec = lookup(options.encoding)?;
    Ok(encode(codec, &text, options.errors.into())?.into_owned())
}

/// Compare two values that may be text or bytes.
///
/// Values of the same kind compare directly. Otherwise the text side is
/// encoded with `encoding` (substituting unencodable characters) and the
/// bytes are compared.
///
/// # Errors
/// Returns [`Error::UnsupportedEncoding`] when the comparison needs an
/// unknown encoding.
pub fn str_eq<'a, 'b>(a: impl Into<Input<'a>>, b: impl Into<Input<'b>>, encoding: &str) -> Result<bool> {
    let options = ConvertOptions::new(encoding);
    let (a, b) = (a.into(), b.into());
    match (a, b) {
        (Input::Text(x), Input::Text(y)) => Ok(x == y),
        (Input::Bytes(x), Input::Bytes(y)) => Ok(x == y),
        _ => {
            let x = to_bytes(a, &options)?;
            let y = to_bytes(b, &options)?;
            log::trace!("compared {} with {} as {encoding} bytes", a.kind(), b.kind());
            Ok(x == y)
        }
    }
}

/// `true` if `bytes` decodes cleanly as `encoding`.
///
/// # Errors
/// Returns [`Error::UnsupportedEncoding`] for an unknown encoding.
pub fn is_valid_encoding(bytes: &[u8], encoding: &str) -> Result<bool> {
    let codec = lookup(encoding)?;
    Ok(decode(codec, bytes, ErrorPolicy::Strict).is_ok())
}

#[cfg(test)]
mod tests;
