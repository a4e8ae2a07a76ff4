//! Codec registry and the per-codec decode/encode loops.
//!
//! UTF-8, ISO-8859-1, ASCII and UTF-16 are handled here directly; every
//! other WHATWG label is delegated to `encoding_rs`. UTF-8 input is checked
//! with [`crate::utf8`], so it is held to that decoder's rules.

use std::{borrow::Cow, fmt, str::FromStr};

use encoding_rs::{CoderResult, DecoderResult, EncoderResult, Encoding};

use crate::{Error, ErrorPolicy, Result, utf8};

/// Canonical lowercase encoding name such as `utf-8` or `latin-1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncodingName(Cow<'static, str>);

impl EncodingName {
    pub const UTF_8: Self = Self(Cow::Borrowed("utf-8"));
    pub const LATIN_1: Self = Self(Cow::Borrowed("latin-1"));

    #[must_use]
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for EncodingName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl AsRef<str> for EncodingName {
    fn as_ref(&self) -> &str { &self.0 }
}

impl PartialEq<str> for EncodingName {
    fn eq(&self, other: &str) -> bool { self.0 == other }
}

impl PartialEq<&str> for EncodingName {
    fn eq(&self, other: &&str) -> bool { self.0 == *other }
}

impl FromStr for EncodingName {
    type Err = Error;

    fn from_str(label: &str) -> Result<Self> { lookup(label).map(Codec::name) }
}

/// A concrete codec resolved from a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Codec {
    Utf8,
    Latin1,
    Ascii,
    Utf16 { big_endian: bool },
    Whatwg(&'static Encoding),
}

impl Codec {
    pub(crate) fn name(self) -> EncodingName {
        EncodingName(match self {
            Self::Utf8 => Cow::Borrowed("utf-8"),
            Self::Latin1 => Cow::Borrowed("latin-1"),
            Self::Ascii => Cow::Borrowed("ascii"),
            Self::Utf16 { big_endian: false } => Cow::Borrowed("utf-16le"),
            Self::Utf16 { big_endian: true } => Cow::Borrowed("utf-16be"),
            Self::Whatwg(enc) => Cow::Owned(enc.name().to_ascii_lowercase()),
        })
    }
}

/// Resolve `label` to its canonical [`EncodingName`].
///
/// # Errors
/// Returns [`Error::UnsupportedEncoding`] for unknown labels.
///
/// # Examples
///
/// ```
/// use textkit::canonical_encoding;
///
/// assert_eq!(canonical_encoding("UTF8").unwrap(), "utf-8");
/// assert_eq!(canonical_encoding("ISO-8859-1").unwrap(), "latin-1");
/// assert_eq!(canonical_encoding("sjis").unwrap(), "shift_jis");
/// assert!(canonical_encoding("klingon").is_err());
/// ```
pub fn canonical_encoding(label: &str) -> Result<EncodingName> { lookup(label).map(Codec::name) }

pub(crate) fn lookup(label: &str) -> Result<Codec> {
    let key = label.trim().to_ascii_lowercase();
    let codec = match key.as_str() {
        "utf-8" | "utf8" | "utf_8" | "u8" => Codec::Utf8,
        "latin-1" | "latin1" | "latin_1" | "iso-8859-1" | "iso8859-1" | "iso_8859_1"
        | "iso_8859-1" | "l1" | "cp819" => Codec::Latin1,
        "ascii" | "us-ascii" | "us_ascii" | "646" => Codec::Ascii,
        "utf-16le" | "utf_16_le" | "utf16le" => Codec::Utf16 { big_endian: false },
        "utf-16be" | "utf_16_be" | "utf16be" => Codec::Utf16 { big_endian: true },
        _ => match Encoding::for_label(key.as_bytes()) {
            Some(enc) if enc == encoding_rs::UTF_8 => Codec::Utf8,
            Some(enc) if enc == encoding_rs::UTF_16LE => Codec::Utf16 { big_endian: false },
            Some(enc) if enc == encoding_rs::UTF_16BE => Codec::Utf16 { big_endian: true },
            Some(enc) if enc != encoding_rs::REPLACEMENT => {
                log::debug!("label {label:?} resolved to {} via encoding_rs", enc.name());
                Codec::Whatwg(enc)
            }
            _ => return Err(Error::UnsupportedEncoding(label.to_string())),
        },
    };
    Ok(codec)
}

fn decode_error(codec: Codec, offset: usize) -> Error {
    Error::Decode {
        encoding: codec.name().to_string(),
        offset,
    }
}

/// Decode `bytes` with `codec`, applying `policy` to malformed input.
pub(crate) fn decode(codec: Codec, bytes: &[u8], policy: ErrorPolicy) -> Result<Cow<'_, str>> {
    match codec {
        Codec::Utf8 => decode_utf8(bytes, policy),
        Codec::Latin1 => Ok(match std::str::from_utf8(bytes) {
            Ok(text) if bytes.is_ascii() => Cow::Borrowed(text),
            _ => Cow::Owned(bytes.iter().copied().map(char::from).collect()),
        }),
        Codec::Ascii => decode_ascii(bytes, policy),
        Codec::Utf16 { big_endian: false } => decode_with(encoding_rs::UTF_16LE, codec, bytes, policy),
        Codec::Utf16 { big_endian: true } => decode_with(encoding_rs::UTF_16BE, codec, bytes, policy),
        Codec::Whatwg(enc) => decode_with(enc, codec, bytes, policy),
    }
}

fn decode_utf8(bytes: &[u8], policy: ErrorPolicy) -> Result<Cow<'_, str>> {
    match utf8::validate(bytes) {
        Ok(()) => std::str::from_utf8(bytes)
            .map(Cow::Borrowed)
            .map_err(|e| decode_error(Codec::Utf8, e.valid_up_to())),
        Err(offset) if policy == ErrorPolicy::Strict => Err(decode_error(Codec::Utf8, offset)),
        Err(_) => {
            let mut out = String::with_capacity(bytes.len());
            let mut invalid = 0usize;
            for (_, outcome) in utf8::outcomes(bytes) {
                match outcome.char() {
                    Some(ch) => out.push(ch),
                    None => {
                        invalid += 1;
                        if policy == ErrorPolicy::Replace {
                            out.push(char::REPLACEMENT_CHARACTER);
                        }
                    }
                }
            }
            log::trace!("utf-8 decode applied {policy} to {invalid} malformed sequence(s)");
            Ok(Cow::Owned(out))
        }
    }
}

fn decode_ascii(bytes: &[u8], policy: ErrorPolicy) -> Result<Cow<'_, str>> {
    if let Ok(text) = std::str::from_utf8(bytes)
        && bytes.is_ascii()
    {
        return Ok(Cow::Borrowed(text));
    }
    let mut out = String::with_capacity(bytes.len());
    for (offset, &b) in bytes.iter().enumerate() {
        if b.is_ascii() {
            out.push(char::from(b));
            continue;
        }
        match policy {
            ErrorPolicy::Strict => return Err(decode_error(Codec::Ascii, offset)),
            ErrorPolicy::Replace => out.push(char::REPLACEMENT_CHARACTER),
            ErrorPolicy::Ignore => {}
        }
    }
    Ok(Cow::Owned(out))
}

fn decode_with<'a>(
    enc: &'static Encoding,
    codec: Codec,
    bytes: &'a [u8],
    policy: ErrorPolicy,
) -> Result<Cow<'a, str>> {
    if let Some(text) = enc.decode_without_bom_handling_and_without_replacement(bytes) {
        return Ok(text);
    }

    let mut decoder = enc.new_decoder_without_bom_handling();
    let mut out = String::with_capacity(
        decoder
            .max_utf8_buffer_length_without_replacement(bytes.len())
            .unwrap_or(bytes.len()),
    );
    let mut read = 0;
    loop {
        let (result, consumed) =
            decoder.decode_to_string_without_replacement(&bytes[read..], &mut out, true);
        read += consumed;
        match result {
            DecoderResult::InputEmpty => break,
            DecoderResult::OutputFull => {
                let remaining = bytes.len() - read;
                let extra = decoder
                    .max_utf8_buffer_length_without_replacement(remaining)
                    .unwrap_or(remaining * 3);
                out.reserve(extra.max(16));
            }
            DecoderResult::Malformed(bad, after) => match policy {
                ErrorPolicy::Strict => {
                    let offset = read.saturating_sub(usize::from(bad) + usize::from(after));
                    return Err(decode_error(codec, offset));
                }
                ErrorPolicy::Replace => out.push(char::REPLACEMENT_CHARACTER),
                ErrorPolicy::Ignore => {}
            },
        }
    }
    Ok(Cow::Owned(out))
}

/// What an encoder does with a character the target cannot represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Unmappable {
    Fail,
    Substitute,
    Skip,
    /// Write an XML numeric character reference.
    CharRef,
}

impl From<ErrorPolicy> for Unmappable {
    fn from(policy: ErrorPolicy) -> Self {
        match policy {
            ErrorPolicy::Strict => Self::Fail,
            ErrorPolicy::Replace => Self::Substitute,
            ErrorPolicy::Ignore => Self::Skip,
        }
    }
}

fn push_unmappable(
    out: &mut Vec<u8>,
    codec: Codec,
    ch: char,
    offset: usize,
    mode: Unmappable,
) -> Result<()> {
    match mode {
        Unmappable::Fail => {
            return Err(Error::Encode {
                encoding: codec.name().to_string(),
                character: ch,
                offset,
            });
        }
        Unmappable::Substitute => out.push(b'?'),
        Unmappable::Skip => {}
        Unmappable::CharRef => out.extend_from_slice(format!("&#{};", u32::from(ch)).as_bytes()),
    }
    Ok(())
}

/// Encode `text` with `codec`, applying `mode` to unrepresentable characters.
pub(crate) fn encode(codec: Codec, text: &str, mode: Unmappable) -> Result<Cow<'_, [u8]>> {
    match codec {
        Codec::Utf8 => encode_utf8(text, mode),
        Codec::Latin1 => encode_single_byte(codec, text, 0xFF, mode),
        Codec::Ascii => encode_single_byte(codec, text, 0x7F, mode),
        Codec::Utf16 { big_endian } => {
            let mut out = Vec::with_capacity(text.len() * 2);
            for unit in text.encode_utf16() {
                let bytes = if big_endian {
                    unit.to_be_bytes()
                } else {
                    unit.to_le_bytes()
                };
                out.extend_from_slice(&bytes);
            }
            Ok(Cow::Owned(out))
        }
        Codec::Whatwg(enc) => encode_with(enc, codec, text, mode),
    }
}

/// U+FFFE and U+FFFF are written as unmappable, since decoding rejects them.
fn encode_utf8(text: &str, mode: Unmappable) -> Result<Cow<'_, [u8]>> {
    let nonchar = |c: char| matches!(c, '\u{FFFE}' | '\u{FFFF}');
    if !text.contains(nonchar) {
        return Ok(Cow::Borrowed(text.as_bytes()));
    }
    let mut out = Vec::with_capacity(text.len());
    for (offset, ch) in text.char_indices() {
        if nonchar(ch) {
            push_unmappable(&mut out, Codec::Utf8, ch, offset, mode)?;
        } else {
            out.extend_from_slice(ch.encode_utf8(&mut [0; 4]).as_bytes());
        }
    }
    Ok(Cow::Owned(out))
}

fn encode_single_byte(codec: Codec, text: &str, max: u32, mode: Unmappable) -> Result<Cow<'_, [u8]>> {
    if text.is_ascii() {
        return Ok(Cow::Borrowed(text.as_bytes()));
    }
    let mut out = Vec::with_capacity(text.len());
    for (offset, ch) in text.char_indices() {
        match u8::try_from(u32::from(ch)) {
            Ok(b) if u32::from(b) <= max => out.push(b),
            _ => push_unmappable(&mut out, codec, ch, offset, mode)?,
        }
    }
    Ok(Cow::Owned(out))
}

fn encode_with<'a>(
    enc: &'static Encoding,
    codec: Codec,
    text: &'a str,
    mode: Unmappable,
) -> Result<Cow<'a, [u8]>> {
    if enc.is_ascii_compatible() && text.is_ascii() {
        return Ok(Cow::Borrowed(text.as_bytes()));
    }

    let mut encoder = enc.new_encoder();
    let mut out = Vec::with_capacity(
        encoder
            .max_buffer_length_from_utf8_if_no_unmappables(text.len())
            .unwrap_or(text.len() * 4),
    );
    let mut read = 0;

    if mode == Unmappable::CharRef {
        // encoding_rs substitutes numeric character references itself and
        // keeps stateful encoders (ISO-2022-JP) consistent while doing so.
        loop {
            let (result, consumed, _) =
                encoder.encode_from_utf8_to_vec(&text[read..], &mut out, true);
            read += consumed;
            match result {
                CoderResult::InputEmpty => break,
                CoderResult::OutputFull => out.reserve((text.len() - read).max(16)),
            }
        }
        return Ok(Cow::Owned(out));
    }

    loop {
        let (result, consumed) =
            encoder.encode_from_utf8_to_vec_without_replacement(&text[read..], &mut out, true);
        read += consumed;
        match result {
            EncoderResult::InputEmpty => break,
            EncoderResult::OutputFull => {
                let remaining = text.len() - read;
                let extra = encoder
                    .max_buffer_length_from_utf8_without_replacement(remaining)
                    .unwrap_or(remaining * 4);
                out.reserve(extra.max(16));
            }
            EncoderResult::Unmappable(ch) => {
                push_unmappable(&mut out, codec, ch, read - ch.len_utf8(), mode)?;
            }
        }
    }
    Ok(Cow::Owned(out))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("utf-8", "utf-8")]
    #[case(" UTF8 ", "utf-8")]
    #[case("unicode-1-1-utf-8", "utf-8")]
    #[case("latin1", "latin-1")]
    #[case("ISO-8859-1", "latin-1")]
    #[case("us-ascii", "ascii")]
    #[case("utf-16", "utf-16le")]
    #[case("UTF-16BE", "utf-16be")]
    #[case("cp1252", "windows-1252")]
    #[case("shift-jis", "shift_jis")]
    #[case("euc-jp", "euc-jp")]
    #[case("koi8-r", "koi8-r")]
    fn resolves_labels(#[case] label: &str, #[case] expected: &str) {
        assert_eq!(canonical_encoding(label).expect("known label"), expected);
    }

    #[rstest]
    #[case("")]
    #[case("klingon")]
    #[case("iso-2022-kr")]
    fn rejects_unknown_labels(#[case] label: &str) {
        assert_eq!(
            lookup(label),
            Err(Error::UnsupportedEncoding(label.to_string()))
        );
    }

    #[test]
    fn latin1_is_identity_not_windows_1252() {
        let text = decode(Codec::Latin1, &[0x80, 0xE9], ErrorPolicy::Strict).expect("latin-1");
        assert_eq!(text, "\u{80}é");
    }

    #[test]
    fn ascii_decode_policies() {
        let bytes = b"a\xFFb";
        assert_eq!(
            decode(Codec::Ascii, bytes, ErrorPolicy::Strict),
            Err(Error::Decode {
                encoding: "ascii".into(),
                offset: 1
            })
        );
        assert_eq!(decode(Codec::Ascii, bytes, ErrorPolicy::Replace).unwrap(), "a\u{FFFD}b");
        assert_eq!(decode(Codec::Ascii, bytes, ErrorPolicy::Ignore).unwrap(), "ab");
    }

    #[test]
    fn whatwg_decode_reports_offset() {
        let sjis = lookup("shift_jis").expect("shift_jis");
        // 0x82 0xA0 decodes; 0x82 followed by '!' is malformed.
        let err = decode(sjis, b"\x82\xA0\x82!", ErrorPolicy::Strict).unwrap_err();
        assert!(matches!(err, Error::Decode { offset: 2, .. }), "{err:?}");
        let lossy = decode(sjis, b"\x82\xA0\x82!", ErrorPolicy::Replace).expect("lossy");
        assert!(lossy.contains('\u{FFFD}'));
    }

    #[test]
    fn utf16_round_trip() {
        for big_endian in [false, true] {
            let codec = Codec::Utf16 { big_endian };
            let bytes = encode(codec, "a€𝄞", Unmappable::Fail).expect("utf-16 encodes all");
            assert_eq!(bytes.len(), 2 + 2 + 4);
            let text = decode(codec, &bytes, ErrorPolicy::Strict).expect("utf-16 decode");
            assert_eq!(text, "a€𝄞");
        }
    }

    #[rstest]
    #[case(Unmappable::Substitute, b"caf? ok".as_slice())]
    #[case(Unmappable::Skip, b"caf ok".as_slice())]
    #[case(Unmappable::CharRef, b"caf&#8364; ok".as_slice())]
    fn single_byte_unmappable_modes(#[case] mode: Unmappable, #[case] expected: &[u8]) {
        let out = encode(Codec::Ascii, "caf€ ok", mode).expect("lenient mode");
        assert_eq!(out.as_ref(), expected);
    }

    #[test]
    fn whatwg_encode_modes() {
        let cp1252 = lookup("windows-1252").expect("cp1252");
        assert_eq!(
            encode(cp1252, "€ ✓", Unmappable::Substitute).unwrap().as_ref(),
            b"\x80 ?"
        );
        assert_eq!(
            encode(cp1252, "€ ✓", Unmappable::CharRef).unwrap().as_ref(),
            b"\x80 &#10003;"
        );
        assert_eq!(
            encode(cp1252, "€ ✓", Unmappable::Fail),
            Err(Error::Encode {
                encoding: "windows-1252".into(),
                character: '✓',
                offset: 4
            })
        );
    }

    #[rstest]
    #[case(Unmappable::Substitute, "a?b".as_bytes())]
    #[case(Unmappable::Skip, "ab".as_bytes())]
    #[case(Unmappable::CharRef, "a&#65534;b".as_bytes())]
    fn utf8_encode_treats_nonchars_as_unmappable(#[case] mode: Unmappable, #[case] expected: &[u8]) {
        let out = encode(Codec::Utf8, "a\u{FFFE}b", mode).expect("lenient mode");
        assert_eq!(out.as_ref(), expected);
        assert_eq!(
            encode(Codec::Utf8, "é\u{FFFF}", Unmappable::Fail),
            Err(Error::Encode {
                encoding: "utf-8".into(),
                character: '\u{FFFF}',
                offset: 2
            })
        );
        assert!(matches!(encode(Codec::Utf8, "é✓", mode), Ok(Cow::Borrowed(b)) if b == "é✓".as_bytes()));
    }

    #[test]
    fn encoding_name_compares_with_str() {
        let name: EncodingName = "Latin1".parse().expect("known");
        assert_eq!(name, "latin-1");
        assert_eq!(name.to_string(), "latin-1");
        assert_eq!(EncodingName::UTF_8.as_str(), "utf-8");
    }
}
