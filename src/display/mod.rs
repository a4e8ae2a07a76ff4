//! Terminal display width of text.
//!
//! Widths are counted in fixed-width columns: East Asian wide characters take
//! two, combining marks none, and control characters none, except the few
//! that erase a column (backspace, escape, delete and CCH), which count as
//! minus one. Totals are therefore signed.

use std::borrow::Cow;

use crate::{
    ControlCharPolicy, ConvertOptions, Error, Result,
    controls::is_display_control,
    intervals::{WidthClass, classify},
    to_bytes, to_text, utf8,
};

pub mod wrap;

pub use wrap::{WrapOptions, fill, wrap};

/// Width of a single codepoint: `-1`, `0`, `1` or `2`.
///
/// # Errors
/// Returns [`Error::ControlChar`] for a control character under
/// [`ControlCharPolicy::Strict`].
pub fn codepoint_width(ch: char, policy: ControlCharPolicy) -> Result<isize> {
    let cp = u32::from(ch);
    if is_display_control(cp) {
        if policy == ControlCharPolicy::Strict {
            return Err(Error::ControlChar { codepoint: cp });
        }
        return Ok(match cp {
            0x08 | 0x1B | 0x7F | 0x94 => -1,
            _ => 0,
        });
    }
    Ok(match classify(cp) {
        Some(WidthClass::Zero) => 0,
        Some(WidthClass::Wide) => 2,
        None => 1,
    })
}

fn lenient_width(ch: char) -> isize { codepoint_width(ch, ControlCharPolicy::Replace).unwrap_or(0) }

/// Total width of `text`.
///
/// # Errors
/// Returns [`Error::ControlChar`] for the first control character under
/// [`ControlCharPolicy::Strict`].
///
/// # Examples
///
/// ```
/// use textkit::{ControlCharPolicy, text_width};
///
/// let width = text_width("く ku ら ra と to み mi", ControlCharPolicy::Replace).unwrap();
/// assert_eq!(width, 23);
/// ```
pub fn text_width(text: &str, policy: ControlCharPolicy) -> Result<isize> {
    text.chars()
        .try_fold(0isize, |acc, ch| Ok(acc + codepoint_width(ch, policy)?))
}

/// [`text_width`] with control characters counted rather than rejected.
#[must_use]
pub fn display_width(text: &str) -> isize { text.chars().map(lenient_width).sum() }

/// Width of a UTF-8 byte string, measured without decoding it first.
///
/// Each malformed run counts as one replacement character, one column wide.
///
/// # Errors
/// As [`text_width`].
pub fn bytes_width(bytes: &[u8], policy: ControlCharPolicy) -> Result<isize> {
    utf8::outcomes(bytes).try_fold(0isize, |acc, (_, outcome)| {
        let ch = outcome.char().unwrap_or(char::REPLACEMENT_CHARACTER);
        Ok(acc + codepoint_width(ch, policy)?)
    })
}

/// `true` if the combined width of `texts` is at most `limit`.
///
/// Stops measuring once the running total passes `limit`.
#[must_use]
pub fn text_width_le(limit: usize, texts: &[&str]) -> bool {
    let chars: usize = texts.iter().map(|t| t.chars().count()).sum();
    // No codepoint is wider than two columns.
    if chars.saturating_mul(2) <= limit {
        return true;
    }
    let limit = isize::try_from(limit).unwrap_or(isize::MAX);
    let mut total = 0isize;
    for ch in texts.iter().flat_map(|t| t.chars()) {
        total += lenient_width(ch);
        if total > limit {
            return false;
        }
    }
    true
}

/// Longest prefix of `text` no wider than `max_width` columns.
///
/// Stops at the first codepoint that would overflow, so a leading wide
/// character with `max_width` of one yields an empty string.
#[must_use]
pub fn chop_to_width(text: &str, max_width: usize) -> &str {
    let max = isize::try_from(max_width).unwrap_or(isize::MAX);
    let mut total = 0isize;
    for (idx, ch) in text.char_indices() {
        total += lenient_width(ch);
        if total > max {
            return &text[..idx];
        }
    }
    text
}

/// Which side of the text the padding goes on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    /// Text on the left, spaces appended.
    #[default]
    Left,
    /// Spaces first, text on the right.
    Right,
}

/// Options for [`pad_to_width`].
///
/// `prefix` and `suffix` are written around the text and count towards the
/// padded width. Only the text itself is chopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PadOptions<'a> {
    /// Chop the text to this many columns before padding.
    pub chop: Option<usize>,
    pub align: Align,
    pub prefix: &'a str,
    pub suffix: &'a str,
}

impl<'a> PadOptions<'a> {
    #[must_use]
    pub fn chop(mut self, width: usize) -> Self {
        self.chop = Some(width);
        self
    }

    #[must_use]
    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    #[must_use]
    pub fn wrap_with(mut self, prefix: &'a str, suffix: &'a str) -> Self {
        self.prefix = prefix;
        self.suffix = suffix;
        self
    }
}

/// Pad `prefix + text + suffix` with spaces until it is at least `target`
/// columns wide.
///
/// Text already wider than `target` is left as is unless `options.chop` is
/// set.
///
/// # Examples
///
/// ```
/// use textkit::{Align, PadOptions, pad_to_width};
///
/// assert_eq!(pad_to_width("ab", 4, &PadOptions::default()), "ab  ");
/// assert_eq!(pad_to_width("ab", 4, &PadOptions::default().align(Align::Right)), "  ab");
/// assert_eq!(pad_to_width("日本語", 4, &PadOptions::default().chop(4)), "日本");
/// assert_eq!(pad_to_width("ab", 4, &PadOptions::default().wrap_with("[", "]")), "[ab]");
/// ```
#[must_use]
pub fn pad_to_width(text: &str, target: usize, options: &PadOptions<'_>) -> String {
    let text = options.chop.map_or(text, |max| chop_to_width(text, max));
    let width = display_width(options.prefix) + display_width(text) + display_width(options.suffix);
    let width = usize::try_from(width).unwrap_or(0);
    let padding = " ".repeat(target.saturating_sub(width));
    let mut out = String::with_capacity(
        options.prefix.len() + text.len() + options.suffix.len() + padding.len(),
    );
    if options.align == Align::Right {
        out.push_str(&padding);
    }
    out.push_str(options.prefix);
    out.push_str(text);
    out.push_str(options.suffix);
    if options.align == Align::Left {
        out.push_str(&padding);
    }
    out
}

/// [`pad_to_width`] for a byte string in `encoding`.
///
/// Malformed input is replaced while measuring; the result is encoded back
/// to `encoding`, substituting characters it cannot represent.
///
/// # Errors
/// Returns [`Error::UnsupportedEncoding`] for an unknown encoding.
pub fn pad_bytes_to_width(
    bytes: &[u8],
    target: usize,
    options: &PadOptions<'_>,
    encoding: &str,
) -> Result<Vec<u8>> {
    let convert = ConvertOptions::new(encoding);
    let text = to_text(bytes, &convert)?;
    let padded = pad_to_width(&text, target, options);
    Ok(match to_bytes(padded.as_str(), &convert)? {
        Cow::Borrowed(b) => b.to_vec(),
        Cow::Owned(b) => b,
    })
}
