//! Control-character handling shared by the width and XML helpers.
//!
//! Two notions of "control" are in play. The display code treats every C0
//! code, DEL and every C1 code as a control with no printable width. The XML
//! helpers only act on the codes that are illegal or discouraged in XML 1.0
//! documents: C0 except tab, newline and carriage return (backspace is left
//! alone), plus DEL and the C1 block apart from NEL.

use std::borrow::Cow;

use crate::{ControlCharPolicy, Error, Result};

/// Substitute written in place of a control character under `Replace`.
pub const REPLACEMENT: char = '?';

/// `true` for codepoints the display code treats as terminal controls.
#[inline]
#[must_use]
pub fn is_display_control(cp: u32) -> bool { cp < 0x20 || (0x7F..0xA0).contains(&cp) }

/// `true` for control characters acted on by [`process_control_chars`].
#[must_use]
pub fn is_xml_control(ch: char) -> bool {
    matches!(
        u32::from(ch),
        0x00..=0x07 | 0x0B | 0x0C | 0x0E..=0x1F | 0x7F..=0x84 | 0x86..=0x9F
    )
}

/// Apply `policy` to the XML control characters in `text`.
///
/// `Replace` writes `?` for each one, `Ignore` drops them and `Strict` fails
/// on the first. Text without control characters is returned borrowed.
///
/// # Errors
/// Returns [`Error::ControlChar`] under [`ControlCharPolicy::Strict`].
///
/// # Examples
///
/// ```
/// use textkit::{ControlCharPolicy, process_control_chars};
///
/// let out = process_control_chars("a\u{1}b", ControlCharPolicy::Replace).unwrap();
/// assert_eq!(out, "a?b");
/// ```
pub fn process_control_chars(text: &str, policy: ControlCharPolicy) -> Result<Cow<'_, str>> {
    let Some(first) = text.find(is_xml_control) else {
        return Ok(Cow::Borrowed(text));
    };

    let mut out = String::with_capacity(text.len());
    out.push_str(&text[..first]);
    let mut count = 0usize;
    for ch in text[first..].chars() {
        if !is_xml_control(ch) {
            out.push(ch);
            continue;
        }
        count += 1;
        match policy {
            ControlCharPolicy::Strict => {
                return Err(Error::ControlChar {
                    codepoint: u32::from(ch),
                });
            }
            ControlCharPolicy::Replace => out.push(REPLACEMENT),
            ControlCharPolicy::Ignore => {}
        }
    }
    log::trace!("applied {policy} to {count} control character(s)");
    Ok(Cow::Owned(out))
}
