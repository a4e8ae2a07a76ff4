//! Validating UTF-8 decoder.
//!
//! [`decode_next`] reads one codepoint at a time and never panics. Malformed
//! input is an ordinary [`DecodeOutcome::Invalid`] value that carries how many
//! bytes belong to the broken sequence, so callers can skip exactly that many
//! and carry on. Overlong forms, UTF-16 surrogates, U+FFFE/U+FFFF and values
//! above U+10FFFF are all rejected.

/// Result of decoding one sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// A well-formed codepoint spanning `len` bytes.
    Valid { ch: char, len: usize },
    /// A malformed sequence; skip `len` bytes to resynchronise.
    Invalid { len: usize },
}

impl DecodeOutcome {
    /// Number of bytes consumed, always between 1 and 4.
    #[must_use]
    pub fn consumed(self) -> usize {
        match self {
            Self::Valid { len, .. } | Self::Invalid { len } => len,
        }
    }

    /// The decoded character, if the sequence was valid.
    #[must_use]
    pub fn char(self) -> Option<char> {
        match self {
            Self::Valid { ch, .. } => Some(ch),
            Self::Invalid { .. } => None,
        }
    }

    #[must_use]
    pub fn is_valid(self) -> bool { matches!(self, Self::Valid { .. }) }
}

#[inline]
fn is_continuation(b: u8) -> bool { b & 0xC0 == 0x80 }

/// Decode the sequence starting at `offset`.
///
/// Returns `None` once `offset` reaches the end of `bytes`.
///
/// # Examples
///
/// ```
/// use textkit::utf8::{DecodeOutcome, decode_next};
///
/// assert_eq!(
///     decode_next("é".as_bytes(), 0),
///     Some(DecodeOutcome::Valid { ch: 'é', len: 2 })
/// );
/// assert_eq!(decode_next(&[0xC0, 0x80], 0), Some(DecodeOutcome::Invalid { len: 2 }));
/// assert_eq!(decode_next(b"", 0), None);
/// ```
#[must_use]
pub fn decode_next(bytes: &[u8], offset: usize) -> Option<DecodeOutcome> {
    let rest = bytes.get(offset..)?;
    let &b0 = rest.first()?;

    if b0 < 0x80 {
        return Some(DecodeOutcome::Valid {
            ch: char::from(b0),
            len: 1,
        });
    }

    let (need, lead_bits) = if b0 & 0xE0 == 0xC0 {
        (2, u32::from(b0 & 0x1F))
    } else if b0 & 0xF0 == 0xE0 {
        (3, u32::from(b0 & 0x0F))
    } else if b0 & 0xF8 == 0xF0 {
        (4, u32::from(b0 & 0x07))
    } else {
        // Stray continuation byte or 0xF8..=0xFF.
        return Some(DecodeOutcome::Invalid { len: 1 });
    };

    let mut cp = lead_bits;
    for i in 1..need {
        match rest.get(i) {
            Some(&b) if is_continuation(b) => cp = (cp << 6) | u32::from(b & 0x3F),
            // Truncated, or a non-continuation byte that starts the next sequence.
            _ => return Some(DecodeOutcome::Invalid { len: i }),
        }
    }

    let b1 = rest[1];
    let rejected = match need {
        2 => b0 & 0xFE == 0xC0,
        3 => {
            (b0 == 0xE0 && b1 & 0xE0 == 0x80)
                || (b0 == 0xED && b1 & 0xE0 == 0xA0)
                || (b0 == 0xEF && b1 == 0xBF && rest[2] & 0xFE == 0xBE)
        }
        _ => (b0 == 0xF0 && b1 & 0xF0 == 0x80) || (b0 == 0xF4 && b1 > 0x8F) || b0 > 0xF4,
    };
    if rejected {
        return Some(DecodeOutcome::Invalid { len: need });
    }

    Some(match char::from_u32(cp) {
        Some(ch) => DecodeOutcome::Valid { ch, len: need },
        None => DecodeOutcome::Invalid { len: need },
    })
}

/// Lazy iterator over the [`DecodeOutcome`]s of a byte slice.
///
/// Each item is paired with the offset at which its sequence starts.
#[derive(Debug, Clone)]
pub struct Utf8Outcomes<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Utf8Outcomes<'a> {
    #[must_use]
    pub fn new(bytes: &'a [u8]) -> Self { Self { bytes, offset: 0 } }
}

impl Iterator for Utf8Outcomes<'_> {
    type Item = (usize, DecodeOutcome);

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.offset;
        let outcome = decode_next(self.bytes, start)?;
        self.offset += outcome.consumed();
        Some((start, outcome))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.bytes.len().saturating_sub(self.offset);
        (remaining.div_ceil(4), Some(remaining))
    }
}

impl std::iter::FusedIterator for Utf8Outcomes<'_> {}

/// Iterate the decode outcomes of `bytes`.
#[must_use]
pub fn outcomes(bytes: &[u8]) -> Utf8Outcomes<'_> { Utf8Outcomes::new(bytes) }

/// Check `bytes`, returning the offset of the first malformed sequence.
///
/// # Errors
/// Returns the byte offset at which decoding first fails.
pub fn validate(bytes: &[u8]) -> Result<(), usize> {
    match outcomes(bytes).find(|(_, outcome)| !outcome.is_valid()) {
        Some((offset, _)) => Err(offset),
        None => Ok(()),
    }
}

/// `true` if every sequence in `bytes` decodes.
#[must_use]
pub fn is_valid(bytes: &[u8]) -> bool { validate(bytes).is_ok() }
