//! Standard-alphabet base64 with padding.

use crate::{Error, Result};

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Encode `bytes` as padded base64.
#[must_use]
pub fn encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len().div_ceil(3) * 4);
    for chunk in bytes.chunks(3) {
        let b = [
            chunk[0],
            chunk.get(1).copied().unwrap_or(0),
            chunk.get(2).copied().unwrap_or(0),
        ];
        let n = (u32::from(b[0]) << 16) | (u32::from(b[1]) << 8) | u32::from(b[2]);
        for i in 0..4 {
            if i <= chunk.len() {
                out.push(char::from(ALPHABET[((n >> (18 - 6 * i)) & 0x3F) as usize]));
            } else {
                out.push('=');
            }
        }
    }
    out
}

fn sextet(byte: u8) -> Option<u32> {
    let value = match byte {
        b'A'..=b'Z' => byte - b'A',
        b'a'..=b'z' => byte - b'a' + 26,
        b'0'..=b'9' => byte - b'0' + 52,
        b'+' => 62,
        b'/' => 63,
        _ => return None,
    };
    Some(u32::from(value))
}

/// Decode padded base64, skipping ASCII whitespace.
///
/// # Errors
/// Returns [`Error::InvalidBase64`] with the offset of the first byte that
/// is not part of a well-formed encoding.
pub fn decode(input: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(input.len() / 4 * 3);
    let mut acc = 0u32;
    let mut held = 0usize;
    let mut padding = 0usize;

    for (offset, &byte) in input.iter().enumerate() {
        if byte.is_ascii_whitespace() {
            continue;
        }
        let invalid = Error::InvalidBase64 { offset };
        if byte == b'=' {
            // Padding may only fill the last one or two places of a quantum.
            if held < 2 {
                return Err(invalid);
            }
            padding += 1;
            if held + padding == 4 {
                flush(&mut out, acc, held, padding);
                (acc, held) = (0, 0);
            }
            continue;
        }
        if padding > 0 {
            return Err(invalid);
        }
        let value = sextet(byte).ok_or(invalid)?;
        acc = (acc << 6) | value;
        held += 1;
        if held == 4 {
            flush(&mut out, acc, held, 0);
            (acc, held) = (0, 0);
        }
    }

    if held != 0 {
        return Err(Error::InvalidBase64 {
            offset: input.len(),
        });
    }
    Ok(out)
}

/// Append the bytes carried by `held` sextets of one quantum.
fn flush(out: &mut Vec<u8>, acc: u32, held: usize, padding: usize) {
    let [_, bytes @ ..] = (acc << (6 * padding)).to_be_bytes();
    out.extend(bytes.into_iter().take(held.saturating_sub(1)));
}
