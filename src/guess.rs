//! Guessing the encoding of an unlabelled byte string.
//!
//! Strict UTF-8 wins outright. Otherwise an optional statistical
//! [`EncodingDetector`] is consulted, and its answer is used only when it is
//! confident enough. Everything else falls back to `latin-1`, which decodes
//! any byte string but will mangle text that was really in some other
//! multi-byte encoding. That fallback is intended: callers always get a
//! usable answer.

use std::fmt;

use crate::{
    Error, Result,
    convert::{EncodingName, Input},
    utf8,
};

/// Confidence required before a detector's answer is trusted.
pub const DEFAULT_THRESHOLD: f32 = 0.6;

/// A detector's answer for one byte string.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub encoding: EncodingName,
    /// Certainty in `0.0..=1.0`.
    pub confidence: f32,
}

/// A statistical encoding detector.
pub trait EncodingDetector: fmt::Debug {
    fn detect(&self, bytes: &[u8]) -> Detection;
}

/// Detector that never knows: it always answers `latin-1` with zero
/// confidence, so the guesser falls through to its fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDetector;

impl EncodingDetector for NoDetector {
    fn detect(&self, _bytes: &[u8]) -> Detection {
        Detection {
            encoding: EncodingName::LATIN_1,
            confidence: 0.0,
        }
    }
}

/// Detector backed by `chardetng`.
///
/// `chardetng` has no score of its own. `guess_assess` only says whether its
/// pick beat some other candidate, which almost any input manages, so the
/// confidence also scales with the number of non-ASCII bytes it had to go
/// on. A pick that cannot decode the input cleanly gets no confidence.
#[cfg(feature = "detect")]
#[derive(Debug, Clone, Copy, Default)]
pub struct ChardetngDetector;

/// Non-ASCII bytes needed before a `chardetng` pick is fully trusted.
#[cfg(feature = "detect")]
pub const EVIDENCE_BYTES: usize = 16;

#[cfg(feature = "detect")]
impl EncodingDetector for ChardetngDetector {
    fn detect(&self, bytes: &[u8]) -> Detection {
        let mut detector = chardetng::EncodingDetector::new();
        detector.feed(bytes, true);
        let (encoding, plausible) = detector.guess_assess(None, false);
        let malformed = encoding.decode_without_bom_handling_and_without_replacement(bytes).is_none();
        let evidence = bytes.iter().filter(|b| !b.is_ascii()).count().min(EVIDENCE_BYTES);
        #[expect(clippy::cast_precision_loss, reason = "both counts are at most 16")]
        let ratio = evidence as f32 / EVIDENCE_BYTES as f32;
        let confidence = if plausible && !malformed { ratio } else { 0.0 };
        let name = crate::canonical_encoding(encoding.name()).unwrap_or(EncodingName::LATIN_1);
        log::trace!("chardetng picked {name} (plausible: {plausible}) with confidence {confidence:.2}");
        Detection {
            encoding: name,
            confidence,
        }
    }
}

/// Encoding guesser with an optional detector and a confidence threshold.
#[derive(Debug)]
pub struct EncodingGuesser {
    detector: Option<Box<dyn EncodingDetector + Send + Sync>>,
    threshold: f32,
}

impl Default for EncodingGuesser {
    /// Uses [`ChardetngDetector`] when the `detect` feature is enabled.
    fn default() -> Self {
        #[cfg(feature = "detect")]
        let detector: Option<Box<dyn EncodingDetector + Send + Sync>> = Some(Box::new(ChardetngDetector));
        #[cfg(not(feature = "detect"))]
        let detector: Option<Box<dyn EncodingDetector + Send + Sync>> = None;
        Self {
            detector,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl EncodingGuesser {
    /// A guesser that only tries UTF-8 and then falls back to `latin-1`.
    #[must_use]
    pub fn without_detector() -> Self {
        Self {
            detector: None,
            threshold: DEFAULT_THRESHOLD,
        }
    }

    #[must_use]
    pub fn with_detector(detector: impl EncodingDetector + Send + Sync + 'static) -> Self {
        Self {
            detector: Some(Box::new(detector)),
            threshold: DEFAULT_THRESHOLD,
        }
    }

    #[must_use]
    pub fn threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Guess the encoding of `input`.
    ///
    /// # Errors
    /// Returns [`Error::TypeMismatch`] unless `input` is a byte string.
    pub fn guess<'a>(&self, input: impl Into<Input<'a>>) -> Result<EncodingName> {
        let input = input.into();
        let Input::Bytes(bytes) = input else {
            return Err(Error::TypeMismatch {
                expected: "bytes",
                found: input.kind(),
            });
        };

        if utf8::is_valid(bytes) {
            log::debug!("{} byte(s) are valid utf-8", bytes.len());
            return Ok(EncodingName::UTF_8);
        }
        if let Some(detector) = &self.detector {
            let detection = detector.detect(bytes);
            if detection.confidence >= self.threshold {
                log::debug!(
                    "detector chose {} at confidence {:.2}",
                    detection.encoding,
                    detection.confidence
                );
                return Ok(detection.encoding);
            }
            log::debug!(
                "ignoring {} at confidence {:.2} below {:.2}",
                detection.encoding,
                detection.confidence,
                self.threshold
            );
        }
        log::debug!("falling back to latin-1");
        Ok(EncodingName::LATIN_1)
    }
}

/// Guess with [`EncodingGuesser::default`].
///
/// # Errors
/// Returns [`Error::TypeMismatch`] unless `input` is a byte string.
///
/// # Examples
///
/// ```
/// use textkit::guess_encoding;
///
/// assert_eq!(guess_encoding("café".as_bytes()).unwrap(), "utf-8");
/// assert!(guess_encoding("café").is_err());
/// ```
pub fn guess_encoding<'a>(input: impl Into<Input<'a>>) -> Result<EncodingName> {
    EncodingGuesser::default().guess(input)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[derive(Debug)]
    struct Fixed(&'static str, f32);

    impl EncodingDetector for Fixed {
        fn detect(&self, _bytes: &[u8]) -> Detection {
            Detection {
                encoding: self.0.parse().expect("fixture label is known"),
                confidence: self.1,
            }
        }
    }

    #[rstest]
    #[case(b"".as_slice())]
    #[case(b"plain ascii".as_slice())]
    #[case("café".as_bytes())]
    fn utf8_wins(#[case] bytes: &[u8]) {
        let guesser = EncodingGuesser::with_detector(Fixed("shift_jis", 1.0));
        assert_eq!(guesser.guess(bytes).expect("bytes"), "utf-8");
    }

    #[test]
    fn confident_detector_is_trusted() {
        let guesser = EncodingGuesser::with_detector(Fixed("shift_jis", 0.9));
        assert_eq!(guesser.guess(b"\x82\xA0").expect("bytes"), "shift_jis");
    }

    #[test]
    fn unsure_detector_is_ignored() {
        let guesser = EncodingGuesser::with_detector(Fixed("shift_jis", 0.5));
        assert_eq!(guesser.guess(b"\x82\xA0").expect("bytes"), "latin-1");
        let guesser = EncodingGuesser::with_detector(Fixed("shift_jis", 0.5)).threshold(0.4);
        assert_eq!(guesser.guess(b"\x82\xA0").expect("bytes"), "shift_jis");
    }

    #[test]
    fn latin1_fallback_accepts_anything() {
        // Shift_JIS bytes come back as latin-1 without a detector. This is
        // the documented fallback.
        let guesser = EncodingGuesser::without_detector();
        assert_eq!(guesser.guess(b"\x82\xA0\x82\xA2").expect("bytes"), "latin-1");
        assert_eq!(
            EncodingGuesser::with_detector(NoDetector).guess(b"\xFF").expect("bytes"),
            "latin-1"
        );
    }

    #[test]
    fn text_is_rejected() {
        let err = guess_encoding("café").unwrap_err();
        assert_eq!(
            err,
            Error::TypeMismatch {
                expected: "bytes",
                found: "text"
            }
        );
    }

    #[cfg(feature = "detect")]
    #[test]
    fn chardetng_names_a_legacy_encoding() {
        let text = "これは日本語のテキストです。文字コードを推測します。";
        let (sjis, _, _) = encoding_rs::SHIFT_JIS.encode(text);
        let detection = ChardetngDetector.detect(&sjis);
        assert_eq!(detection.encoding, "shift_jis");
        assert!(detection.confidence > 0.9);
    }

    #[cfg(feature = "detect")]
    #[rstest]
    #[case(b"\x00\x81\xff\x90\x8d".as_slice())]
    #[case(b"\xff\xfe\xfd\xfc\x80".as_slice())]
    #[case(b"\xFFcaf\xE9\xFF".as_slice())]
    fn short_noise_falls_back_to_latin1(#[case] bytes: &[u8]) {
        assert!(ChardetngDetector.detect(bytes).confidence < DEFAULT_THRESHOLD);
        assert_eq!(guess_encoding(bytes).expect("bytes"), "latin-1");
    }

    #[cfg(feature = "detect")]
    #[test]
    fn chardetng_confidence_grows_with_evidence() {
        let (sjis, _, _) = encoding_rs::SHIFT_JIS.encode("これは");
        assert_eq!(sjis.len(), 6);
        let short = ChardetngDetector.detect(&sjis).confidence;
        assert!(short < DEFAULT_THRESHOLD, "{short}");
        let (sjis, _, _) = encoding_rs::SHIFT_JIS.encode("これは日本語のテキストです。文字コードを推測します。");
        let long = ChardetngDetector.detect(&sjis);
        assert_eq!(long.encoding, "shift_jis");
        assert!((long.confidence - 1.0).abs() < f32::EPSILON);
    }
}
