//! Unit tests for the text/bytes converters.

use std::borrow::Cow;

use rstest::rstest;

use super::*;

#[derive(Debug)]
struct Opaque;

impl Displayable for Opaque {}

#[derive(Debug)]
struct Named(&'static str);

impl Displayable for Named {
    fn display_text(&self) -> Option<String> { Some(format!("named {}", self.0)) }
}

#[test]
fn text_input_is_returned_unchanged() {
    let out = to_text("café", &ConvertOptions::new("klingon")).expect("text needs no codec");
    assert!(matches!(out, Cow::Borrowed("café")));
}

#[test]
fn bytes_input_is_not_reencoded() {
    let raw = b"caf\xC3\xA9";
    let out = to_bytes(raw, &ConvertOptions::new("latin-1")).expect("bytes need no codec");
    assert_eq!(out.as_ref(), raw);
}

#[test]
fn encodes_latin1_not_utf8() {
    let out = to_bytes("café", &ConvertOptions::new("latin-1")).expect("latin-1 encodes é");
    assert_eq!(out.as_ref(), b"caf\xE9");
    assert_eq!(out.len(), 4);
}

#[rstest]
#[case(ErrorPolicy::Replace, "a\u{FFFD}b\u{FFFD}c")]
#[case(ErrorPolicy::Ignore, "abc")]
fn lenient_decode_resynchronises(#[case] policy: ErrorPolicy, #[case] expected: &str) {
    let out = to_text(b"a\xE2\x82b\xFFc", &ConvertOptions::new("utf-8").errors(policy))
        .expect("lenient policies never fail");
    assert_eq!(out, expected);
}

#[test]
fn strict_decode_reports_offset() {
    let err = to_text(b"ok\xC0\x80", &ConvertOptions::new("utf-8").errors(ErrorPolicy::Strict))
        .unwrap_err();
    assert_eq!(
        err,
        Error::Decode {
            encoding: "utf-8".into(),
            offset: 2
        }
    );
}

#[rstest]
#[case(ErrorPolicy::Replace, b"snow ? man".as_slice())]
#[case(ErrorPolicy::Ignore, b"snow  man".as_slice())]
fn lenient_encode(#[case] policy: ErrorPolicy, #[case] expected: &[u8]) {
    let out = to_bytes("snow ☃ man", &ConvertOptions::new("latin-1").errors(policy))
        .expect("lenient policies never fail");
    assert_eq!(out.as_ref(), expected);
}

#[test]
fn strict_encode_names_character() {
    let err = to_bytes("snow ☃", &ConvertOptions::new("ascii").errors(ErrorPolicy::Strict))
        .unwrap_err();
    assert_eq!(
        err,
        Error::Encode {
            encoding: "ascii".into(),
            character: '☃',
            offset: 5
        }
    );
}

#[test]
fn unknown_encoding_is_reported_for_bytes() {
    let err = to_text(b"abc", &ConvertOptions::new("klingon")).unwrap_err();
    assert_eq!(err, Error::UnsupportedEncoding("klingon".into()));
    let err = to_bytes("abc", &ConvertOptions::new("klingon")).unwrap_err();
    assert_eq!(err, Error::UnsupportedEncoding("klingon".into()));
}

#[rstest]
#[case(NonTextPolicy::Empty, "")]
#[case(NonTextPolicy::SimpleRepr, "42")]
#[case(NonTextPolicy::Repr, "42")]
fn non_text_numbers(#[case] policy: NonTextPolicy, #[case] expected: &str) {
    let value: &dyn Displayable = &42_u32;
    let out = to_text(value, &ConvertOptions::default().non_text(policy)).expect("renders");
    assert_eq!(out, expected);
}

#[test]
fn simple_repr_falls_back_to_debug() {
    let value: &dyn Displayable = &Opaque;
    let out = to_text(value, &ConvertOptions::default()).expect("renders");
    assert_eq!(out, "Opaque");

    let named: &dyn Displayable = &Named("x");
    assert_eq!(to_text(named, &ConvertOptions::default()).unwrap(), "named x");
    let repr = ConvertOptions::default().non_text(NonTextPolicy::Repr);
    assert_eq!(to_text(named, &repr).unwrap(), "Named(\"x\")");
}

#[test]
fn strict_non_text_fails() {
    let value: &dyn Displayable = &1.5_f64;
    let opts = ConvertOptions::default().non_text(NonTextPolicy::Strict);
    assert!(matches!(to_text(value, &opts), Err(Error::TypeMismatch { .. })));
    assert!(matches!(to_bytes(value, &opts), Err(Error::TypeMismatch { .. })));
}

#[test]
fn passthrough_returns_the_value() {
    let value: &dyn Displayable = &Opaque;
    let opts = ConvertOptions::default().non_text(NonTextPolicy::Passthrough);
    match convert_text(value, &opts).expect("passthrough never fails") {
        Converted::Passthrough(v) => assert_eq!(format!("{v:?}"), "Opaque"),
        other => panic!("expected passthrough, got {other:?}"),
    }
    assert!(matches!(
        to_text(value, &opts),
        Err(Error::TypeMismatch {
            expected: "text",
            ..
        })
    ));
}

#[test]
fn non_text_bytes_use_target_encoding() {
    let value: &dyn Displayable = &'é';
    let out = to_bytes(value, &ConvertOptions::new("latin-1")).expect("renders");
    assert_eq!(out.as_ref(), b"\xE9");
}

#[derive(Debug)]
struct Outer(std::io::Error);

impl std::fmt::Display for Outer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str("loading catalog") }
}

impl std::error::Error for Outer {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> { Some(&self.0) }
}

#[test]
fn error_chain_is_rendered() {
    let err = Outer(std::io::Error::other("disk full ✗"));
    assert_eq!(error_to_text(&err), "loading catalog: disk full ✗");
    let bytes = error_to_bytes(&err, &ConvertOptions::new("ascii")).expect("ascii with replace");
    assert_eq!(bytes, b"loading catalog: disk full ?");
}

#[rstest]
#[case(Input::Text("café"), Input::Text("café"), true)]
#[case(Input::Bytes(b"caf\xC3\xA9"), Input::Text("café"), true)]
#[case(Input::Text("café"), Input::Bytes(b"caf\xE9"), false)]
#[case(Input::Bytes(b"a"), Input::Bytes(b"b"), false)]
fn str_eq_mixed_kinds(#[case] a: Input<'static>, #[case] b: Input<'static>, #[case] expected: bool) {
    assert_eq!(str_eq(a, b, "utf-8").expect("utf-8 known"), expected);
}

#[test]
fn str_eq_honours_encoding() {
    assert!(str_eq("café", b"caf\xE9", "latin-1").expect("latin-1 known"));
}

#[test]
fn valid_encoding_checks() {
    assert!(is_valid_encoding(b"caf\xC3\xA9", "utf-8").unwrap());
    assert!(!is_valid_encoding(b"caf\xE9", "utf-8").unwrap());
    assert!(is_valid_encoding(b"caf\xE9", "latin-1").unwrap());
    assert!(is_valid_encoding(b"x", "nope").is_err());
}
