//! Width-aware word wrapping.
//!
//! Words are split on whitespace and laid out first-fit with
//! `textwrap`'s wrapping algorithm, measuring each word with
//! [`display_width`](super::display_width) rather than counting characters.
//! A word wider than the line is placed on a line of its own, unbroken.

use textwrap::{core::Fragment, wrap_algorithms::wrap_first_fit};

use super::display_width;

/// Default line width for [`wrap`] and [`fill`].
pub const DEFAULT_WIDTH: usize = 70;

/// Line width and indentation for [`wrap`] and [`fill`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrapOptions<'a> {
    pub width: usize,
    /// Written before the first line and counted towards its width.
    pub initial_indent: &'a str,
    /// Written before every later line.
    pub subsequent_indent: &'a str,
}

impl Default for WrapOptions<'_> {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            initial_indent: "",
            subsequent_indent: "",
        }
    }
}

impl From<usize> for WrapOptions<'_> {
    fn from(width: usize) -> Self {
        Self {
            width,
            ..Self::default()
        }
    }
}

impl<'a> WrapOptions<'a> {
    #[must_use]
    pub fn new(width: usize) -> Self { Self::from(width) }

    #[must_use]
    pub fn initial_indent(mut self, indent: &'a str) -> Self {
        self.initial_indent = indent;
        self
    }

    #[must_use]
    pub fn subsequent_indent(mut self, indent: &'a str) -> Self {
        self.subsequent_indent = indent;
        self
    }
}

/// A whitespace-separated word measured in display columns.
#[derive(Debug)]
struct Word<'a> {
    text: &'a str,
    columns: usize,
}

impl<'a> Word<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            columns: usize::try_from(display_width(text)).unwrap_or(0),
        }
    }
}

#[expect(clippy::cast_precision_loss, reason = "column counts are small")]
fn as_f64(columns: usize) -> f64 { columns as f64 }

impl Fragment for Word<'_> {
    fn width(&self) -> f64 { as_f64(self.columns) }

    fn whitespace_width(&self) -> f64 { 1.0 }

    fn penalty_width(&self) -> f64 { 0.0 }
}

/// Wrap `text` into lines no wider than `options.width` columns.
///
/// Runs of whitespace, including newlines, collapse to a single space.
/// Empty or blank input produces no lines.
///
/// # Examples
///
/// ```
/// use textkit::{WrapOptions, wrap};
///
/// assert_eq!(wrap("the quick brown fox", 10), ["the quick", "brown fox"]);
/// assert_eq!(wrap("日本語の テキスト", 8), ["日本語の", "テキスト"]);
/// let opts = WrapOptions::new(8).initial_indent("* ").subsequent_indent("  ");
/// assert_eq!(wrap("one two three", opts), ["* one", "  two", "  three"]);
/// assert!(wrap("   ", 10).is_empty());
/// ```
#[must_use]
pub fn wrap<'a>(text: &str, options: impl Into<WrapOptions<'a>>) -> Vec<String> {
    let options = options.into();
    let words: Vec<Word<'_>> = text.split_whitespace().map(Word::new).collect();
    if words.is_empty() {
        return Vec::new();
    }

    let indent_width = |indent: &str| usize::try_from(display_width(indent)).unwrap_or(0);
    let line_widths = [
        as_f64(options.width.saturating_sub(indent_width(options.initial_indent))),
        as_f64(options.width.saturating_sub(indent_width(options.subsequent_indent))),
    ];

    wrap_first_fit(&words, &line_widths)
        .into_iter()
        .enumerate()
        .map(|(idx, line)| {
            let indent = if idx == 0 {
                options.initial_indent
            } else {
                options.subsequent_indent
            };
            let mut out = String::from(indent);
            for (n, word) in line.iter().enumerate() {
                if n > 0 {
                    out.push(' ');
                }
                out.push_str(word.text);
            }
            out
        })
        .collect()
}

/// [`wrap`] joined with newlines.
#[must_use]
pub fn fill<'a>(text: &str, options: impl Into<WrapOptions<'a>>) -> String { wrap(text, options).join("\n") }
