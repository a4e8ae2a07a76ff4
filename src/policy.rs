//! Policies that callers pass to select how lossy an operation may be.

use std::{fmt, str::FromStr};

/// What to do when bytes cannot become text, or text cannot become bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum ErrorPolicy {
    /// Fail with an error.
    Strict,
    /// Substitute U+FFFD when decoding and `?` when encoding.
    #[default]
    Replace,
    /// Drop the offending bytes or characters.
    Ignore,
}

/// What the dynamic converters do with a value that is neither text nor bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum NonTextPolicy {
    /// Produce an empty result.
    Empty,
    /// Hand the value back untouched.
    Passthrough,
    /// Use the value's own text rendering, falling back to its debug form.
    #[default]
    SimpleRepr,
    /// Use the value's debug representation.
    Repr,
    /// Fail with [`crate::Error::TypeMismatch`].
    Strict,
}

/// Treatment of control characters by the width and XML helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum ControlCharPolicy {
    /// Substitute `?` (XML) or assign the conventional width (display).
    #[default]
    Replace,
    /// Drop them (XML) or assign the conventional width (display).
    Ignore,
    /// Fail with [`crate::Error::ControlChar`].
    Strict,
}

/// Error returned when a policy name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown policy {0:?}")]
pub struct ParsePolicyError(String);

macro_rules! policy_names {
    ($ty:ty { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            /// Lowercase name accepted by [`FromStr`].
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }
        }

        impl FromStr for $ty {
            type Err = ParsePolicyError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($name => Ok(Self::$variant),)+
                    _ => Err(ParsePolicyError(s.to_string())),
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
        }
    };
}

policy_names!(ErrorPolicy {
    Strict => "strict",
    Replace => "replace",
    Ignore => "ignore",
});

policy_names!(NonTextPolicy {
    Empty => "empty",
    Passthrough => "passthrough",
    SimpleRepr => "simplerepr",
    Repr => "repr",
    Strict => "strict",
});

policy_names!(ControlCharPolicy {
    Replace => "replace",
    Ignore => "ignore",
    Strict => "strict",
});
