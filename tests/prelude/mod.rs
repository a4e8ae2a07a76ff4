//! Common imports for integration tests.
//!
//! Test files pull this in with `mod prelude; use prelude::*;`.
#![allow(unfulfilled_lint_expectations)]

#[expect(unused_imports, reason = "re-exporting common test utilities")]
pub use assert_cmd::{Command, prelude::*};
#[expect(unused_imports, reason = "re-exporting common test utilities")]
pub use predicates::prelude::*;
#[expect(unused_imports, reason = "re-exporting common test utilities")]
pub use rstest::rstest;

#[path = "../common/mod.rs"]
#[allow(dead_code, reason = "each test binary uses a subset")]
mod common;
#[expect(unused_imports, reason = "re-exporting common test utilities")]
pub use common::*;
