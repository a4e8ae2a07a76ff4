//! Utility helpers shared across integration tests.

use std::{fs, path::PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// A fresh `textkit` command.
pub fn textkit() -> Command { Command::cargo_bin("textkit").expect("failed to create textkit command") }

/// Write each `(name, bytes)` pair into a new temporary directory.
///
/// The directory must be kept alive for as long as the paths are used.
pub fn temp_files(files: &[(&str, &[u8])]) -> (TempDir, Vec<PathBuf>) {
    let dir = tempfile::tempdir().expect("failed to create temporary directory");
    let paths = files
        .iter()
        .map(|(name, bytes)| {
            let path = dir.path().join(name);
            fs::write(&path, bytes).expect("failed to write temporary file");
            path
        })
        .collect();
    (dir, paths)
}

/// Run `textkit` with `args`, feeding `stdin`, and return its stdout.
pub fn run_cli(args: &[&str], stdin: &[u8]) -> Vec<u8> {
    let output = textkit()
        .args(args)
        .write_stdin(stdin)
        .output()
        .expect("failed to run textkit");
    assert!(
        output.status.success(),
        "textkit {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    output.stdout
}

/// Assert that every line is no wider than `width` display columns.
pub fn assert_lines_fit(lines: &[String], width: usize) {
    for line in lines {
        let columns = textkit::display_width(line);
        assert!(
            usize::try_from(columns).is_ok_and(|c| c <= width),
            "{line:?} is {columns} columns wide, limit {width}"
        );
    }
}
