//! Tests for the check and format commands on real files

use std::fs;
use std::path::PathBuf;

use jac_cli::files::collect_inputs;
use jac_cli::{build_program, check_files, format_files};
use jac_compiler::Program;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, text: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn test_check_counts_errors_across_files() {
    let dir = TempDir::new().unwrap();
    let paths = vec![
        write(&dir, "good.jac", "x = 1\nprint(x)\n"),
        write(&dir, "bad.jac", "print(nope)\nprint(\"a\" - 1)\n"),
    ];
    let summary = check_files(&Program::default(), &paths, false);
    assert_eq!(summary.files_checked, 2);
    assert_eq!(summary.errors, 2);
    assert!(!summary.passed());
}

#[test]
fn test_check_passes_with_warnings_only() {
    let dir = TempDir::new().unwrap();
    let paths = vec![write(&dir, "warn.jac", "import os\n")];
    let summary = check_files(&Program::default(), &paths, false);
    assert!(summary.passed());
    assert_eq!(summary.warnings, 1);
}

#[test]
fn test_unreadable_file_counts_as_error() {
    let dir = TempDir::new().unwrap();
    let paths = vec![dir.path().join("missing.jac")];
    let summary = check_files(&Program::default(), &paths, true);
    assert_eq!(summary.files_checked, 1);
    assert_eq!(summary.errors, 1);
}

#[test]
fn test_format_rewrites_only_modified_files() {
    let dir = TempDir::new().unwrap();
    let messy = write(&dir, "messy.jac", "x=1+2\n");
    let tidy = write(&dir, "tidy.jac", "y = 2\n");

    let summary = format_files(&Program::default(), &[messy.clone(), tidy.clone()], false);
    assert_eq!(summary.modified, vec![messy.clone()]);
    assert_eq!(summary.failed, 0);
    assert_eq!(fs::read_to_string(&messy).unwrap(), "x = 1 + 2\n");
    assert_eq!(fs::read_to_string(&tidy).unwrap(), "y = 2\n");
}

#[test]
fn test_format_check_leaves_files_alone() {
    let dir = TempDir::new().unwrap();
    let messy = write(&dir, "messy.jac", "x=1\n");

    let summary = format_files(&Program::default(), &[messy.clone()], true);
    assert_eq!(summary.modified, vec![messy.clone()]);
    assert_eq!(fs::read_to_string(&messy).unwrap(), "x=1\n");
}

#[test]
fn test_format_blocked_file_is_untouched() {
    let dir = TempDir::new().unwrap();
    let broken = write(&dir, "broken.jac", "fn a() {");

    let summary = format_files(&Program::default(), &[broken.clone()], false);
    assert!(summary.modified.is_empty());
    assert_eq!(summary.failed, 1);
    assert_eq!(fs::read_to_string(&broken).unwrap(), "fn a() {");
}

#[test]
fn test_config_file_drives_formatting() {
    let dir = TempDir::new().unwrap();
    let config = write(&dir, "jacfmt.toml", "indent_width = 2\n");
    let file = write(&dir, "f.jac", "fn f() {\n    return 1\n}\n");

    let program = build_program(Some(&config), Some(2)).unwrap();
    assert_eq!(program.jobs(), 2);
    format_files(&program, &[file.clone()], false);
    assert_eq!(fs::read_to_string(&file).unwrap(), "fn f() {\n  return 1\n}\n");
}

#[test]
fn test_invalid_config_is_reported() {
    let dir = TempDir::new().unwrap();
    let config = write(&dir, "jacfmt.toml", "tabs = true\n");
    assert!(build_program(Some(&config), None).is_err());
}

#[test]
fn test_directory_inputs() {
    let dir = TempDir::new().unwrap();
    write(&dir, "a.jac", "a=1\n");
    write(&dir, "readme.md", "a=1\n");

    let files = collect_inputs(&[dir.path().to_path_buf()]);
    let summary = format_files(&Program::default(), &files, true);
    assert_eq!(summary.files, 1);
    assert_eq!(summary.modified.len(), 1);
}
