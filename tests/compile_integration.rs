//! End-to-end tests for compile on the fixture files

mod common;

use common::*;
use jac::diagnostics::Severity;
use jac::Program;

#[test]
fn test_stats_fixture_has_no_errors() {
    let report = jac::compile(fixture_path("stats.jac")).unwrap();
    assert!(!report.has_errors(), "{:#?}", report.errors);
}

#[test]
fn test_semantic_fixture_reports_each_error() {
    let report = jac::compile(fixture_path("semantic.jac")).unwrap();
    let messages: Vec<String> = report.errors.iter().map(|d| d.message.clone()).collect();
    assert_eq!(
        messages,
        vec![
            "undefined name 'missing'".to_string(),
            "type mismatch: expected str, found int".to_string(),
        ]
    );
}

#[test]
fn test_semantic_errors_do_not_block_formatting() {
    let output = jac::format(fixture_path("semantic.jac")).unwrap();
    assert!(!output.modified);
}

#[test]
fn test_broken_fixture_reports_syntax_errors() {
    let report = jac::compile(fixture_path("broken.jac")).unwrap();
    assert!(report.has_errors());
    assert!(report.errors.iter().all(|d| d.severity == Severity::Error));
    assert_eq!(report.errors[0].pass, "parse");

    let err = jac::format(fixture_path("broken.jac")).unwrap_err();
    assert!(matches!(err, jac::SessionError::FormatBlocked { .. }));
}

#[test]
fn test_compile_is_deterministic() {
    let source = load_fixture("semantic.jac");
    let first = Program::default().compile_source(&unit(&source));
    let second = Program::default().compile_source(&unit(&source));
    assert_eq!(first.errors, second.errors);
    assert_eq!(first.warnings, second.warnings);
}

#[test]
fn test_unclosed_function_is_one_syntax_error() {
    let report = Program::default().compile_source(&unit("fn a() {"));
    assert_eq!(report.errors.len(), 1);
    assert_eq!(
        report.errors[0].message,
        "unexpected token: expected '}', found end of file"
    );
}

#[test]
fn test_empty_source_is_clean() {
    let report = Program::default().compile_source(&unit(""));
    assert!(report.is_clean());
}

#[test]
fn test_batch_matches_single_runs() {
    let names = ["stats.jac", "semantic.jac", "broken.jac", "messy.jac"];
    let paths: Vec<_> = names.iter().map(|name| fixture_path(name)).collect();
    let batch = Program::default().with_jobs(3).compile_batch(&paths);
    for (path, result) in paths.iter().zip(batch) {
        let single = jac::compile(path).unwrap();
        let batched = result.unwrap();
        assert_eq!(batched.errors, single.errors);
        assert_eq!(batched.warnings, single.warnings);
    }
}
