//! Integration tests for type error detection

use jac_ast::{Module, StatementKind};
use jac_checker::check;
use jac_diagnostics::Diagnostics;
use jac_parser::parse;

/// Parse and check, returning the checked module and all diagnostics
fn run(source: &str) -> (Module, Diagnostics) {
    let module = parse(source).expect("parse failed");
    let mut diagnostics = Diagnostics::new();
    let module = check(module, &mut diagnostics);
    (module, diagnostics)
}

/// Helper to collect error messages produced by the checker
fn check_source_errors(source: &str) -> Vec<String> {
    let (_, diagnostics) = run(source);
    diagnostics.errors().map(|d| d.message.clone()).collect()
}

/// Helper to check that checking succeeds without errors
fn check_source_ok(source: &str) {
    let errors = check_source_errors(source);
    assert!(errors.is_empty(), "Expected check to succeed, got errors: {:?}", errors);
}

// === Return Type Tests ===

#[test]
fn test_return_type_mismatch() {
    let source = r#"
fn name() -> int {
    return "not an int"
}
"#;
    let errors = check_source_errors(source);
    assert_eq!(errors, vec!["type mismatch: expected int, found str"]);
}

#[test]
fn test_correct_return_type() {
    let source = r#"
fn answer() -> int {
    return 42
}
"#;
    check_source_ok(source);
}

#[test]
fn test_int_widens_to_float() {
    let source = r#"
fn half(x: int) -> float {
    return x
}
"#;
    check_source_ok(source);
}

#[test]
fn test_bare_return_in_typed_function() {
    let source = r#"
fn value() -> str {
    return
}
"#;
    let errors = check_source_errors(source);
    assert_eq!(errors, vec!["type mismatch: expected str, found none"]);
}

// === Operator Tests ===

#[test]
fn test_add_int_int() {
    let source = r#"
fn add(a: int, b: int) -> int {
    return a + b
}
"#;
    check_source_ok(source);
}

#[test]
fn test_division_produces_float() {
    let source = r#"
fn ratio(a: int, b: int) -> int {
    return a / b
}
"#;
    let errors = check_source_errors(source);
    assert_eq!(errors, vec!["type mismatch: expected int, found float"]);
}

#[test]
fn test_string_concatenation_and_repetition() {
    let source = r#"
greeting = "hello" + " " + "world"
line = "-" * 10
print(greeting, line)
"#;
    check_source_ok(source);
}

#[test]
fn test_add_str_int_is_rejected() {
    let errors = check_source_errors("x = \"a\" + 1");
    assert_eq!(errors, vec!["unsupported operand types for '+': str and int"]);
}

#[test]
fn test_ordering_comparison_of_mixed_types() {
    let errors = check_source_errors("ok = 1 < \"two\"");
    assert_eq!(errors, vec!["unsupported operand types for '<': int and str"]);
}

#[test]
fn test_negating_a_string() {
    let errors = check_source_errors("x = -\"a\"");
    assert_eq!(errors, vec!["unsupported operand type for '-': str"]);
}

#[test]
fn test_undefined_name_does_not_cascade() {
    let errors = check_source_errors("x = missing + 1\ny = x * \"s\"");
    assert_eq!(errors, vec!["undefined name 'missing'"]);
}

// === Call Tests ===

#[test]
fn test_call_arity() {
    let source = r#"
fn add(a: int, b: int) -> int {
    return a + b
}
add(1)
"#;
    let errors = check_source_errors(source);
    assert_eq!(errors, vec!["'add' expects 2 argument(s), found 1"]);
}

#[test]
fn test_call_argument_type() {
    let source = r#"
fn shout(text: str) -> str {
    return text
}
shout(3)
"#;
    let errors = check_source_errors(source);
    assert_eq!(errors, vec!["type mismatch: expected str, found int"]);
}

#[test]
fn test_builtins() {
    let source = r#"
names = ["a", "b"]
count: int = len(names)
label: str = str(count)
total = int("3") + float(2)
for i in range(count) {
    print(i, label, total)
}
"#;
    check_source_ok(source);
}

#[test]
fn test_len_of_int() {
    let errors = check_source_errors("n = len(5)");
    assert_eq!(errors, vec!["type mismatch: expected str or list, found int"]);
}

#[test]
fn test_calling_a_non_function() {
    let errors = check_source_errors("x = 1\nx()");
    assert_eq!(errors, vec!["value of type int is not callable"]);
}

// === Annotation Tests ===

#[test]
fn test_annotated_assignment_mismatch() {
    let errors = check_source_errors("x: int = \"five\"");
    assert_eq!(errors, vec!["type mismatch: expected int, found str"]);
}

#[test]
fn test_annotation_sticks_to_variable() {
    let errors = check_source_errors("x: int = 1\nx = \"later\"");
    assert_eq!(errors, vec!["type mismatch: expected int, found str"]);
}

#[test]
fn test_unannotated_variable_may_change_type() {
    check_source_ok("x = 1\nx = \"later\"\nprint(x)");
}

#[test]
fn test_compound_assignment() {
    check_source_ok("total: float = 0.0\ntotal += 1\nprint(total)");
    let errors = check_source_errors("count: int = 0\ncount /= 2");
    assert_eq!(errors, vec!["type mismatch: expected int, found float"]);
}

// === Index and Iteration Tests ===

#[test]
fn test_index_with_string() {
    let errors = check_source_errors("xs = [1, 2]\nv = xs[\"0\"]\nprint(v)");
    assert_eq!(errors, vec!["type mismatch: expected int, found str"]);
}

#[test]
fn test_iterate_over_int() {
    let errors = check_source_errors("for i in 10 {\n    print(i)\n}");
    assert_eq!(errors, vec!["value of type int is not iterable"]);
}

#[test]
fn test_list_element_assignment() {
    let errors = check_source_errors("xs = [1, 2]\nxs[0] = \"one\"");
    assert_eq!(errors, vec!["type mismatch: expected int, found str"]);
}

// === Inference Tests ===

#[test]
fn test_inferred_types_are_recorded() {
    let (module, diagnostics) = run("xs = [1, 2.5]\nname = \"jac\"\nprint(xs, name)");
    assert!(!diagnostics.has_errors());
    let inferred: Vec<String> = module
        .statements
        .iter()
        .filter_map(|stmt| match &stmt.kind {
            StatementKind::Assign(assign) => assign
                .inferred
                .as_ref()
                .map(jac_ast::printer::render_type),
            _ => None,
        })
        .collect();
    assert_eq!(inferred, vec!["list[float]", "str"]);
}
