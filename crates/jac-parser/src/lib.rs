//! Jac Parser - Recursive descent parser with local error recovery
//!
//! Parses Jac source code into an AST. Parsing never gives up on the first
//! error: a failed statement becomes an `Error` node and parsing continues at
//! the next statement boundary, so one run reports every independent
//! syntax error.

mod error;
mod parser;

pub use error::*;
pub use parser::*;

use jac_ast::Module;
use jac_diagnostics::{Diagnostics, Severity};
use jac_lexer::tokenize;

/// Pass name under which syntax errors are recorded
pub const PASS_NAME: &str = "parse";

/// A possibly partial module and the syntax errors found while building it
#[derive(Debug)]
pub struct Parsed {
    pub module: Module,
    pub errors: Vec<ParseError>,
}

impl Parsed {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parse a source string, keeping the partial tree when there are errors
pub fn parse_with_recovery(source: &str) -> Parsed {
    let tokens = tokenize(source);
    let mut parser = Parser::new(source, tokens);
    let module = parser.parse_module();
    Parsed {
        module,
        errors: parser.finish(),
    }
}

/// Parse a source string into a Module AST
pub fn parse(source: &str) -> Result<Module, Vec<ParseError>> {
    let parsed = parse_with_recovery(source);
    if parsed.errors.is_empty() {
        Ok(parsed.module)
    } else {
        Err(parsed.errors)
    }
}

/// Parse and record syntax errors into a session's diagnostics
pub fn parse_into(source: &str, diagnostics: &mut Diagnostics) -> Module {
    let Parsed { module, errors } = parse_with_recovery(source);
    for error in errors {
        let severity = if error.is_fatal() {
            Severity::Fatal
        } else {
            Severity::Error
        };
        diagnostics.record(severity, error.to_string(), error.span(), PASS_NAME);
    }
    module
}

#[cfg(test)]
mod tests {
    use super::*;
    use jac_ast::*;

    fn parse_ok(source: &str) -> Module {
        match parse(source) {
            Ok(module) => module,
            Err(errors) => panic!("Failed to parse {:?}: {:?}", source, errors),
        }
    }

    fn kinds(module: &Module) -> Vec<&StatementKind> {
        module.statements.iter().map(|s| &s.kind).collect()
    }

    #[test]
    fn test_parse_empty() {
        let module = parse_ok("");
        assert!(module.is_empty());
    }

    #[test]
    fn test_parse_assignment() {
        let module = parse_ok("x = 1+1");
        assert_eq!(module.statements.len(), 1);
        match &module.statements[0].kind {
            StatementKind::Assign(assign) => {
                assert!(assign.op.is_none());
                assert!(matches!(assign.target.kind, ExprKind::Ident(ref n) if n == "x"));
                assert!(matches!(
                    assign.value.kind,
                    ExprKind::Binary { op: BinaryOp::Add, .. }
                ));
            }
            other => panic!("expected assignment, got {:?}", other),
        }
        assert_eq!(module.statements[0].span, Span::new(0, 7));
    }

    #[test]
    fn test_parse_annotated_and_compound_assignment() {
        let module = parse_ok("total: int = 0\ntotal += 2\nitems[0] -= 1");
        let stmts = kinds(&module);
        assert!(matches!(stmts[0], StatementKind::Assign(a) if a.annotation.is_some()));
        assert!(matches!(stmts[1], StatementKind::Assign(a) if a.op == Some(BinaryOp::Add)));
        assert!(matches!(stmts[2], StatementKind::Assign(a) if a.op == Some(BinaryOp::Sub)));
    }

    #[test]
    fn test_parse_function() {
        let source = r#"
fn add(a: int, b: int) -> int {
    return a + b
}
"#;
        let module = parse_ok(source);
        let func = module.functions().next().expect("function");
        assert_eq!(func.name, "add");
        assert_eq!(func.params.len(), 2);
        assert_eq!(func.params[1].ty.as_ref().map(|t| t.name.as_str()), Some("int"));
        assert_eq!(func.return_type.as_ref().map(|t| t.name.as_str()), Some("int"));
        assert_eq!(func.body.statements.len(), 1);
    }

    #[test]
    fn test_parse_generic_type() {
        let module = parse_ok("fn f(xs: list[list[int]]) -> none {}");
        let func = module.functions().next().expect("function");
        let ty = func.params[0].ty.as_ref().expect("type");
        assert_eq!(ty.name, "list");
        assert_eq!(ty.arg.as_ref().map(|t| t.name.as_str()), Some("list"));
        assert_eq!(func.return_type.as_ref().map(|t| t.name.as_str()), Some("none"));
    }

    #[test]
    fn test_parse_imports() {
        let module = parse_ok("import os.path as p\nfrom utils import a, b");
        let imports: Vec<_> = module.imports().collect();
        assert_eq!(imports.len(), 2);
        assert_eq!(imports[0].path(), ["os", "path"]);
        assert_eq!(imports[0].bound_names(), vec!["p"]);
        assert_eq!(imports[1].bound_names(), vec!["a", "b"]);
    }

    #[test]
    fn test_parse_control_flow() {
        let source = r#"
fn run(n: int) {
    for i in range(n) {
        if i == 2 {
            continue
        } elif i > 5 {
            break
        }
        else {
            print(i)
        }
    }
    while n > 0 {
        n -= 1
    }
}
"#;
        let module = parse_ok(source);
        let func = module.functions().next().expect("function");
        let StatementKind::For { body, .. } = &func.body.statements[0].kind else {
            panic!("expected for loop");
        };
        let StatementKind::If { branches, else_branch } = &body.statements[0].kind else {
            panic!("expected if");
        };
        assert_eq!(branches.len(), 2);
        assert!(else_branch.is_some());
        assert!(matches!(func.body.statements[1].kind, StatementKind::While { .. }));
    }

    #[test]
    fn test_precedence() {
        let module = parse_ok("x = 1 + 2 * 3 == 7 and not false");
        let StatementKind::Assign(assign) = &module.statements[0].kind else {
            panic!("expected assignment");
        };
        let ExprKind::Binary { op, left, .. } = &assign.value.kind else {
            panic!("expected binary");
        };
        assert_eq!(*op, BinaryOp::And);
        assert!(matches!(left.kind, ExprKind::Binary { op: BinaryOp::Eq, .. }));
    }

    #[test]
    fn test_newline_terminates_statement() {
        let module = parse_ok("a = 1\n-b");
        assert_eq!(module.statements.len(), 2);
        assert!(matches!(module.statements[1].kind, StatementKind::Expr(_)));
    }

    #[test]
    fn test_newline_inside_brackets_continues() {
        let module = parse_ok("print(\n    1,\n    2,\n)\nxs = [\n  1, 2\n]");
        assert_eq!(module.statements.len(), 2);
    }

    #[test]
    fn test_semicolons_separate_statements() {
        let module = parse_ok("a = 1; b = 2;;");
        assert_eq!(module.statements.len(), 2);
    }

    #[test]
    fn test_string_escapes() {
        let module = parse_ok(r#"s = 'it\'s\n'"#);
        let StatementKind::Assign(assign) = &module.statements[0].kind else {
            panic!("expected assignment");
        };
        assert!(matches!(&assign.value.kind, ExprKind::Literal(Literal::Str(s)) if s == "it's\n"));
    }

    #[test]
    fn test_comments_attach_to_statements() {
        let source = "# header\nx = 1  # trailing\n\n\n# about y\ny = 2\n# end\n";
        let module = parse_ok(source);
        assert_eq!(module.statements[0].trivia.leading_comments, vec!["# header"]);
        assert_eq!(
            module.statements[0].trivia.trailing_comment.as_deref(),
            Some("# trailing")
        );
        assert_eq!(module.statements[1].trivia.leading_comments, vec!["# about y"]);
        assert_eq!(module.statements[1].trivia.blank_lines_before, 2);
        assert_eq!(module.dangling_comments, vec!["# end"]);
    }

    #[test]
    fn test_comments_inside_brackets_lead_their_statement() {
        let module = parse_ok("# list\nx = [\n  1, # one\n  2, # two\n]\nprint(1, # a\n  2)\n");
        assert_eq!(
            module.statements[0].trivia.leading_comments,
            vec!["# list", "# one", "# two"]
        );
        assert_eq!(module.statements[0].trivia.trailing_comment, None);
        assert_eq!(module.statements[1].trivia.leading_comments, vec!["# a"]);
        assert!(module.dangling_comments.is_empty());
    }

    #[test]
    fn test_block_dangling_comment() {
        let module = parse_ok("fn f() {\n    # nothing yet\n}");
        let func = module.functions().next().expect("function");
        assert!(func.body.statements.is_empty());
        assert_eq!(func.body.dangling_comments, vec!["# nothing yet"]);
    }

    #[test]
    fn test_missing_close_brace_is_one_error() {
        let errors = parse("fn a() {").unwrap_err();
        assert_eq!(errors.len(), 1, "{:?}", errors);
        assert_eq!(
            errors[0].to_string(),
            "unexpected token: expected '}', found end of file"
        );
    }

    #[test]
    fn test_recovery_reports_independent_errors() {
        let source = "x = (1 +\ny = 2\nz = ]\nw = 3";
        let parsed = parse_with_recovery(source);
        assert_eq!(parsed.errors.len(), 2, "{:?}", parsed.errors);
        let kinds = kinds(&parsed.module);
        assert!(matches!(kinds[0], StatementKind::Error));
        assert!(matches!(kinds.last(), Some(StatementKind::Assign(_))));
    }

    #[test]
    fn test_recovery_inside_block() {
        let source = "fn f() {\n    x = = 1\n    return 2\n}\ny = 1";
        let parsed = parse_with_recovery(source);
        assert_eq!(parsed.errors.len(), 1, "{:?}", parsed.errors);
        let func = parsed.module.functions().next().expect("function");
        assert!(func.body.statements[0].is_error());
        assert!(matches!(func.body.statements[1].kind, StatementKind::Return(Some(_))));
        assert_eq!(parsed.module.statements.len(), 2);
    }

    #[test]
    fn test_unmatched_close_brace() {
        let parsed = parse_with_recovery("x = 1\n}\ny = 2");
        assert!(matches!(parsed.errors[..], [ParseError::UnmatchedBrace { .. }]));
        assert_eq!(parsed.module.statements.len(), 2);
    }

    #[test]
    fn test_invalid_character_reported_once() {
        let parsed = parse_with_recovery("x = 1 @ 2\ny = 3");
        assert_eq!(parsed.errors.len(), 1, "{:?}", parsed.errors);
        assert!(matches!(parsed.errors[0], ParseError::InvalidCharacter { .. }));
    }

    #[test]
    fn test_unterminated_string() {
        let parsed = parse_with_recovery("s = \"abc\ny = 1");
        assert_eq!(parsed.errors.len(), 1, "{:?}", parsed.errors);
        assert!(matches!(parsed.errors[0], ParseError::UnterminatedString { .. }));
        assert_eq!(parsed.module.statements.len(), 2);
    }

    #[test]
    fn test_invalid_assignment_target() {
        let parsed = parse_with_recovery("f() = 3");
        assert!(matches!(
            parsed.errors[..],
            [ParseError::InvalidAssignmentTarget { .. }]
        ));
    }

    #[test]
    fn test_misplaced_function() {
        let parsed = parse_with_recovery("fn outer() {\n    fn inner() {}\n}");
        assert_eq!(parsed.errors.len(), 1);
        assert!(matches!(parsed.errors[0], ParseError::MisplacedDeclaration { .. }));
    }

    #[test]
    fn test_integer_overflow() {
        let parsed = parse_with_recovery("x = 99999999999999999999");
        assert!(matches!(parsed.errors[..], [ParseError::InvalidLiteral { .. }]));
    }

    #[test]
    fn test_nesting_limit_is_fatal() {
        let depth = MAX_NESTING + 10;
        let source = format!("x = {}1{}", "(".repeat(depth), ")".repeat(depth));
        let parsed = parse_with_recovery(&source);
        assert_eq!(parsed.errors.len(), 1);
        assert!(parsed.errors[0].is_fatal());
    }

    #[test]
    fn test_long_operator_chain_is_fatal() {
        let source = format!("x = {}1\n", "1 + ".repeat(20_000));
        let parsed = parse_with_recovery(&source);
        assert_eq!(parsed.errors.len(), 1, "{:?}", parsed.errors);
        assert!(matches!(
            parsed.errors[0],
            ParseError::NestingTooDeep { limit: MAX_EXPR_HEIGHT, .. }
        ));
        assert!(parsed.errors[0].is_fatal());
    }

    #[test]
    fn test_long_postfix_chain_is_fatal() {
        for link in [".a", "()", "[0]"] {
            let source = format!("x = y{}\n", link.repeat(20_000));
            let parsed = parse_with_recovery(&source);
            assert_eq!(parsed.errors.len(), 1, "{}: {:?}", link, parsed.errors);
            assert!(parsed.errors[0].is_fatal());
        }
    }

    #[test]
    fn test_chain_within_height_limit_parses() {
        let source = format!("x = {}1\n", "1 + ".repeat(MAX_EXPR_HEIGHT - 1));
        let parsed = parse_with_recovery(&source);
        assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);

        let source = format!("x = {}1\n", "1 + ".repeat(MAX_EXPR_HEIGHT));
        assert!(parse_with_recovery(&source).errors[0].is_fatal());
    }

    #[test]
    fn test_parse_into_records_diagnostics() {
        let mut diagnostics = Diagnostics::new();
        let module = parse_into("fn a() {", &mut diagnostics);
        assert_eq!(module.statements.len(), 1);
        assert_eq!(diagnostics.error_count(), 1);
        assert_eq!(diagnostics.all()[0].pass, PASS_NAME);
        assert!(!diagnostics.has_fatal());
    }

    #[test]
    fn test_errors_sorted_by_position() {
        let parsed = parse_with_recovery("a = )\nb = \"x\\q\"\nc = ]");
        let starts: Vec<_> = parsed.errors.iter().map(|e| e.span().start).collect();
        let mut sorted = starts.clone();
        sorted.sort();
        assert_eq!(starts, sorted);
        assert_eq!(parsed.errors.len(), 3, "{:?}", parsed.errors);
    }
}
