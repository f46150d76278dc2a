//! Terminal rendering of diagnostics with ariadne

use std::io::{self, Write};
use std::path::Path;

use ariadne::{Color, Label, Report, ReportKind, Source};
use jac_diagnostics::{Diagnostic, Severity};

/// ariadne counts characters, spans count bytes
fn char_offset(source: &str, byte: usize) -> usize {
    let byte = byte.min(source.len());
    source
        .char_indices()
        .take_while(|(index, _)| *index < byte)
        .count()
}

fn kind_and_color(severity: Severity) -> (ReportKind<'static>, Color) {
    match severity {
        Severity::Fatal => (ReportKind::Custom("Fatal", Color::Red), Color::Red),
        Severity::Error => (ReportKind::Error, Color::Red),
        Severity::Warning => (ReportKind::Warning, Color::Yellow),
    }
}

/// Write one diagnostic as a source snippet report
pub fn write_diagnostic<W: Write>(
    out: W,
    path: &Path,
    source: &str,
    diagnostic: &Diagnostic,
    color: bool,
) -> io::Result<()> {
    let id = path.display().to_string();
    let start = char_offset(source, diagnostic.span.start);
    let end = char_offset(source, diagnostic.span.end).max(start);
    let (kind, label_color) = kind_and_color(diagnostic.severity);

    let mut report = Report::build(kind, id.clone(), start)
        .with_config(ariadne::Config::default().with_color(color))
        .with_message(&diagnostic.message)
        .with_label(
            Label::new((id.clone(), start..end))
                .with_message(&diagnostic.message)
                .with_color(label_color),
        );
    if let Some(note) = &diagnostic.note {
        report = report.with_note(note);
    }
    report.finish().write((id, Source::from(source)), out)
}

/// Print diagnostics to stderr
pub fn eprint_diagnostics(path: &Path, source: &str, diagnostics: &[Diagnostic]) {
    let color = std::env::var_os("NO_COLOR").is_none();
    let stderr = io::stderr();
    for diagnostic in diagnostics {
        if write_diagnostic(stderr.lock(), path, source, diagnostic, color).is_err() {
            eprintln!("{}: {}", path.display(), diagnostic);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jac_diagnostics::Span;

    fn render(source: &str, diagnostic: &Diagnostic) -> String {
        let mut out = Vec::new();
        write_diagnostic(&mut out, Path::new("main.jac"), source, diagnostic, false).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_char_offsets() {
        assert_eq!(char_offset("abc", 2), 2);
        assert_eq!(char_offset("é = 1", 3), 2);
        assert_eq!(char_offset("ab", 10), 2);
    }

    #[test]
    fn test_report_names_file_and_message() {
        let source = "print(y)\n";
        let diagnostic = Diagnostic::new(
            Severity::Error,
            "undefined name 'y'",
            Span::new(6, 7),
            "resolve",
        );
        let text = render(source, &diagnostic);
        assert!(text.contains("main.jac"), "{}", text);
        assert!(text.contains("undefined name 'y'"), "{}", text);
    }

    #[test]
    fn test_report_includes_note() {
        let source = "print(x)\nx = 1\n";
        let diagnostic = Diagnostic::new(
            Severity::Error,
            "undefined name 'x'",
            Span::new(6, 7),
            "resolve",
        )
        .with_note("'x' is assigned later in the module");
        let text = render(source, &diagnostic);
        assert!(text.contains("assigned later"), "{}", text);
    }

    #[test]
    fn test_report_at_end_of_file() {
        let source = "fn a() {";
        let diagnostic = Diagnostic::new(
            Severity::Error,
            "unexpected token: expected '}', found end of file",
            Span::new(8, 8),
            "parse",
        );
        assert!(render(source, &diagnostic).contains("end of file"));
    }
}
