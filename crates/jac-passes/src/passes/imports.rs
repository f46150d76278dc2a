//! Import sorting pass
//!
//! Only the run of imports at the top of the module is touched. Plain
//! `import` lines come before `from` imports; within each group the order is
//! by path, then alias or imported names. Exact duplicates are dropped.

use std::cmp::Ordering;

use jac_ast::{ImportStmt, Module, Statement, StatementKind, Trivia};

use crate::{Pass, PassContext};

pub struct SortImports;

impl Pass for SortImports {
    fn name(&self) -> &'static str {
        "imports"
    }

    fn run(&self, mut module: Module, cx: &mut PassContext<'_>) -> Module {
        if !cx.style().sort_imports {
            return module;
        }

        let run_len = module
            .statements
            .iter()
            .take_while(|s| matches!(s.kind, StatementKind::Import(_)))
            .count();
        if run_len == 0 {
            return module;
        }

        let rest = module.statements.split_off(run_len);
        let mut imports = std::mem::take(&mut module.statements);

        // The file header stays at the top whichever import ends up first
        let header = std::mem::take(&mut imports[0].trivia.leading_comments);
        let header_blank_lines = imports[0].trivia.blank_lines_before;

        for stmt in &mut imports {
            if let StatementKind::Import(ImportStmt::From { names, .. }) = &mut stmt.kind {
                names.sort();
                names.dedup();
            }
            stmt.trivia.blank_lines_before = 0;
        }
        imports.sort_by(|a, b| compare(&a.kind, &b.kind));

        let mut sorted: Vec<Statement> = Vec::with_capacity(imports.len());
        for stmt in imports {
            match sorted.last_mut() {
                Some(prev) if prev.kind == stmt.kind => merge_trivia(&mut prev.trivia, stmt.trivia),
                _ => sorted.push(stmt),
            }
        }

        if let Some(first) = sorted.first_mut() {
            let mut leading = header;
            leading.append(&mut first.trivia.leading_comments);
            first.trivia.leading_comments = leading;
            first.trivia.blank_lines_before = header_blank_lines;
        }

        sorted.extend(rest);
        module.statements = sorted;
        module
    }
}

fn compare(a: &StatementKind, b: &StatementKind) -> Ordering {
    match (a, b) {
        (StatementKind::Import(a), StatementKind::Import(b)) => compare_imports(a, b),
        _ => Ordering::Equal,
    }
}

fn compare_imports(a: &ImportStmt, b: &ImportStmt) -> Ordering {
    match (a, b) {
        (
            ImportStmt::Module { path: pa, alias: aa },
            ImportStmt::Module { path: pb, alias: ab },
        ) => pa.cmp(pb).then_with(|| aa.cmp(ab)),
        (ImportStmt::From { path: pa, names: na }, ImportStmt::From { path: pb, names: nb }) => {
            pa.cmp(pb).then_with(|| na.cmp(nb))
        }
        (ImportStmt::Module { .. }, ImportStmt::From { .. }) => Ordering::Less,
        (ImportStmt::From { .. }, ImportStmt::Module { .. }) => Ordering::Greater,
    }
}

/// Keep the comments of a dropped duplicate on the surviving import
fn merge_trivia(kept: &mut Trivia, dropped: Trivia) {
    kept.leading_comments.extend(dropped.leading_comments);
    if kept.trailing_comment.is_none() {
        kept.trailing_comment = dropped.trailing_comment;
    } else if let Some(comment) = dropped.trailing_comment {
        kept.leading_comments.push(comment);
    }
}
