//! Recursive descent parser implementation
//!
//! Statement parsers return `Result`; the statement loop is the only place
//! errors are caught. There the error is recorded, an `Error` statement is
//! left in the tree and the token stream is resynchronized at the next
//! statement boundary.

use jac_ast::*;
use jac_lexer::{Token, TokenKind};

use crate::ParseError;

/// Maximum depth of nested blocks and expressions
pub const MAX_NESTING: usize = 128;

/// Maximum height of one expression tree. Every operator or postfix link
/// adds a level, so long flat chains are bounded too.
pub const MAX_EXPR_HEIGHT: usize = 2 * MAX_NESTING;

pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    comments: Vec<Token>,
    comment_taken: Vec<bool>,
    next_comment: usize,
    /// Open `(` / `[` around the current position; newlines inside do not
    /// end statements
    nesting: usize,
    depth: usize,
    /// Height of the expression most recently built
    expr_height: usize,
    aborted: bool,
    errors: Vec<ParseError>,
    lexical_error_spans: Vec<Span>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, all_tokens: Vec<Token>) -> Self {
        let mut tokens = Vec::with_capacity(all_tokens.len());
        let mut comments = Vec::new();
        let mut errors = Vec::new();
        let mut lexical_error_spans = Vec::new();

        for token in all_tokens {
            match token.kind {
                TokenKind::Comment => comments.push(token),
                TokenKind::Error => {
                    errors.push(ParseError::InvalidCharacter {
                        text: token.text(source).to_string(),
                        span: token.span,
                    });
                    lexical_error_spans.push(token.span);
                    tokens.push(token);
                }
                TokenKind::UnterminatedString => {
                    errors.push(ParseError::UnterminatedString { span: token.span });
                    tokens.push(token);
                }
                _ => tokens.push(token),
            }
        }

        let comment_taken = vec![false; comments.len()];
        Self {
            source,
            tokens,
            pos: 0,
            comments,
            comment_taken,
            next_comment: 0,
            nesting: 0,
            depth: 0,
            expr_height: 0,
            aborted: false,
            errors,
            lexical_error_spans,
        }
    }

    /// Errors recorded so far, ordered by source position
    pub fn finish(mut self) -> Vec<ParseError> {
        self.errors.sort_by_key(|e| e.span().start);
        self.errors
    }

    // === Utilities ===

    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or_else(|| {
            // tokenize always appends an EOF token
            &self.tokens[self.tokens.len() - 1]
        })
    }

    fn peek(&self) -> TokenKind {
        self.current().kind
    }

    fn advance(&mut self) -> &Token {
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
            &self.tokens[self.pos - 1]
        } else {
            &self.tokens[self.pos]
        }
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek() == kind
    }

    fn at_any(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.peek())
    }

    fn consume(&mut self, kind: TokenKind) -> Result<&Token, ParseError> {
        if self.at(kind) {
            Ok(self.advance())
        } else {
            Err(ParseError::unexpected(
                kind.describe(),
                self.peek(),
                self.current().span,
            ))
        }
    }

    fn consume_ident(&mut self, what: &str) -> Result<(String, Span), ParseError> {
        if self.at(TokenKind::Ident) {
            let source = self.source;
            let token = self.advance();
            Ok((token.text(source).to_string(), token.span))
        } else {
            Err(ParseError::unexpected(what, self.peek(), self.current().span))
        }
    }

    fn span(&self) -> Span {
        self.current().span
    }

    /// Span of the most recently consumed token
    fn prev_span(&self) -> Span {
        if self.pos == 0 {
            Span::new(0, 0)
        } else {
            self.tokens[self.pos - 1].span
        }
    }

    /// True when the current token starts a new line outside brackets
    fn line_break(&self) -> bool {
        self.nesting == 0 && self.current().on_new_line()
    }

    fn at_statement_end(&self) -> bool {
        self.line_break() || self.at_any(&[TokenKind::Semicolon, TokenKind::RBrace, TokenKind::Eof])
    }

    fn report(&mut self, error: ParseError) {
        let span = error.span();
        if self.lexical_error_spans.contains(&span) {
            return;
        }
        if self.errors.last().map(|e| e.span()) == Some(span) {
            return;
        }
        self.errors.push(error);
    }

    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_NESTING {
            return Err(ParseError::NestingTooDeep {
                limit: MAX_NESTING,
                span: self.span(),
            });
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Record the height of the expression about to be built
    fn grow(&mut self, height: usize, span: Span) -> Result<(), ParseError> {
        if height > MAX_EXPR_HEIGHT {
            return Err(ParseError::NestingTooDeep {
                limit: MAX_EXPR_HEIGHT,
                span,
            });
        }
        self.expr_height = height;
        Ok(())
    }

    fn in_brackets<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        self.nesting += 1;
        let result = f(self);
        self.nesting -= 1;
        result
    }

    // === Comments ===

    fn take_comments_before(&mut self, offset: usize) -> Vec<Token> {
        let mut taken = Vec::new();
        let mut i = self.next_comment;
        while i < self.comments.len() && self.comments[i].span.start < offset {
            if !self.comment_taken[i] {
                self.comment_taken[i] = true;
                taken.push(self.comments[i].clone());
            }
            i += 1;
        }
        while self.next_comment < self.comments.len() && self.comment_taken[self.next_comment] {
            self.next_comment += 1;
        }
        taken
    }

    /// A comment on the same line right after `end`, with no code between
    fn take_trailing_comment(&mut self, end: usize) -> Option<String> {
        let next_code = self.current().span.start;
        let index = (self.next_comment..self.comments.len())
            .find(|&i| !self.comment_taken[i] && self.comments[i].span.start >= end)?;
        let comment = &self.comments[index];
        if comment.span.start > next_code && self.peek() != TokenKind::Eof {
            return None;
        }
        if self.source[end..comment.span.start].contains('\n') {
            return None;
        }
        self.comment_taken[index] = true;
        Some(comment.text(self.source).trim_end().to_string())
    }

    fn comment_texts(&self, comments: &[Token]) -> Vec<String> {
        comments
            .iter()
            .map(|c| c.text(self.source).trim_end().to_string())
            .collect()
    }

    // === Module ===

    pub fn parse_module(&mut self) -> Module {
        let mut statements = Vec::new();

        while !self.at(TokenKind::Eof) && !self.aborted {
            if self.at(TokenKind::RBrace) {
                let span = self.span();
                self.report(ParseError::UnmatchedBrace { span });
                self.advance();
                continue;
            }
            if self.at(TokenKind::Semicolon) {
                self.advance();
                continue;
            }
            statements.push(self.parse_statement_recovering(true));
        }

        let dangling = self.take_comments_before(self.source.len() + 1);
        Module {
            statements,
            dangling_comments: self.comment_texts(&dangling),
            span: Span::new(0, self.source.len()),
        }
    }

    // === Statements ===

    fn parse_statement_recovering(&mut self, top_level: bool) -> Statement {
        let leading = self.take_comments_before(self.span().start);
        let first_newlines = leading
            .first()
            .map(|c| c.newlines_before)
            .unwrap_or(self.current().newlines_before);
        let start_pos = self.pos;
        let start = self.span();
        let saved_depth = self.depth;

        let mut stmt = match self.parse_statement(top_level) {
            Ok(stmt) if self.aborted => stmt,
            Ok(stmt) => {
                if let Err(error) = self.expect_statement_end() {
                    self.report(error);
                    self.synchronize(start_pos);
                }
                stmt
            }
            Err(error) => {
                let fatal = error.is_fatal();
                self.report(error);
                self.depth = saved_depth;
                self.nesting = 0;
                if fatal {
                    self.aborted = true;
                } else {
                    self.synchronize(start_pos);
                }
                Statement::new(StatementKind::Error, start.merge(self.prev_span()))
            }
        };

        let mut comments = self.comment_texts(&leading);
        if !self.aborted {
            // Comments between the brackets of a multi-line statement move
            // above it
            let inner = self.take_comments_before(stmt.span.end);
            comments.extend(self.comment_texts(&inner));
        }
        stmt.trivia.leading_comments = comments;
        stmt.trivia.blank_lines_before = first_newlines.saturating_sub(1);
        if !self.aborted {
            stmt.trivia.trailing_comment = self.take_trailing_comment(stmt.span.end);
        }
        stmt
    }

    fn expect_statement_end(&mut self) -> Result<(), ParseError> {
        if self.at(TokenKind::Semicolon) {
            while self.at(TokenKind::Semicolon) {
                self.advance();
            }
            return Ok(());
        }
        if self.at_statement_end() {
            return Ok(());
        }
        Err(ParseError::unexpected(
            "newline or ';'",
            self.peek(),
            self.span(),
        ))
    }

    /// Skip to the next statement boundary: a new line or `;` at bracket
    /// depth zero, the `}` closing the current block, or end of input.
    fn synchronize(&mut self, start_pos: usize) {
        self.nesting = 0;
        if self.pos > start_pos
            && (self.current().on_new_line() || self.peek().starts_statement())
        {
            return;
        }

        let mut depth = 0usize;
        loop {
            match self.peek() {
                TokenKind::Eof => return,
                TokenKind::RBrace if depth == 0 => return,
                TokenKind::Semicolon if depth == 0 => {
                    self.advance();
                    return;
                }
                TokenKind::LBrace | TokenKind::LParen | TokenKind::LBracket => depth += 1,
                TokenKind::RBrace | TokenKind::RParen | TokenKind::RBracket => {
                    depth = depth.saturating_sub(1)
                }
                _ => {}
            }
            self.advance();
            if depth == 0 && self.current().on_new_line() {
                return;
            }
        }
    }

    fn parse_statement(&mut self, top_level: bool) -> Result<Statement, ParseError> {
        let start = self.span();

        let kind = match self.peek() {
            TokenKind::Import | TokenKind::From => {
                let import = self.parse_import()?;
                if !top_level {
                    self.report(ParseError::MisplacedDeclaration {
                        what: "imports",
                        span: start.merge(self.prev_span()),
                    });
                    StatementKind::Error
                } else {
                    StatementKind::Import(import)
                }
            }
            TokenKind::Fn => {
                let func = self.parse_function()?;
                if !top_level {
                    self.report(ParseError::MisplacedDeclaration {
                        what: "function declarations",
                        span: start.merge(func.name_span),
                    });
                    StatementKind::Error
                } else {
                    StatementKind::Function(func)
                }
            }
            TokenKind::Return => {
                self.advance();
                if self.at_statement_end() {
                    StatementKind::Return(None)
                } else {
                    StatementKind::Return(Some(self.parse_expr()?))
                }
            }
            TokenKind::Break => {
                self.advance();
                StatementKind::Break
            }
            TokenKind::Continue => {
                self.advance();
                StatementKind::Continue
            }
            TokenKind::If => self.parse_if()?,
            TokenKind::While => {
                self.advance();
                let condition = self.parse_expr()?;
                let body = self.parse_block()?;
                StatementKind::While { condition, body }
            }
            TokenKind::For => {
                self.advance();
                let (binding, binding_span) = self.consume_ident("loop variable")?;
                self.consume(TokenKind::In)?;
                let iterable = self.parse_expr()?;
                let body = self.parse_block()?;
                StatementKind::For {
                    binding,
                    binding_span,
                    iterable,
                    body,
                }
            }
            _ => self.parse_expr_or_assign()?,
        };

        Ok(Statement::new(kind, start.merge(self.prev_span())))
    }

    fn parse_import(&mut self) -> Result<ImportStmt, ParseError> {
        if self.at(TokenKind::From) {
            self.advance();
            let path = self.parse_path()?;
            self.consume(TokenKind::Import)?;
            let mut names = vec![self.consume_ident("imported name")?.0];
            while self.at(TokenKind::Comma) && !self.line_break() {
                self.advance();
                names.push(self.consume_ident("imported name")?.0);
            }
            return Ok(ImportStmt::From { path, names });
        }

        self.consume(TokenKind::Import)?;
        let path = self.parse_path()?;
        let alias = if self.at(TokenKind::As) && !self.line_break() {
            self.advance();
            Some(self.consume_ident("alias")?.0)
        } else {
            None
        };
        Ok(ImportStmt::Module { path, alias })
    }

    fn parse_path(&mut self) -> Result<Vec<String>, ParseError> {
        let mut path = vec![self.consume_ident("module path")?.0];
        while self.at(TokenKind::Dot) && !self.line_break() {
            self.advance();
            path.push(self.consume_ident("module path segment")?.0);
        }
        Ok(path)
    }

    fn parse_function(&mut self) -> Result<FunctionDecl, ParseError> {
        self.consume(TokenKind::Fn)?;
        let (name, name_span) = self.consume_ident("function name")?;
        self.consume(TokenKind::LParen)?;
        let params = self.in_brackets(|p| p.parse_params())?;
        self.consume(TokenKind::RParen)?;

        let return_type = if self.at(TokenKind::Arrow) {
            self.advance();
            Some(self.parse_type()?)
        } else {
            None
        };

        let body = self.parse_block()?;
        Ok(FunctionDecl {
            name,
            params,
            return_type,
            body,
            name_span,
        })
    }

    fn parse_params(&mut self) -> Result<Vec<Parameter>, ParseError> {
        let mut params = Vec::new();
        while !self.at(TokenKind::RParen) {
            let (name, span) = self.consume_ident("parameter name")?;
            let ty = if self.at(TokenKind::Colon) {
                self.advance();
                Some(self.parse_type()?)
            } else {
                None
            };
            params.push(Parameter {
                name,
                ty,
                span: span.merge(self.prev_span()),
            });

            if self.at(TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        Ok(params)
    }

    fn parse_type(&mut self) -> Result<TypeExpr, ParseError> {
        self.nested(|p| {
            let start = p.span();
            let name = match p.peek() {
                TokenKind::Ident => {
                    let source = p.source;
                    p.advance().text(source).to_string()
                }
                TokenKind::None => {
                    p.advance();
                    "none".to_string()
                }
                found => return Err(ParseError::unexpected("type", found, start)),
            };

            if p.at(TokenKind::LBracket) && !p.line_break() {
                p.advance();
                let arg = p.in_brackets(|p| p.parse_type())?;
                p.consume(TokenKind::RBracket)?;
                Ok(TypeExpr::with_arg(name, arg, start.merge(p.prev_span())))
            } else {
                Ok(TypeExpr::named(name, start))
            }
        })
    }

    fn parse_block(&mut self) -> Result<Block, ParseError> {
        self.nested(|p| {
            let start = p.span();
            p.consume(TokenKind::LBrace)?;
            let saved_nesting = std::mem::replace(&mut p.nesting, 0);

            let mut statements = Vec::new();
            while !p.at(TokenKind::RBrace) && !p.at(TokenKind::Eof) && !p.aborted {
                if p.at(TokenKind::Semicolon) {
                    p.advance();
                    continue;
                }
                statements.push(p.parse_statement_recovering(false));
            }

            let dangling = p.take_comments_before(p.span().start);
            if p.at(TokenKind::RBrace) {
                p.advance();
            } else if !p.aborted {
                let error = ParseError::unexpected("'}'", p.peek(), p.span());
                p.report(error);
            }
            p.nesting = saved_nesting;

            Ok(Block {
                statements,
                dangling_comments: p.comment_texts(&dangling),
                span: start.merge(p.prev_span()),
            })
        })
    }

    fn parse_if(&mut self) -> Result<StatementKind, ParseError> {
        let mut branches = Vec::new();

        let start = self.span();
        self.consume(TokenKind::If)?;
        let condition = self.parse_expr()?;
        let body = self.parse_block()?;
        branches.push(CondBranch {
            condition,
            body,
            span: start.merge(self.prev_span()),
        });

        while self.at(TokenKind::Elif) {
            let start = self.span();
            self.advance();
            let condition = self.parse_expr()?;
            let body = self.parse_block()?;
            branches.push(CondBranch {
                condition,
                body,
                span: start.merge(self.prev_span()),
            });
        }

        let else_branch = if self.at(TokenKind::Else) {
            self.advance();
            Some(self.parse_block()?)
        } else {
            None
        };

        Ok(StatementKind::If {
            branches,
            else_branch,
        })
    }

    fn parse_expr_or_assign(&mut self) -> Result<StatementKind, ParseError> {
        let target = self.parse_expr()?;

        if self.at(TokenKind::Colon) && !self.line_break() {
            if !matches!(target.kind, ExprKind::Ident(_)) {
                return Err(ParseError::InvalidAssignmentTarget { span: target.span });
            }
            self.advance();
            let annotation = self.parse_type()?;
            self.consume(TokenKind::Eq)?;
            let value = self.parse_expr()?;
            return Ok(StatementKind::Assign(AssignStmt {
                target,
                op: None,
                annotation: Some(annotation),
                value,
                inferred: None,
            }));
        }

        let op = match self.peek() {
            _ if self.line_break() => return Ok(StatementKind::Expr(target)),
            TokenKind::Eq => None,
            TokenKind::PlusEq => Some(BinaryOp::Add),
            TokenKind::MinusEq => Some(BinaryOp::Sub),
            TokenKind::StarEq => Some(BinaryOp::Mul),
            TokenKind::SlashEq => Some(BinaryOp::Div),
            _ => return Ok(StatementKind::Expr(target)),
        };

        if !target.is_assignable() {
            return Err(ParseError::InvalidAssignmentTarget { span: target.span });
        }
        self.advance();
        let value = self.parse_expr()?;
        Ok(StatementKind::Assign(AssignStmt {
            target,
            op,
            annotation: None,
            value,
            inferred: None,
        }))
    }

    // === Expressions ===

    pub fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.nested(|p| p.parse_or())
    }

    /// Binary operator at the current token, unless a newline ends the
    /// expression first
    fn binary_op(&self, table: &[(TokenKind, BinaryOp)]) -> Option<BinaryOp> {
        if self.line_break() {
            return None;
        }
        table
            .iter()
            .find(|(kind, _)| self.at(*kind))
            .map(|(_, op)| *op)
    }

    fn parse_binary_level(
        &mut self,
        table: &[(TokenKind, BinaryOp)],
        next: fn(&mut Self) -> Result<Expr, ParseError>,
    ) -> Result<Expr, ParseError> {
        let mut left = next(self)?;
        while let Some(op) = self.binary_op(table) {
            let left_height = self.expr_height;
            self.advance();
            let right = next(self)?;
            let span = left.span.merge(right.span);
            self.grow(1 + left_height.max(self.expr_height), span)?;
            left = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            );
        }
        Ok(left)
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(&[(TokenKind::Or, BinaryOp::Or)], Self::parse_and)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(&[(TokenKind::And, BinaryOp::And)], Self::parse_not)
    }

    fn parse_not(&mut self) -> Result<Expr, ParseError> {
        if self.at(TokenKind::Not) {
            let start = self.span();
            self.advance();
            let operand = self.nested(|p| p.parse_not())?;
            let span = start.merge(operand.span);
            self.grow(1 + self.expr_height, span)?;
            return Ok(Expr::new(
                ExprKind::Unary {
                    op: UnaryOp::Not,
                    operand: Box::new(operand),
                },
                span,
            ));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(
            &[
                (TokenKind::EqEq, BinaryOp::Eq),
                (TokenKind::Ne, BinaryOp::Ne),
                (TokenKind::Lt, BinaryOp::Lt),
                (TokenKind::Le, BinaryOp::Le),
                (TokenKind::Gt, BinaryOp::Gt),
                (TokenKind::Ge, BinaryOp::Ge),
            ],
            Self::parse_additive,
        )
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(
            &[
                (TokenKind::Plus, BinaryOp::Add),
                (TokenKind::Minus, BinaryOp::Sub),
            ],
            Self::parse_term,
        )
    }

    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(
            &[
                (TokenKind::Star, BinaryOp::Mul),
                (TokenKind::Slash, BinaryOp::Div),
                (TokenKind::Percent, BinaryOp::Mod),
            ],
            Self::parse_unary,
        )
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        if self.at(TokenKind::Minus) {
            let start = self.span();
            self.advance();
            let operand = self.nested(|p| p.parse_unary())?;
            let span = start.merge(operand.span);
            self.grow(1 + self.expr_height, span)?;
            return Ok(Expr::new(
                ExprKind::Unary {
                    op: UnaryOp::Neg,
                    operand: Box::new(operand),
                },
                span,
            ));
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;

        loop {
            if self.line_break() {
                break;
            }
            let object_height = self.expr_height;
            match self.peek() {
                TokenKind::LParen => {
                    self.advance();
                    let args = self.in_brackets(|p| p.parse_expr_list(TokenKind::RParen))?;
                    self.consume(TokenKind::RParen)?;
                    let span = expr.span.merge(self.prev_span());
                    self.grow(1 + object_height.max(self.expr_height), span)?;
                    expr = Expr::new(
                        ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                        },
                        span,
                    );
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.in_brackets(|p| p.parse_expr())?;
                    self.consume(TokenKind::RBracket)?;
                    let span = expr.span.merge(self.prev_span());
                    self.grow(1 + object_height.max(self.expr_height), span)?;
                    expr = Expr::new(
                        ExprKind::Index {
                            object: Box::new(expr),
                            index: Box::new(index),
                        },
                        span,
                    );
                }
                TokenKind::Dot => {
                    self.advance();
                    let (field, field_span) = self.consume_ident("field name")?;
                    let span = expr.span.merge(field_span);
                    self.grow(1 + object_height, span)?;
                    expr = Expr::new(
                        ExprKind::Field {
                            object: Box::new(expr),
                            field,
                        },
                        span,
                    );
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.current().clone();
        let span = token.span;

        let kind = match token.kind {
            TokenKind::Int => {
                self.advance();
                let value = token.text(self.source).parse::<i64>().map_err(|_| {
                    ParseError::InvalidLiteral {
                        message: "integer literal out of range".into(),
                        span,
                    }
                })?;
                ExprKind::Literal(Literal::Int(value))
            }
            TokenKind::Float => {
                self.advance();
                let value = token
                    .text(self.source)
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| ParseError::InvalidLiteral {
                        message: "float literal out of range".into(),
                        span,
                    })?;
                ExprKind::Literal(Literal::Float(value))
            }
            TokenKind::String | TokenKind::UnterminatedString => {
                self.advance();
                let terminated = token.kind == TokenKind::String;
                ExprKind::Literal(Literal::Str(self.parse_string_literal(&token, terminated)))
            }
            TokenKind::True => {
                self.advance();
                ExprKind::Literal(Literal::Bool(true))
            }
            TokenKind::False => {
                self.advance();
                ExprKind::Literal(Literal::Bool(false))
            }
            TokenKind::None => {
                self.advance();
                ExprKind::Literal(Literal::None)
            }
            TokenKind::Ident => {
                self.advance();
                ExprKind::Ident(token.text(self.source).to_string())
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.in_brackets(|p| p.parse_expr())?;
                self.consume(TokenKind::RParen)?;
                // Grouping is not kept in the tree; the printer re-derives it
                return Ok(Expr::new(inner.kind, span.merge(self.prev_span())));
            }
            TokenKind::LBracket => {
                self.advance();
                let items = self.in_brackets(|p| p.parse_expr_list(TokenKind::RBracket))?;
                self.consume(TokenKind::RBracket)?;
                let span = span.merge(self.prev_span());
                self.grow(1 + self.expr_height, span)?;
                return Ok(Expr::new(ExprKind::List(items), span));
            }
            TokenKind::Error => {
                // Already reported by the lexer pass in `Parser::new`
                self.advance();
                self.expr_height = 1;
                return Ok(Expr::error(span));
            }
            found => return Err(ParseError::unexpected("expression", found, span)),
        };

        self.expr_height = 1;
        Ok(Expr::new(kind, span))
    }

    /// Comma separated expressions up to (not including) `close`; a trailing
    /// comma is allowed. Leaves the tallest item's height in `expr_height`.
    fn parse_expr_list(&mut self, close: TokenKind) -> Result<Vec<Expr>, ParseError> {
        let mut items = Vec::new();
        let mut height = 0;
        while !self.at(close) {
            items.push(self.parse_expr()?);
            height = height.max(self.expr_height);
            if self.at(TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        self.expr_height = height;
        Ok(items)
    }

    fn parse_string_literal(&mut self, token: &Token, terminated: bool) -> String {
        let text = token.text(self.source);
        let inner = if terminated {
            &text[1..text.len() - 1]
        } else {
            &text[1..]
        };
        let body_start = token.span.start + 1;

        let mut result = String::with_capacity(inner.len());
        let mut chars = inner.char_indices();
        while let Some((offset, c)) = chars.next() {
            if c != '\\' {
                result.push(c);
                continue;
            }
            match chars.next() {
                Some((_, 'n')) => result.push('\n'),
                Some((_, 't')) => result.push('\t'),
                Some((_, 'r')) => result.push('\r'),
                Some((_, '0')) => result.push('\0'),
                Some((_, '\\')) => result.push('\\'),
                Some((_, '"')) => result.push('"'),
                Some((_, '\'')) => result.push('\''),
                Some((next_offset, other)) => {
                    let end = body_start + next_offset + other.len_utf8();
                    self.report(ParseError::InvalidEscape {
                        text: format!("\\{}", other),
                        span: Span::new(body_start + offset, end),
                    });
                    result.push('\\');
                    result.push(other);
                }
                None => result.push('\\'),
            }
        }
        result
    }
}
