//! Jac Lexer - Tokenization using logos
//!
//! Comments are kept as tokens so the parser can attach them to statements.
//! Every token records how many line breaks separate it from the previous
//! token, which is what makes newlines statement terminators without
//! emitting newline tokens.

mod token;

pub use token::*;

use logos::Logos;
use jac_ast::Span;

/// Tokenize a source string into a vector of tokens
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(source);
    let mut prev_end = 0;

    while let Some(result) = lexer.next() {
        let span = Span::new(lexer.span().start, lexer.span().end);
        let kind = match result {
            Ok(kind) => kind,
            Err(_) => TokenKind::Error,
        };
        let newlines_before = count_newlines(&source[prev_end..span.start]);
        prev_end = span.end;
        tokens.push(Token {
            kind,
            span,
            newlines_before,
        });
    }

    // Add EOF token
    let end = source.len();
    tokens.push(Token {
        kind: TokenKind::Eof,
        span: Span::new(end, end),
        newlines_before: count_newlines(&source[prev_end..end]),
    });

    tokens
}

fn count_newlines(gap: &str) -> u32 {
    gap.bytes().filter(|&b| b == b'\n').count() as u32
}

/// A token with its span
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// Line breaks between the previous token (or start of input) and this one
    pub newlines_before: u32,
}

impl Token {
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.span.start..self.span.end]
    }

    /// Whether the token begins a new line
    pub fn on_new_line(&self) -> bool {
        self.newlines_before > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_basic_tokens() {
        let tokens = tokenize("x = 5");
        assert_eq!(tokens[0].kind, TokenKind::Ident);
        assert_eq!(tokens[1].kind, TokenKind::Eq);
        assert_eq!(tokens[2].kind, TokenKind::Int);
        assert_eq!(tokens[3].kind, TokenKind::Eof);
    }

    #[test]
    fn test_assignment_vs_equality() {
        assert_eq!(kinds("a == b")[1], TokenKind::EqEq);
        assert_eq!(kinds("a += b")[1], TokenKind::PlusEq);
        assert_eq!(kinds("a -> b")[1], TokenKind::Arrow);
    }

    #[test]
    fn test_keywords_are_not_identifiers() {
        assert_eq!(
            kinds("fn elif format"),
            vec![TokenKind::Fn, TokenKind::Elif, TokenKind::Ident, TokenKind::Eof]
        );
    }

    #[test]
    fn test_strings_both_quotes() {
        assert_eq!(kinds(r#""a\"b""#)[0], TokenKind::String);
        assert_eq!(kinds("'single'")[0], TokenKind::String);
        assert_eq!(kinds("\"open\nx")[0], TokenKind::UnterminatedString);
    }

    #[test]
    fn test_comments_are_tokens() {
        let tokens = tokenize("x = 1  # note\ny = 2");
        assert_eq!(tokens[3].kind, TokenKind::Comment);
        assert_eq!(tokens[3].text("x = 1  # note\ny = 2"), "# note");
        assert_eq!(tokens[3].newlines_before, 0);
        assert_eq!(tokens[4].newlines_before, 1);
    }

    #[test]
    fn test_newline_counts() {
        let tokens = tokenize("a\n\n\nb");
        assert_eq!(tokens[0].newlines_before, 0);
        assert_eq!(tokens[1].newlines_before, 3);
    }

    #[test]
    fn test_unknown_character_is_error() {
        assert_eq!(kinds("a $ b")[1], TokenKind::Error);
    }
}
