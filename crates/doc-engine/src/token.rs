//! Tokens and the lexer interface.
//!
//! The engine never lexes by itself. A [`Lexer`] turns one line of text into an ordered list of
//! [`Token`]s that covers the whole line; spans the lexer does not recognize are reported as
//! [`TokenKind::Invalid`] tokens instead of errors.

use std::ops::Range;

/// Token classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Spaces and other blanks.
    Whitespace,
    /// Comment text.
    Comment,
    /// Identifier.
    Identifier,
    /// Reserved word.
    Keyword,
    /// Numeric literal.
    Number,
    /// String literal.
    String,
    /// Operator.
    Operator,
    /// Separator such as `,` or `;`.
    Punctuation,
    /// `(`, `[` or `{`.
    OpenBracket,
    /// `)`, `]` or `}`.
    CloseBracket,
    /// Unrecognized span.
    Invalid,
}

impl TokenKind {
    /// Whether the parser should see tokens of this kind.
    pub fn is_significant(self) -> bool {
        !matches!(self, TokenKind::Whitespace | TokenKind::Comment)
    }

    /// Whether this is an open or close bracket.
    pub fn is_bracket(self) -> bool {
        matches!(self, TokenKind::OpenBracket | TokenKind::CloseBracket)
    }
}

/// A classified span of one line.
///
/// `start` and `end` are character columns; `end` is exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    /// Classification.
    pub kind: TokenKind,
    /// First column.
    pub start: usize,
    /// End column (exclusive).
    pub end: usize,
    /// Optional payload (the matched text, a parsed literal, ...).
    pub value: Option<String>,
}

impl Token {
    /// Create a token without a payload.
    pub fn new(kind: TokenKind, start: usize, end: usize) -> Self {
        Self {
            kind,
            start,
            end,
            value: None,
        }
    }

    /// Attach a payload.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Column range covered by the token.
    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Whether `column` falls inside the token.
    pub fn contains(&self, column: usize) -> bool {
        self.span().contains(&column)
    }
}

/// Per-line tokenizer.
///
/// Implementations must be total, deterministic and side-effect free, and the returned tokens
/// must cover `0..line.chars().count()` without gaps.
pub trait Lexer: Send {
    /// Tokenize one line (without line terminator).
    fn tokenize(&self, line: &str) -> Vec<Token>;
}

impl<L: Lexer + ?Sized> Lexer for Box<L> {
    fn tokenize(&self, line: &str) -> Vec<Token> {
        (**self).tokenize(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_significance() {
        assert!(!TokenKind::Whitespace.is_significant());
        assert!(!TokenKind::Comment.is_significant());
        assert!(TokenKind::Invalid.is_significant());
        assert!(TokenKind::OpenBracket.is_bracket());
        assert!(!TokenKind::Operator.is_bracket());
    }

    #[test]
    fn test_span() {
        let token = Token::new(TokenKind::Identifier, 2, 5).with_value("foo");
        assert_eq!(token.span(), 2..5);
        assert!(token.contains(2));
        assert!(!token.contains(5));
        assert_eq!(token.value.as_deref(), Some("foo"));
    }
}
