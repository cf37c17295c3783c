//! Fixtures shared by unit tests.

use crate::token::{Lexer, Token, TokenKind};

/// Splits a line into word, blank, bracket and single-character operator tokens.
/// `#` starts a comment running to the end of the line.
#[derive(Debug, Default)]
pub(crate) struct WordLexer;

impl Lexer for WordLexer {
    fn tokenize(&self, line: &str) -> Vec<Token> {
        let chars: Vec<char> = line.chars().collect();
        let mut tokens = Vec::new();
        let mut start = 0;
        while start < chars.len() {
            let ch = chars[start];
            let run_end = |pred: fn(char) -> bool| {
                let mut end = start;
                while end < chars.len() && pred(chars[end]) {
                    end += 1;
                }
                end
            };
            let (kind, end) = match ch {
                '#' => (TokenKind::Comment, chars.len()),
                ' ' => (TokenKind::Whitespace, run_end(|c| c == ' ')),
                '(' | '[' | '{' => (TokenKind::OpenBracket, start + 1),
                ')' | ']' | '}' => (TokenKind::CloseBracket, start + 1),
                c if c.is_alphanumeric() => (TokenKind::Identifier, run_end(char::is_alphanumeric)),
                _ => (TokenKind::Operator, start + 1),
            };
            let text: String = chars[start..end].iter().collect();
            tokens.push(Token::new(kind, start, end).with_value(text));
            start = end;
        }
        tokens
    }
}
