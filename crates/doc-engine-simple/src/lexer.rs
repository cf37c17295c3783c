//! Regex-based line lexer.

use doc_engine::{Lexer, Token, TokenKind};
use regex::Regex;
use std::collections::HashSet;
use thiserror::Error;

/// Errors raised while building a [`RegexLexer`].
#[derive(Debug, Error)]
pub enum LexerError {
    #[error("invalid token pattern: {0}")]
    /// A rule pattern failed to compile.
    Pattern(#[from] regex::Error),
}

/// A single token rule. Patterns are anchored at the current position.
#[derive(Debug, Clone)]
pub struct TokenRule {
    regex: Regex,
    kind: TokenKind,
}

impl TokenRule {
    /// Compile `pattern` into a rule producing `kind` tokens.
    pub fn new(pattern: &str, kind: TokenKind) -> Result<Self, LexerError> {
        Ok(Self {
            regex: Regex::new(&format!(r"\A(?:{pattern})"))?,
            kind,
        })
    }

    /// Token kind produced by this rule.
    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    fn match_len(&self, rest: &str) -> Option<usize> {
        self.regex
            .find(rest)
            .map(|m| m.end())
            .filter(|&len| len > 0)
    }
}

/// Ordered-rule lexer.
///
/// At each position the first rule with a non-empty match wins. Identifiers found in the keyword
/// set become [`TokenKind::Keyword`]. A character no rule matches becomes part of an
/// [`TokenKind::Invalid`] token, so the output always covers the whole line.
#[derive(Debug, Clone)]
pub struct RegexLexer {
    rules: Vec<TokenRule>,
    keywords: HashSet<String>,
}

impl RegexLexer {
    /// Create a lexer from ordered rules.
    pub fn new(rules: Vec<TokenRule>) -> Self {
        Self {
            rules,
            keywords: HashSet::new(),
        }
    }

    /// Reclassify these identifiers as keywords.
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords.extend(keywords.into_iter().map(Into::into));
        self
    }

    /// The rules, in priority order.
    pub fn rules(&self) -> &[TokenRule] {
        &self.rules
    }

    /// Whether `word` is a keyword.
    pub fn is_keyword(&self, word: &str) -> bool {
        self.keywords.contains(word)
    }

    /// A small C-like grammar: comments, strings, numbers, identifiers, brackets, operators.
    pub fn c_like() -> Result<Self, LexerError> {
        Ok(Self::new(vec![
            TokenRule::new(r"\s+", TokenKind::Whitespace)?,
            // Line comment, or a block comment closed on the same line
            TokenRule::new(r"//.*|/\*.*?\*/", TokenKind::Comment)?,
            TokenRule::new(r#""(?:\\.|[^"\\])*"|'(?:\\.|[^'\\])*'"#, TokenKind::String)?,
            TokenRule::new(
                r"0[xX][0-9a-fA-F]+|\d+(?:\.\d+)?(?:[eE][+-]?\d+)?",
                TokenKind::Number,
            )?,
            TokenRule::new(r"[A-Za-z_][A-Za-z0-9_]*", TokenKind::Identifier)?,
            TokenRule::new(r"[(\[{]", TokenKind::OpenBracket)?,
            TokenRule::new(r"[)\]}]", TokenKind::CloseBracket)?,
            TokenRule::new(r"[,;.:]", TokenKind::Punctuation)?,
            TokenRule::new(
                r"==|!=|<=|>=|&&|\|\||->|\+\+|--|[-+*/%=<>!&|^~?]",
                TokenKind::Operator,
            )?,
        ])
        .with_keywords([
            "if", "else", "while", "for", "return", "fn", "let", "const", "struct", "break",
            "continue", "true", "false", "null",
        ]))
    }
}

impl Lexer for RegexLexer {
    fn tokenize(&self, line: &str) -> Vec<Token> {
        let mut tokens: Vec<Token> = Vec::new();
        let mut byte = 0;
        let mut column = 0;

        while byte < line.len() {
            let rest = &line[byte..];
            let matched = self
                .rules
                .iter()
                .find_map(|rule| rule.match_len(rest).map(|len| (rule.kind, len)));

            let Some((kind, len)) = matched else {
                let ch_len = rest.chars().next().map_or(1, char::len_utf8);
                let text = &rest[..ch_len];
                match tokens.last_mut() {
                    Some(last) if last.kind == TokenKind::Invalid && last.end == column => {
                        last.end += 1;
                        if let Some(value) = last.value.as_mut() {
                            value.push_str(text);
                        }
                    }
                    _ => tokens.push(
                        Token::new(TokenKind::Invalid, column, column + 1).with_value(text),
                    ),
                }
                byte += ch_len;
                column += 1;
                continue;
            };

            let text = &rest[..len];
            let kind = if kind == TokenKind::Identifier && self.is_keyword(text) {
                TokenKind::Keyword
            } else {
                kind
            };
            let width = text.chars().count();
            tokens.push(Token::new(kind, column, column + width).with_value(text));
            byte += len;
            column += width;
        }

        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(tokens: &[Token]) -> Vec<(TokenKind, &str)> {
        tokens
            .iter()
            .map(|t| (t.kind, t.value.as_deref().unwrap_or("")))
            .collect()
    }

    #[test]
    fn test_c_like_tokens() {
        let lexer = RegexLexer::c_like().unwrap();
        let tokens = lexer.tokenize(r#"if (x1 >= 0x1F) { s = "a\"b"; } // done"#);
        assert_eq!(
            kinds(&tokens),
            vec![
                (TokenKind::Keyword, "if"),
                (TokenKind::Whitespace, " "),
                (TokenKind::OpenBracket, "("),
                (TokenKind::Identifier, "x1"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Operator, ">="),
                (TokenKind::Whitespace, " "),
                (TokenKind::Number, "0x1F"),
                (TokenKind::CloseBracket, ")"),
                (TokenKind::Whitespace, " "),
                (TokenKind::OpenBracket, "{"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Identifier, "s"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Operator, "="),
                (TokenKind::Whitespace, " "),
                (TokenKind::String, r#""a\"b""#),
                (TokenKind::Punctuation, ";"),
                (TokenKind::Whitespace, " "),
                (TokenKind::CloseBracket, "}"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Comment, "// done"),
            ]
        );
    }

    #[test]
    fn test_tokens_cover_line_in_columns() {
        let lexer = RegexLexer::c_like().unwrap();
        let line = "名前 = «x» + 1.5e3";
        let tokens = lexer.tokenize(line);

        let mut column = 0;
        for token in &tokens {
            assert_eq!(token.start, column);
            assert!(token.end > token.start);
            column = token.end;
        }
        assert_eq!(column, line.chars().count());
    }

    #[test]
    fn test_unmatched_run_is_one_invalid_token() {
        let lexer = RegexLexer::c_like().unwrap();
        let tokens = lexer.tokenize("a @#$ b");
        assert_eq!(tokens[2], Token::new(TokenKind::Invalid, 2, 5).with_value("@#$"));
    }

    #[test]
    fn test_empty_line_has_no_tokens() {
        let lexer = RegexLexer::c_like().unwrap();
        assert!(lexer.tokenize("").is_empty());
    }

    #[test]
    fn test_bad_pattern_is_an_error() {
        let err = TokenRule::new("(", TokenKind::Operator).unwrap_err();
        assert!(err.to_string().starts_with("invalid token pattern"));
    }
}
