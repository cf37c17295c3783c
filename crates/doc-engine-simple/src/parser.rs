//! Bracket-balance parser.
//!
//! [`BracketParser`] groups the significant token stream by brackets and reports unmatched,
//! mismatched and unclosed brackets. It never stops at the first problem: a close bracket that
//! matches an outer group closes the groups in between (reporting them as unclosed), and a close
//! bracket that matches nothing is reported and skipped.

use doc_engine::{ParseResult, Parser, SyntaxError, Token, TokenKind, TokenSource};
use std::ops::Range;

/// A bracketed region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BracketGroup {
    /// Opening character: `(`, `[` or `{`.
    pub open: char,
    /// Line of the opening bracket.
    pub line: usize,
    /// Column span of the opening bracket.
    pub span: Range<usize>,
    /// Line and span of the closing bracket; `None` if the group was never closed.
    pub close: Option<(usize, Range<usize>)>,
    /// Nested groups, in order.
    pub children: Vec<BracketGroup>,
    /// Non-bracket tokens directly inside this group.
    pub token_count: usize,
}

impl BracketGroup {
    fn opened_by(line: usize, token: &Token) -> Self {
        Self {
            open: bracket_char(token, '('),
            line,
            span: token.span(),
            close: None,
            children: Vec::new(),
            token_count: 0,
        }
    }

    /// Nesting depth of the deepest group below (and including) this one.
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(Self::depth).max().unwrap_or(0)
    }
}

/// Top level of a parsed document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BracketTree {
    /// Top-level groups, in order.
    pub groups: Vec<BracketGroup>,
    /// Non-bracket tokens outside every group.
    pub token_count: usize,
}

impl BracketTree {
    /// Deepest nesting level (0 without groups).
    pub fn max_depth(&self) -> usize {
        self.groups.iter().map(BracketGroup::depth).max().unwrap_or(0)
    }
}

/// Parser checking bracket balance.
#[derive(Debug, Clone, Copy, Default)]
pub struct BracketParser;

impl BracketParser {
    /// Create a parser.
    pub fn new() -> Self {
        Self
    }
}

impl Parser for BracketParser {
    type Tree = BracketTree;

    fn parse(&mut self, source: &mut dyn TokenSource) -> ParseResult<BracketTree> {
        let mut tree = BracketTree::default();
        let mut stack: Vec<BracketGroup> = Vec::new();
        let mut errors = Vec::new();

        while let Some(token) = source.current_token() {
            let line = source.current_line();
            match token.kind {
                TokenKind::OpenBracket => stack.push(BracketGroup::opened_by(line, token)),
                TokenKind::CloseBracket => {
                    let close = bracket_char(token, ')');
                    let open = partner(close);
                    match stack.iter().rposition(|group| group.open == open) {
                        Some(index) => {
                            if index + 1 < stack.len() {
                                let expected = closer(stack[stack.len() - 1].open);
                                errors.push(SyntaxError::at_token(
                                    line,
                                    token,
                                    format!("mismatched `{close}`, expected `{expected}`"),
                                ));
                            }
                            while stack.len() > index + 1 {
                                if let Some(group) = stack.pop() {
                                    errors.push(unclosed(&group));
                                    attach(&mut stack, &mut tree, group);
                                }
                            }
                            if let Some(mut group) = stack.pop() {
                                group.close = Some((line, token.span()));
                                attach(&mut stack, &mut tree, group);
                            }
                        }
                        None => errors.push(SyntaxError::at_token(
                            line,
                            token,
                            format!("unmatched `{close}`"),
                        )),
                    }
                }
                _ => match stack.last_mut() {
                    Some(group) => group.token_count += 1,
                    None => tree.token_count += 1,
                },
            }
            source.accept();
        }

        while let Some(group) = stack.pop() {
            errors.push(unclosed(&group));
            attach(&mut stack, &mut tree, group);
        }

        errors.sort_by_key(|error| (error.line, error.span.start));
        ParseResult {
            tree: Some(tree),
            errors,
        }
    }
}

fn attach(stack: &mut [BracketGroup], tree: &mut BracketTree, group: BracketGroup) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(group),
        None => tree.groups.push(group),
    }
}

fn unclosed(group: &BracketGroup) -> SyntaxError {
    SyntaxError {
        line: group.line,
        span: group.span.clone(),
        message: format!("unclosed `{}`", group.open),
    }
}

fn bracket_char(token: &Token, fallback: char) -> char {
    token
        .value
        .as_deref()
        .and_then(|value| value.chars().next())
        .unwrap_or(fallback)
}

fn partner(close: char) -> char {
    match close {
        ']' => '[',
        '}' => '{',
        _ => '(',
    }
}

fn closer(open: char) -> char {
    match open {
        '[' => ']',
        '{' => '}',
        _ => ')',
    }
}
