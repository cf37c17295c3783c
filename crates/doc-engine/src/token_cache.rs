//! Incremental token cache.
//!
//! [`TokenCache`] keeps one token list per document line. It is driven by the [`LineEvent`]s the
//! line store records: a modified line is re-tokenized, added lines are tokenized and spliced in,
//! removed lines are dropped. Lines that no event names are never touched, so the cost of an edit
//! is proportional to the number of affected lines.
//!
//! Each applied event re-emits exactly one [`TokensChanged`] notification.
//!
//! [`TokenCursor`] walks tokens lazily across line boundaries in either direction; bracket
//! matching is built on it.

use crate::caret::Caret;
use crate::line_store::{LineChange, LineChangeKind, LineEvent, LineStore};
use crate::signal::Signal;
use crate::token::{Lexer, Token, TokenKind};
use std::fmt;
use std::iter::FusedIterator;
use tracing::{debug, trace};

/// Payload of the "tokens changed" notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokensChanged {
    /// What happened to the lines.
    pub kind: LineChangeKind,
    /// Affected line range (after the change for adds and modifies, before it for removals).
    pub change: LineChange,
}

/// Per-line token lists kept in lock-step with a [`LineStore`].
pub struct TokenCache {
    lexer: Box<dyn Lexer>,
    lines: Vec<Vec<Token>>,
    tokens_changed: Signal<TokensChanged>,
}

impl TokenCache {
    /// Tokenize every line of `lines`.
    pub fn new(lexer: Box<dyn Lexer>, lines: &LineStore) -> Self {
        let tokens: Vec<Vec<Token>> = lines.lines().map(|line| lexer.tokenize(line)).collect();
        debug!(lines = tokens.len(), "token cache built");
        Self {
            lexer,
            lines: tokens,
            tokens_changed: Signal::new(),
        }
    }

    /// Apply one line event and notify subscribers.
    ///
    /// # Panics
    ///
    /// Panics if the event addresses lines the cache does not have, which means the cache and the
    /// line store have diverged.
    pub fn apply(&mut self, event: &LineEvent) -> TokensChanged {
        let LineChange { start, count } = event.change;
        match event.kind {
            LineChangeKind::Modified => {
                assert!(
                    start + count <= self.lines.len(),
                    "token cache diverged from line store: modify {start}+{count} of {}",
                    self.lines.len()
                );
                for (slot, text) in self.lines[start..start + count].iter_mut().zip(&event.lines) {
                    *slot = self.lexer.tokenize(text);
                }
            }
            LineChangeKind::Added => {
                assert!(
                    start <= self.lines.len(),
                    "token cache diverged from line store: add at {start} of {}",
                    self.lines.len()
                );
                let fresh: Vec<Vec<Token>> =
                    event.lines.iter().map(|text| self.lexer.tokenize(text)).collect();
                self.lines.splice(start..start, fresh);
            }
            LineChangeKind::Removed => {
                assert!(
                    start + count <= self.lines.len(),
                    "token cache diverged from line store: remove {start}+{count} of {}",
                    self.lines.len()
                );
                self.lines.drain(start..start + count);
            }
        }
        trace!(kind = ?event.kind, start, count, "token cache delta applied");

        let changed = TokensChanged {
            kind: event.kind,
            change: event.change,
        };
        self.tokens_changed.emit(&changed);
        changed
    }

    /// Discard every entry and re-tokenize `lines` from scratch.
    pub fn rebuild_all(&mut self, lines: &LineStore) -> TokensChanged {
        self.lines = lines.lines().map(|line| self.lexer.tokenize(line)).collect();
        debug!(lines = self.lines.len(), "token cache rebuilt");

        let changed = TokensChanged {
            kind: LineChangeKind::Modified,
            change: LineChange::new(0, self.lines.len()),
        };
        self.tokens_changed.emit(&changed);
        changed
    }

    /// "Tokens changed" notification channel.
    pub fn tokens_changed(&mut self) -> &mut Signal<TokensChanged> {
        &mut self.tokens_changed
    }

    /// Number of cached lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Tokens of line `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn line(&self, index: usize) -> &[Token] {
        &self.lines[index]
    }

    /// Iterate every line's tokens.
    pub fn lines(&self) -> impl Iterator<Item = &[Token]> + '_ {
        self.lines.iter().map(Vec::as_slice)
    }

    /// Check the cache against the line store it follows.
    ///
    /// # Panics
    ///
    /// Panics if the line counts differ.
    pub fn assert_in_sync(&self, lines: &LineStore) {
        assert_eq!(
            self.lines.len(),
            lines.line_count(),
            "token cache line count diverged from line store"
        );
    }

    /// Walk tokens in document order starting at token `index` of `line` (inclusive).
    pub fn forward(&self, line: usize, index: usize) -> TokenCursor<'_> {
        TokenCursor {
            lines: &self.lines,
            line,
            position: index,
            direction: CursorDirection::Forward,
            finished: false,
        }
    }

    /// Walk tokens in reverse document order starting at token `index` of `line` (inclusive).
    pub fn backward(&self, line: usize, index: usize) -> TokenCursor<'_> {
        let Some(last_line) = self.lines.len().checked_sub(1) else {
            return TokenCursor {
                lines: &self.lines,
                line: 0,
                position: 0,
                direction: CursorDirection::Backward,
                finished: true,
            };
        };
        let line = line.min(last_line);
        let position = index.saturating_add(1).min(self.lines[line].len());
        TokenCursor {
            lines: &self.lines,
            line,
            position,
            direction: CursorDirection::Backward,
            finished: false,
        }
    }

    /// Token under `caret` as `(token index, token)`.
    ///
    /// A caret sitting right after the last token of a line resolves to that token.
    pub fn token_at(&self, caret: Caret) -> Option<(usize, &Token)> {
        let tokens = self.lines.get(caret.line)?;
        tokens
            .iter()
            .position(|token| token.contains(caret.column))
            .or_else(|| {
                tokens
                    .iter()
                    .rposition(|token| token.end == caret.column && token.start < token.end)
            })
            .map(|index| (index, &tokens[index]))
    }

    /// Find the bracket matching the bracket token at (`line`, `index`).
    ///
    /// Returns the `(line, token index)` of the match, or `None` if the token is not a bracket or
    /// has no partner. Brackets are paired by character (`(`/`)`, `[`/`]`, `{`/`}`); a closer
    /// met on the way closes the nearest enclosing bracket of its own type and drops the ones
    /// nested inside it, and a closer with no such bracket is skipped. This is the recovery
    /// `doc_engine_simple::BracketParser` applies, so both agree on malformed input.
    pub fn matching_bracket(&self, line: usize, index: usize) -> Option<(usize, usize)> {
        let start = self.lines.get(line)?.get(index)?;
        let (same, cursor) = match start.kind {
            TokenKind::OpenBracket => (TokenKind::OpenBracket, self.forward(line, index)),
            TokenKind::CloseBracket => (TokenKind::CloseBracket, self.backward(line, index)),
            _ => return None,
        };

        let mut pending: Vec<char> = Vec::new();
        for (token, position) in cursor.with_positions() {
            if !token.kind.is_bracket() {
                continue;
            }
            let ch = bracket_char(token)?;
            if token.kind == same {
                pending.push(ch);
                continue;
            }
            let Some(partner) = pending.iter().rposition(|&open| brackets_pair(open, ch)) else {
                continue;
            };
            pending.truncate(partner);
            if pending.is_empty() {
                return Some(position);
            }
        }
        None
    }
}

fn bracket_char(token: &Token) -> Option<char> {
    token.value.as_deref()?.chars().next()
}

/// Whether `a` and `b` are the two halves of one bracket pair, in either order.
fn brackets_pair(a: char, b: char) -> bool {
    matches!(
        (a, b),
        ('(', ')') | (')', '(') | ('[', ']') | (']', '[') | ('{', '}') | ('}', '{')
    )
}

impl fmt::Debug for TokenCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCache")
            .field("lines", &self.lines)
            .field("tokens_changed", &self.tokens_changed)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CursorDirection {
    Forward,
    Backward,
}

/// Lazy cross-line token cursor produced by [`TokenCache::forward`] and
/// [`TokenCache::backward`].
///
/// Yields `(token, line index)` pairs and skips empty lines. Nothing past the current token is
/// materialized.
#[derive(Debug, Clone)]
pub struct TokenCursor<'a> {
    lines: &'a [Vec<Token>],
    line: usize,
    /// Forward: index of the next token. Backward: number of tokens still to yield on `line`.
    position: usize,
    direction: CursorDirection,
    finished: bool,
}

impl<'a> TokenCursor<'a> {
    /// Adapt the cursor to yield `(token, (line, token index))`.
    pub fn with_positions(self) -> impl Iterator<Item = (&'a Token, (usize, usize))> {
        let mut cursor = self;
        std::iter::from_fn(move || {
            let (token, line) = cursor.next()?;
            let index = match cursor.direction {
                CursorDirection::Forward => cursor.position - 1,
                CursorDirection::Backward => cursor.position,
            };
            Some((token, (line, index)))
        })
    }

    fn next_forward(&mut self) -> Option<(&'a Token, usize)> {
        let lines = self.lines;
        loop {
            let tokens = lines.get(self.line)?;
            if let Some(token) = tokens.get(self.position) {
                self.position += 1;
                return Some((token, self.line));
            }
            self.line += 1;
            self.position = 0;
        }
    }

    fn next_backward(&mut self) -> Option<(&'a Token, usize)> {
        let lines = self.lines;
        loop {
            if self.position > 0 {
                self.position -= 1;
                return Some((&lines[self.line][self.position], self.line));
            }
            if self.line == 0 {
                return None;
            }
            self.line -= 1;
            self.position = lines[self.line].len();
        }
    }
}

impl<'a> Iterator for TokenCursor<'a> {
    type Item = (&'a Token, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let item = match self.direction {
            CursorDirection::Forward => self.next_forward(),
            CursorDirection::Backward => self.next_backward(),
        };
        if item.is_none() {
            self.finished = true;
        }
        item
    }
}

impl FusedIterator for TokenCursor<'_> {}
