//! Analysis results.
//!
//! The engine does not parse by itself: a [`Parser`] consumes a [`TokenSource`] and returns a
//! [`ParseResult`]. Syntax problems are data (entries in [`ParseResult::errors`]), never panics
//! or `Err`s.
//!
//! [`CacheTokenSource`] feeds the parser from a [`TokenCache`], skipping whitespace and comments.
//! [`AnalysisHolder`] keeps the latest result and notifies subscribers on every rebuild.

use crate::signal::Signal;
use crate::token::Token;
use crate::token_cache::{TokenCache, TokenCursor};
use std::fmt;
use std::ops::Range;
use tracing::debug;

/// A syntax problem tied to a line and a column span.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SyntaxError {
    /// Line index.
    pub line: usize,
    /// Column span of the offending token(s).
    pub span: Range<usize>,
    /// Human-readable message.
    pub message: String,
}

impl SyntaxError {
    /// Create an error on `token` at `line`.
    pub fn at_token(line: usize, token: &Token, message: impl Into<String>) -> Self {
        Self {
            line,
            span: token.span(),
            message: message.into(),
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}-{}: {}",
            self.line + 1,
            self.span.start + 1,
            self.span.end + 1,
            self.message
        )
    }
}

/// Outcome of one full parse. Replaced wholesale on each reparse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseResult<T> {
    /// Syntax tree, if the parser produced one.
    pub tree: Option<T>,
    /// Syntax errors in document order.
    pub errors: Vec<SyntaxError>,
}

impl<T> ParseResult<T> {
    /// A result with a tree and no errors.
    pub fn ok(tree: T) -> Self {
        Self {
            tree: Some(tree),
            errors: Vec::new(),
        }
    }

    /// Whether the parse reported no errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

impl<T> Default for ParseResult<T> {
    fn default() -> Self {
        Self {
            tree: None,
            errors: Vec::new(),
        }
    }
}

/// Token stream consumed by a [`Parser`].
pub trait TokenSource {
    /// Token under the cursor, or `None` at the end.
    fn current_token(&self) -> Option<&Token>;

    /// Line of the current token (the last token's line at the end).
    fn current_line(&self) -> usize;

    /// Advance past the current token.
    fn accept(&mut self);

    /// Whether every token has been consumed.
    fn is_at_end(&self) -> bool {
        self.current_token().is_none()
    }
}

/// Full-document parser.
pub trait Parser {
    /// Syntax tree type.
    type Tree;

    /// Parse the whole token stream.
    fn parse(&mut self, source: &mut dyn TokenSource) -> ParseResult<Self::Tree>;
}

/// [`TokenSource`] over a [`TokenCache`] yielding only significant tokens.
#[derive(Debug, Clone)]
pub struct CacheTokenSource<'a> {
    cursor: TokenCursor<'a>,
    current: Option<(&'a Token, usize)>,
    line: usize,
}

impl<'a> CacheTokenSource<'a> {
    /// Start at the first significant token of `cache`.
    pub fn new(cache: &'a TokenCache) -> Self {
        let mut source = Self {
            cursor: cache.forward(0, 0),
            current: None,
            line: 0,
        };
        source.advance();
        source
    }

    fn advance(&mut self) {
        self.current = self
            .cursor
            .by_ref()
            .find(|(token, _)| token.kind.is_significant());
        if let Some((_, line)) = self.current {
            self.line = line;
        }
    }
}

impl TokenSource for CacheTokenSource<'_> {
    fn current_token(&self) -> Option<&Token> {
        self.current.map(|(token, _)| token)
    }

    fn current_line(&self) -> usize {
        self.line
    }

    fn accept(&mut self) {
        if self.current.is_some() {
            self.advance();
        }
    }
}

/// Holder of the latest [`ParseResult`].
pub struct AnalysisHolder<T> {
    result: ParseResult<T>,
    revision: u64,
    changed: Signal<ParseResult<T>>,
}

impl<T> AnalysisHolder<T> {
    /// Create a holder with an empty result at revision 0.
    pub fn new() -> Self {
        Self {
            result: ParseResult::default(),
            revision: 0,
            changed: Signal::new(),
        }
    }

    /// Reparse `source`, replace the held result and notify subscribers.
    ///
    /// Subscribers are notified even when the new result equals the old one.
    pub fn rebuild<P>(&mut self, parser: &mut P, source: &mut dyn TokenSource) -> &ParseResult<T>
    where
        P: Parser<Tree = T> + ?Sized,
    {
        self.result = parser.parse(source);
        self.revision += 1;
        debug!(
            revision = self.revision,
            errors = self.result.errors.len(),
            has_tree = self.result.tree.is_some(),
            "analysis rebuilt"
        );
        self.changed.emit(&self.result);
        &self.result
    }

    /// Latest result.
    pub fn result(&self) -> &ParseResult<T> {
        &self.result
    }

    /// Number of rebuilds so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// "Parse result changed" notification channel.
    pub fn changed(&mut self) -> &mut Signal<ParseResult<T>> {
        &mut self.changed
    }
}

impl<T> Default for AnalysisHolder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for AnalysisHolder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisHolder")
            .field("result", &self.result)
            .field("revision", &self.revision)
            .field("changed", &self.changed)
            .finish()
    }
}
