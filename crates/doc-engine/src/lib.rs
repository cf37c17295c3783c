#![warn(missing_docs)]
//! Doc Engine - Headless Editable-Text Engine
//!
//! # Overview
//!
//! `doc-engine` keeps three views of a document synchronized while a user edits it: the raw
//! lines, a per-line token cache and the latest syntax analysis. Every edit is a reversible
//! command, so undo/redo restores text and carets exactly. Rendering, input devices, file dialogs
//! and OS clipboards are left to the host; lexers and parsers plug in through traits.
//!
//! # Core Features
//!
//! - **Batched notifications**: one user action produces one "modified" notification and at most
//!   one caret-move notification, however many internal edits it performs
//! - **Exact undo/redo**: commands capture the text they remove, including interior lines of
//!   multi-line selections
//! - **Incremental tokens**: only lines named by a change are re-tokenized
//! - **Debounced analysis**: bursts of edits trigger one trailing-edge reparse
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Editor (composition root)                  │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Analysis Trigger + Analysis Holder         │  ← Debounced Reparse
//! ├─────────────────────────────────────────────┤
//! │  Token Cache (per-line tokens, cursors)     │  ← Incremental Lexing
//! ├─────────────────────────────────────────────┤
//! │  Document (carets, batching, history)       │  ← Editing Operations
//! ├─────────────────────────────────────────────┤
//! │  Edit Commands                              │  ← Reversible Mutations
//! ├─────────────────────────────────────────────┤
//! │  Line Store                                 │  ← Text Storage
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use doc_engine::{Caret, Document, DocumentConfig, MemoryClipboard};
//!
//! let mut doc = Document::new("abc", DocumentConfig::default());
//! doc.set_carets(Caret::new(0, 2), Caret::new(0, 2));
//!
//! let mut clipboard = MemoryClipboard::with_text("d\r\ne\r\nf");
//! doc.paste(&mut clipboard);
//! assert_eq!(doc.text(), "abd\r\ne\r\nfc");
//! assert_eq!(doc.carets().enter, Caret::new(2, 1));
//!
//! doc.undo();
//! assert_eq!(doc.text(), "abc");
//! ```
//!
//! # Module Description
//!
//! - [`caret`] - Caret positions and the caret pair
//! - [`line_store`] - Line storage and line change events
//! - [`signal`] - Ordered synchronous observer lists
//! - [`commands`] - Reversible edit commands
//! - [`history`] - Undo/redo stacks
//! - [`document`] - Document model and batching scope
//! - [`token_cache`] - Incremental token cache and cross-line cursors
//! - [`debounce`] - Debounced analysis trigger and schedulers
//! - [`analysis`] - Parser interface and result holder
//! - [`editor`] - The full pipeline
//!
//! # Text Normalization
//!
//! Text entering the engine (construction, `reset`, `paste`) has every `\r` stripped and every
//! tab expanded to four spaces before it is split on `\n`. Columns count Unicode scalar values.

pub mod analysis;
pub mod caret;
pub mod clipboard;
pub mod commands;
pub mod config;
pub mod debounce;
pub mod document;
pub mod editor;
pub mod history;
pub mod line_ending;
pub mod line_store;
pub mod signal;
#[cfg(test)]
mod testing;
mod text;
pub mod token;
pub mod token_cache;

pub use analysis::{
    AnalysisHolder, CacheTokenSource, ParseResult, Parser, SyntaxError, TokenSource,
};
pub use caret::{Caret, CaretSlot, Carets, Direction};
pub use clipboard::{Clipboard, MemoryClipboard};
pub use commands::{EditCommand, EditOp, Erased};
pub use config::{DocumentConfig, EditorConfig};
pub use debounce::{
    AnalysisTrigger, ManualScheduler, Scheduler, SchedulerError, ThreadScheduler, TimerId,
    TimerOutcome,
};
pub use document::{Document, DocumentChange, DocumentSignals};
pub use editor::Editor;
pub use history::History;
pub use line_ending::LineEnding;
pub use line_store::{LineChange, LineChangeKind, LineEvent, LineStore};
pub use signal::{Signal, Subscriber, SubscriptionId};
pub use token::{Lexer, Token, TokenKind};
pub use token_cache::{TokenCache, TokenCursor, TokensChanged};
