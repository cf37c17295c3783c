//! Document model.
//!
//! [`Document`] combines the [`LineStore`], the caret pair and the [`History`] behind
//! caret-relative editing operations (`backspace`, `add_char`, `enter`, `paste`, ...).
//!
//! # Batching
//!
//! Every public operation runs inside a batching scope ([`Document::batch`]). Nested scopes are
//! transparent. The outermost scope snapshots both carets, runs the operation (which may issue
//! several edit commands) and on exit emits:
//!
//! - at most one `carets_moved` notification, only if either caret changed;
//! - at most one `modified` notification, if a caret changed or any line mutation happened.
//!
//! Line-level notifications (`line_added` / `line_modified` / `line_removed`) are published
//! synchronously right after each command, in mutation order.
//!
//! # Example
//!
//! ```rust
//! use doc_engine::{Caret, Document, DocumentConfig};
//!
//! let mut doc = Document::new("abc", DocumentConfig::default());
//! doc.set_carets(Caret::new(0, 2), Caret::new(0, 2));
//!
//! doc.backspace();
//! assert_eq!(doc.text(), "ac");
//!
//! doc.undo();
//! assert_eq!(doc.text(), "abc");
//! assert_eq!(doc.carets().enter, Caret::new(0, 2));
//! ```

use crate::caret::{Caret, CaretSlot, Carets, Direction};
use crate::clipboard::Clipboard;
use crate::commands::EditCommand;
use crate::config::DocumentConfig;
use crate::history::History;
use crate::line_store::{LineChangeKind, LineEvent, LineStore};
use crate::signal::Signal;
use crate::text::{leading_whitespace, normalize_lines, slice_columns, split_at_column};
use tracing::debug;

/// Payload of the `modified` notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentChange {
    /// Version before the batch.
    pub old_version: u64,
    /// Version after the batch.
    pub new_version: u64,
    /// Whether any line was added, modified or removed.
    pub structural: bool,
}

/// Notification channels exposed by a [`Document`].
#[derive(Debug, Default)]
pub struct DocumentSignals {
    /// Lines were inserted.
    pub line_added: Signal<LineEvent>,
    /// A line was rewritten in place.
    pub line_modified: Signal<LineEvent>,
    /// Lines were removed.
    pub line_removed: Signal<LineEvent>,
    /// Either caret moved (emitted once per batch).
    pub carets_moved: Signal<Carets>,
    /// The document changed (emitted once per batch).
    pub modified: Signal<DocumentChange>,
}

#[derive(Debug, Default)]
struct BatchState {
    depth: usize,
    carets_before: Carets,
    structural: bool,
}

/// Editable document: lines, carets and undo history.
#[derive(Debug)]
pub struct Document {
    lines: LineStore,
    carets: Carets,
    history: History,
    config: DocumentConfig,
    version: u64,
    batch: BatchState,
    journal: Option<Vec<LineEvent>>,
    signals: DocumentSignals,
}

impl Document {
    /// Create a document from boundary text (normalized: `\r` stripped, tabs expanded).
    pub fn new(text: &str, config: DocumentConfig) -> Self {
        Self {
            lines: LineStore::from_text(text),
            carets: Carets::default(),
            history: History::new(config.max_undo),
            config,
            version: 0,
            batch: BatchState::default(),
            journal: None,
            signals: DocumentSignals::default(),
        }
    }

    /// Create an empty document.
    pub fn empty(config: DocumentConfig) -> Self {
        Self::new("", config)
    }

    // ---- queries -------------------------------------------------------------------------

    /// Line storage.
    pub fn line_store(&self) -> &LineStore {
        &self.lines
    }

    /// Text of line `index`.
    pub fn line(&self, index: usize) -> &str {
        self.lines.line(index)
    }

    /// Number of lines (always at least 1).
    pub fn line_count(&self) -> usize {
        self.lines.line_count()
    }

    /// Longest line length in characters.
    pub fn max_length(&self) -> usize {
        self.lines.max_length()
    }

    /// Whole document joined with the configured line ending.
    pub fn text(&self) -> String {
        self.lines.text(self.config.line_ending)
    }

    /// Both carets.
    pub fn carets(&self) -> Carets {
        self.carets
    }

    /// Active configuration.
    pub fn config(&self) -> &DocumentConfig {
        &self.config
    }

    /// Version number; incremented by every batch that emits `modified`.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Returns `true` if the carets span a non-empty range.
    pub fn has_selection(&self) -> bool {
        self.carets.has_selection()
    }

    /// Selected range as `(min, max)`, or `None` without a selection.
    pub fn selection_range(&self) -> Option<(Caret, Caret)> {
        self.has_selection().then(|| self.carets.range())
    }

    /// Selected text joined with the configured line ending (empty without a selection).
    pub fn selected_text(&self) -> String {
        let Some((start, end)) = self.selection_range() else {
            return String::new();
        };
        if start.line == end.line {
            return slice_columns(self.lines.line(start.line), start.column, end.column)
                .to_string();
        }

        let mut parts: Vec<&str> = Vec::with_capacity(end.line - start.line + 1);
        parts.push(split_at_column(self.lines.line(start.line), start.column).1);
        for line in start.line + 1..end.line {
            parts.push(self.lines.line(line));
        }
        parts.push(split_at_column(self.lines.line(end.line), end.column).0);
        self.config.line_ending.join(&parts)
    }

    /// Can undo
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Can redo
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Undo stack depth
    pub fn undo_depth(&self) -> usize {
        self.history.undo_depth()
    }

    /// Redo stack depth
    pub fn redo_depth(&self) -> usize {
        self.history.redo_depth()
    }

    /// Whether the document matches its last saved state.
    pub fn is_clean(&self) -> bool {
        self.history.is_clean()
    }

    /// Mark the current state as saved.
    pub fn mark_clean(&mut self) {
        self.history.mark_clean();
    }

    // ---- notifications -------------------------------------------------------------------

    /// Notification channels, for subscribing.
    pub fn signals(&mut self) -> &mut DocumentSignals {
        &mut self.signals
    }

    /// Start recording line events for [`take_line_events`](Self::take_line_events).
    pub fn enable_line_journal(&mut self) {
        self.journal.get_or_insert_with(Vec::new);
    }

    /// Drain the recorded line events, in mutation order.
    pub fn take_line_events(&mut self) -> Vec<LineEvent> {
        self.journal.as_mut().map(std::mem::take).unwrap_or_default()
    }

    // ---- batching ------------------------------------------------------------------------

    /// Run `f` as one user-visible action.
    ///
    /// Re-entrant: calls made while a batch is open run inside the outer batch.
    pub fn batch<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        if self.batch.depth > 0 {
            self.batch.depth += 1;
            let result = f(self);
            self.batch.depth -= 1;
            return result;
        }

        self.batch = BatchState {
            depth: 1,
            carets_before: self.carets,
            structural: false,
        };
        let result = f(self);
        self.batch.depth = 0;
        self.finish_batch();
        result
    }

    fn finish_batch(&mut self) {
        let moved = self.carets != self.batch.carets_before;
        let structural = self.batch.structural;

        if moved {
            self.signals.carets_moved.emit(&self.carets);
        }
        if moved || structural {
            let old_version = self.version;
            self.version += 1;
            self.signals.modified.emit(&DocumentChange {
                old_version,
                new_version: self.version,
                structural,
            });
        }
        debug!(moved, structural, version = self.version, "batch finished");
    }

    fn run(&mut self, command: EditCommand) {
        self.history.run(command, &mut self.lines, &mut self.carets);
        self.publish_line_events();
    }

    fn publish_line_events(&mut self) {
        for event in self.lines.take_events() {
            self.batch.structural = true;
            match event.kind {
                LineChangeKind::Added => self.signals.line_added.emit(&event),
                LineChangeKind::Modified => self.signals.line_modified.emit(&event),
                LineChangeKind::Removed => self.signals.line_removed.emit(&event),
            }
            if let Some(journal) = self.journal.as_mut() {
                journal.push(event);
            }
        }
    }

    // ---- editing -------------------------------------------------------------------------

    /// Delete the selection as its own undoable command.
    ///
    /// Returns `true` if there was a selection to delete.
    pub fn delete_selection(&mut self) -> bool {
        self.batch(|doc| {
            if !doc.has_selection() {
                return false;
            }
            doc.run(EditCommand::delete_selection(doc.carets));
            true
        })
    }

    /// Delete the selection, or the character before the caret (merging lines at column 0).
    pub fn backspace(&mut self) {
        self.batch(|doc| {
            if doc.delete_selection() {
                return;
            }
            if doc.carets.enter == Caret::new(0, 0) {
                return;
            }
            doc.run(EditCommand::backspace(doc.carets));
        });
    }

    /// Delete the selection, or the character after the caret (merging lines at end of line).
    pub fn delete(&mut self) {
        self.batch(|doc| {
            if doc.delete_selection() {
                return;
            }
            if doc.carets.enter == doc.document_end() {
                return;
            }
            doc.run(EditCommand::delete_forward(doc.carets));
        });
    }

    /// Type a character, replacing the selection.
    ///
    /// `'\n'` behaves like [`enter`](Self::enter), `'\t'` like [`tab`](Self::tab), and `'\r'` is
    /// ignored.
    pub fn add_char(&mut self, ch: char) {
        match ch {
            '\n' => self.enter(),
            '\t' => self.tab(),
            '\r' => {}
            _ => self.batch(|doc| {
                doc.delete_selection();
                doc.run(EditCommand::insert_char(doc.carets, ch));
            }),
        }
    }

    /// Replace the selection with spaces up to the next tab stop.
    pub fn tab(&mut self) {
        self.batch(|doc| {
            doc.delete_selection();
            let tab_width = doc.config.tab_width.max(1);
            let spaces = tab_width - doc.carets.enter.column % tab_width;
            doc.run(EditCommand::insert_block(doc.carets, vec![" ".repeat(spaces)]));
        });
    }

    /// Replace the selection with a line break.
    ///
    /// At end of line the leading whitespace of the line is repeated on the new line, as a second
    /// command so undo unwinds both steps.
    pub fn enter(&mut self) {
        self.batch(|doc| {
            doc.delete_selection();
            let at = doc.carets.enter;
            let at_line_end = at.column == doc.lines.line_len(at.line);
            let indent = if doc.config.auto_indent && at_line_end {
                leading_whitespace(doc.lines.line(at.line)).to_string()
            } else {
                String::new()
            };

            doc.run(EditCommand::insert_line_break(doc.carets));
            if !indent.is_empty() {
                doc.run(EditCommand::insert_block(doc.carets, vec![indent]));
            }
        });
    }

    /// Undo the most recent command.
    pub fn undo(&mut self) {
        self.batch(|doc| {
            if doc.history.undo(&mut doc.lines, &mut doc.carets) {
                doc.publish_line_events();
            }
        });
    }

    /// Redo the most recently undone command.
    pub fn redo(&mut self) {
        self.batch(|doc| {
            if doc.history.redo(&mut doc.lines, &mut doc.carets) {
                doc.publish_line_events();
            }
        });
    }

    /// Replace the whole content, clearing history and resetting the carets.
    pub fn reset(&mut self, text: &str) {
        self.batch(|doc| {
            doc.lines.replace_all(normalize_lines(text));
            doc.history.clear();
            doc.carets = Carets::default();
            doc.publish_line_events();
        });
    }

    // ---- clipboard -----------------------------------------------------------------------

    /// Copy the selection to `clipboard`. Does nothing without a selection.
    pub fn copy<C: Clipboard + ?Sized>(&self, clipboard: &mut C) {
        if self.has_selection() {
            clipboard.set_data(&self.selected_text());
        }
    }

    /// Copy the selection to `clipboard` and delete it.
    pub fn cut<C: Clipboard + ?Sized>(&mut self, clipboard: &mut C) {
        self.batch(|doc| {
            if !doc.has_selection() {
                return;
            }
            clipboard.set_data(&doc.selected_text());
            doc.delete_selection();
        });
    }

    /// Replace the selection with the clipboard text (normalized at the boundary).
    pub fn paste<C: Clipboard + ?Sized>(&mut self, clipboard: &mut C) {
        let Some(text) = clipboard.get_data() else {
            return;
        };
        let fragments = normalize_lines(&text);
        if fragments.len() == 1 && fragments[0].is_empty() {
            return;
        }
        self.batch(|doc| {
            doc.delete_selection();
            doc.run(EditCommand::insert_block(doc.carets, fragments));
        });
    }

    // ---- carets --------------------------------------------------------------------------

    /// Select the whole document (anchor at the start, caret at the end).
    pub fn select_all(&mut self) {
        self.batch(|doc| {
            doc.carets = Carets {
                enter: doc.document_end(),
                selection: Caret::new(0, 0),
            };
        });
    }

    /// Place one caret, clamped into the document.
    pub fn set_caret(&mut self, slot: CaretSlot, line: usize, column: usize) {
        self.batch(|doc| {
            let caret = Caret::new(line, column).clamp(&doc.lines);
            doc.carets.set(slot, caret);
        });
    }

    /// Place both carets, clamped into the document.
    pub fn set_carets(&mut self, enter: Caret, selection: Caret) {
        self.batch(|doc| {
            doc.carets = Carets {
                enter: enter.clamp(&doc.lines),
                selection: selection.clamp(&doc.lines),
            };
        });
    }

    /// Move one caret independently of the other.
    pub fn move_caret(&mut self, slot: CaretSlot, direction: Direction) {
        self.batch(|doc| {
            let moved = doc.step(doc.carets.get(slot), direction);
            doc.carets.set(slot, moved);
        });
    }

    /// Move the `enter` caret left; without `select` the selection collapses onto it.
    pub fn left(&mut self, select: bool) {
        self.move_enter(select, |doc, caret| doc.step(caret, Direction::Left));
    }

    /// Move the `enter` caret right.
    pub fn right(&mut self, select: bool) {
        self.move_enter(select, |doc, caret| doc.step(caret, Direction::Right));
    }

    /// Move the `enter` caret up.
    pub fn up(&mut self, select: bool) {
        self.move_enter(select, |doc, caret| doc.step(caret, Direction::Up));
    }

    /// Move the `enter` caret down.
    pub fn down(&mut self, select: bool) {
        self.move_enter(select, |doc, caret| doc.step(caret, Direction::Down));
    }

    /// Move to the start of the line.
    pub fn home(&mut self, select: bool) {
        self.move_enter(select, |_, caret| Caret::new(caret.line, 0));
    }

    /// Move to the end of the line.
    pub fn end(&mut self, select: bool) {
        self.move_enter(select, |doc, caret| {
            Caret::new(caret.line, doc.lines.line_len(caret.line))
        });
    }

    /// Move up by one page.
    pub fn page_up(&mut self, select: bool) {
        self.move_enter(select, |doc, caret| {
            let line = caret.line.saturating_sub(doc.config.page_lines);
            Caret::new(line, caret.column).clamp(&doc.lines)
        });
    }

    /// Move down by one page.
    pub fn page_down(&mut self, select: bool) {
        self.move_enter(select, |doc, caret| {
            let line = caret.line.saturating_add(doc.config.page_lines);
            Caret::new(line, caret.column).clamp(&doc.lines)
        });
    }

    fn move_enter(&mut self, select: bool, target: impl FnOnce(&Self, Caret) -> Caret) {
        self.batch(|doc| {
            let moved = target(doc, doc.carets.enter);
            doc.carets.enter = moved;
            if !select {
                doc.carets.selection = moved;
            }
        });
    }

    fn step(&self, caret: Caret, direction: Direction) -> Caret {
        let last_line = self.lines.line_count() - 1;
        match direction {
            Direction::Left if caret.column > 0 => Caret::new(caret.line, caret.column - 1),
            Direction::Left if caret.line > 0 => {
                Caret::new(caret.line - 1, self.lines.line_len(caret.line - 1))
            }
            Direction::Right if caret.column < self.lines.line_len(caret.line) => {
                Caret::new(caret.line, caret.column + 1)
            }
            Direction::Right if caret.line < last_line => Caret::new(caret.line + 1, 0),
            Direction::Up if caret.line > 0 => {
                Caret::new(caret.line - 1, caret.column).clamp(&self.lines)
            }
            Direction::Down if caret.line < last_line => {
                Caret::new(caret.line + 1, caret.column).clamp(&self.lines)
            }
            _ => caret,
        }
    }

    fn document_end(&self) -> Caret {
        let last = self.lines.line_count() - 1;
        Caret::new(last, self.lines.line_len(last))
    }
}
