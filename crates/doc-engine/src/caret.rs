//! Caret model.
//!
//! A [`Caret`] is a zero-based `(line, column)` position. Columns count Unicode scalar values
//! (`char`s), and a column equal to the line length addresses the slot after the last character.
//!
//! The document keeps two carets in a [`Carets`] pair: `enter` is where typing happens and
//! `selection` is the anchor of the selection. Equal carets mean "no selection".

use crate::line_store::LineStore;
use std::cmp::Ordering;

/// Position coordinates (line and column numbers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Caret {
    /// Zero-based line index.
    pub line: usize,
    /// Zero-based column in characters within the line.
    pub column: usize,
}

impl Caret {
    /// Create a new caret.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Clamp the caret into the valid range of `lines`.
    ///
    /// The result satisfies `line < lines.line_count()` and `column <= lines.line_len(line)`.
    pub fn clamp(self, lines: &LineStore) -> Self {
        let line = self.line.min(lines.line_count() - 1);
        let column = self.column.min(lines.line_len(line));
        Self { line, column }
    }
}

impl Ord for Caret {
    fn cmp(&self, other: &Self) -> Ordering {
        self.line
            .cmp(&other.line)
            .then_with(|| self.column.cmp(&other.column))
    }
}

impl PartialOrd for Caret {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The `enter` caret and the `selection` anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Carets {
    /// Active caret (where text is entered).
    pub enter: Caret,
    /// Selection anchor.
    pub selection: Caret,
}

impl Carets {
    /// Both carets at the same position (no selection).
    pub fn collapsed(caret: Caret) -> Self {
        Self {
            enter: caret,
            selection: caret,
        }
    }

    /// Returns `true` when the carets span a non-empty range.
    pub fn has_selection(&self) -> bool {
        self.enter != self.selection
    }

    /// The selected range as `(min, max)`, half-open.
    pub fn range(&self) -> (Caret, Caret) {
        if self.enter <= self.selection {
            (self.enter, self.selection)
        } else {
            (self.selection, self.enter)
        }
    }

    /// Read one of the two carets.
    pub fn get(&self, slot: CaretSlot) -> Caret {
        match slot {
            CaretSlot::Enter => self.enter,
            CaretSlot::Selection => self.selection,
        }
    }

    /// Replace one of the two carets.
    pub fn set(&mut self, slot: CaretSlot, caret: Caret) {
        match slot {
            CaretSlot::Enter => self.enter = caret,
            CaretSlot::Selection => self.selection = caret,
        }
    }
}

/// Selects which of the two carets an operation addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaretSlot {
    /// The active caret.
    Enter,
    /// The selection anchor.
    Selection,
}

/// Caret movement direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// One character back, wrapping to the end of the previous line.
    Left,
    /// One character forward, wrapping to the start of the next line.
    Right,
    /// One line up, clamping the column.
    Up,
    /// One line down, clamping the column.
    Down,
}
