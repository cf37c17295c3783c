//! Edit command set.
//!
//! Every document mutation is an [`EditCommand`]: a tagged [`EditOp`] plus the caret pair captured
//! right before execution. Executing a command fills in whatever text it removed, so
//! [`EditCommand::undo`] can restore the lines byte-for-byte and put both carets back.
//!
//! Re-executing a command after its own undo reproduces the original effect exactly, which is what
//! redo relies on.
//!
//! # Example
//!
//! ```rust
//! use doc_engine::{Caret, Carets, EditCommand, LineStore};
//!
//! let mut lines = LineStore::from_text("abc");
//! let mut carets = Carets::collapsed(Caret::new(0, 2));
//!
//! let mut command = EditCommand::backspace(carets);
//! command.execute(&mut lines, &mut carets);
//! assert_eq!(lines.line(0), "ac");
//!
//! command.undo(&mut lines, &mut carets);
//! assert_eq!(lines.line(0), "abc");
//! assert_eq!(carets.enter, Caret::new(0, 2));
//! ```

use crate::caret::{Caret, Carets};
use crate::line_store::LineStore;
use crate::text::{char_len, slice_columns, split_at_column};
use tracing::trace;

/// What a backspace/delete removed, captured during execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Erased {
    /// A single character.
    Char(char),
    /// A line break; the lines were merged and the join sits at `column` of the upper line.
    LineBreak {
        /// Column of the join point.
        column: usize,
    },
}

/// The mutation performed by an [`EditCommand`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOp {
    /// Insert one character at `at`.
    InsertChar {
        /// Insertion point.
        at: Caret,
        /// Inserted character (never a line break).
        ch: char,
    },
    /// Insert a block of text given as line fragments.
    ///
    /// The first fragment joins the text before `at`, the last joins the text after it, and any
    /// middle fragments become whole new lines.
    InsertBlock {
        /// Insertion point.
        at: Caret,
        /// Line fragments (at least one).
        fragments: Vec<String>,
    },
    /// Split the line at `at`.
    InsertLineBreak {
        /// Split point.
        at: Caret,
    },
    /// Merge `line` with the line after it.
    RemoveLineBreak {
        /// Upper line of the merge.
        line: usize,
        /// Join column, captured during execution.
        column: Option<usize>,
    },
    /// Remove columns `start..end` of a single line.
    DeleteSingleLineSelection {
        /// Line index.
        line: usize,
        /// First removed column.
        start: usize,
        /// End column (exclusive).
        end: usize,
        /// Removed text, captured during execution.
        removed: String,
    },
    /// Remove the range `start..end` spanning several lines.
    DeleteMultiLineSelection {
        /// Range start.
        start: Caret,
        /// Range end (exclusive).
        end: Caret,
        /// Every removed fragment: the tail of the first line, each interior line, and the head
        /// of the last line. Captured during execution.
        removed: Vec<String>,
    },
    /// Remove the character before `at`, or merge with the previous line at column 0.
    Backspace {
        /// Caret position.
        at: Caret,
        /// What was removed, captured during execution.
        erased: Option<Erased>,
    },
    /// Remove the character at `at`, or merge with the next line at end of line.
    DeleteForward {
        /// Caret position.
        at: Caret,
        /// What was removed, captured during execution.
        erased: Option<Erased>,
    },
}

/// A reversible document mutation; one instance is one history entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditCommand {
    carets_before: Carets,
    op: EditOp,
}

impl EditCommand {
    /// Create a command from its parts.
    pub fn new(carets_before: Carets, op: EditOp) -> Self {
        Self { carets_before, op }
    }

    /// Insert `ch` at the `enter` caret.
    pub fn insert_char(carets: Carets, ch: char) -> Self {
        debug_assert!(ch != '\n' && ch != '\r', "line breaks use insert_line_break");
        Self::new(carets, EditOp::InsertChar {
            at: carets.enter,
            ch,
        })
    }

    /// Insert line fragments at the `enter` caret.
    ///
    /// Fragments are already split at line boundaries; use
    /// [`Document::paste`](crate::Document::paste) for raw text.
    ///
    /// # Panics
    ///
    /// Panics if `fragments` is empty or a fragment contains `'\n'` or `'\r'`.
    pub fn insert_block(carets: Carets, fragments: Vec<String>) -> Self {
        assert!(!fragments.is_empty(), "insert_block needs a fragment");
        assert!(
            !fragments.iter().any(|fragment| fragment.contains(['\n', '\r'])),
            "insert_block fragments must not contain line breaks"
        );
        Self::new(carets, EditOp::InsertBlock {
            at: carets.enter,
            fragments,
        })
    }

    /// Split the line at the `enter` caret.
    pub fn insert_line_break(carets: Carets) -> Self {
        Self::new(carets, EditOp::InsertLineBreak { at: carets.enter })
    }

    /// Merge `line` with the following line.
    pub fn remove_line_break(carets: Carets, line: usize) -> Self {
        Self::new(carets, EditOp::RemoveLineBreak { line, column: None })
    }

    /// Delete the range between the two carets, picking the single- or multi-line variant.
    pub fn delete_selection(carets: Carets) -> Self {
        let (start, end) = carets.range();
        let op = if start.line == end.line {
            EditOp::DeleteSingleLineSelection {
                line: start.line,
                start: start.column,
                end: end.column,
                removed: String::new(),
            }
        } else {
            EditOp::DeleteMultiLineSelection {
                start,
                end,
                removed: Vec::new(),
            }
        };
        Self::new(carets, op)
    }

    /// Backspace at the `enter` caret.
    pub fn backspace(carets: Carets) -> Self {
        Self::new(carets, EditOp::Backspace {
            at: carets.enter,
            erased: None,
        })
    }

    /// Forward delete at the `enter` caret.
    pub fn delete_forward(carets: Carets) -> Self {
        Self::new(carets, EditOp::DeleteForward {
            at: carets.enter,
            erased: None,
        })
    }

    /// Caret pair captured before execution.
    pub fn carets_before(&self) -> Carets {
        self.carets_before
    }

    /// The underlying operation.
    pub fn op(&self) -> &EditOp {
        &self.op
    }

    /// Apply the command to `lines`, moving the carets to the post-edit position.
    pub fn execute(&mut self, lines: &mut LineStore, carets: &mut Carets) {
        trace!(op = ?self.op, "execute edit command");
        let after = match &mut self.op {
            EditOp::InsertChar { at, ch } => {
                let text = lines.line(at.line);
                let (prefix, suffix) = split_at_column(text, at.column);
                let merged = format!("{prefix}{ch}{suffix}");
                lines.set_line(at.line, merged);
                Caret::new(at.line, at.column + 1)
            }
            EditOp::InsertBlock { at, fragments } => insert_fragments(lines, *at, fragments),
            EditOp::InsertLineBreak { at } => {
                split_line(lines, *at);
                Caret::new(at.line + 1, 0)
            }
            EditOp::RemoveLineBreak { line, column } => {
                let join = join_with_next(lines, *line);
                *column = Some(join);
                Caret::new(*line, join)
            }
            EditOp::DeleteSingleLineSelection {
                line,
                start,
                end,
                removed,
            } => {
                *removed = remove_columns(lines, *line, *start, *end);
                Caret::new(*line, *start)
            }
            EditOp::DeleteMultiLineSelection {
                start,
                end,
                removed,
            } => {
                *removed = remove_range(lines, *start, *end);
                *start
            }
            EditOp::Backspace { at, erased } => {
                if at.column > 0 {
                    let ch = remove_char(lines, at.line, at.column - 1);
                    *erased = Some(Erased::Char(ch));
                    Caret::new(at.line, at.column - 1)
                } else if at.line > 0 {
                    let column = join_with_next(lines, at.line - 1);
                    *erased = Some(Erased::LineBreak { column });
                    Caret::new(at.line - 1, column)
                } else {
                    *erased = None;
                    *at
                }
            }
            EditOp::DeleteForward { at, erased } => {
                if at.column < lines.line_len(at.line) {
                    let ch = remove_char(lines, at.line, at.column);
                    *erased = Some(Erased::Char(ch));
                } else if at.line + 1 < lines.line_count() {
                    let column = join_with_next(lines, at.line);
                    *erased = Some(Erased::LineBreak { column });
                } else {
                    *erased = None;
                }
                *at
            }
        };
        *carets = Carets::collapsed(after);
    }

    /// Revert the effect of [`execute`](Self::execute) and restore the carets captured before it.
    pub fn undo(&mut self, lines: &mut LineStore, carets: &mut Carets) {
        trace!(op = ?self.op, "undo edit command");
        match &self.op {
            EditOp::InsertChar { at, .. } => {
                remove_char(lines, at.line, at.column);
            }
            EditOp::InsertBlock { at, fragments } => remove_fragments(lines, *at, fragments),
            EditOp::InsertLineBreak { at } => {
                join_with_next(lines, at.line);
            }
            EditOp::RemoveLineBreak { line, column } => {
                if let Some(column) = column {
                    split_line(lines, Caret::new(*line, *column));
                }
            }
            EditOp::DeleteSingleLineSelection {
                line,
                start,
                removed,
                ..
            } => {
                insert_fragments(lines, Caret::new(*line, *start), std::slice::from_ref(removed));
            }
            EditOp::DeleteMultiLineSelection { start, removed, .. } => {
                insert_fragments(lines, *start, removed);
            }
            EditOp::Backspace { at, erased } => match erased {
                Some(Erased::Char(ch)) => {
                    insert_char_at(lines, Caret::new(at.line, at.column - 1), *ch);
                }
                Some(Erased::LineBreak { column }) => {
                    split_line(lines, Caret::new(at.line - 1, *column));
                }
                None => {}
            },
            EditOp::DeleteForward { at, erased } => match erased {
                Some(Erased::Char(ch)) => insert_char_at(lines, *at, *ch),
                Some(Erased::LineBreak { column }) => {
                    split_line(lines, Caret::new(at.line, *column));
                }
                None => {}
            },
        }
        *carets = self.carets_before;
    }
}

fn insert_char_at(lines: &mut LineStore, at: Caret, ch: char) {
    let (prefix, suffix) = split_at_column(lines.line(at.line), at.column);
    let merged = format!("{prefix}{ch}{suffix}");
    lines.set_line(at.line, merged);
}

fn remove_char(lines: &mut LineStore, line: usize, column: usize) -> char {
    let (prefix, rest) = split_at_column(lines.line(line), column);
    let mut chars = rest.chars();
    let ch = chars
        .next()
        .expect("caret must address an existing character");
    let merged = format!("{prefix}{}", chars.as_str());
    lines.set_line(line, merged);
    ch
}

fn remove_columns(lines: &mut LineStore, line: usize, start: usize, end: usize) -> String {
    let text = lines.line(line);
    let removed = slice_columns(text, start, end).to_string();
    let (prefix, _) = split_at_column(text, start);
    let (_, suffix) = split_at_column(text, end);
    let merged = format!("{prefix}{suffix}");
    lines.set_line(line, merged);
    removed
}

fn split_line(lines: &mut LineStore, at: Caret) {
    let (prefix, suffix) = split_at_column(lines.line(at.line), at.column);
    let (prefix, suffix) = (prefix.to_string(), suffix.to_string());
    lines.set_line(at.line, prefix);
    lines.insert_lines(at.line + 1, vec![suffix]);
}

/// Merge `line` and `line + 1`; returns the join column.
fn join_with_next(lines: &mut LineStore, line: usize) -> usize {
    let column = lines.line_len(line);
    let merged = format!("{}{}", lines.line(line), lines.line(line + 1));
    lines.set_line(line, merged);
    lines.remove_lines(line + 1, 1);
    column
}

/// Insert line fragments at `at`; returns the caret after the inserted text.
fn insert_fragments(lines: &mut LineStore, at: Caret, fragments: &[String]) -> Caret {
    let (prefix, suffix) = split_at_column(lines.line(at.line), at.column);
    let (prefix, suffix) = (prefix.to_string(), suffix.to_string());

    match fragments {
        [] => at,
        [only] => {
            lines.set_line(at.line, format!("{prefix}{only}{suffix}"));
            Caret::new(at.line, at.column + char_len(only))
        }
        [first, middle @ .., last] => {
            lines.set_line(at.line, format!("{prefix}{first}"));
            let mut added: Vec<String> = middle.to_vec();
            added.push(format!("{last}{suffix}"));
            lines.insert_lines(at.line + 1, added);
            Caret::new(at.line + fragments.len() - 1, char_len(last))
        }
    }
}

/// Inverse of [`insert_fragments`].
fn remove_fragments(lines: &mut LineStore, at: Caret, fragments: &[String]) {
    match fragments {
        [] => {}
        [only] => {
            remove_columns(lines, at.line, at.column, at.column + char_len(only));
        }
        [.., last] => {
            let last_line = at.line + fragments.len() - 1;
            let (_, suffix) = split_at_column(lines.line(last_line), char_len(last));
            let suffix = suffix.to_string();
            let (prefix, _) = split_at_column(lines.line(at.line), at.column);
            let merged = format!("{prefix}{suffix}");
            lines.set_line(at.line, merged);
            lines.remove_lines(at.line + 1, fragments.len() - 1);
        }
    }
}

/// Remove `start..end` across lines; returns every removed fragment.
fn remove_range(lines: &mut LineStore, start: Caret, end: Caret) -> Vec<String> {
    let (prefix, head) = split_at_column(lines.line(start.line), start.column);
    let prefix = prefix.to_string();
    let mut removed = vec![head.to_string()];
    for line in start.line + 1..end.line {
        removed.push(lines.line(line).to_string());
    }
    let (tail, suffix) = split_at_column(lines.line(end.line), end.column);
    removed.push(tail.to_string());
    let merged = format!("{prefix}{suffix}");

    lines.set_line(start.line, merged);
    lines.remove_lines(start.line + 1, end.line - start.line);
    removed
}
