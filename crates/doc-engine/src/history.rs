//! Command history.
//!
//! LIFO undo and redo stacks of [`EditCommand`]s. Running a new command clears the redo branch.
//! Each keystroke is its own entry; there is no coalescing.
//!
//! The history also tracks a clean point (the undo depth at which the document was last saved),
//! so dirty state survives undo/redo back to the saved state.

use crate::caret::Carets;
use crate::commands::EditCommand;
use crate::line_store::LineStore;
use tracing::trace;

/// Undo/redo stacks with clean-point tracking.
#[derive(Debug)]
pub struct History {
    undo_stack: Vec<EditCommand>,
    redo_stack: Vec<EditCommand>,
    max_undo: Option<usize>,
    /// Undo depth of the saved state; above the current depth while it sits in the redo branch,
    /// `None` once unreachable.
    clean_index: Option<usize>,
}

impl History {
    /// Create an empty history. `max_undo` bounds the undo stack; `None` means unbounded.
    pub fn new(max_undo: Option<usize>) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_undo,
            clean_index: Some(0),
        }
    }

    /// Execute `command` and push it onto the undo stack, discarding the redo branch.
    pub fn run(&mut self, mut command: EditCommand, lines: &mut LineStore, carets: &mut Carets) {
        command.execute(lines, carets);
        self.push(command);
    }

    /// Undo the most recent command. Returns `false` if there was nothing to undo.
    pub fn undo(&mut self, lines: &mut LineStore, carets: &mut Carets) -> bool {
        let Some(mut command) = self.undo_stack.pop() else {
            return false;
        };
        command.undo(lines, carets);
        self.redo_stack.push(command);
        trace!(undo_depth = self.undo_stack.len(), "undo");
        true
    }

    /// Redo the most recently undone command. Returns `false` if there was nothing to redo.
    pub fn redo(&mut self, lines: &mut LineStore, carets: &mut Carets) -> bool {
        let Some(mut command) = self.redo_stack.pop() else {
            return false;
        };
        command.execute(lines, carets);
        self.undo_stack.push(command);
        trace!(undo_depth = self.undo_stack.len(), "redo");
        true
    }

    /// Can undo
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Can redo
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Undo stack depth
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Redo stack depth
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Whether the current position is the clean point.
    pub fn is_clean(&self) -> bool {
        self.clean_index == Some(self.undo_stack.len())
    }

    /// Mark the current position as the clean point (call after saving).
    pub fn mark_clean(&mut self) {
        self.clean_index = Some(self.undo_stack.len());
    }

    /// Drop every entry and reset the clean point to the empty history.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.clean_index = Some(0);
    }

    fn discard_redo_branch(&mut self) {
        if self.redo_stack.is_empty() {
            return;
        }

        // A clean point inside the dropped branch can never be reached again.
        if let Some(clean_index) = self.clean_index
            && clean_index > self.undo_stack.len()
        {
            self.clean_index = None;
        }

        self.redo_stack.clear();
    }

    fn push(&mut self, command: EditCommand) {
        self.discard_redo_branch();

        if let Some(max_undo) = self.max_undo {
            if max_undo == 0 {
                self.clean_index = None;
                return;
            }
            while self.undo_stack.len() >= max_undo {
                self.undo_stack.remove(0);
                self.clean_index = match self.clean_index {
                    Some(0) | None => None,
                    Some(clean_index) => Some(clean_index - 1),
                };
            }
        }

        self.undo_stack.push(command);
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(None)
    }
}
