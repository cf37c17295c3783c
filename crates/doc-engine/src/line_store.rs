//! Line store.
//!
//! The document's source of truth: an ordered sequence of lines (no terminators) plus the cached
//! length of the longest line. At least one line always exists.
//!
//! Every mutation records exactly one [`LineEvent`] describing the contiguous batch of lines it
//! touched. The owner drains those events with [`LineStore::take_events`] and publishes them.
//! Events accumulate until drained; a store used without a consumer can turn recording off with
//! [`LineStore::set_recording`].

use crate::line_ending::LineEnding;
use crate::text::{char_len, normalize_lines};
use tracing::trace;

/// A contiguous batch of lines starting at `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineChange {
    /// First affected line index.
    pub start: usize,
    /// Number of affected lines.
    pub count: usize,
}

impl LineChange {
    /// Create a new descriptor.
    pub fn new(start: usize, count: usize) -> Self {
        Self { start, count }
    }
}

/// What happened to the lines of a [`LineChange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineChangeKind {
    /// Lines were inserted at `start`.
    Added,
    /// Lines were rewritten in place.
    Modified,
    /// Lines were removed from `start`.
    Removed,
}

/// A recorded line mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineEvent {
    /// Mutation kind.
    pub kind: LineChangeKind,
    /// Affected line range.
    pub change: LineChange,
    /// Line texts: the new texts for `Added`/`Modified`, the removed texts for `Removed`.
    pub lines: Vec<String>,
}

/// Ordered line storage with a cached maximum line length.
#[derive(Debug, Clone)]
pub struct LineStore {
    lines: Vec<String>,
    lengths: Vec<usize>,
    max_length: usize,
    events: Vec<LineEvent>,
    recording: bool,
}

impl LineStore {
    /// Create a store holding a single empty line.
    pub fn new() -> Self {
        Self::from_lines(vec![String::new()])
    }

    /// Build a store from boundary text (normalized: `\r` stripped, tabs expanded).
    pub fn from_text(text: &str) -> Self {
        Self::from_lines(normalize_lines(text))
    }

    fn from_lines(mut lines: Vec<String>) -> Self {
        if lines.is_empty() {
            lines.push(String::new());
        }
        let lengths: Vec<usize> = lines.iter().map(|l| char_len(l)).collect();
        let max_length = lengths.iter().copied().max().unwrap_or(0);
        Self {
            lines,
            lengths,
            max_length,
            events: Vec::new(),
            recording: true,
        }
    }

    /// Number of lines (always at least 1).
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Length of the longest line in characters.
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Text of line `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= line_count()`.
    pub fn line(&self, index: usize) -> &str {
        &self.lines[index]
    }

    /// Text of line `index`, if it exists.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    /// Length of line `index` in characters.
    pub fn line_len(&self, index: usize) -> usize {
        self.lengths[index]
    }

    /// All lines in order.
    pub fn lines(&self) -> impl Iterator<Item = &str> + '_ {
        self.lines.iter().map(String::as_str)
    }

    /// Join all lines with `line_ending`.
    pub fn text(&self, line_ending: LineEnding) -> String {
        line_ending.join(&self.lines)
    }

    /// Rewrite line `index` in place; returns the previous text.
    pub fn set_line(&mut self, index: usize, text: String) -> String {
        let new_len = char_len(&text);
        let old_len = std::mem::replace(&mut self.lengths[index], new_len);
        let old = std::mem::replace(&mut self.lines[index], text.clone());

        if new_len >= self.max_length {
            self.max_length = new_len;
        } else if old_len == self.max_length {
            self.recompute_max_length();
        }

        self.record(LineChangeKind::Modified, LineChange::new(index, 1), vec![text]);
        old
    }

    /// Insert `lines` before line `index` (`index == line_count()` appends).
    ///
    /// Inserting nothing is a no-op and records no event.
    pub fn insert_lines(&mut self, index: usize, lines: Vec<String>) {
        if lines.is_empty() {
            return;
        }
        let count = lines.len();
        let lengths: Vec<usize> = lines.iter().map(|l| char_len(l)).collect();
        if let Some(&longest) = lengths.iter().max() {
            self.max_length = self.max_length.max(longest);
        }
        self.lengths.splice(index..index, lengths);
        self.lines.splice(index..index, lines.iter().cloned());
        self.record(LineChangeKind::Added, LineChange::new(index, count), lines);
    }

    /// Remove `count` lines starting at `index`; returns the removed texts.
    ///
    /// # Panics
    ///
    /// Panics if the removal would leave the store without lines.
    pub fn remove_lines(&mut self, index: usize, count: usize) -> Vec<String> {
        if count == 0 {
            return Vec::new();
        }
        assert!(
            count < self.lines.len(),
            "line store must keep at least one line"
        );
        let removed_lengths: Vec<usize> = self.lengths.drain(index..index + count).collect();
        let removed: Vec<String> = self.lines.drain(index..index + count).collect();
        if removed_lengths.contains(&self.max_length) {
            self.recompute_max_length();
        }
        self.record(
            LineChangeKind::Removed,
            LineChange::new(index, count),
            removed.clone(),
        );
        removed
    }

    /// Replace the whole content.
    ///
    /// Records one `Removed` event for the old lines and one `Added` event for the new ones.
    pub fn replace_all(&mut self, mut lines: Vec<String>) {
        if lines.is_empty() {
            lines.push(String::new());
        }
        let replacement = Self::from_lines(lines);
        let old_lines = std::mem::replace(&mut self.lines, replacement.lines);
        self.lengths = replacement.lengths;
        self.max_length = replacement.max_length;

        let old_count = old_lines.len();
        self.record(
            LineChangeKind::Removed,
            LineChange::new(0, old_count),
            old_lines,
        );
        self.record(
            LineChangeKind::Added,
            LineChange::new(0, self.lines.len()),
            self.lines.clone(),
        );
    }

    /// Turn event recording on or off. Turning it off drops any undrained events.
    pub fn set_recording(&mut self, recording: bool) {
        self.recording = recording;
        if !recording {
            self.events.clear();
        }
    }

    /// Whether mutations currently record events.
    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Drain the events recorded since the last call.
    pub fn take_events(&mut self) -> Vec<LineEvent> {
        std::mem::take(&mut self.events)
    }

    /// Returns `true` if events are waiting to be drained.
    pub fn has_pending_events(&self) -> bool {
        !self.events.is_empty()
    }

    fn recompute_max_length(&mut self) {
        self.max_length = self.lengths.iter().copied().max().unwrap_or(0);
    }

    fn record(&mut self, kind: LineChangeKind, change: LineChange, lines: Vec<String>) {
        trace!(?kind, start = change.start, count = change.count, "line change");
        if !self.recording {
            return;
        }
        self.events.push(LineEvent {
            kind,
            change,
            lines,
        });
    }
}

impl Default for LineStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store_has_one_line() {
        let store = LineStore::new();
        assert_eq!(store.line_count(), 1);
        assert_eq!(store.line(0), "");
        assert_eq!(store.max_length(), 0);

        let store = LineStore::from_text("");
        assert_eq!(store.line_count(), 1);
    }

    #[test]
    fn test_from_text_normalizes() {
        let store = LineStore::from_text("a\r\n\tb\n");
        assert_eq!(store.lines().collect::<Vec<_>>(), vec!["a", "    b", ""]);
        assert_eq!(store.max_length(), 5);
        assert_eq!(store.text(LineEnding::Lf), "a\n    b\n");
    }

    #[test]
    fn test_max_length_tracks_mutations() {
        let mut store = LineStore::from_text("abc\nabcdef\nx");
        assert_eq!(store.max_length(), 6);

        store.set_line(1, "ab".to_string());
        assert_eq!(store.max_length(), 3);

        store.insert_lines(0, vec!["0123456789".to_string()]);
        assert_eq!(store.max_length(), 10);

        store.remove_lines(0, 1);
        assert_eq!(store.max_length(), 3);
    }

    #[test]
    fn test_each_mutation_records_one_event() {
        let mut store = LineStore::from_text("a\nb\nc");

        store.set_line(1, "B".to_string());
        store.insert_lines(3, vec!["d".to_string(), "e".to_string()]);
        let removed = store.remove_lines(0, 2);
        assert_eq!(removed, vec!["a", "B"]);

        let events = store.take_events();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].kind, LineChangeKind::Modified);
        assert_eq!(events[0].change, LineChange::new(1, 1));
        assert_eq!(events[1].kind, LineChangeKind::Added);
        assert_eq!(events[1].change, LineChange::new(3, 2));
        assert_eq!(events[1].lines, vec!["d", "e"]);
        assert_eq!(events[2].kind, LineChangeKind::Removed);
        assert_eq!(events[2].change, LineChange::new(0, 2));
        assert!(!store.has_pending_events());
    }

    #[test]
    fn test_insert_nothing_records_nothing() {
        let mut store = LineStore::new();
        store.insert_lines(0, Vec::new());
        assert!(store.take_events().is_empty());
    }

    #[test]
    fn test_replace_all() {
        let mut store = LineStore::from_text("a\nb");
        store.replace_all(vec!["x".to_string(), "y".to_string(), "z".to_string()]);
        assert_eq!(store.line_count(), 3);

        let events = store.take_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, LineChangeKind::Removed);
        assert_eq!(events[0].change, LineChange::new(0, 2));
        assert_eq!(events[1].kind, LineChangeKind::Added);
        assert_eq!(events[1].change, LineChange::new(0, 3));
    }

    #[test]
    fn test_recording_can_be_turned_off() {
        let mut store = LineStore::from_text("a");
        store.set_line(0, "b".to_string());
        store.set_recording(false);
        assert!(!store.is_recording());
        assert!(!store.has_pending_events());

        store.insert_lines(1, vec!["c".to_string()]);
        store.remove_lines(0, 1);
        assert!(!store.has_pending_events());
        assert_eq!(store.line(0), "c");

        store.set_recording(true);
        store.set_line(0, "d".to_string());
        assert_eq!(store.take_events().len(), 1);
    }

    #[test]
    #[should_panic(expected = "at least one line")]
    fn test_cannot_remove_every_line() {
        let mut store = LineStore::from_text("a\nb");
        store.remove_lines(0, 2);
    }
}
