//! Configuration.

use crate::line_ending::LineEnding;
use std::time::Duration;

/// Document editing behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentConfig {
    /// Tab stop width used by the tab key (spaces are inserted up to the next stop).
    pub tab_width: usize,
    /// Lines moved by page up / page down.
    pub page_lines: usize,
    /// Copy the leading whitespace of a line onto a new line created at its end.
    pub auto_indent: bool,
    /// Separator used when document lines are joined into text.
    pub line_ending: LineEnding,
    /// Maximum undo depth; `None` means unbounded.
    pub max_undo: Option<usize>,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            tab_width: 4,
            page_lines: 20,
            auto_indent: true,
            line_ending: LineEnding::Crlf,
            max_undo: None,
        }
    }
}

impl DocumentConfig {
    /// Set the tab width (clamped to at least 1).
    pub fn with_tab_width(mut self, tab_width: usize) -> Self {
        self.tab_width = tab_width.max(1);
        self
    }

    /// Set the page size.
    pub fn with_page_lines(mut self, page_lines: usize) -> Self {
        self.page_lines = page_lines.max(1);
        self
    }

    /// Enable or disable auto-indent.
    pub fn with_auto_indent(mut self, auto_indent: bool) -> Self {
        self.auto_indent = auto_indent;
        self
    }

    /// Set the line ending used for joined text.
    pub fn with_line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    /// Bound the undo history.
    pub fn with_max_undo(mut self, max_undo: Option<usize>) -> Self {
        self.max_undo = max_undo;
        self
    }
}

/// Configuration for the full [`Editor`](crate::Editor) pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    /// Document behavior.
    pub document: DocumentConfig,
    /// Quiet period the analysis trigger waits for before reparsing.
    pub quiet_period: Duration,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            document: DocumentConfig::default(),
            quiet_period: Duration::from_millis(300),
        }
    }
}

impl EditorConfig {
    /// Replace the document configuration.
    pub fn with_document(mut self, document: DocumentConfig) -> Self {
        self.document = document;
        self
    }

    /// Set the analysis quiet period.
    pub fn with_quiet_period(mut self, quiet_period: Duration) -> Self {
        self.quiet_period = quiet_period;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders() {
        let document = DocumentConfig::default()
            .with_tab_width(2)
            .with_max_undo(Some(10));
        let config = EditorConfig::default()
            .with_document(document.clone())
            .with_quiet_period(Duration::from_millis(50));

        assert_eq!(config.document, document);
        assert_eq!(config.document.tab_width, 2);
        assert_eq!(config.document.page_lines, 20);
        assert_eq!(config.quiet_period, Duration::from_millis(50));
    }
}
