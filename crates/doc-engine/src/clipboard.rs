//! Clipboard interface.
//!
//! OS integration lives outside the engine; hosts pass an implementation of [`Clipboard`] to
//! `cut`/`copy`/`paste`. Text crossing this boundary is a finished string.

/// Clipboard collaborator.
pub trait Clipboard {
    /// Current clipboard text, if any.
    fn get_data(&mut self) -> Option<String>;

    /// Replace the clipboard text.
    fn set_data(&mut self, text: &str);
}

/// In-process clipboard, useful for headless hosts and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryClipboard {
    data: Option<String>,
}

impl MemoryClipboard {
    /// Create an empty clipboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clipboard holding `text`.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            data: Some(text.into()),
        }
    }

    /// Peek at the stored text.
    pub fn text(&self) -> Option<&str> {
        self.data.as_deref()
    }
}

impl Clipboard for MemoryClipboard {
    fn get_data(&mut self) -> Option<String> {
        self.data.clone()
    }

    fn set_data(&mut self, text: &str) {
        self.data = Some(text.to_string());
    }
}
