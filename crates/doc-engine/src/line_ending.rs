//! Line ending helpers.
//!
//! `doc-engine` stores lines without terminators; separators are structural. When text leaves the
//! document (`text()`, copy/cut) the lines are joined with the configured [`LineEnding`].

/// The newline sequence used when joining document lines into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    /// `\n`
    Lf,
    /// `\r\n` (default)
    #[default]
    Crlf,
}

impl LineEnding {
    /// The separator as a string slice.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::Crlf => "\r\n",
        }
    }

    /// Join lines with this separator.
    pub fn join<S: AsRef<str>>(self, lines: &[S]) -> String {
        let mut joined = String::new();
        for (index, line) in lines.iter().enumerate() {
            if index > 0 {
                joined.push_str(self.as_str());
            }
            joined.push_str(line.as_ref());
        }
        joined
    }
}
