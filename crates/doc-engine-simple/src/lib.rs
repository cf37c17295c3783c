//! `doc-engine-simple` - Simple (regex-based) lexer and bracket parser for `doc-engine`.
//!
//! These collaborators are intended for lightweight languages and tests, where a full grammar is
//! unnecessary. They plug into the engine through [`doc_engine::Lexer`] and
//! [`doc_engine::Parser`].
//!
//! ```rust
//! use doc_engine::{EditorConfig, Editor, ManualScheduler};
//! use doc_engine_simple::{BracketParser, RegexLexer};
//!
//! let lexer = RegexLexer::c_like().unwrap();
//! let editor = Editor::new(
//!     "f(x] {",
//!     Box::new(lexer),
//!     BracketParser::new(),
//!     ManualScheduler::new(),
//!     EditorConfig::default(),
//! );
//! assert_eq!(editor.analysis().result().errors.len(), 3);
//! ```

mod lexer;
mod parser;

pub use lexer::{LexerError, RegexLexer, TokenRule};
pub use parser::{BracketGroup, BracketParser, BracketTree};
