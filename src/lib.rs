//! A real-time autoformatting engine for block-structured text documents.
//!
//! Watches the document change stream and converts short typed patterns
//! into structure or styling at the moment of typing: a leading `* `
//! becomes a bulleted list item, a span wrapped in `*…*` becomes italic
//! text. Matching is caret-anchored and reacts only to single locally
//! typed characters; every transformation commits as one atomic,
//! undoable transaction or not at all.
//!
//! # Example
//!
//! ```rust
//! use autoformat::{Editor, markup};
//!
//! let doc = markup::parse("<paragraph>**foobar*[]</paragraph>").unwrap();
//! let mut editor = Editor::standard(doc).unwrap();
//!
//! // Typing the closing delimiter strips both `**` markers and applies
//! // the bold attribute to the wrapped text.
//! editor.type_char('*');
//! assert_eq!(
//!     markup::data(editor.document()),
//!     "<paragraph><$text bold>foobar</$text>[]</paragraph>"
//! );
//!
//! // Block patterns convert the whole block.
//! let doc = markup::parse("<paragraph>#[]</paragraph>").unwrap();
//! let mut editor = Editor::standard(doc).unwrap();
//! editor.type_char(' ');
//! assert_eq!(markup::data(editor.document()), "<heading1>[]</heading1>");
//! ```

mod change;
mod command;
pub mod defaults;
mod doc;
mod editor;
pub mod engine;
mod position;

pub use change::{ChangeListener, ChangeOrigin, ChangeSet, MutationEntry};
pub use command::{
    AttributeCommand, BlockQuoteCommand, CmdFailure, CmdResult, Command, CommandParams,
    CommandRegistry, HeadingCommand, ListCommand, ListStyle,
};
pub use doc::{AttrSpan, Block, BlockKind, Document, OBJECT_CHAR, Schema, Selection, Transaction};
pub use doc::markup;
pub use editor::Editor;
pub use engine::{
    Action, ApplyCx, AttributeAction, Autoformat, BlockPattern, CommandAction, InlineMatch,
    InlinePattern,
};
pub use position::Position;
