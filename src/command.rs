//! Host command layer: named operations with an observable enabled state.
//!
//! Commands are registered by name into a [`CommandRegistry`] at setup
//! time. Absence of a name is a valid "not available" state, never an
//! error. Enablement is a function of the current document (typically the
//! kind of the block holding the selection focus); execution runs inside
//! a caller-provided transaction so a failing command leaves no trace.

use std::collections::HashMap;

use crate::doc::{BlockKind, Document, Transaction};

/// The result of executing a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CmdResult {
    Success,
    Failure(CmdFailure),
}

/// The reason a command failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CmdFailure {
    /// The command is not enabled for the current selection.
    Disabled,
    /// The supplied parameters are not valid for this command.
    InvalidParams,
    /// No command with the given name is registered.
    UnknownCommand,
}

impl CmdResult {
    pub fn is_success(&self) -> bool {
        matches!(self, CmdResult::Success)
    }
}

/// Optional parameters for a command execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandParams {
    pub value: Option<String>,
}

impl CommandParams {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn value(value: &str) -> Self {
        Self {
            value: Some(value.to_string()),
        }
    }
}

/// A named, host-defined operation.
pub trait Command {
    /// Whether the command may execute against the current document.
    fn is_enabled(&self, doc: &Document) -> bool;

    /// Execute inside the given transaction.
    fn execute(&self, tx: &mut Transaction<'_>, params: &CommandParams) -> CmdResult;

    /// Parameter values this command currently accepts, for commands that
    /// parameterize over a discrete set (e.g. heading levels). Used at
    /// registration time to discover which matchers to generate.
    fn enabled_values(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Name-keyed registry of commands.
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<String, Box<dyn Command>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a command by name.
    pub fn add(&mut self, name: &str, command: impl Command + 'static) {
        self.commands.insert(name.to_string(), Box::new(command));
    }

    /// Look up a command by name.
    pub fn get(&self, name: &str) -> Option<&dyn Command> {
        self.commands.get(name).map(|c| c.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }
}

fn focus_kind(doc: &Document) -> BlockKind {
    doc.focus_block().kind()
}

// ─── Reference commands ─────────────────────────────────────────────────────

/// Which list flavor a [`ListCommand`] produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListStyle {
    Bulleted,
    Numbered,
}

impl ListStyle {
    fn kind(self) -> BlockKind {
        match self {
            ListStyle::Bulleted => BlockKind::BulletedListItem,
            ListStyle::Numbered => BlockKind::NumberedListItem,
        }
    }
}

/// Turn the focus block into a list item of the given style, or back into
/// a paragraph when it already is one.
pub struct ListCommand {
    style: ListStyle,
}

impl ListCommand {
    pub fn new(style: ListStyle) -> Self {
        Self { style }
    }
}

impl Command for ListCommand {
    fn is_enabled(&self, doc: &Document) -> bool {
        let kind = focus_kind(doc);
        kind.is_paragraph() || kind.is_list_item()
    }

    fn execute(&self, tx: &mut Transaction<'_>, _params: &CommandParams) -> CmdResult {
        if !self.is_enabled(tx.doc()) {
            return CmdResult::Failure(CmdFailure::Disabled);
        }
        let block = tx.doc().selection().focus.block;
        let target = self.style.kind();
        let next = if focus_kind(tx.doc()) == target {
            BlockKind::Paragraph
        } else {
            target
        };
        tx.set_block_kind(block, next);
        CmdResult::Success
    }
}

/// Turn the focus block into a heading. Parameterized by value
/// (`heading1`..`heading6`); only configured levels are accepted.
pub struct HeadingCommand {
    levels: Vec<u8>,
}

impl HeadingCommand {
    pub fn new(levels: &[u8]) -> Self {
        Self {
            levels: levels
                .iter()
                .copied()
                .filter(|l| (1..=6).contains(l))
                .collect(),
        }
    }
}

impl Command for HeadingCommand {
    fn is_enabled(&self, doc: &Document) -> bool {
        matches!(
            focus_kind(doc),
            BlockKind::Paragraph | BlockKind::Heading(_)
        )
    }

    fn execute(&self, tx: &mut Transaction<'_>, params: &CommandParams) -> CmdResult {
        if !self.is_enabled(tx.doc()) {
            return CmdResult::Failure(CmdFailure::Disabled);
        }
        let level = params
            .value
            .as_deref()
            .and_then(|v| v.strip_prefix("heading"))
            .and_then(|v| v.parse::<u8>().ok())
            .filter(|l| self.levels.contains(l));
        let Some(level) = level else {
            return CmdResult::Failure(CmdFailure::InvalidParams);
        };
        let block = tx.doc().selection().focus.block;
        let next = if focus_kind(tx.doc()) == BlockKind::Heading(level) {
            BlockKind::Paragraph
        } else {
            BlockKind::Heading(level)
        };
        tx.set_block_kind(block, next);
        CmdResult::Success
    }

    fn enabled_values(&self) -> Vec<String> {
        self.levels.iter().map(|l| format!("heading{l}")).collect()
    }
}

/// Toggle the focus block between paragraph and block quote. Enabled on
/// paragraphs and quotes only; a heading or list item stays what it is.
pub struct BlockQuoteCommand;

impl Command for BlockQuoteCommand {
    fn is_enabled(&self, doc: &Document) -> bool {
        matches!(
            focus_kind(doc),
            BlockKind::Paragraph | BlockKind::BlockQuote
        )
    }

    fn execute(&self, tx: &mut Transaction<'_>, _params: &CommandParams) -> CmdResult {
        if !self.is_enabled(tx.doc()) {
            return CmdResult::Failure(CmdFailure::Disabled);
        }
        let block = tx.doc().selection().focus.block;
        let next = if focus_kind(tx.doc()) == BlockKind::BlockQuote {
            BlockKind::Paragraph
        } else {
            BlockKind::BlockQuote
        };
        tx.set_block_kind(block, next);
        CmdResult::Success
    }
}

/// Toggle a text attribute. Over a ranged selection the attribute is set
/// unless the whole range already carries it; at a collapsed caret the
/// selection attribute flips, affecting subsequently typed text.
pub struct AttributeCommand {
    key: String,
}

impl AttributeCommand {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
        }
    }
}

impl Command for AttributeCommand {
    fn is_enabled(&self, _doc: &Document) -> bool {
        true
    }

    fn execute(&self, tx: &mut Transaction<'_>, _params: &CommandParams) -> CmdResult {
        let sel = tx.doc().selection().clone();
        if sel.is_collapsed() {
            if sel.attributes().contains(&self.key) {
                tx.clear_selection_attribute(&self.key);
            } else {
                tx.add_selection_attribute(&self.key);
            }
            return CmdResult::Success;
        }
        let (start, end) = (sel.start(), sel.end());
        if start.block != end.block {
            return CmdResult::Failure(CmdFailure::InvalidParams);
        }
        let covered = {
            let block = tx.doc().block(start.block);
            (start.offset..end.offset)
                .filter(|&o| !block.is_object(o))
                .all(|o| block.attrs_covering(o).contains(&self.key))
        };
        if covered {
            tx.remove_attribute(&self.key, start.block, start.offset..end.offset);
        } else {
            tx.set_attribute(&self.key, start.block, start.offset..end.offset);
        }
        CmdResult::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::ChangeOrigin;
    use crate::doc::Block;
    use crate::position::Position;

    fn doc(kind: BlockKind) -> Document {
        Document::from_blocks(vec![Block::with_text(kind, "text")])
    }

    #[test]
    fn list_command_toggles() {
        let cmd = ListCommand::new(ListStyle::Bulleted);
        let mut d = doc(BlockKind::Paragraph);
        assert!(cmd.is_enabled(&d));

        let mut tx = d.transaction(ChangeOrigin::Transform);
        assert!(cmd.execute(&mut tx, &CommandParams::none()).is_success());
        tx.commit();
        assert_eq!(d.block(0).kind(), BlockKind::BulletedListItem);

        let mut tx = d.transaction(ChangeOrigin::Transform);
        assert!(cmd.execute(&mut tx, &CommandParams::none()).is_success());
        tx.commit();
        assert_eq!(d.block(0).kind(), BlockKind::Paragraph);
    }

    #[test]
    fn heading_command_respects_configured_levels() {
        let cmd = HeadingCommand::new(&[1, 3]);
        assert_eq!(cmd.enabled_values(), vec!["heading1", "heading3"]);

        let mut d = doc(BlockKind::Paragraph);
        let mut tx = d.transaction(ChangeOrigin::Transform);
        assert_eq!(
            cmd.execute(&mut tx, &CommandParams::value("heading2")),
            CmdResult::Failure(CmdFailure::InvalidParams)
        );
        assert!(
            cmd.execute(&mut tx, &CommandParams::value("heading3"))
                .is_success()
        );
        tx.commit();
        assert_eq!(d.block(0).kind(), BlockKind::Heading(3));
    }

    #[test]
    fn block_quote_disabled_in_heading() {
        let d = doc(BlockKind::Heading(1));
        assert!(!BlockQuoteCommand.is_enabled(&d));
        let d = doc(BlockKind::Paragraph);
        assert!(BlockQuoteCommand.is_enabled(&d));
    }

    #[test]
    fn attribute_command_toggles_over_range() {
        let cmd = AttributeCommand::new("bold");
        let mut d = doc(BlockKind::Paragraph);
        d.set_selection(Position::new(0, 0), Position::new(0, 4));

        let mut tx = d.transaction(ChangeOrigin::Transform);
        assert!(cmd.execute(&mut tx, &CommandParams::none()).is_success());
        tx.commit();
        assert_eq!(
            d.block(0).attrs_covering(2),
            std::collections::BTreeSet::from(["bold".to_string()])
        );

        let mut tx = d.transaction(ChangeOrigin::Transform);
        assert!(cmd.execute(&mut tx, &CommandParams::none()).is_success());
        tx.commit();
        assert!(d.block(0).attr_spans().is_empty());
    }

    #[test]
    fn registry_lookup_and_absence() {
        let mut registry = CommandRegistry::new();
        registry.add("bulletedList", ListCommand::new(ListStyle::Bulleted));
        assert!(registry.contains("bulletedList"));
        assert!(registry.get("numberedList").is_none());
    }
}
