//! The document model: ordered blocks, a selection, undo history and the
//! pending change queue.
//!
//! The document is the shared mutable resource every listener reacts to.
//! All mutation goes through [`Transaction`]; committed batches queue up
//! as [`ChangeSet`]s and are drained by the embedding host, which keeps
//! notification delivery synchronous and ordered.

use std::collections::{BTreeSet, VecDeque};
use std::fmt;

pub mod block;
pub mod markup;
pub mod schema;
mod selection;
mod transaction;

pub use block::{AttrSpan, Block, BlockKind, OBJECT_CHAR};
pub use schema::Schema;
pub use selection::Selection;
pub use transaction::Transaction;

use crate::change::{ChangeOrigin, ChangeSet, MutationEntry};
use crate::position::Position;

/// One undoable step: the pre-change snapshot of every touched block plus
/// the pre-change selection.
pub(crate) struct UndoStep {
    pub(crate) snapshots: Vec<(usize, Block)>,
    pub(crate) selection: Selection,
}

/// A block-structured document.
pub struct Document {
    pub(crate) blocks: Vec<Block>,
    selection: Selection,
    undo: Vec<UndoStep>,
    pending: VecDeque<ChangeSet>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{block}")?;
        }
        Ok(())
    }
}

// Constructors
impl Document {
    /// A document holding a single empty paragraph.
    pub fn new() -> Self {
        Self::from_blocks(vec![Block::new(BlockKind::Paragraph)])
    }

    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        Self {
            blocks,
            selection: Selection::default(),
            undo: Vec::new(),
            pending: VecDeque::new(),
        }
    }
}

// Accessors
impl Document {
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn block(&self, index: usize) -> &Block {
        &self.blocks[index]
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub(crate) fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    /// The block containing the selection focus.
    pub fn focus_block(&self) -> &Block {
        &self.blocks[self.selection.focus.block]
    }
}

// Selection placement
impl Document {
    /// Place a collapsed caret, recomputing the selection attributes from
    /// the character before the caret (falling back to the one after, so
    /// a caret at the start of styled text still types styled).
    pub fn set_caret(&mut self, pos: Position) {
        let pos = self.clamp(pos);
        let attrs = self.attrs_around(pos);
        self.selection = Selection::caret(pos);
        self.selection.set_attributes(attrs);
    }

    /// Place a ranged selection.
    pub fn set_selection(&mut self, anchor: Position, focus: Position) {
        let anchor = self.clamp(anchor);
        let focus = self.clamp(focus);
        self.selection = Selection::range(anchor, focus);
    }

    fn clamp(&self, pos: Position) -> Position {
        let block = pos.block.min(self.blocks.len().saturating_sub(1));
        let offset = pos.offset.min(self.blocks[block].len_chars());
        Position::new(block, offset)
    }

    fn attrs_around(&self, pos: Position) -> BTreeSet<String> {
        let block = &self.blocks[pos.block];
        if pos.offset > 0 {
            block.attrs_covering(pos.offset - 1)
        } else {
            block.attrs_covering(0)
        }
    }
}

// Transactions, undo and the pending change queue
impl Document {
    /// Open a writer for one atomic batch with the given origin.
    pub fn transaction(&mut self, origin: ChangeOrigin) -> Transaction<'_> {
        Transaction::new(self, origin)
    }

    /// Revert the most recent undoable step. Returns false when there is
    /// nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(step) = self.undo.pop() else {
            return false;
        };
        let mut entries = Vec::with_capacity(step.snapshots.len());
        for (index, block) in step.snapshots {
            self.blocks[index] = block;
            entries.push(MutationEntry::ReplaceBlock { block: index });
        }
        self.selection = step.selection;
        self.pending.push_back(ChangeSet {
            origin: ChangeOrigin::Transform,
            entries,
        });
        true
    }

    /// Pop the oldest committed batch awaiting delivery.
    pub fn take_pending(&mut self) -> Option<ChangeSet> {
        self.pending.pop_front()
    }

    pub(crate) fn push_pending(&mut self, change: ChangeSet) {
        self.pending.push_back(change);
    }

    pub(crate) fn push_undo(&mut self, step: UndoStep) {
        self.undo.push(step);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caret_inherits_attrs_of_preceding_char() {
        let mut block = Block::paragraph("plain");
        block.push_text("bold", &["bold".to_string()].into_iter().collect());
        let mut doc = Document::from_blocks(vec![block]);

        doc.set_caret(Position::new(0, 9));
        assert!(doc.selection().attributes().contains("bold"));

        doc.set_caret(Position::new(0, 3));
        assert!(doc.selection().attributes().is_empty());

        // At the very start of a styled block the following char decides.
        let mut styled = Block::new(BlockKind::Paragraph);
        styled.push_text("x", &["bold".to_string()].into_iter().collect());
        let mut doc = Document::from_blocks(vec![styled]);
        doc.set_caret(Position::new(0, 0));
        assert!(doc.selection().attributes().contains("bold"));
    }

    #[test]
    fn caret_clamps_to_content() {
        let mut doc = Document::from_blocks(vec![Block::paragraph("ab")]);
        doc.set_caret(Position::new(5, 99));
        assert_eq!(doc.selection().focus, Position::new(0, 2));
    }

    #[test]
    fn display_joins_blocks() {
        let doc = Document::from_blocks(vec![Block::paragraph("one"), Block::paragraph("two")]);
        assert_eq!(doc.to_string(), "one\ntwo");
    }
}
