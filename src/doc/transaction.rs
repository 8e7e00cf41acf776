//! Scoped writer over a document.
//!
//! A transaction applies its operations eagerly but takes a snapshot of
//! every block it touches (and of the selection) before the first change
//! to it. Dropping the transaction without committing restores the
//! snapshots, so an aborted attempt leaves no visible trace. Committing
//! publishes the collected mutation entries as one batch and records one
//! undo step for the whole transaction.

use std::collections::BTreeSet;
use std::mem;
use std::ops::Range;

use crate::change::{ChangeOrigin, ChangeSet, MutationEntry};
use crate::doc::{Block, BlockKind, Document, Selection, UndoStep};
use crate::position::Position;

/// A writer capability scoped to one atomic, undoable batch.
pub struct Transaction<'a> {
    doc: &'a mut Document,
    origin: ChangeOrigin,
    entries: Vec<MutationEntry>,
    snapshots: Vec<(usize, Block)>,
    saved_selection: Selection,
    committed: bool,
}

impl<'a> Transaction<'a> {
    pub(crate) fn new(doc: &'a mut Document, origin: ChangeOrigin) -> Self {
        let saved_selection = doc.selection().clone();
        Self {
            doc,
            origin,
            entries: Vec::new(),
            snapshots: Vec::new(),
            saved_selection,
            committed: false,
        }
    }

    /// Read access to the document mid-transaction.
    pub fn doc(&self) -> &Document {
        self.doc
    }

    pub fn origin(&self) -> ChangeOrigin {
        self.origin
    }

    /// Insert text at a position, carrying the given attributes.
    pub fn insert_text(&mut self, pos: Position, text: &str, attrs: &BTreeSet<String>) {
        let length = text.chars().count();
        if length == 0 {
            return;
        }
        self.touch(pos.block);
        self.doc.blocks[pos.block].insert_text(pos.offset, text, attrs);
        self.doc
            .selection_mut()
            .map_insert(pos.block, pos.offset, length);
        self.entries.push(MutationEntry::InsertText {
            block: pos.block,
            offset: pos.offset,
            length,
        });
    }

    /// Delete a character range within a block.
    pub fn delete(&mut self, block: usize, range: Range<usize>) {
        if range.start >= range.end {
            return;
        }
        self.touch(block);
        self.doc.blocks[block].delete(range.clone());
        self.doc
            .selection_mut()
            .map_delete(block, range.start, range.end);
        self.entries.push(MutationEntry::DeleteText {
            block,
            offset: range.start,
            length: range.end - range.start,
        });
    }

    /// Apply an attribute over a character range.
    pub fn set_attribute(&mut self, key: &str, block: usize, range: Range<usize>) {
        if range.start >= range.end {
            return;
        }
        self.touch(block);
        self.doc.blocks[block].set_attr(key, range.clone());
        self.entries.push(MutationEntry::SetAttribute {
            block,
            key: key.to_string(),
            start: range.start,
            end: range.end,
        });
    }

    /// Remove an attribute from a character range.
    pub fn remove_attribute(&mut self, key: &str, block: usize, range: Range<usize>) {
        if range.start >= range.end {
            return;
        }
        self.touch(block);
        self.doc.blocks[block].remove_attr(key, range.clone());
        self.entries.push(MutationEntry::RemoveAttribute {
            block,
            key: key.to_string(),
            start: range.start,
            end: range.end,
        });
    }

    /// Change a block's structural kind.
    pub fn set_block_kind(&mut self, block: usize, kind: BlockKind) {
        self.touch(block);
        self.doc.blocks[block].set_kind(kind);
        self.entries.push(MutationEntry::SetBlockKind { block });
    }

    /// Remove an attribute from the active typing position, so text typed
    /// after the transaction does not carry it.
    pub fn clear_selection_attribute(&mut self, key: &str) {
        self.doc.selection_mut().clear_attribute(key);
    }

    /// Add an attribute at the active typing position.
    pub fn add_selection_attribute(&mut self, key: &str) {
        self.doc.selection_mut().add_attribute(key);
    }

    /// Whether any mutation has been recorded so far.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Commit: publish the batch to the pending change queue and record
    /// one undo step covering every touched block.
    pub fn commit(mut self) {
        self.committed = true;
        let entries = mem::take(&mut self.entries);
        let snapshots = mem::take(&mut self.snapshots);
        if entries.is_empty() {
            return;
        }
        if self.origin != ChangeOrigin::Remote {
            self.doc.push_undo(UndoStep {
                snapshots,
                selection: self.saved_selection.clone(),
            });
        }
        self.doc.push_pending(ChangeSet {
            origin: self.origin,
            entries,
        });
    }

    fn touch(&mut self, block: usize) {
        if !self.snapshots.iter().any(|(i, _)| *i == block) {
            self.snapshots.push((block, self.doc.blocks[block].clone()));
        }
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        for (index, block) in self.snapshots.drain(..) {
            self.doc.blocks[index] = block;
        }
        *self.doc.selection_mut() = self.saved_selection.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::ChangeOrigin;

    fn doc() -> Document {
        Document::from_blocks(vec![Block::paragraph("hello world")])
    }

    #[test]
    fn commit_publishes_one_batch() {
        let mut doc = doc();
        let mut tx = doc.transaction(ChangeOrigin::Transform);
        tx.delete(0, 0..6);
        tx.set_attribute("bold", 0, 0..5);
        tx.commit();

        assert_eq!(doc.block(0).text(), "world");
        let change = doc.take_pending().unwrap();
        assert_eq!(change.origin, ChangeOrigin::Transform);
        assert_eq!(change.entries.len(), 2);
        assert!(doc.take_pending().is_none());
    }

    #[test]
    fn dropped_transaction_rolls_back() {
        let mut doc = doc();
        doc.set_caret(Position::new(0, 11));
        {
            let mut tx = doc.transaction(ChangeOrigin::Transform);
            tx.delete(0, 0..6);
            tx.set_attribute("bold", 0, 0..5);
            // No commit.
        }
        assert_eq!(doc.block(0).text(), "hello world");
        assert!(doc.block(0).attr_spans().is_empty());
        assert_eq!(doc.selection().focus, Position::new(0, 11));
        assert!(doc.take_pending().is_none());
    }

    #[test]
    fn deletion_maps_selection() {
        let mut doc = doc();
        doc.set_caret(Position::new(0, 11));
        let mut tx = doc.transaction(ChangeOrigin::Transform);
        tx.delete(0, 0..6);
        tx.commit();
        assert_eq!(doc.selection().focus, Position::new(0, 5));
    }

    #[test]
    fn empty_transaction_commits_nothing() {
        let mut doc = doc();
        doc.transaction(ChangeOrigin::Transform).commit();
        assert!(doc.take_pending().is_none());
        assert!(!doc.undo());
    }

    #[test]
    fn undo_reverts_a_whole_step() {
        let mut doc = doc();
        let mut tx = doc.transaction(ChangeOrigin::Transform);
        tx.delete(0, 0..6);
        tx.set_attribute("bold", 0, 0..5);
        tx.commit();
        assert_eq!(doc.block(0).text(), "world");

        assert!(doc.undo());
        assert_eq!(doc.block(0).text(), "hello world");
        assert!(doc.block(0).attr_spans().is_empty());
    }

    #[test]
    fn remote_batches_are_not_undoable() {
        let mut doc = doc();
        let mut tx = doc.transaction(ChangeOrigin::Remote);
        tx.delete(0, 0..6);
        tx.commit();
        assert_eq!(doc.block(0).text(), "world");
        assert!(!doc.undo());
        assert_eq!(doc.block(0).text(), "world");
    }
}
