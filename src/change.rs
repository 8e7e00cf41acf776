//! Change notification stream: batches of document mutations.
//!
//! Every committed transaction publishes one [`ChangeSet`] tagged with the
//! origin of the batch. Listeners receive batches synchronously, in commit
//! order, on the same execution turn as the mutation that produced them.

use crate::doc::Document;

/// The origin of a committed batch of mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
    /// A locally typed edit (the only origin autoformatting reacts to).
    Typing,
    /// A programmatic transformation, including the autoformat engine's
    /// own edits and command executions.
    Transform,
    /// A non-reactive batch merged from a remote collaborator. Never
    /// triggers matching and is not locally undoable.
    Remote,
}

/// A single mutation within a batch. Offsets and lengths are character
/// counts at the time the operation was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationEntry {
    InsertText {
        block: usize,
        offset: usize,
        length: usize,
    },
    DeleteText {
        block: usize,
        offset: usize,
        length: usize,
    },
    SetAttribute {
        block: usize,
        key: String,
        start: usize,
        end: usize,
    },
    RemoveAttribute {
        block: usize,
        key: String,
        start: usize,
        end: usize,
    },
    SetBlockKind {
        block: usize,
    },
    /// A block restored wholesale (undo).
    ReplaceBlock {
        block: usize,
    },
}

/// An ordered batch of mutations committed as one atomic, undoable unit.
#[derive(Debug, Clone)]
pub struct ChangeSet {
    pub origin: ChangeOrigin,
    pub entries: Vec<MutationEntry>,
}

/// Subscription contract for document changes.
///
/// Listeners are invoked once per committed batch, synchronously and in
/// commit order. Batches produced while handling a batch are queued and
/// delivered after the current one.
pub trait ChangeListener {
    fn on_change(&self, doc: &mut Document, change: &ChangeSet);
}
