//! The change gate: decides whether a committed batch is the one shape
//! autoformatting can safely react to.
//!
//! Eligible means: a locally typed batch containing exactly one mutation,
//! that mutation is a one-character text insertion, and the selection is
//! a collapsed caret sitting immediately after it. Everything else
//! (remote merges, the engine's own transform batches, pastes, deletions)
//! falls through on a cheap early-exit check without touching block text.

use log::trace;

use crate::change::{ChangeOrigin, ChangeSet, MutationEntry};
use crate::doc::Document;

/// The caret context of an eligible keystroke. `caret` is the block char
/// offset of the collapsed focus, just after the inserted character.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TypedChar {
    pub block: usize,
    pub caret: usize,
}

pub(crate) fn eligible(change: &ChangeSet, doc: &Document) -> Option<TypedChar> {
    if change.origin != ChangeOrigin::Typing {
        return None;
    }
    let [entry] = change.entries.as_slice() else {
        return None;
    };
    let MutationEntry::InsertText {
        block,
        offset,
        length,
    } = entry
    else {
        return None;
    };
    if *length != 1 {
        return None;
    }
    let selection = doc.selection();
    if !selection.is_collapsed() {
        trace!("autoformat gate: selection not collapsed");
        return None;
    }
    let focus = selection.focus;
    if focus.block != *block || focus.offset != offset + 1 {
        trace!("autoformat gate: caret not immediately after insertion");
        return None;
    }
    Some(TypedChar {
        block: *block,
        caret: focus.offset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc::Block;
    use crate::position::Position;

    fn typed(origin: ChangeOrigin, entries: Vec<MutationEntry>) -> ChangeSet {
        ChangeSet { origin, entries }
    }

    fn insert(block: usize, offset: usize, length: usize) -> MutationEntry {
        MutationEntry::InsertText {
            block,
            offset,
            length,
        }
    }

    fn doc_with_caret(offset: usize) -> Document {
        let mut doc = Document::from_blocks(vec![Block::paragraph("hello")]);
        doc.set_caret(Position::new(0, offset));
        doc
    }

    #[test]
    fn accepts_single_typed_char_at_caret() {
        let doc = doc_with_caret(3);
        let change = typed(ChangeOrigin::Typing, vec![insert(0, 2, 1)]);
        let t = eligible(&change, &doc).unwrap();
        assert_eq!(t.block, 0);
        assert_eq!(t.caret, 3);
    }

    #[test]
    fn rejects_remote_and_transform_origins() {
        let doc = doc_with_caret(3);
        for origin in [ChangeOrigin::Remote, ChangeOrigin::Transform] {
            let change = typed(origin, vec![insert(0, 2, 1)]);
            assert!(eligible(&change, &doc).is_none());
        }
    }

    #[test]
    fn rejects_multi_entry_batches() {
        let doc = doc_with_caret(3);
        let change = typed(
            ChangeOrigin::Typing,
            vec![insert(0, 2, 1), insert(0, 3, 1)],
        );
        assert!(eligible(&change, &doc).is_none());
    }

    #[test]
    fn rejects_multi_char_insertions() {
        let doc = doc_with_caret(5);
        let change = typed(ChangeOrigin::Typing, vec![insert(0, 0, 5)]);
        assert!(eligible(&change, &doc).is_none());
    }

    #[test]
    fn rejects_non_insert_entries() {
        let doc = doc_with_caret(3);
        let change = typed(
            ChangeOrigin::Typing,
            vec![MutationEntry::DeleteText {
                block: 0,
                offset: 2,
                length: 1,
            }],
        );
        assert!(eligible(&change, &doc).is_none());
    }

    #[test]
    fn rejects_non_collapsed_selection() {
        let mut doc = Document::from_blocks(vec![Block::paragraph("hello")]);
        doc.set_selection(Position::new(0, 2), Position::new(0, 4));
        let change = typed(ChangeOrigin::Typing, vec![insert(0, 1, 1)]);
        assert!(eligible(&change, &doc).is_none());
    }

    #[test]
    fn rejects_caret_away_from_insertion() {
        let doc = doc_with_caret(5);
        let change = typed(ChangeOrigin::Typing, vec![insert(0, 2, 1)]);
        assert!(eligible(&change, &doc).is_none());
    }
}
