//! The Block type: a block kind, rope-stored text, and attribute spans.
//!
//! Attributes are styling marks over character ranges of the block's
//! content. Structural inline objects (widgets with no text contribution)
//! are stored as the Unicode object-replacement character; they take up
//! one character of block content but are excluded from text projection
//! and never carry attributes.

use std::collections::BTreeSet;
use std::fmt;
use std::ops::Range;

use ropey::Rope;

/// The character standing in for a structural inline object.
pub const OBJECT_CHAR: char = '\u{FFFC}';

/// The structural kind of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph,
    Heading(u8),
    BulletedListItem,
    NumberedListItem,
    BlockQuote,
}

impl BlockKind {
    pub fn is_paragraph(&self) -> bool {
        matches!(self, BlockKind::Paragraph)
    }

    pub fn is_list_item(&self) -> bool {
        matches!(
            self,
            BlockKind::BulletedListItem | BlockKind::NumberedListItem
        )
    }
}

/// A styling attribute applied over a character range of a block.
///
/// Ranges are end-exclusive character offsets into the block's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrSpan {
    pub key: String,
    pub range: Range<usize>,
}

/// A structural container unit of the document: a kind, text content and
/// the attribute spans over it.
#[derive(Debug, Clone)]
pub struct Block {
    kind: BlockKind,
    text: Rope,
    attrs: Vec<AttrSpan>,
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

// Constructors
impl Block {
    /// Create an empty block of the given kind.
    pub fn new(kind: BlockKind) -> Self {
        Self {
            kind,
            text: Rope::new(),
            attrs: Vec::new(),
        }
    }

    /// Create a paragraph with plain (unattributed) content.
    pub fn paragraph(text: &str) -> Self {
        let mut block = Self::new(BlockKind::Paragraph);
        block.text = Rope::from_str(text);
        block
    }

    /// Create a block of the given kind with plain content.
    pub fn with_text(kind: BlockKind, text: &str) -> Self {
        let mut block = Self::new(kind);
        block.text = Rope::from_str(text);
        block
    }
}

// Accessors
impl Block {
    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    pub fn set_kind(&mut self, kind: BlockKind) {
        self.kind = kind;
    }

    /// Content length in characters, inline objects included.
    pub fn len_chars(&self) -> usize {
        self.text.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.len_chars() == 0
    }

    pub fn char_at(&self, offset: usize) -> Option<char> {
        if offset < self.len_chars() {
            Some(self.text.char(offset))
        } else {
            None
        }
    }

    /// Full content as a `String`, inline objects included.
    pub fn text(&self) -> String {
        self.text.to_string()
    }

    /// The attribute spans, sorted by key then start offset.
    pub fn attr_spans(&self) -> &[AttrSpan] {
        &self.attrs
    }

    /// The set of attribute keys covering the character at `offset`.
    pub fn attrs_covering(&self, offset: usize) -> BTreeSet<String> {
        self.attrs
            .iter()
            .filter(|s| s.range.contains(&offset))
            .map(|s| s.key.clone())
            .collect()
    }

    pub fn is_object(&self, offset: usize) -> bool {
        self.char_at(offset) == Some(OBJECT_CHAR)
    }
}

// Mutation primitives. Attribute spans update in the same pass, using the
// same arithmetic live marks use: a boundary at or after an edit moves
// with the edit, a boundary inside a deleted range collapses to its start.
impl Block {
    /// Append text carrying the given attributes. Used when building
    /// blocks; editing goes through `insert_text`.
    pub fn push_text(&mut self, text: &str, attrs: &BTreeSet<String>) {
        let at = self.len_chars();
        self.insert_text(at, text, attrs);
    }

    /// Append a structural inline object.
    pub fn push_object(&mut self) {
        let at = self.len_chars();
        self.text.insert_char(at, OBJECT_CHAR);
        self.shift_attrs_after_insert(at, 1);
    }

    /// Insert `text` at character offset `at`, applying `attrs` to the
    /// inserted range. Spans starting at `at` move right (text typed just
    /// before a styled range does not pick up its style); spans ending at
    /// `at` do not extend.
    pub fn insert_text(&mut self, at: usize, text: &str, attrs: &BTreeSet<String>) {
        let at = at.min(self.len_chars());
        let n = text.chars().count();
        if n == 0 {
            return;
        }
        self.text.insert(at, text);
        self.shift_attrs_after_insert(at, n);
        for key in attrs {
            self.attrs.push(AttrSpan {
                key: key.clone(),
                range: at..at + n,
            });
        }
        self.normalize();
    }

    /// Delete the character range, remapping attribute spans.
    pub fn delete(&mut self, range: Range<usize>) {
        let start = range.start.min(self.len_chars());
        let end = range.end.min(self.len_chars());
        if start >= end {
            return;
        }
        self.text.remove(start..end);
        let removed = end - start;
        for span in &mut self.attrs {
            span.range.start = remap_after_delete(span.range.start, start, end, removed);
            span.range.end = remap_after_delete(span.range.end, start, end, removed);
        }
        self.normalize();
    }

    /// Apply an attribute over the character range.
    pub fn set_attr(&mut self, key: &str, range: Range<usize>) {
        let start = range.start.min(self.len_chars());
        let end = range.end.min(self.len_chars());
        if start >= end {
            return;
        }
        self.attrs.push(AttrSpan {
            key: key.to_string(),
            range: start..end,
        });
        self.normalize();
    }

    /// Remove an attribute from the character range, splitting spans that
    /// straddle a boundary.
    pub fn remove_attr(&mut self, key: &str, range: Range<usize>) {
        let mut next = Vec::with_capacity(self.attrs.len());
        for span in self.attrs.drain(..) {
            if span.key != key || span.range.end <= range.start || span.range.start >= range.end {
                next.push(span);
                continue;
            }
            if span.range.start < range.start {
                next.push(AttrSpan {
                    key: span.key.clone(),
                    range: span.range.start..range.start,
                });
            }
            if span.range.end > range.end {
                next.push(AttrSpan {
                    key: span.key,
                    range: range.end..span.range.end,
                });
            }
        }
        self.attrs = next;
        self.normalize();
    }

    fn shift_attrs_after_insert(&mut self, at: usize, n: usize) {
        for span in &mut self.attrs {
            if span.range.start >= at {
                span.range.start += n;
            }
            if span.range.end > at {
                span.range.end += n;
            }
        }
    }

    /// Sort spans and merge same-key spans that touch or overlap.
    fn normalize(&mut self) {
        self.attrs.retain(|s| s.range.start < s.range.end);
        self.attrs
            .sort_by(|a, b| (&a.key, a.range.start).cmp(&(&b.key, b.range.start)));
        let mut merged: Vec<AttrSpan> = Vec::with_capacity(self.attrs.len());
        for span in self.attrs.drain(..) {
            match merged.last_mut() {
                Some(last) if last.key == span.key && span.range.start <= last.range.end => {
                    last.range.end = last.range.end.max(span.range.end);
                }
                _ => merged.push(span),
            }
        }
        self.attrs = merged;
    }
}

/// Remap a single boundary after deleting `[start, end)` (`removed` chars).
fn remap_after_delete(bound: usize, start: usize, end: usize, removed: usize) -> usize {
    if bound <= start {
        bound
    } else if bound < end {
        start
    } else {
        bound - removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(keys: &[&str]) -> BTreeSet<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn insert_shifts_spans() {
        let mut block = Block::paragraph("hello world");
        block.set_attr("bold", 6..11);

        // Insert before the span: the whole span shifts.
        block.insert_text(0, "xy", &attrs(&[]));
        assert_eq!(block.attr_spans()[0].range, 8..13);

        // Insert at span end: no extension.
        block.insert_text(13, "z", &attrs(&[]));
        assert_eq!(block.attr_spans()[0].range, 8..13);

        // Insert inside: extension.
        block.insert_text(10, "q", &attrs(&[]));
        assert_eq!(block.attr_spans()[0].range, 8..14);
    }

    #[test]
    fn insert_at_span_start_does_not_style_new_text() {
        let mut block = Block::paragraph("bold");
        block.set_attr("bold", 0..4);
        block.insert_text(0, "x", &attrs(&[]));
        assert_eq!(block.attr_spans()[0].range, 1..5);
        assert!(block.attrs_covering(0).is_empty());
    }

    #[test]
    fn insert_applies_given_attrs() {
        let mut block = Block::paragraph("ab");
        block.insert_text(1, "c", &attrs(&["italic"]));
        assert_eq!(block.text(), "acb");
        assert_eq!(block.attrs_covering(1), attrs(&["italic"]));
    }

    #[test]
    fn delete_collapses_and_shifts_spans() {
        let mut block = Block::paragraph("0123456789");
        block.set_attr("bold", 2..5);
        block.set_attr("italic", 7..9);

        block.delete(3..8);
        assert_eq!(block.text(), "01289");
        // bold 2..5 -> 2..3, italic 7..9 -> 3..4
        assert_eq!(block.attrs_covering(2), attrs(&["bold"]));
        assert_eq!(block.attrs_covering(3), attrs(&["italic"]));
    }

    #[test]
    fn delete_whole_span_drops_it() {
        let mut block = Block::paragraph("abcdef");
        block.set_attr("bold", 2..4);
        block.delete(1..5);
        assert_eq!(block.text(), "af");
        assert!(block.attr_spans().is_empty());
    }

    #[test]
    fn same_key_spans_merge() {
        let mut block = Block::paragraph("abcdef");
        block.set_attr("bold", 0..2);
        block.set_attr("bold", 2..4);
        block.set_attr("italic", 1..3);
        assert_eq!(block.attr_spans().len(), 2);
        assert_eq!(block.attr_spans()[0].range, 0..4);
    }

    #[test]
    fn remove_attr_splits_spans() {
        let mut block = Block::paragraph("abcdef");
        block.set_attr("bold", 0..6);
        block.remove_attr("bold", 2..4);
        let spans = block.attr_spans();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].range, 0..2);
        assert_eq!(spans[1].range, 4..6);
    }

    #[test]
    fn objects_count_as_content() {
        let mut block = Block::paragraph("ab");
        block.push_object();
        block.push_text("cd", &attrs(&[]));
        assert_eq!(block.len_chars(), 5);
        assert!(block.is_object(2));
        assert!(!block.is_object(1));
    }
}
