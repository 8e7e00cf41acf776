//! Text projection: flatten a block into a plain string with an exact
//! bidirectional mapping between string offsets and block offsets.
//!
//! Inline objects contribute nothing to the projected text, so projected
//! ("flat") offsets and block offsets drift apart around them. Attribute
//! boundaries do not affect projection at all. All positions are
//! **character** (not byte) indices except where a method says bytes;
//! byte conversions exist because regex matches report byte offsets.

use std::ops::Range;

use crate::doc::{Block, OBJECT_CHAR};

/// A flattened view of one block, built in O(block length).
pub struct Projection {
    text: String,
    /// Flat char index -> byte offset into `text`. Has `len + 1` entries.
    byte_of_flat: Vec<usize>,
    /// Flat char index -> block char offset of that character.
    block_of_flat: Vec<usize>,
    /// Block char boundary -> number of projected chars before it.
    /// Has `block length + 1` entries.
    flat_of_block: Vec<usize>,
}

impl Projection {
    /// Project a block's textual content in document order.
    pub fn of(block: &Block) -> Self {
        let source = block.text();
        let mut text = String::with_capacity(source.len());
        let mut byte_of_flat = Vec::new();
        let mut block_of_flat = Vec::new();
        let mut flat_of_block = Vec::with_capacity(source.chars().count() + 1);

        for (offset, c) in source.chars().enumerate() {
            flat_of_block.push(block_of_flat.len());
            if c == OBJECT_CHAR {
                continue;
            }
            byte_of_flat.push(text.len());
            block_of_flat.push(offset);
            text.push(c);
        }
        flat_of_block.push(block_of_flat.len());
        byte_of_flat.push(text.len());

        Self {
            text,
            byte_of_flat,
            block_of_flat,
            flat_of_block,
        }
    }

    /// The projected text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Projected length in characters.
    pub fn len_chars(&self) -> usize {
        self.block_of_flat.len()
    }

    /// The projected text from block start up to the flat caret offset.
    pub fn prefix(&self, caret: usize) -> &str {
        &self.text[..self.byte_of_flat[caret]]
    }

    /// Map a block char boundary (0..=block length) to a flat boundary.
    pub fn flat_of_block(&self, offset: usize) -> usize {
        self.flat_of_block[offset.min(self.flat_of_block.len() - 1)]
    }

    /// Map a flat char range back to block char ranges, split around
    /// inline objects. Ranges come back in ascending order.
    pub fn block_ranges(&self, range: Range<usize>) -> Vec<Range<usize>> {
        let mut ranges: Vec<Range<usize>> = Vec::new();
        for flat in range.start..range.end.min(self.len_chars()) {
            let offset = self.block_of_flat[flat];
            match ranges.last_mut() {
                Some(last) if last.end == offset => last.end = offset + 1,
                _ => ranges.push(offset..offset + 1),
            }
        }
        ranges
    }

    /// Convert a byte range of the projected text into flat char offsets.
    pub fn chars_of_bytes(&self, bytes: Range<usize>) -> Range<usize> {
        let start = self.byte_of_flat.partition_point(|&b| b < bytes.start);
        let end = self.byte_of_flat.partition_point(|&b| b < bytes.end);
        start..end
    }
}
