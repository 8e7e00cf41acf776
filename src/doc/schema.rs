//! Schema: which attributes exist and where they may apply.
//!
//! The registry is populated at setup time. Validation splits candidate
//! ranges so that an attribute is only ever applied to plain text:
//! structural inline objects break a range into the sub-ranges around
//! them. An unregistered attribute key is valid nowhere.

use std::collections::BTreeSet;
use std::ops::Range;

use crate::doc::Block;

/// Registry of known text attributes with range validation.
#[derive(Debug, Default)]
pub struct Schema {
    attributes: BTreeSet<String>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an attribute key as applicable to text.
    pub fn register_attribute(&mut self, key: &str) {
        self.attributes.insert(key.to_string());
    }

    /// Whether the attribute key is known at all.
    pub fn allows(&self, key: &str) -> bool {
        self.attributes.contains(key)
    }

    /// The subset of `ranges` (possibly split) where `key` may legally
    /// apply within `block`. Ranges are character offsets into the block.
    pub fn valid_ranges(
        &self,
        block: &Block,
        ranges: &[Range<usize>],
        key: &str,
    ) -> Vec<Range<usize>> {
        if !self.allows(key) {
            return Vec::new();
        }
        let mut valid = Vec::new();
        for range in ranges {
            let start = range.start.min(block.len_chars());
            let end = range.end.min(block.len_chars());
            let mut run_start = start;
            for offset in start..end {
                if block.is_object(offset) {
                    if run_start < offset {
                        valid.push(run_start..offset);
                    }
                    run_start = offset + 1;
                }
            }
            if run_start < end {
                valid.push(run_start..end);
            }
        }
        valid
    }
}
