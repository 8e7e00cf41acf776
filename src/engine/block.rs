//! Block pattern matching: a whole-prefix pattern that converts the
//! current block through a host command.
//!
//! The pattern must match the entire text preceding the caret: a match
//! starting anywhere past offset 0, or stopping short of the caret, does
//! not count. Only plain paragraphs are eligible: a heading or list item
//! never reinterprets its own prefix. On match the prefix is deleted and
//! the bound command executed, all inside one transform transaction;
//! any declined or failing step rolls the transaction back so the
//! keystroke behaves as plain typing.

use log::{debug, trace};
use regex::Regex;

use crate::change::ChangeOrigin;
use crate::command::CommandRegistry;
use crate::doc::Document;
use crate::engine::action::Action;
use crate::engine::projector::Projection;

/// A compiled whole-prefix pattern. Callers write patterns anchored the
/// usual way (`^…\s$`); matching additionally requires the match to span
/// the entire prefix.
pub struct BlockPattern {
    regex: Regex,
}

impl BlockPattern {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }
}

/// Attempt one block registration. Returns true only when a transform
/// committed.
pub(crate) fn try_match(
    pattern: &BlockPattern,
    action: &Action,
    doc: &mut Document,
    commands: &CommandRegistry,
    projection: &Projection,
    caret: usize,
    block: usize,
) -> bool {
    let Action::Command(action) = action else {
        debug!("block pattern bound to a non-command action; permanently inert");
        return false;
    };
    if !doc.block(block).kind().is_paragraph() {
        return false;
    }
    let prefix = projection.prefix(caret);
    let Some(found) = pattern.regex.find(prefix) else {
        return false;
    };
    if found.start() != 0 || found.end() != prefix.len() {
        trace!("block pattern matched inside the prefix only; ignoring");
        return false;
    }

    // Decide before mutating: a declined attempt must leave no trace.
    let Some(command) = commands.get(&action.name) else {
        return false;
    };
    if let Some(decide) = &action.decide
        && !decide(doc)
    {
        return false;
    }
    if !command.is_enabled(doc) {
        trace!("command '{}' disabled; block match aborted", action.name);
        return false;
    }

    let remove = projection.block_ranges(0..caret);
    let mut tx = doc.transaction(ChangeOrigin::Transform);
    for range in remove.into_iter().rev() {
        tx.delete(block, range);
    }
    if !command.execute(&mut tx, &action.params).is_success() {
        // Dropping the transaction rolls the deletion back.
        return false;
    }
    tx.commit();
    debug!("block autoformat: '{}' applied", action.name);
    true
}
