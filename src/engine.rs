//! The autoformat engine: watches the change stream and converts typed
//! patterns into structure or styling at the moment of typing.
//!
//! Registrations are (pattern, action) pairs, tried in registration
//! order on every eligible keystroke. The first registration that
//! commits a transform wins; registrations that do not match (or match
//! and then decline) pass control to the next one. The engine reacts
//! only to batches the [gate](gate) accepts, so its own transform
//! batches (tagged `Transform` and multi-entry besides) can never feed
//! back into it.

use std::rc::Rc;

use log::trace;

mod action;
pub mod block;
mod gate;
pub mod inline;
pub mod projector;


pub use action::{Action, ApplierFn, ApplyCx, AttributeAction, CommandAction, DecisionFn};
pub use block::BlockPattern;
pub use inline::{InlineMatch, InlinePattern, TestFn};
pub use projector::Projection;

use crate::change::{ChangeListener, ChangeSet};
use crate::command::CommandRegistry;
use crate::doc::{Document, Schema};

enum Matcher {
    Block(BlockPattern),
    Inline(InlinePattern),
}

struct Registration {
    matcher: Matcher,
    action: Action,
}

/// The engine instance. Holds an ordered, immutable-after-setup set of
/// registrations plus the registries its actions consult; attach it to
/// the host's change stream as a [`ChangeListener`].
pub struct Autoformat {
    commands: Rc<CommandRegistry>,
    schema: Rc<Schema>,
    registrations: Vec<Registration>,
}

impl Autoformat {
    pub fn new(commands: Rc<CommandRegistry>, schema: Rc<Schema>) -> Self {
        Self {
            commands,
            schema,
            registrations: Vec::new(),
        }
    }

    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    /// Register a whole-prefix block pattern with its action.
    pub fn register_block_pattern(&mut self, pattern: BlockPattern, action: impl Into<Action>) {
        self.registrations.push(Registration {
            matcher: Matcher::Block(pattern),
            action: action.into(),
        });
    }

    /// Register a delimiter-wrapped inline pattern with its action.
    pub fn register_inline_pattern(&mut self, pattern: InlinePattern, action: impl Into<Action>) {
        self.registrations.push(Registration {
            matcher: Matcher::Inline(pattern),
            action: action.into(),
        });
    }

    pub fn registration_count(&self) -> usize {
        self.registrations.len()
    }
}

impl ChangeListener for Autoformat {
    fn on_change(&self, doc: &mut Document, change: &ChangeSet) {
        let Some(typed) = gate::eligible(change, doc) else {
            return;
        };
        let projection = Projection::of(doc.block(typed.block));
        let caret = projection.flat_of_block(typed.caret);
        trace!(
            "autoformat: eligible keystroke in block {} at offset {caret}",
            typed.block
        );

        for registration in &self.registrations {
            let committed = match &registration.matcher {
                Matcher::Block(pattern) => block::try_match(
                    pattern,
                    &registration.action,
                    doc,
                    &self.commands,
                    &projection,
                    caret,
                    typed.block,
                ),
                Matcher::Inline(pattern) => inline::try_match(
                    pattern,
                    &registration.action,
                    doc,
                    &self.commands,
                    &self.schema,
                    &projection,
                    caret,
                    typed.block,
                ),
            };
            if committed {
                break;
            }
        }
    }
}
