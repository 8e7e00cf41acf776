//! Actions bound to patterns: the closed set of things a match can do.
//!
//! A [`CommandAction`] names a host command (with optional parameters and
//! an optional decision callback); an [`AttributeAction`] carries an
//! attribute key and an applier callback. Both report success as `true`
//! and decline as `false`; a declined action aborts the whole attempt
//! with no visible mutation.

use std::ops::Range;

use crate::command::{CommandParams, CommandRegistry};
use crate::doc::{Document, Schema, Transaction};

/// A pre-flight decision callback: returning false aborts the attempt.
pub type DecisionFn = Box<dyn Fn(&Document) -> bool>;

/// An attribute applier: receives write access and the resolved format
/// ranges (block char coordinates) and decides whether and how to apply.
pub type ApplierFn = Box<dyn Fn(&mut Transaction<'_>, &ApplyCx<'_>, &[Range<usize>]) -> bool>;

/// Context handed to attribute appliers.
pub struct ApplyCx<'a> {
    pub commands: &'a CommandRegistry,
    pub schema: &'a Schema,
    /// Index of the block the match occurred in.
    pub block: usize,
}

/// Invoke a named host command, gated on its reported enabled state.
pub struct CommandAction {
    pub(crate) name: String,
    pub(crate) params: CommandParams,
    pub(crate) decide: Option<DecisionFn>,
}

impl CommandAction {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            params: CommandParams::none(),
            decide: None,
        }
    }

    pub fn with_params(name: &str, params: CommandParams) -> Self {
        Self {
            name: name.to_string(),
            params,
            decide: None,
        }
    }

    /// Attach a decision callback consulted before any mutation.
    pub fn with_decision(mut self, decide: DecisionFn) -> Self {
        self.decide = Some(decide);
        self
    }
}

/// Apply a named styling attribute to the resolved format ranges.
pub struct AttributeAction {
    pub(crate) key: String,
    pub(crate) apply: ApplierFn,
}

impl AttributeAction {
    /// The standard applier: abort unless the attribute's command exists
    /// and is enabled, apply the attribute over the schema-validated
    /// sub-ranges, then clear it from the typing position so subsequent
    /// text is plain.
    pub fn new(key: &str) -> Self {
        let attr = key.to_string();
        Self {
            key: key.to_string(),
            apply: Box::new(move |tx, cx, ranges| {
                let Some(command) = cx.commands.get(&attr) else {
                    return false;
                };
                if !command.is_enabled(tx.doc()) {
                    return false;
                }
                for range in cx.schema.valid_ranges(tx.doc().block(cx.block), ranges, &attr) {
                    tx.set_attribute(&attr, cx.block, range);
                }
                tx.clear_selection_attribute(&attr);
                true
            }),
        }
    }

    /// An applier with custom behavior.
    pub fn with_applier(key: &str, apply: ApplierFn) -> Self {
        Self {
            key: key.to_string(),
            apply,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

/// An action bound to a registration.
pub enum Action {
    Command(CommandAction),
    Attribute(AttributeAction),
}

impl From<CommandAction> for Action {
    fn from(action: CommandAction) -> Self {
        Action::Command(action)
    }
}

impl From<AttributeAction> for Action {
    fn from(action: AttributeAction) -> Self {
        Action::Attribute(action)
    }
}
