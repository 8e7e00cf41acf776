//! Embedding harness: a document plus its registries and change
//! listeners, with typing entry points.
//!
//! The harness owns the shared registries behind `Rc` so matchers and
//! actions receive them explicitly at construction. Every committed
//! batch is delivered to the listeners synchronously, in commit order,
//! before control returns to the caller. Batches produced while a
//! listener runs (the autoformat engine committing a transform) queue up
//! and are delivered next.

use std::fmt;
use std::rc::Rc;

use anyhow::Result;

use crate::change::{ChangeListener, ChangeOrigin};
use crate::command::{
    AttributeCommand, BlockQuoteCommand, CmdFailure, CmdResult, CommandParams, CommandRegistry,
    HeadingCommand, ListCommand, ListStyle,
};
use crate::defaults;
use crate::doc::{Document, Schema, Transaction};
use crate::engine::Autoformat;

pub struct Editor {
    doc: Document,
    commands: Rc<CommandRegistry>,
    schema: Rc<Schema>,
    listeners: Vec<Box<dyn ChangeListener>>,
}

impl Editor {
    /// An editor over `doc` with the given registries and no listeners.
    pub fn new(doc: Document, commands: CommandRegistry, schema: Schema) -> Self {
        Self {
            doc,
            commands: Rc::new(commands),
            schema: Rc::new(schema),
            listeners: Vec::new(),
        }
    }

    /// The full setup: the reference command set, the matching schema,
    /// and an autoformat engine carrying the default pattern set.
    pub fn standard(doc: Document) -> Result<Self> {
        let mut commands = CommandRegistry::new();
        commands.add("bulletedList", ListCommand::new(ListStyle::Bulleted));
        commands.add("numberedList", ListCommand::new(ListStyle::Numbered));
        commands.add("heading", HeadingCommand::new(&[1, 2, 3, 4, 5, 6]));
        commands.add("blockQuote", BlockQuoteCommand);
        let mut schema = Schema::new();
        for key in ["bold", "italic", "code"] {
            commands.add(key, AttributeCommand::new(key));
            schema.register_attribute(key);
        }
        let mut editor = Self::new(doc, commands, schema);
        editor.attach_default_autoformats()?;
        Ok(editor)
    }

    /// An engine with the default set attached, but no commands at all:
    /// every trigger text stays literal.
    pub fn bare(doc: Document) -> Result<Self> {
        let mut editor = Self::new(doc, CommandRegistry::new(), Schema::new());
        editor.attach_default_autoformats()?;
        Ok(editor)
    }

    fn attach_default_autoformats(&mut self) -> Result<()> {
        let mut engine = Autoformat::new(self.commands.clone(), self.schema.clone());
        defaults::register_defaults(&mut engine)?;
        self.attach(Box::new(engine));
        Ok(())
    }

    /// Subscribe a listener to the change stream.
    pub fn attach(&mut self, listener: Box<dyn ChangeListener>) {
        self.listeners.push(listener);
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    /// Shared handle to the command registry, for building further
    /// engines against this editor.
    pub fn commands(&self) -> Rc<CommandRegistry> {
        self.commands.clone()
    }

    /// Shared handle to the schema.
    pub fn schema(&self) -> Rc<Schema> {
        self.schema.clone()
    }

    /// Type one character at the selection start, carrying the current
    /// selection attributes.
    pub fn type_char(&mut self, c: char) {
        let at = self.doc.selection().start();
        let attrs = self.doc.selection().attributes().clone();
        let mut tx = self.doc.transaction(ChangeOrigin::Typing);
        tx.insert_text(at, &c.to_string(), &attrs);
        tx.commit();
        self.dispatch_pending();
    }

    /// Type a string one character at a time, as keystrokes.
    pub fn type_str(&mut self, text: &str) {
        for c in text.chars() {
            self.type_char(c);
        }
    }

    /// Run a batch with an explicit origin (e.g. a remote merge) and
    /// deliver the resulting notifications.
    pub fn change(&mut self, origin: ChangeOrigin, f: impl FnOnce(&mut Transaction<'_>)) {
        let mut tx = self.doc.transaction(origin);
        f(&mut tx);
        tx.commit();
        self.dispatch_pending();
    }

    /// Execute a registered command by name inside one transform batch.
    pub fn execute(&mut self, name: &str, params: &CommandParams) -> CmdResult {
        let Some(command) = self.commands.get(name) else {
            return CmdResult::Failure(CmdFailure::UnknownCommand);
        };
        if !command.is_enabled(&self.doc) {
            return CmdResult::Failure(CmdFailure::Disabled);
        }
        let result = {
            let mut tx = self.doc.transaction(ChangeOrigin::Transform);
            let result = command.execute(&mut tx, params);
            if result.is_success() {
                tx.commit();
            }
            result
        };
        self.dispatch_pending();
        result
    }

    /// Revert the most recent undoable batch.
    pub fn undo(&mut self) -> bool {
        let undone = self.doc.undo();
        self.dispatch_pending();
        undone
    }

    fn dispatch_pending(&mut self) {
        while let Some(change) = self.doc.take_pending() {
            for listener in &self.listeners {
                listener.on_change(&mut self.doc, &change);
            }
        }
    }
}

impl fmt::Display for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.doc)
    }
}
