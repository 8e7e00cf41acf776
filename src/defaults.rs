//! The stock autoformat set.
//!
//! Registers the familiar typing shortcuts against an engine, skipping
//! every pattern whose command is not present in the registry:
//!
//! - `* ` or `- ` turns the paragraph into a bulleted list item.
//! - `1. ` or `1) ` turns the paragraph into a numbered list item.
//! - `**bold**` / `__bold__`, `*italic*` / `_italic_`, `` `code` ``.
//! - `# ` through `###### ` produce a heading, one matcher per level
//!   the heading command currently offers.
//! - `> ` turns the paragraph into a block quote.

use anyhow::Result;
use regex::Regex;

use crate::command::CommandParams;
use crate::engine::{Autoformat, AttributeAction, BlockPattern, CommandAction, InlinePattern};

/// Register the whole default set on `engine`.
pub fn register_defaults(engine: &mut Autoformat) -> Result<()> {
    add_list_autoformats(engine)?;
    add_basic_style_autoformats(engine)?;
    add_heading_autoformats(engine)?;
    add_block_quote_autoformats(engine)?;
    Ok(())
}

fn add_list_autoformats(engine: &mut Autoformat) -> Result<()> {
    if engine.commands().contains("bulletedList") {
        engine.register_block_pattern(
            BlockPattern::new(r"^[*-]\s$")?,
            CommandAction::new("bulletedList"),
        );
    }
    if engine.commands().contains("numberedList") {
        engine.register_block_pattern(
            BlockPattern::new(r"^\d+[.)]\s$")?,
            CommandAction::new("numberedList"),
        );
    }
    Ok(())
}

fn add_basic_style_autoformats(engine: &mut Autoformat) -> Result<()> {
    if engine.commands().contains("bold") {
        engine.register_inline_pattern(
            InlinePattern::delimited(r"(\*\*)([^*]+)(\*\*)$")?,
            AttributeAction::new("bold"),
        );
        engine.register_inline_pattern(
            InlinePattern::delimited(r"(__)([^_]+)(__)$")?,
            AttributeAction::new("bold"),
        );
    }
    if engine.commands().contains("italic") {
        // A bold marker must not open an italic span, so the italic
        // patterns require a non-delimiter character (or block start)
        // before the opening delimiter.
        engine.register_inline_pattern(
            InlinePattern::delimited(r"(?:^|[^*])(\*)([^*_]+)(\*)$")?,
            AttributeAction::new("italic"),
        );
        engine.register_inline_pattern(
            InlinePattern::delimited(r"(?:^|[^_])(_)([^_]+)(_)$")?,
            AttributeAction::new("italic"),
        );
    }
    if engine.commands().contains("code") {
        engine.register_inline_pattern(
            InlinePattern::delimited(r"(`)([^`]+)(`)$")?,
            AttributeAction::new("code"),
        );
    }
    Ok(())
}

fn add_heading_autoformats(engine: &mut Autoformat) -> Result<()> {
    let values = match engine.commands().get("heading") {
        Some(command) => command.enabled_values(),
        None => return Ok(()),
    };
    let level_value = Regex::new(r"^heading([1-6])$")?;
    for value in values {
        let Some(caps) = level_value.captures(&value) else {
            continue;
        };
        let level: usize = caps[1].parse()?;
        engine.register_block_pattern(
            BlockPattern::new(&format!(r"^(#{{{level}}})\s$"))?,
            CommandAction::with_params("heading", CommandParams::value(&value)),
        );
    }
    Ok(())
}

fn add_block_quote_autoformats(engine: &mut Autoformat) -> Result<()> {
    if engine.commands().contains("blockQuote") {
        engine.register_block_pattern(
            BlockPattern::new(r"^>\s$")?,
            CommandAction::new("blockQuote"),
        );
    }
    Ok(())
}
