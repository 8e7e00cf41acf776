//! Markup helpers for building and inspecting documents in tests, docs
//! and debugging sessions.
//!
//! The format is a compact XML-ish notation:
//!
//! ```text
//! <paragraph>foo <$text bold>bar</$text>[] baz</paragraph>
//! <heading2>title</heading2>
//! <listItem type="bulleted">item</listItem>
//! <blockQuote>quoted</blockQuote>
//! ```
//!
//! `[]` marks a collapsed caret; `[` and `]` mark the two ends of a
//! ranged selection; `<object/>` is a structural inline object. `parse`
//! builds a document (including its selection) from this notation and
//! `data` renders a document back, so round-trip assertions read the way
//! the document looks.

use std::collections::BTreeSet;
use std::iter::Peekable;
use std::str::Chars;

use anyhow::{Result, bail};
use itertools::Itertools;

use crate::doc::{Block, BlockKind, Document, OBJECT_CHAR};
use crate::position::Position;

/// Render a document, selection included, in markup notation.
pub fn data(doc: &Document) -> String {
    let sel = doc.selection();
    let (caret, range) = if sel.is_collapsed() {
        (Some(sel.focus), None)
    } else {
        (None, Some((sel.start(), sel.end())))
    };

    let mut out = String::new();
    for (index, block) in doc.blocks().iter().enumerate() {
        let (open, close) = tags(block.kind());
        out.push_str(&open);
        render_content(&mut out, block, index, caret, range);
        out.push_str(&close);
    }
    out
}

/// Build a document (and its selection) from markup notation.
pub fn parse(input: &str) -> Result<Document> {
    Parser {
        chars: input.chars().peekable(),
    }
    .parse_document()
}

fn tags(kind: BlockKind) -> (String, String) {
    match kind {
        BlockKind::Paragraph => ("<paragraph>".into(), "</paragraph>".into()),
        BlockKind::Heading(level) => (format!("<heading{level}>"), format!("</heading{level}>")),
        BlockKind::BulletedListItem => {
            ("<listItem type=\"bulleted\">".into(), "</listItem>".into())
        }
        BlockKind::NumberedListItem => {
            ("<listItem type=\"numbered\">".into(), "</listItem>".into())
        }
        BlockKind::BlockQuote => ("<blockQuote>".into(), "</blockQuote>".into()),
    }
}

fn render_content(
    out: &mut String,
    block: &Block,
    index: usize,
    caret: Option<Position>,
    range: Option<(Position, Position)>,
) {
    let text = block.text();
    let chars: Vec<char> = text.chars().collect();
    let mut open: Option<BTreeSet<String>> = None;

    for offset in 0..=chars.len() {
        // Attributes of the run beginning at this offset; objects and
        // end-of-block close any open run.
        let next = match chars.get(offset) {
            Some(&OBJECT_CHAR) | None => BTreeSet::new(),
            Some(_) => block.attrs_covering(offset),
        };
        if let Some(current) = &open
            && *current != next
        {
            out.push_str("</$text>");
            open = None;
        }

        let here = Position::new(index, offset);
        if caret == Some(here) {
            out.push_str("[]");
        }
        if let Some((start, end)) = range {
            if start == here {
                out.push('[');
            }
            if end == here {
                out.push(']');
            }
        }

        match chars.get(offset) {
            Some(&OBJECT_CHAR) => out.push_str("<object/>"),
            Some(&c) => {
                if !next.is_empty() && open.is_none() {
                    out.push_str(&format!("<$text {}>", next.iter().join(" ")));
                    open = Some(next);
                }
                out.push(c);
            }
            None => {}
        }
    }
}

struct Parser<'a> {
    chars: Peekable<Chars<'a>>,
}

impl Parser<'_> {
    fn parse_document(&mut self) -> Result<Document> {
        let mut blocks = Vec::new();
        let mut caret = None;
        let mut range_start = None;
        let mut range_end = None;

        loop {
            self.skip_whitespace();
            if self.chars.peek().is_none() {
                break;
            }
            let tag = self.parse_tag()?;
            let kind = block_kind(&tag)?;
            let block = self.parse_content(
                &tag,
                kind,
                blocks.len(),
                &mut caret,
                &mut range_start,
                &mut range_end,
            )?;
            blocks.push(block);
        }

        if blocks.is_empty() {
            bail!("markup contains no blocks");
        }
        let mut doc = Document::from_blocks(blocks);
        if let Some(pos) = caret {
            doc.set_caret(pos);
        } else if let (Some(start), Some(end)) = (range_start, range_end) {
            doc.set_selection(start, end);
        } else if range_start.is_some() || range_end.is_some() {
            bail!("unbalanced selection markers");
        }
        Ok(doc)
    }

    fn parse_content(
        &mut self,
        open_tag: &str,
        kind: BlockKind,
        index: usize,
        caret: &mut Option<Position>,
        range_start: &mut Option<Position>,
        range_end: &mut Option<Position>,
    ) -> Result<Block> {
        let mut block = Block::new(kind);
        let mut attrs: BTreeSet<String> = BTreeSet::new();
        let mut buffer = String::new();

        loop {
            match self.chars.peek() {
                None => bail!("unclosed <{open_tag}>"),
                Some('<') => {
                    block.push_text(&buffer, &attrs);
                    buffer.clear();
                    let tag = self.parse_tag()?;
                    match tag.as_str() {
                        t if t == format!("/{}", tag_name(open_tag)) => return Ok(block),
                        "/$text" => attrs.clear(),
                        "object/" => block.push_object(),
                        t if t.starts_with("$text") => {
                            attrs = t["$text".len()..]
                                .split_whitespace()
                                .map(|k| k.to_string())
                                .collect();
                            if attrs.is_empty() {
                                bail!("<$text> with no attributes");
                            }
                        }
                        t => bail!("unexpected tag <{t}>"),
                    }
                }
                Some('[') => {
                    block.push_text(&buffer, &attrs);
                    buffer.clear();
                    self.chars.next();
                    let here = Position::new(index, block.len_chars());
                    if self.chars.peek() == Some(&']') {
                        self.chars.next();
                        *caret = Some(here);
                    } else {
                        *range_start = Some(here);
                    }
                }
                Some(']') => {
                    block.push_text(&buffer, &attrs);
                    buffer.clear();
                    self.chars.next();
                    *range_end = Some(Position::new(index, block.len_chars()));
                }
                Some(&c) => {
                    buffer.push(c);
                    self.chars.next();
                }
            }
        }
    }

    /// Read `<...>` and return the inside, e.g. `listItem type="numbered"`.
    fn parse_tag(&mut self) -> Result<String> {
        match self.chars.next() {
            Some('<') => {}
            _ => bail!("expected '<'"),
        }
        let mut tag = String::new();
        for c in self.chars.by_ref() {
            if c == '>' {
                return Ok(tag);
            }
            tag.push(c);
        }
        bail!("unclosed tag <{tag}");
    }

    fn skip_whitespace(&mut self) {
        while self.chars.peek().is_some_and(|c| c.is_whitespace()) {
            self.chars.next();
        }
    }
}

fn tag_name(tag: &str) -> &str {
    tag.split_whitespace().next().unwrap_or(tag)
}

fn block_kind(tag: &str) -> Result<BlockKind> {
    let name = tag_name(tag);
    match name {
        "paragraph" => Ok(BlockKind::Paragraph),
        "blockQuote" => Ok(BlockKind::BlockQuote),
        "listItem" => match tag {
            t if t.contains("type=\"bulleted\"") => Ok(BlockKind::BulletedListItem),
            t if t.contains("type=\"numbered\"") => Ok(BlockKind::NumberedListItem),
            t => bail!("listItem without a list type: <{t}>"),
        },
        _ => {
            if let Some(level) = name.strip_prefix("heading")
                && let Ok(level) = level.parse::<u8>()
                && (1..=6).contains(&level)
            {
                return Ok(BlockKind::Heading(level));
            }
            bail!("unknown block tag <{tag}>");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_plain_paragraph() {
        let doc = parse("<paragraph>hello[]</paragraph>").unwrap();
        assert_eq!(doc.block(0).text(), "hello");
        assert_eq!(doc.selection().focus, Position::new(0, 5));
        assert_eq!(data(&doc), "<paragraph>hello[]</paragraph>");
    }

    #[test]
    fn round_trip_attributed_text() {
        let input = "<paragraph>foo <$text bold>bar</$text>[] baz</paragraph>";
        let doc = parse(input).unwrap();
        assert_eq!(doc.block(0).text(), "foo bar baz");
        assert_eq!(doc.block(0).attr_spans()[0].range, 4..7);
        assert_eq!(data(&doc), input);
    }

    #[test]
    fn round_trip_multiple_attributes() {
        let input = "<paragraph><$text bold italic>x</$text>[]</paragraph>";
        assert_eq!(data(&parse(input).unwrap()), input);
    }

    #[test]
    fn round_trip_block_kinds() {
        for input in [
            "<heading2>t[]</heading2>",
            "<listItem type=\"bulleted\">i[]</listItem>",
            "<listItem type=\"numbered\">i[]</listItem>",
            "<blockQuote>q[]</blockQuote>",
        ] {
            assert_eq!(data(&parse(input).unwrap()), input);
        }
    }

    #[test]
    fn round_trip_ranged_selection() {
        let input = "<paragraph>*foob[ar]</paragraph>";
        let doc = parse(input).unwrap();
        assert_eq!(doc.selection().start(), Position::new(0, 5));
        assert_eq!(doc.selection().end(), Position::new(0, 7));
        assert!(!doc.selection().is_collapsed());
        assert_eq!(data(&doc), input);
    }

    #[test]
    fn round_trip_objects() {
        let input = "<paragraph>a<object/>b[]</paragraph>";
        let doc = parse(input).unwrap();
        assert!(doc.block(0).is_object(1));
        assert_eq!(data(&doc), input);
    }

    #[test]
    fn multiple_blocks() {
        let doc = parse("<paragraph>a[]</paragraph><heading1>b</heading1>").unwrap();
        assert_eq!(doc.block_count(), 2);
        assert_eq!(doc.block(1).kind(), BlockKind::Heading(1));
    }

    #[test]
    fn caret_between_styled_runs_closes_the_tag() {
        let input = "<paragraph><$text bold>foobar</$text>[]</paragraph>";
        assert_eq!(data(&parse(input).unwrap()), input);
    }

    #[test]
    fn rejects_unknown_tags() {
        assert!(parse("<bogus>x</bogus>").is_err());
        assert!(parse("<paragraph>x").is_err());
        assert!(parse("<heading9>x</heading9>").is_err());
    }
}
