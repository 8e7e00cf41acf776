//! Inline pattern matching: delimiter-wrapped spans that become styled
//! text with the delimiters stripped.
//!
//! Two evaluation modes. A delimited regex carries exactly three capture
//! groups (leading delimiter, content, trailing delimiter); the engine
//! takes the last match ending exactly at the caret. A custom callback
//! receives the text up to the caret and returns explicit format and
//! remove range lists. A regex with the wrong group arity degrades to a
//! permanently inert pattern at construction: it never matches and never
//! errors, so a misregistered pattern behaves like plain typing.

use std::cmp::Reverse;
use std::ops::Range;

use itertools::Itertools;
use log::{debug, trace};
use regex::Regex;

use crate::change::ChangeOrigin;
use crate::command::CommandRegistry;
use crate::doc::{Document, Schema};
use crate::engine::action::{Action, ApplyCx, AttributeAction};
use crate::engine::projector::Projection;

/// A custom test callback: text up to the caret in, explicit ranges out.
pub type TestFn = Box<dyn Fn(&str) -> InlineMatch>;

/// The outcome of a successful inline test. Ranges are character offsets
/// into the projected text preceding the caret: `remove` identifies
/// delimiter text to strip, `format` the span(s) to style.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineMatch {
    pub format: Vec<Range<usize>>,
    pub remove: Vec<Range<usize>>,
}

/// An inline pattern in one of its evaluation modes.
pub enum InlinePattern {
    Delimited(Regex),
    Custom(TestFn),
    /// A delimited pattern whose regex did not have exactly three capture
    /// groups. Kept registered, matches nothing.
    Inert,
}

impl InlinePattern {
    /// Compile a delimited pattern. Anything but exactly three capture
    /// groups yields [`InlinePattern::Inert`].
    pub fn delimited(pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(pattern)?;
        // captures_len counts the implicit whole-match group.
        if regex.captures_len() != 4 {
            debug!("inline pattern {pattern:?} lacks the delimiter/content/delimiter groups; inert");
            return Ok(Self::Inert);
        }
        Ok(Self::Delimited(regex))
    }

    pub fn custom(test: TestFn) -> Self {
        Self::Custom(test)
    }

    /// Evaluate against the text preceding the caret. `projection` is the
    /// block projection the prefix was sliced from, used to convert regex
    /// byte offsets to character offsets.
    pub(crate) fn evaluate(&self, prefix: &str, projection: &Projection) -> Option<InlineMatch> {
        if prefix.is_empty() {
            return None;
        }
        let mut m = match self {
            Self::Inert => return None,
            Self::Delimited(regex) => {
                let mut last = None;
                for caps in regex.captures_iter(prefix) {
                    let whole = caps.get(0)?;
                    if whole.end() != prefix.len() {
                        continue;
                    }
                    if let (Some(lead), Some(content), Some(trail)) =
                        (caps.get(1), caps.get(2), caps.get(3))
                    {
                        last = Some(InlineMatch {
                            format: vec![projection.chars_of_bytes(content.range())],
                            remove: vec![
                                projection.chars_of_bytes(lead.range()),
                                projection.chars_of_bytes(trail.range()),
                            ],
                        });
                    }
                }
                last?
            }
            Self::Custom(test) => test(prefix),
        };
        m.format.retain(|r| r.start < r.end);
        m.remove.retain(|r| r.start < r.end);
        if m.format.is_empty() || m.remove.is_empty() {
            return None;
        }
        Some(m)
    }
}

/// Attempt one inline registration. Returns true only when a transform
/// committed.
pub(crate) fn try_match(
    pattern: &InlinePattern,
    action: &Action,
    doc: &mut Document,
    commands: &CommandRegistry,
    schema: &Schema,
    projection: &Projection,
    caret: usize,
    block: usize,
) -> bool {
    let Action::Attribute(action) = action else {
        debug!("inline pattern bound to a non-attribute action; permanently inert");
        return false;
    };
    let Some(m) = pattern.evaluate(projection.prefix(caret), projection) else {
        return false;
    };
    apply(action, &m, doc, commands, schema, projection, block)
}

fn apply(
    action: &AttributeAction,
    m: &InlineMatch,
    doc: &mut Document,
    commands: &CommandRegistry,
    schema: &Schema,
    projection: &Projection,
    block: usize,
) -> bool {
    let mut tx = doc.transaction(ChangeOrigin::Transform);

    // Strip delimiters in descending offset order so that deleting one
    // range does not invalidate the offsets of another still pending.
    let descending = m
        .remove
        .iter()
        .cloned()
        .sorted_by_key(|r| Reverse(r.start));
    for flat in descending {
        for range in projection.block_ranges(flat).into_iter().rev() {
            tx.delete(block, range);
        }
    }

    // Format ranges shift left by the removed text that preceded them.
    let shift = |offset: usize| {
        offset
            - m.remove
                .iter()
                .filter(|r| r.end <= offset)
                .map(|r| r.end - r.start)
                .sum::<usize>()
    };
    let post = Projection::of(tx.doc().block(block));
    let ranges: Vec<Range<usize>> = m
        .format
        .iter()
        .flat_map(|r| post.block_ranges(shift(r.start)..shift(r.end)))
        .collect();

    let cx = ApplyCx {
        commands,
        schema,
        block,
    };
    if !(action.apply)(&mut tx, &cx, &ranges) {
        trace!("attribute '{}' declined; inline match aborted", action.key);
        return false;
    }
    tx.commit();
    debug!("inline autoformat: '{}' applied", action.key);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc::Block;

    fn eval(pattern: &InlinePattern, text: &str) -> Option<InlineMatch> {
        let block = Block::paragraph(text);
        let projection = Projection::of(&block);
        pattern.evaluate(projection.text(), &projection)
    }

    #[test]
    fn wrong_arity_is_inert() {
        let p = InlinePattern::delimited(r"(\*)(.+?)\*").unwrap();
        assert!(matches!(p, InlinePattern::Inert));
        assert!(eval(&p, "*foobar*").is_none());
    }

    #[test]
    fn three_groups_decompose_left_to_right() {
        let p = InlinePattern::delimited(r"(\*\*)([^*]+)(\*\*)$").unwrap();
        let m = eval(&p, "**foobar**").unwrap();
        assert_eq!(m.remove, vec![0..2, 8..10]);
        assert_eq!(m.format, vec![2..8]);
    }

    #[test]
    fn match_must_end_at_caret() {
        let p = InlinePattern::delimited(r"(`)([^`]+)(`)").unwrap();
        assert!(eval(&p, "`code` and more").is_none());
        assert!(eval(&p, "say `code`").is_some());
    }

    #[test]
    fn last_match_wins() {
        let p = InlinePattern::delimited(r"(`)([^`]+)(`)").unwrap();
        let m = eval(&p, "`a` `b`").unwrap();
        assert_eq!(m.format, vec![5..6]);
    }

    #[test]
    fn single_char_content_matches() {
        let p = InlinePattern::delimited(r"(\*\*)([^*]+)(\*\*)$").unwrap();
        let m = eval(&p, "**a**").unwrap();
        assert_eq!(m.format, vec![2..3]);
    }

    #[test]
    fn leading_context_excludes_looser_pattern() {
        // The italic pattern refuses an opening delimiter preceded by the
        // bold delimiter character.
        let p = InlinePattern::delimited(r"(?:^|[^*])(\*)([^*_]+)(\*)$").unwrap();
        assert!(eval(&p, "**foobar**").is_none());
        assert!(eval(&p, "x*foobar*").is_some());
        assert!(eval(&p, "*foobar*").is_some());
    }

    #[test]
    fn empty_prefix_never_matches() {
        let p = InlinePattern::custom(Box::new(|_| InlineMatch {
            format: vec![0..1],
            remove: vec![0..1],
        }));
        assert!(eval(&p, "").is_none());
    }

    #[test]
    fn custom_with_empty_lists_never_matches() {
        let no_format = InlinePattern::custom(Box::new(|_| InlineMatch {
            format: vec![0..0],
            remove: vec![0..1],
        }));
        assert!(eval(&no_format, "* ").is_none());

        let no_remove = InlinePattern::custom(Box::new(|_| InlineMatch {
            format: vec![0..1],
            remove: vec![],
        }));
        assert!(eval(&no_remove, "* ").is_none());
    }
}
