//! Aligning annotated variants against their shared base text and replaying
//! the differences.
//!
//! All positions are code-point offsets into the base text. Insertions never
//! shift later positions because every position is computed against the same
//! immutable base.

use crate::error::AlignError;

const COMMENT_OPEN: [char; 4] = ['<', '!', '-', '-'];
const COMMENT_CLOSE: [char; 3] = ['-', '-', '>'];

/// The bracket pair one annotated variant uses for its spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiters {
    pub open: char,
    pub close: char,
}

impl Delimiters {
    /// Inline HTML tags.
    pub const MARKUP: Self = Self {
        open: '<',
        close: '>',
    };

    /// Furigana readings such as `漢字[かんじ]`.
    pub const READING: Self = Self {
        open: '[',
        close: ']',
    };

    /// Whether spaces the variant adds are kept as insertions.
    ///
    /// A space in front of a reading marks where its base text begins, so the
    /// reading variant keeps them. Markup never carries meaningful spacing.
    pub fn preserves_spacing(&self) -> bool {
        *self == Self::READING
    }
}

/// Text inserted into the base at `position`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffEntry {
    pub position: usize,
    pub text: String,
}

impl DiffEntry {
    pub fn new(position: usize, text: impl Into<String>) -> Self {
        Self {
            position,
            text: text.into(),
        }
    }
}

/// Insertions ordered by ascending base position.
pub type DiffList = Vec<DiffEntry>;

/// Walks `base` and `variant` in lock-step and records every place the
/// variant adds text.
pub fn extract(base: &str, variant: &str, delimiters: Delimiters) -> Result<DiffList, AlignError> {
    let base: Vec<char> = base.chars().collect();
    let variant: Vec<char> = variant.chars().collect();

    let mut diffs = DiffList::new();
    let mut base_pos = 0;
    let mut variant_pos = 0;

    while variant_pos < variant.len() && base_pos < base.len() {
        let current = variant[variant_pos];

        if current == base[base_pos] {
            variant_pos += 1;
            base_pos += 1;
        } else if current == ' ' {
            if delimiters.preserves_spacing() {
                diffs.push(DiffEntry::new(base_pos, " "));
            }
            variant_pos += 1;
        } else if current == delimiters.open {
            let end = span_end(&variant, variant_pos, delimiters).ok_or(
                AlignError::MalformedAnnotation {
                    open: delimiters.open,
                    position: variant_pos,
                },
            )?;

            diffs.push(DiffEntry::new(
                base_pos,
                variant[variant_pos..end].iter().collect::<String>(),
            ));
            variant_pos = end;
        } else if base[base_pos] == ' ' {
            base_pos += 1;
        } else {
            return Err(AlignError::AlignmentDivergence {
                base_position: base_pos,
                variant_position: variant_pos,
                found: Some(current),
            });
        }
    }

    if variant_pos < variant.len() {
        diffs.push(DiffEntry::new(
            base_pos,
            variant[variant_pos..].iter().collect::<String>(),
        ));
    } else if base[base_pos..].iter().any(|c| !c.is_whitespace()) {
        return Err(AlignError::AlignmentDivergence {
            base_position: base_pos,
            variant_position: variant_pos,
            found: None,
        });
    }

    Ok(diffs)
}

/// End (exclusive) of the span opening at `start`.
///
/// HTML comments run to `-->` and may contain `>` themselves.
fn span_end(variant: &[char], start: usize, delimiters: Delimiters) -> Option<usize> {
    if delimiters == Delimiters::MARKUP && variant[start..].starts_with(&COMMENT_OPEN) {
        let body = start + COMMENT_OPEN.len();
        if let Some(close) = variant[body..]
            .windows(COMMENT_CLOSE.len())
            .position(|window| window == COMMENT_CLOSE)
        {
            return Some(body + close + COMMENT_CLOSE.len());
        }
    }

    variant[start..]
        .iter()
        .position(|&c| c == delimiters.close)
        .map(|close| start + close + 1)
}

/// Merges the markup and reading insertions into one ascending list.
///
/// Where both lists insert at the same position the reading goes first, so a
/// reading stays attached to its base text inside any closing tag.
pub fn merge_diffs(markup: DiffList, reading: DiffList) -> DiffList {
    let mut merged = DiffList::with_capacity(markup.len() + reading.len());
    let mut markup = markup.into_iter().peekable();
    let mut reading = reading.into_iter().peekable();

    loop {
        let take_reading = match (markup.peek(), reading.peek()) {
            (Some(m), Some(r)) => r.position <= m.position,
            (None, Some(_)) => true,
            (Some(_), None) => false,
            (None, None) => break,
        };

        let next = if take_reading {
            reading.next()
        } else {
            markup.next()
        };
        merged.extend(next);
    }

    merged
}

/// Replays `merged` over `base`.
pub fn reconstruct(base: &str, merged: &[DiffEntry]) -> String {
    let base: Vec<char> = base.chars().collect();
    let inserted: usize = merged.iter().map(|entry| entry.text.len()).sum();

    let mut output = String::with_capacity(base.len() * 3 + inserted);
    let mut cursor = 0;

    for entry in merged {
        let position = entry.position.min(base.len());
        if cursor < position {
            output.extend(&base[cursor..position]);
            cursor = position;
        }
        output.push_str(&entry.text);
    }

    if cursor < base.len() {
        output.extend(&base[cursor..]);
    }

    output
}
