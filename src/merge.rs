use tracing::debug;

use crate::align::{Delimiters, extract, merge_diffs, reconstruct};
use crate::error::AlignError;
use crate::markup::{
    decode_entities, normalize_text, protect_line_breaks, reduce, restore_line_breaks,
};

/// Merges a markup-bearing field with a reading string computed from its plain text.
///
/// `reading` must be an annotation of `reduce(decode_entities(markup))` using
/// `[` `]` brackets, such as the output of
/// [`annotate_tokens`](crate::reading::annotate_tokens). The result keeps every
/// tag of `markup` in place and attaches every reading of `reading`.
pub fn merge_markup_readings(markup: &str, reading: &str) -> Result<String, AlignError> {
    let decoded = normalize_text(&decode_entities(markup));

    let base = protect_line_breaks(&reduce(&decoded));
    let reading = protect_line_breaks(reading);
    let formatted = protect_line_breaks(&decoded);

    let reading_diff = extract(&base, &reading, Delimiters::READING)?;
    let markup_diff = extract(&base, &formatted, Delimiters::MARKUP)?;
    debug!(
        readings = reading_diff.len(),
        tags = markup_diff.len(),
        "aligned variants against base"
    );

    let merged = merge_diffs(markup_diff, reading_diff);

    Ok(restore_line_breaks(&reconstruct(&base, &merged)))
}
