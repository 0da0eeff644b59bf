//! Markup handling: reducing a markup-bearing field to the plain base text that
//! every annotated variant is aligned against.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Stand-in for line-break tags while the surrounding markup is stripped or aligned.
/// It sits in the private-use area so it never collides with user text or delimiters.
pub const LINE_BREAK_PLACEHOLDER: &str = "\u{E000}";

/// The canonical form every line-break tag is rewritten to.
pub const LINE_BREAK: &str = "<br>";

static LINE_BREAK_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<br ?/?>").expect("valid regex"));
static COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"));
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));
static ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[A-Za-z][A-Za-z0-9]{1,31});")
        .expect("valid regex")
});

/// Reduces a raw field to its plain base form.
///
/// Line breaks become spaces, the fullwidth tilde becomes `~`, all markup is
/// stripped except line-break tags, which survive as a single canonical `<br>`.
pub fn reduce(raw: &str) -> String {
    let text = normalize_text(raw);
    let protected = protect_line_breaks(&text);

    restore_line_breaks(&strip_markup(&protected))
}

/// Character-level normalization shared by the base text and the markup variant.
pub fn normalize_text(raw: &str) -> String {
    raw.replace("\r\n", " ")
        .replace('\n', " ")
        .replace('\u{FF5E}', "~")
}

/// Removes HTML comments and tags, keeping their text content.
pub fn strip_markup(text: &str) -> String {
    let without_comments = COMMENT.replace_all(text, "");

    TAG.replace_all(&without_comments, "").into_owned()
}

/// Swaps every line-break tag for [`LINE_BREAK_PLACEHOLDER`].
pub fn protect_line_breaks(text: &str) -> String {
    LINE_BREAK_TAG
        .replace_all(text, LINE_BREAK_PLACEHOLDER)
        .into_owned()
}

/// Turns placeholders back into canonical `<br>` tags.
pub fn restore_line_breaks(text: &str) -> String {
    text.replace(LINE_BREAK_PLACEHOLDER, LINE_BREAK)
}

/// Decodes HTML character references.
///
/// `&nbsp;` decodes to a plain space so it aligns with ordinary word spacing.
/// Unknown names and out-of-range code points are left as written.
pub fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &Captures| match decode_reference(&caps[1]) {
            Some(decoded) => decoded,
            None => Cow::Owned(caps[0].to_string()),
        })
        .into_owned()
}

fn decode_reference(reference: &str) -> Option<Cow<'static, str>> {
    if let Some(numeric) = reference.strip_prefix('#') {
        let hex = numeric
            .strip_prefix('x')
            .or_else(|| numeric.strip_prefix('X'));
        let code = match hex {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => numeric.parse::<u32>().ok()?,
        };

        return char::from_u32(code).map(|c| Cow::Owned(c.to_string()));
    }

    let decoded = match reference {
        "nbsp" => " ",
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "hellip" => "\u{2026}",
        "mdash" => "\u{2014}",
        "ndash" => "\u{2013}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "ldquo" => "\u{201C}",
        "rdquo" => "\u{201D}",
        "middot" => "\u{B7}",
        "times" => "\u{D7}",
        "divide" => "\u{F7}",
        "yen" => "\u{A5}",
        "copy" => "\u{A9}",
        "reg" => "\u{AE}",
        _ => return None,
    };

    Some(Cow::Borrowed(decoded))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reduce_strips_tags_but_keeps_line_breaks() {
        assert_eq!(reduce("<b>林檎</b>を<br />食べた"), "林檎を<br>食べた");
        assert_eq!(reduce("<div>猫</div><br/>犬<br>鳥"), "猫<br>犬<br>鳥");
    }

    #[test]
    fn reduce_normalizes_newlines_and_tilde() {
        assert_eq!(reduce("一\n二\r\n三"), "一 二 三");
        assert_eq!(reduce("あ～い"), "あ~い");
    }

    #[test]
    fn strip_markup_drops_comments_with_inner_brackets() {
        assert_eq!(strip_markup("a<!-- <b>x</b> -->b"), "ab");
        assert_eq!(strip_markup("<span style=\"color: red\">赤</span>"), "赤");
    }

    #[test]
    fn line_break_placeholder_round_trips() {
        let protected = protect_line_breaks("a<br>b<br />c<br/>d");
        assert!(!protected.contains('<'));
        assert_eq!(restore_line_breaks(&protected), "a<br>b<br>c<br>d");
    }

    #[test]
    fn decode_entities_handles_named_and_numeric_references() {
        assert_eq!(decode_entities("a&nbsp;b"), "a b");
        assert_eq!(decode_entities("&lt;b&gt; &amp; &quot;"), "<b> & \"");
        assert_eq!(decode_entities("&#26085;&#x672C;"), "日本");
    }

    #[test]
    fn decode_entities_leaves_unknown_references_alone() {
        assert_eq!(decode_entities("&bogus; &#xFFFFFF; & ;"), "&bogus; &#xFFFFFF; & ;");
    }
}
