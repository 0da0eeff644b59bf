//! Turning analyzer output into a compact reading string such as
//! `昨日[きのう]、 林檎[りんご]を 食[た]べた`.

pub mod kana;
pub mod mecab;

use anyhow::Result;

pub use kana::{KanaFolder, default_normalizer};
#[cfg(feature = "wana-kana")]
pub use kana::WanaKana;
pub use mecab::MecabAnalyzer;

/// Single-character numerals that are never given a reading. The analyzer
/// spells them out ("にい" for "２"), which reads worse than the digit itself.
pub const UNANNOTATED_NUMERALS: &str = "一二三四五六七八九十０１２３４５６７８９0123456789";

/// One morpheme as produced by an [`Analyzer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub surface: String,
    /// Phonetic reading, usually katakana. Empty when the analyzer has none.
    pub reading: String,
}

impl Token {
    pub fn new(surface: impl Into<String>, reading: impl Into<String>) -> Self {
        Self {
            surface: surface.into(),
            reading: reading.into(),
        }
    }
}

/// A morphological analyzer.
///
/// The tokens must cover `text` left to right with no gaps: concatenating
/// every surface form gives back the input, minus whitespace.
pub trait Analyzer {
    fn analyze(&mut self, text: &str) -> Result<Vec<Token>>;
}

impl<F> Analyzer for F
where
    F: FnMut(&str) -> Result<Vec<Token>>,
{
    fn analyze(&mut self, text: &str) -> Result<Vec<Token>> {
        self(text)
    }
}

/// Converts kana to hiragana. Implementations must be idempotent.
pub trait PhoneticNormalizer: Send + Sync {
    fn to_hiragana(&self, text: &str) -> String;
}

impl<N: PhoneticNormalizer + ?Sized> PhoneticNormalizer for Box<N> {
    fn to_hiragana(&self, text: &str) -> String {
        (**self).to_hiragana(text)
    }
}

/// Annotates one token with the smallest reading span.
///
/// Kana shared at the start or end of both the surface form and its reading
/// (okurigana, mostly) stays outside the brackets. Annotated fragments carry a
/// space in front of the annotated core so the reading binds to it alone.
pub fn minimize<N: PhoneticNormalizer + ?Sized>(token: &Token, normalizer: &N) -> String {
    let surface = token.surface.as_str();

    // hiragana, punctuation, latin text or no reading at all
    if token.reading.is_empty() || token.reading == surface {
        return surface.to_string();
    }

    let reading = normalizer.to_hiragana(&token.reading);
    if reading == surface || is_numeral(surface) {
        return surface.to_string();
    }

    let surface: Vec<char> = surface.chars().collect();
    let reading: Vec<char> = reading.chars().collect();
    let (prefix, suffix) = shared_affixes(&surface, &reading);

    let head: String = reading[..prefix].iter().collect();
    let core: String = surface[prefix..surface.len() - suffix].iter().collect();
    let core_reading: String = reading[prefix..reading.len() - suffix].iter().collect();
    let tail: String = reading[reading.len() - suffix..].iter().collect();

    format!("{head} {core}[{core_reading}]{tail}")
}

/// Lengths of the common prefix and suffix, leaving at least one surface
/// character to annotate.
fn shared_affixes(surface: &[char], reading: &[char]) -> (usize, usize) {
    let limit = surface.len().saturating_sub(1);

    let prefix = surface
        .iter()
        .zip(reading)
        .take(limit)
        .take_while(|(s, r)| s == r)
        .count();
    let suffix = surface
        .iter()
        .rev()
        .zip(reading.iter().rev())
        .take(limit)
        .take_while(|(s, r)| s == r)
        .count()
        .min(limit - prefix)
        .min(reading.len() - prefix);

    (prefix, suffix)
}

fn is_numeral(surface: &str) -> bool {
    let mut chars = surface.chars();

    match (chars.next(), chars.next()) {
        (Some(c), None) => UNANNOTATED_NUMERALS.contains(c),
        _ => false,
    }
}

/// Minimizes every token and joins the fragments into one reading string.
pub fn annotate_tokens<N: PhoneticNormalizer + ?Sized>(tokens: &[Token], normalizer: &N) -> String {
    let fragments: Vec<String> = tokens
        .iter()
        .map(|token| minimize(token, normalizer))
        .collect();

    let mut joined = String::new();
    for (i, fragment) in fragments.iter().enumerate() {
        joined.push_str(fragment);

        // keep the reading bracket from running into following latin text
        if fragments.get(i + 1).is_some_and(|next| is_ascii_word(next)) {
            joined.push(' ');
        }
    }

    joined.trim().replace("< br>", "<br>")
}

fn is_ascii_word(fragment: &str) -> bool {
    !fragment.is_empty() && fragment.chars().all(|c| c.is_ascii_alphanumeric())
}
