use std::ops::RangeInclusive;

#[cfg(feature = "wana-kana")]
use wana_kana::ConvertJapanese;

use super::PhoneticNormalizer;

// Katakana with a hiragana counterpart exactly 0x60 code points below
const FOLDABLE_KATAKANA_RANGE: RangeInclusive<char> = '\u{30A1}'..='\u{30F6}';
const KATAKANA_TO_HIRAGANA_OFFSET: u32 = 0x60;

/// Shifts katakana onto the hiragana block one code point at a time.
///
/// The prolonged sound mark `ー` and anything outside the katakana block pass
/// through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct KanaFolder;

impl PhoneticNormalizer for KanaFolder {
    fn to_hiragana(&self, text: &str) -> String {
        text.chars().map(fold_katakana).collect()
    }
}

fn fold_katakana(c: char) -> char {
    if FOLDABLE_KATAKANA_RANGE.contains(&c) {
        char::from_u32(c as u32 - KATAKANA_TO_HIRAGANA_OFFSET).unwrap_or(c)
    } else {
        c
    }
}

/// Hiragana conversion through `wana_kana`.
///
/// Only katakana runs are handed over, so latin text is never read as romaji
/// and `ー` is kept as written.
#[cfg(feature = "wana-kana")]
#[derive(Debug, Clone, Copy, Default)]
pub struct WanaKana;

#[cfg(feature = "wana-kana")]
impl PhoneticNormalizer for WanaKana {
    fn to_hiragana(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut run = String::new();

        for c in text.chars() {
            if FOLDABLE_KATAKANA_RANGE.contains(&c) {
                run.push(c);
                continue;
            }

            if !run.is_empty() {
                out.push_str(&run.as_str().to_hiragana());
                run.clear();
            }
            out.push(c);
        }

        if !run.is_empty() {
            out.push_str(&run.as_str().to_hiragana());
        }

        out
    }
}

/// The normalizer [`Furiganizer::new`](crate::Furiganizer::new) uses.
pub fn default_normalizer() -> Box<dyn PhoneticNormalizer> {
    #[cfg(feature = "wana-kana")]
    {
        Box::new(WanaKana)
    }

    #[cfg(not(feature = "wana-kana"))]
    {
        Box::new(KanaFolder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_katakana_and_keeps_the_rest() {
        assert_eq!(KanaFolder.to_hiragana("タベタ"), "たべた");
        assert_eq!(KanaFolder.to_hiragana("ラーメン"), "らーめん");
        assert_eq!(KanaFolder.to_hiragana("PCとテレビ"), "PCとてれび");
    }

    #[test]
    fn folding_is_idempotent() {
        let once = KanaFolder.to_hiragana("キョウハイイテンキ");
        assert_eq!(KanaFolder.to_hiragana(&once), once);
        assert_eq!(KanaFolder.to_hiragana("ありがとう"), "ありがとう");
    }

    #[cfg(feature = "wana-kana")]
    #[test]
    fn wana_kana_converts_only_katakana_runs() {
        assert_eq!(WanaKana.to_hiragana("タベタ"), "たべた");
        assert_eq!(WanaKana.to_hiragana("ka とカ"), "ka とか");
        assert_eq!(WanaKana.to_hiragana("ありがとう"), "ありがとう");
    }
}
