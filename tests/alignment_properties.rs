use furiganify::align::{Delimiters, extract, merge_diffs, reconstruct};
use furiganify::{DiffEntry, KanaFolder, PhoneticNormalizer, merge_markup_readings};
use proptest::prelude::*;

fn base_text() -> impl Strategy<Value = String> {
    "[猫犬林檎食べたあいうカナabc、。]{1,12}"
}

fn reading_insertion() -> impl Strategy<Value = String> + Clone {
    prop_oneof![
        Just(" ".to_string()),
        "[ぁ-ゖ]{1,4}".prop_map(|reading| format!("[{reading}]")),
    ]
}

fn markup_insertion() -> impl Strategy<Value = String> + Clone {
    prop_oneof![
        Just("<b>".to_string()),
        Just("</b>".to_string()),
        Just("<i>".to_string()),
        Just("</i>".to_string()),
        Just("<span class=\"hl\">".to_string()),
        Just("</span>".to_string()),
    ]
}

/// A base text plus insertions at arbitrary code-point positions.
fn annotated_text(
    insertion: impl Strategy<Value = String> + Clone,
) -> impl Strategy<Value = (String, String)> {
    base_text()
        .prop_flat_map(move |base| {
            let len = base.chars().count();
            let insertions = prop::collection::vec((0..=len, insertion.clone()), 0..6);

            (Just(base), insertions)
        })
        .prop_map(|(base, mut insertions)| {
            insertions.sort_by_key(|(position, _)| *position);

            let chars: Vec<char> = base.chars().collect();
            let mut annotated = String::new();
            let mut cursor = 0;
            for (position, text) in insertions {
                annotated.extend(&chars[cursor..position]);
                annotated.push_str(&text);
                cursor = position;
            }
            annotated.extend(&chars[cursor..]);

            (base, annotated)
        })
}

proptest! {
    #[test]
    fn readings_round_trip((base, annotated) in annotated_text(reading_insertion())) {
        let diffs = extract(&base, &annotated, Delimiters::READING).unwrap();

        prop_assert_eq!(reconstruct(&base, &diffs), annotated);
    }

    #[test]
    fn markup_round_trips((base, annotated) in annotated_text(markup_insertion())) {
        let diffs = extract(&base, &annotated, Delimiters::MARKUP).unwrap();

        prop_assert_eq!(reconstruct(&base, &diffs), annotated);
    }

    #[test]
    fn positions_never_decrease((base, annotated) in annotated_text(reading_insertion())) {
        let diffs = extract(&base, &annotated, Delimiters::READING).unwrap();

        prop_assert!(diffs.windows(2).all(|pair| pair[0].position <= pair[1].position));
    }

    #[test]
    fn merged_diffs_stay_sorted(
        (base, tagged) in annotated_text(markup_insertion()),
        readings in prop::collection::vec(reading_insertion(), 0..4),
    ) {
        let markup = extract(&base, &tagged, Delimiters::MARKUP).unwrap();
        let len = base.chars().count();
        let reading: Vec<_> = readings
            .into_iter()
            .enumerate()
            .map(|(i, text)| DiffEntry::new(i.min(len), text))
            .collect();

        let merged = merge_diffs(markup.clone(), reading.clone());

        prop_assert_eq!(merged.len(), markup.len() + reading.len());
        prop_assert!(merged.windows(2).all(|pair| pair[0].position <= pair[1].position));
    }

    #[test]
    fn plain_markup_keeps_reading_as_is((base, reading) in annotated_text(reading_insertion())) {
        prop_assert_eq!(merge_markup_readings(&base, &reading).unwrap(), reading);
    }

    #[test]
    fn bare_readings_keep_markup_as_is((base, tagged) in annotated_text(markup_insertion())) {
        prop_assert_eq!(merge_markup_readings(&tagged, &base).unwrap(), tagged);
    }

    #[test]
    fn hiragana_normalization_is_idempotent(text in "[ぁ-ゖァ-ヶーa-z]{0,16}") {
        let once = KanaFolder.to_hiragana(&text);

        prop_assert_eq!(KanaFolder.to_hiragana(&once), once);
    }

    #[test]
    fn hiragana_is_left_unchanged(text in "[ぁ-ゖ]{0,16}") {
        prop_assert_eq!(KanaFolder.to_hiragana(&text), text);
    }
}
