//! Adds furigana readings to Japanese text while keeping its inline markup.
//!
//! Readings use the bracket notation common to flashcard software:
//! `<b>林檎</b>を食べた` becomes `<b>林檎[りんご]</b>を 食[た]べた`.
//!
//! The readings are computed on the plain text of a field and then merged
//! back into the original markup, see [`merge_markup_readings`].

pub mod align;
pub mod config;
mod error;
pub mod markup;
mod merge;
pub mod reading;

use anyhow::{Context, Result};
use tracing::{debug, warn};

pub use align::{Delimiters, DiffEntry, DiffList};
pub use config::MecabConfig;
pub use error::AlignError;
pub use merge::merge_markup_readings;
pub use reading::{
    Analyzer, KanaFolder, MecabAnalyzer, PhoneticNormalizer, Token, annotate_tokens,
    default_normalizer, minimize,
};

use crate::markup::{decode_entities, reduce};

/// A field annotated with readings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Furigana {
    pub text: String,
    /// Set when the readings could not be merged into the markup and `text`
    /// holds the plain base text instead.
    pub fallback: Option<AlignError>,
}

impl Furigana {
    pub fn is_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}

/// Runs the full pipeline over one field: reduce, analyze, minimize, merge.
pub struct Furiganizer<A> {
    analyzer: A,
    normalizer: Box<dyn PhoneticNormalizer>,
}

impl<A: Analyzer> Furiganizer<A> {
    pub fn new(analyzer: A) -> Self {
        Self {
            analyzer,
            normalizer: default_normalizer(),
        }
    }

    pub fn with_normalizer(mut self, normalizer: impl PhoneticNormalizer + 'static) -> Self {
        self.normalizer = Box::new(normalizer);
        self
    }

    /// Annotates `raw`, which may contain HTML tags and entities.
    ///
    /// Analyzer failures are returned as errors. A failure to merge the
    /// readings back into the markup is not: the plain base text is returned
    /// and [`Furigana::fallback`] records why.
    pub fn reading(&mut self, raw: &str) -> Result<Furigana> {
        let base = reduce(&decode_entities(raw));
        if base.trim().is_empty() {
            return Ok(Furigana {
                text: String::new(),
                fallback: None,
            });
        }

        let tokens = self
            .analyzer
            .analyze(&base)
            .with_context(|| format!("Failed to analyze {base:?}"))?;
        let readings = annotate_tokens(&tokens, &*self.normalizer);
        debug!(tokens = tokens.len(), %readings, "annotated base text");

        match merge_markup_readings(raw, &readings) {
            Ok(text) => Ok(Furigana {
                text,
                fallback: None,
            }),
            Err(err) => {
                warn!(%err, "Could not merge readings into {raw:?}, keeping plain text");

                Ok(Furigana {
                    text: base,
                    fallback: Some(err),
                })
            }
        }
    }
}
