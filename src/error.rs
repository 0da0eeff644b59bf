use std::fmt;

/// Failure to line an annotated variant up against its base text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlignError {
    /// An annotation span was opened at `position` (in the variant) and never closed.
    MalformedAnnotation { open: char, position: usize },
    /// The variant holds `found` at `variant_position` where the base expects
    /// something else, outside of any annotation span.
    AlignmentDivergence {
        base_position: usize,
        variant_position: usize,
        found: Option<char>,
    },
}

impl fmt::Display for AlignError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlignError::MalformedAnnotation { open, position } => {
                write!(f, "unclosed '{open}' annotation at variant offset {position}")
            }
            AlignError::AlignmentDivergence {
                base_position,
                variant_position,
                found: Some(found),
            } => write!(
                f,
                "variant diverges from base at base offset {base_position}: unexpected {found:?} at variant offset {variant_position}"
            ),
            AlignError::AlignmentDivergence {
                base_position,
                variant_position,
                found: None,
            } => write!(
                f,
                "variant ended at offset {variant_position} before base offset {base_position} was reached"
            ),
        }
    }
}

impl std::error::Error for AlignError {}
