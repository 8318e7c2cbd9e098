use thiserror::Error;

/// Reasons a quiz session refuses to start or a piece of input is rejected.
///
/// None of these are fatal to the surrounding page: the browser entry points
/// log them and return without throwing.
#[derive(Debug, Error)]
pub enum QuizError {
    #[error("target container not found: #{0}")]
    MissingContainer(String),
    #[error("no characters to quiz")]
    EmptySequence,
    #[error("stroke data covers {strokes} positions but the sequence has {characters} characters")]
    StrokeDataMismatch { characters: usize, strokes: usize },
    #[error("no character or stroke data at position {0}")]
    MissingEntry(usize),
    #[error("unknown tone category '{0}'")]
    UnknownTone(String),
    #[error("invalid hint setting '{0}', expected a miss count or \"never\"")]
    InvalidHint(String),
    #[error("field contains no Chinese characters")]
    EmptyField,
    #[error("invalid quiz configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),
    #[error("browser environment unavailable: {0}")]
    Environment(String),
}
