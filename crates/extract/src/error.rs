use thiserror::Error;

/// Malformed recognizer output. Aborts the analysis request.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SpanError {
    #[error("{stage}: span #{index} is missing `{field}`")]
    MissingField {
        stage: &'static str,
        index: usize,
        field: &'static str,
    },

    #[error("{stage}: span #{index} ({start}..{end}) exceeds text length {len}")]
    OutOfBounds {
        stage: &'static str,
        index: usize,
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("{stage}: span #{index} has confidence {value} outside [0, 1]")]
    InvalidConfidence {
        stage: &'static str,
        index: usize,
        value: f32,
    },
}

pub type SpanResult<T> = Result<T, SpanError>;
