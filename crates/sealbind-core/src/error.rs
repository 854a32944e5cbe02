use thiserror::Error;

#[derive(Error, Debug)]
pub enum SealBindError {
    #[error("Unsupported input format: {0}")]
    InvalidInputFormat(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Slice count ({slices}) does not match document page count ({pages})")]
    CountMismatch { slices: usize, pages: usize },

    #[error("Failed to decode: {0}")]
    Decode(String),

    #[error("Failed to encode: {0}")]
    Encode(String),

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),
}

impl SealBindError {
    /// Stable short name for a host UI to branch on without string matching
    /// the full message.
    pub fn kind(&self) -> &'static str {
        match self {
            SealBindError::InvalidInputFormat(_) => "invalid_input_format",
            SealBindError::Validation(_) => "validation",
            SealBindError::CountMismatch { .. } => "count_mismatch",
            SealBindError::Decode(_) => "decode",
            SealBindError::Encode(_) => "encode",
            SealBindError::Io(_) => "io",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_mismatch_message_names_both_counts() {
        let err = SealBindError::CountMismatch {
            slices: 3,
            pages: 5,
        };
        let msg = err.to_string();
        assert!(msg.contains('3'));
        assert!(msg.contains('5'));
    }

    #[test]
    fn test_kinds_are_distinct() {
        let errors = [
            SealBindError::InvalidInputFormat("x".into()),
            SealBindError::Validation("x".into()),
            SealBindError::CountMismatch { slices: 1, pages: 2 },
            SealBindError::Decode("x".into()),
            SealBindError::Encode("x".into()),
        ];
        let mut kinds: Vec<_> = errors.iter().map(|e| e.kind()).collect();
        kinds.sort();
        kinds.dedup();
        assert_eq!(kinds.len(), errors.len());
    }
}
