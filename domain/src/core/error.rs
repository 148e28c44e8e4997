//! Domain error types

use thiserror::Error;

/// Domain-level errors
///
/// These are validation failures raised synchronously to the immediate
/// caller. They are never retried automatically.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Winner candidate {0} is not part of the voted batch")]
    WinnerNotInBatch(String),

    #[error("Winner candidate {0} has no votes")]
    WinnerWithoutVotes(String),

    #[error("Empty candidate batch")]
    EmptyBatch,

    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_error_display() {
        let error = DomainError::InvalidTransition {
            from: "completed".to_string(),
            to: "in_progress".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid status transition: completed -> in_progress"
        );
    }
}
