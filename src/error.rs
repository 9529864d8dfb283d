use thiserror::Error;

use crate::gumloop::GumloopError;
use crate::validator::ValidationFailure;

/// Why a conversion stopped before producing code. A failed verification is
/// not one of these; it is a successful conversion with `valid == false`.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("Proof validation failed: {0}")]
    Validation(#[from] ValidationFailure),

    #[error("Gumloop not configured: missing {0}")]
    Configuration(String),

    #[error("Gumloop transformation failed: {0}")]
    Transform(#[from] GumloopError),
}

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("job queue is full, try again later")]
    QueueFull,

    #[error("scheduler is shutting down")]
    ShuttingDown,

    #[error("job not found: {0}")]
    JobNotFound(String),
}

/// Classifies a conversion failure for callers deciding whether to resubmit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The proof itself was rejected; resubmitting the same text fails again.
    Business,
    /// Missing configuration or an unreachable provider.
    System,
}

impl ConversionError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ConversionError::Validation(_) => FailureKind::Business,
            ConversionError::Configuration(_) | ConversionError::Transform(_) => {
                FailureKind::System
            }
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::Business => write!(f, "Business"),
            FailureKind::System => write!(f, "System"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_message_carries_reason() {
        let err = ConversionError::from(ValidationFailure::MissingConclusion);
        assert_eq!(
            err.to_string(),
            "Proof validation failed: Missing 'QED' block to conclude the proof."
        );
        assert_eq!(err.kind(), FailureKind::Business);
    }

    #[test]
    fn configuration_error_names_missing_fields() {
        let err = ConversionError::Configuration("api key, flow id".into());
        assert_eq!(
            err.to_string(),
            "Gumloop not configured: missing api key, flow id"
        );
        assert_eq!(err.kind(), FailureKind::System);
    }

    #[test]
    fn transform_error_wraps_provider_error() {
        let err = ConversionError::from(GumloopError::Api {
            status: 500,
            message: "boom".into(),
        });
        assert_eq!(
            err.to_string(),
            "Gumloop transformation failed: API error (status 500): boom"
        );
        assert_eq!(err.kind(), FailureKind::System);
    }

    #[test]
    fn failure_kind_display() {
        assert_eq!(FailureKind::Business.to_string(), "Business");
        assert_eq!(FailureKind::System.to_string(), "System");
    }
}
