//! Public error shape of the scheduling engine

use thiserror::Error;
use tracing::error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum SchedulingError {
    #[error("service {0} not found")]
    ServiceNotFound(Uuid),

    #[error("property {0} not found")]
    PropertyNotFound(Uuid),

    #[error("invalid request: {0}")]
    InvalidInput(String),

    #[error("{0} was cancelled")]
    Cancelled(&'static str),

    #[error("{0} exceeded its deadline")]
    DeadlineExceeded(&'static str),

    #[error("scheduling system error: {0}")]
    System(String),
}

impl SchedulingError {
    /// Stable code used in wire responses
    pub fn code(&self) -> &'static str {
        match self {
            SchedulingError::ServiceNotFound(_) | SchedulingError::PropertyNotFound(_) => "NOT_FOUND",
            SchedulingError::InvalidInput(_) => "INVALID_REQUEST",
            SchedulingError::Cancelled(_) => "CANCELLED",
            SchedulingError::DeadlineExceeded(_) => "TIMEOUT",
            SchedulingError::System(_) => "SCHEDULING_ERROR",
        }
    }

    /// Collapse an internal failure into the public shape.
    ///
    /// Errors that already are a `SchedulingError` pass through unchanged;
    /// anything else is logged and reported as `System`.
    pub fn surface(operation: &'static str, err: anyhow::Error) -> Self {
        match err.downcast::<SchedulingError>() {
            Ok(known) => known,
            Err(other) => {
                let message = format!("{:#}", other);
                error!(operation, error = %message, "Unexpected scheduling fault");
                SchedulingError::System(message)
            }
        }
    }
}
