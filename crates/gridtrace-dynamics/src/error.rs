//! Error types for the dynamics step.

use thiserror::Error;

/// Errors raised by invalid dynamics settings.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DynamicsError {
    /// The time step is not a positive finite number.
    #[error("time step must be positive and finite, got {0}")]
    InvalidTimeStep(f64),

    /// A setting other than the time step is NaN or infinite.
    #[error("{0} must be finite")]
    NonFinite(&'static str),

    /// `max_sphere_contacts` is above [`crate::MAX_SPHERE_CONTACTS`].
    #[error("max_sphere_contacts must be at most {max}, got {got}")]
    TooManyContacts {
        /// Requested limit.
        got: usize,
        /// Largest accepted limit.
        max: usize,
    },
}

/// Result type for dynamics operations.
pub type Result<T> = std::result::Result<T, DynamicsError>;
