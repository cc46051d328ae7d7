//! Error types shared by the evaluators, heuristics and search strategies.

use thiserror::Error;

/// Errors that can occur while building or solving a scheduling problem.
///
/// Running out of search budget is not an error: it is reported through
/// `Diagnostics::optimal` instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchedulingError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Loss evaluated at t={start_time} before release time {release_time}")]
    Domain { start_time: f64, release_time: f64 },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SchedulingError {
    pub(crate) fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub(crate) fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, SchedulingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = SchedulingError::invalid_input("empty task list");
        assert_eq!(err.to_string(), "Invalid input: empty task list");

        let err = SchedulingError::Domain {
            start_time: 1.0,
            release_time: 2.0,
        };
        assert!(err.to_string().contains("before release time 2"));
    }
}
