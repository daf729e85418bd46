//! BVG client error types.

use crate::domain::{DepartureError, FlagsError};

/// Errors from querying a BVG board.
#[derive(Debug, thiserror::Error)]
pub enum BvgError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Board answered with a non-success status code
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Board page did not have the expected structure
    #[error("unexpected markup: {0}")]
    Markup(String),

    /// A board row could not be turned into a departure
    #[error("invalid departure: {0}")]
    Departure(#[from] DepartureError),

    /// Query parameters could not be encoded
    #[error("invalid query: {0}")]
    Flags(#[from] FlagsError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = BvgError::Api {
            status: 503,
            message: "Service Unavailable".into(),
        };
        assert_eq!(err.to_string(), "API error 503: Service Unavailable");

        let err = BvgError::Markup("row has 2 cells, expected at least 3".into());
        assert_eq!(
            err.to_string(),
            "unexpected markup: row has 2 cells, expected at least 3"
        );

        let err = BvgError::from(DepartureError::InvalidFormat("soon".into()));
        assert_eq!(
            err.to_string(),
            "invalid departure: invalid departure time format: \"soon\""
        );

        let err = BvgError::from(FlagsError::InvalidWidth(0));
        assert!(err.to_string().contains("invalid flag width 0"));
    }
}
