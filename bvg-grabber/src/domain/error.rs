//! Domain error types.
//!
//! These errors represent invalid departure data. They are distinct from
//! transport and markup errors, which live with the BVG client.

/// Errors raised while building a [`Departure`](super::Departure).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DepartureError {
    /// Departure time string matches neither supported format
    #[error("invalid departure time format: {0:?}")]
    InvalidFormat(String),

    /// Unix timestamp outside the representable range
    #[error("departure timestamp out of range: {0}")]
    InvalidTimestamp(i64),

    /// Departure time given as a value that is not a number, string or instant
    #[error("unsupported type for departure time: {0}")]
    UnsupportedType(&'static str),
}
