//! Error type shared by every trajectory operation.
//!
//! All failures are input contract violations reported to the immediate
//! caller. Nothing here is transient, so nothing is retried.

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrajectoryError {
    #[error("invalid position: latitude {latitude}, longitude {longitude}")]
    InvalidPosition { latitude: f64, longitude: f64 },

    #[error("points out of order at index {index}: {previous} -> {current}")]
    TemporalOrdering {
        index: usize,
        previous: DateTime<Utc>,
        current: DateTime<Utc>,
    },

    #[error("time interval must be positive, got {0}s")]
    NonPositiveInterval(f64),

    #[error("sampling step must be positive, got {0}s")]
    InvalidStep(i64),

    #[error("point limit must be positive")]
    InvalidLimit,

    #[error("{name} threshold must be finite, got {value}")]
    InvalidThreshold { name: &'static str, value: f64 },

    #[error("end time {end} is before start time {start}")]
    RangeValidation {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("segment mixes devices: expected {expected}, found {found}")]
    MixedDevices { expected: i64, found: i64 },

    #[cfg(feature = "serde")]
    #[error("malformed stream message: {0}")]
    MalformedMessage(String),
}

pub type Result<T> = std::result::Result<T, TrajectoryError>;
