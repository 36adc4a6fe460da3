//! # Trajectory Core
//!
//! Turns time-ordered GPS samples from tracked devices into travel segments,
//! renderable paths and compact coordinate lists for thin clients.
//!
//! This library provides:
//! - Great-circle and planar distance/velocity computation
//! - Dual-criterion segmentation (time gap and velocity outlier)
//! - Fixed-interval range sampling of query results
//! - Path building and compact path projection
//!
//! ## Features
//!
//! - **`parallel`** - Segment independent device tracks in parallel with rayon
//! - **`serde`** - Serde derives on all types plus stream message decoding
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use trajectory_core::{
//!     build_paths, segment, simplify_paths, Position, SegmentConfig, TrajectoryPoint,
//! };
//!
//! let t0 = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
//! let points: Vec<TrajectoryPoint> = [0, 5, 40, 45]
//!     .iter()
//!     .map(|&s| {
//!         TrajectoryPoint::new(
//!             1,
//!             Position::new(31.2304, 121.4737).unwrap(),
//!             t0 + chrono::Duration::seconds(s),
//!         )
//!     })
//!     .collect();
//!
//! let segments = segment(&points, &SegmentConfig::time_only(30.0)).unwrap();
//! assert_eq!(segments.len(), 2);
//!
//! let paths = build_paths(&segments).unwrap();
//! let mini = simplify_paths(&paths);
//! assert_eq!(mini[0].points[0], [31.2304, 121.4737]);
//! ```

use chrono::{DateTime, Utc};

pub mod error;
pub use error::{Result, TrajectoryError};

pub mod geo_utils;
pub use geo_utils::{approx_distance, distance, velocity, DistanceModel, EARTH_RADIUS_M};

// Time-gap and velocity-outlier segmentation
pub mod segmentation;
pub use segmentation::{
    segment, segment_devices, split_by_time, split_by_velocity, split_reason, Segment,
    SegmentConfig, SegmentTracker, SplitReason, TrackerEvent,
};

#[cfg(feature = "parallel")]
pub use segmentation::segment_devices_parallel;

// Fixed-interval downsampling of range query results
pub mod sampling;
pub use sampling::{sample, sample_query, step_for_limit};

// Path building and compact projection
pub mod paths;
pub use paths::{build_paths, mini_paths, simplify_paths, Path, PathMini};

pub mod palette;
pub use palette::generate_colors;

#[cfg(feature = "serde")]
pub mod stream;
#[cfg(feature = "serde")]
pub use stream::{parse_stream_message, StreamMessage};

// ============================================================================
// Core Types
// ============================================================================

/// A WGS84 coordinate with latitude and longitude in degrees.
///
/// Construction validates the range, so every `Position` in the crate is valid.
///
/// # Example
/// ```
/// use trajectory_core::Position;
/// let point = Position::new(51.5074, -0.1278).unwrap(); // London
/// assert!(Position::new(91.0, 0.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawPosition"))]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl Position {
    /// Create a position, failing with [`TrajectoryError::InvalidPosition`]
    /// when either coordinate is out of range or not finite.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        let position = Self { latitude, longitude };
        if position.is_valid() {
            Ok(position)
        } else {
            Err(TrajectoryError::InvalidPosition { latitude, longitude })
        }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }

    /// The `[latitude, longitude]` pair used by compact paths.
    #[inline]
    pub fn to_pair(self) -> [f64; 2] {
        [self.latitude, self.longitude]
    }
}

/// Unchecked coordinates as decoded, validated on the way into [`Position`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawPosition {
    latitude: f64,
    longitude: f64,
}

#[cfg(feature = "serde")]
impl TryFrom<RawPosition> for Position {
    type Error = TrajectoryError;

    fn try_from(raw: RawPosition) -> Result<Self> {
        Self::new(raw.latitude, raw.longitude)
    }
}

impl TryFrom<(f64, f64)> for Position {
    type Error = TrajectoryError;

    fn try_from((latitude, longitude): (f64, f64)) -> Result<Self> {
        Self::new(latitude, longitude)
    }
}

/// A single geolocated sample from one device.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrajectoryPoint {
    pub device_id: i64,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub position: Position,
    pub timestamp: DateTime<Utc>,
}

impl TrajectoryPoint {
    pub fn new(device_id: i64, position: Position, timestamp: DateTime<Utc>) -> Self {
        Self { device_id, position, timestamp }
    }

    /// Seconds elapsed from `earlier` to this point. Negative if out of order.
    #[inline]
    pub fn seconds_since(&self, earlier: &TrajectoryPoint) -> f64 {
        let delta = self.timestamp - earlier.timestamp;
        match delta.num_nanoseconds() {
            Some(ns) => ns as f64 / 1_000_000_000.0,
            None => match delta.num_microseconds() {
                Some(us) => us as f64 / 1_000_000.0,
                None => delta.num_milliseconds() as f64 / 1_000.0,
            },
        }
    }
}

/// Bounding box of a path.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

/// Time window for one device, as handed to the range-query collaborator.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RangeQuery {
    pub device_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl RangeQuery {
    pub fn new(device_id: i64, start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Self {
        Self { device_id, start_time, end_time }
    }

    /// Reject windows that end before they start.
    pub fn validate(&self) -> Result<()> {
        if self.end_time < self.start_time {
            return Err(TrajectoryError::RangeValidation {
                start: self.start_time,
                end: self.end_time,
            });
        }
        Ok(())
    }

    /// Whether `point` belongs to this device and falls inside the window.
    pub fn contains(&self, point: &TrajectoryPoint) -> bool {
        point.device_id == self.device_id
            && point.timestamp >= self.start_time
            && point.timestamp <= self.end_time
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap() + Duration::seconds(seconds)
    }

    #[test]
    fn test_position_validation() {
        assert!(Position::new(51.5074, -0.1278).is_ok());
        assert!(Position::new(90.0, 180.0).is_ok());
        assert!(Position::new(-90.0, -180.0).is_ok());
        assert_eq!(
            Position::new(91.0, 0.0),
            Err(TrajectoryError::InvalidPosition { latitude: 91.0, longitude: 0.0 })
        );
        assert!(Position::new(0.0, 181.0).is_err());
        assert!(Position::new(f64::NAN, 0.0).is_err());
        assert!(Position::try_from((0.0, -180.5)).is_err());
    }

    #[test]
    fn test_seconds_since() {
        let p = Position::new(0.0, 0.0).unwrap();
        let a = TrajectoryPoint::new(1, p, t(0));
        let b = TrajectoryPoint::new(1, p, t(0) + Duration::milliseconds(1500));
        assert_eq!(b.seconds_since(&a), 1.5);
        assert_eq!(a.seconds_since(&b), -1.5);

        let c = TrajectoryPoint::new(1, p, t(0) + Duration::nanoseconds(500));
        assert_eq!(c.seconds_since(&a), 5e-7);
    }

    #[test]
    fn test_range_query_validation() {
        assert!(RangeQuery::new(1, t(0), t(10)).validate().is_ok());
        assert!(RangeQuery::new(1, t(10), t(10)).validate().is_ok());
        assert!(matches!(
            RangeQuery::new(1, t(10), t(0)).validate(),
            Err(TrajectoryError::RangeValidation { .. })
        ));
    }

    #[test]
    fn test_range_query_contains() {
        let p = Position::new(0.0, 0.0).unwrap();
        let query = RangeQuery::new(7, t(0), t(10));
        assert!(query.contains(&TrajectoryPoint::new(7, p, t(10))));
        assert!(!query.contains(&TrajectoryPoint::new(7, p, t(11))));
        assert!(!query.contains(&TrajectoryPoint::new(8, p, t(5))));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_point_deserialize_validates_position() {
        let point: TrajectoryPoint = serde_json::from_str(
            r#"{"device_id": 3, "latitude": 31.23, "longitude": 121.47, "timestamp": "2023-11-14T22:13:20Z"}"#,
        )
        .unwrap();
        assert_eq!(point.device_id, 3);
        assert_eq!(point.position, Position::new(31.23, 121.47).unwrap());
        assert_eq!(point.timestamp, t(0));

        let round_trip: TrajectoryPoint =
            serde_json::from_str(&serde_json::to_string(&point).unwrap()).unwrap();
        assert_eq!(round_trip, point);

        assert!(serde_json::from_str::<Position>(r#"{"latitude": 91.0, "longitude": 0.0}"#).is_err());
        assert!(serde_json::from_str::<TrajectoryPoint>(
            r#"{"device_id": 3, "latitude": 0.0, "longitude": 200.0, "timestamp": "2023-11-14T22:13:20Z"}"#,
        )
        .is_err());
    }
}
