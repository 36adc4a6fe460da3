//! # Geographic Utilities
//!
//! Distance and velocity computation for trajectory points.
//!
//! ## Overview
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`distance`] | Great-circle (haversine) distance between two positions |
//! | [`approx_distance`] | Planar approximation, cheaper and accurate only for short spans |
//! | [`velocity`] | Speed between two positions over a time interval |
//! | [`polyline_length`] | Total length of a position sequence |
//! | [`compute_bounds`] | Bounding box of a position sequence |
//!
//! The two distance models are interchangeable behind [`DistanceModel`], which is
//! what the segmenter uses to pick one.
//!
//! ## Example
//!
//! ```rust
//! use trajectory_core::{Position, geo_utils};
//!
//! let a = Position::new(0.0, 0.0).unwrap();
//! let b = Position::new(0.0, 1.0).unwrap();
//!
//! // One degree of longitude at the equator
//! let d = geo_utils::distance(&a, &b);
//! assert!((d - 111_195.0).abs() < 1_112.0);
//!
//! // Covered in 1000 seconds
//! let v = geo_utils::velocity(&a, &b, 1000.0, Default::default()).unwrap();
//! assert!((v - 111.195).abs() < 1.2);
//! ```
//!
//! ## Algorithm Notes
//!
//! ### Haversine Formula
//!
//! `a = sin²(Δlat/2) + cos(lat1)·cos(lat2)·sin²(Δlon/2)`,
//! `c = 2·atan2(√a, √(1−a))`, `d = R·c` with `R` = [`EARTH_RADIUS_M`].
//!
//! Reference: [Haversine formula (Wikipedia)](https://en.wikipedia.org/wiki/Haversine_formula)
//!
//! ### Planar Approximation
//!
//! Euclidean norm of the latitude/longitude deltas in radians, scaled by `R`.
//! It ignores the cos(latitude) shrink of longitude, so it overestimates east-west
//! spans away from the equator.

use geo::{BoundingRect, Coord, LineString};

use crate::error::{Result, TrajectoryError};
use crate::{Bounds, Position};

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_008.771;

/// Which numeric model to use for distances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DistanceModel {
    /// Great-circle distance, see [`distance`].
    Haversine,
    /// Planar approximation, see [`approx_distance`].
    #[default]
    Planar,
}

impl DistanceModel {
    /// Distance in meters between two positions under this model.
    #[inline]
    pub fn distance(self, p1: &Position, p2: &Position) -> f64 {
        match self {
            DistanceModel::Haversine => distance(p1, p2),
            DistanceModel::Planar => approx_distance(p1, p2),
        }
    }
}

// =============================================================================
// Distance Functions
// =============================================================================

/// Calculate the great-circle distance between two positions using the Haversine formula.
///
/// Returns the distance in meters along a sphere of radius [`EARTH_RADIUS_M`].
/// The result is non-negative, finite and symmetric for all valid positions.
///
/// # Example
///
/// ```rust
/// use trajectory_core::{Position, geo_utils};
///
/// let london = Position::new(51.5074, -0.1278).unwrap();
/// let paris = Position::new(48.8566, 2.3522).unwrap();
///
/// let d = geo_utils::distance(&london, &paris);
/// assert!((d - 343_560.0).abs() < 1000.0); // ~344 km
/// ```
pub fn distance(p1: &Position, p2: &Position) -> f64 {
    let lat1 = p1.latitude.to_radians();
    let lat2 = p2.latitude.to_radians();
    let delta_lat = (p2.latitude - p1.latitude).to_radians();
    let delta_lon = (p2.longitude - p1.longitude).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    // Rounding can push `a` a hair past 1 for antipodal points
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Planar approximation of the distance between two positions, in meters.
///
/// Cheaper than [`distance`] and close to it for spans of a few kilometers near
/// the equator. Used by default when segmenting dense device streams.
#[inline]
pub fn approx_distance(p1: &Position, p2: &Position) -> f64 {
    let delta_lat = p1.latitude.to_radians() - p2.latitude.to_radians();
    let delta_lon = p1.longitude.to_radians() - p2.longitude.to_radians();
    delta_lat.hypot(delta_lon) * EARTH_RADIUS_M
}

/// Velocity in meters per second between two positions `seconds` apart.
///
/// Fails with [`TrajectoryError::NonPositiveInterval`] when `seconds` is zero,
/// negative or NaN. Callers that segment streams guarantee positive deltas
/// before getting here.
pub fn velocity(p1: &Position, p2: &Position, seconds: f64, model: DistanceModel) -> Result<f64> {
    if !(seconds > 0.0) {
        return Err(TrajectoryError::NonPositiveInterval(seconds));
    }
    Ok(model.distance(p1, p2) / seconds)
}

/// Total length of a position sequence in meters.
///
/// Empty or single-point sequences return 0.0.
pub fn polyline_length(points: &[Position], model: DistanceModel) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    points
        .windows(2)
        .map(|w| model.distance(&w[0], &w[1]))
        .sum()
}

// =============================================================================
// Bounding Box Functions
// =============================================================================

/// Compute the bounding box of a position sequence.
///
/// Returns `None` for empty input.
///
/// ```rust
/// use trajectory_core::{Position, geo_utils};
///
/// let track = vec![
///     Position::new(51.5000, -0.1300).unwrap(),
///     Position::new(51.5100, -0.1200).unwrap(),
/// ];
/// let bounds = geo_utils::compute_bounds(&track).unwrap();
/// assert_eq!(bounds.min_lat, 51.5000);
/// assert_eq!(bounds.max_lng, -0.1200);
/// ```
pub fn compute_bounds(points: &[Position]) -> Option<Bounds> {
    let line: LineString<f64> = points
        .iter()
        .map(|p| Coord { x: p.longitude, y: p.latitude })
        .collect();

    line.bounding_rect().map(|rect| Bounds {
        min_lat: rect.min().y,
        max_lat: rect.max().y,
        min_lng: rect.min().x,
        max_lng: rect.max().x,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
