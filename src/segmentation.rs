//! # Trajectory Segmentation
//!
//! Splits one device's time-ordered points into travel segments.
//!
//! ## Algorithm
//! 1. Start a segment at the first point
//! 2. For every next point, compute Δt against the LAST point of the current segment
//! 3. Δt ≤ 0 is a caller bug (unsorted input) and fails the whole call
//! 4. Split on a time gap (Δt ≥ time threshold), else on a velocity outlier
//!    (speed > velocity threshold), else append
//! 5. Emit the in-progress segment at the end
//!
//! Both criteria live in [`split_reason`], so the "time before velocity" priority
//! is expressed once. A threshold of zero or below disables its criterion; with
//! both disabled every input yields a single segment, which is a valid mode and
//! not an error.
//!
//! [`SegmentTracker`] applies the same rule one point at a time for live streams.

use log::debug;

use crate::error::{Result, TrajectoryError};
use crate::geo_utils::{velocity, DistanceModel};
use crate::TrajectoryPoint;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A non-empty, time-ordered run of points from one device.
pub type Segment = Vec<TrajectoryPoint>;

/// Configuration for segmentation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SegmentConfig {
    /// Gap in seconds at or above which a new segment starts. `<= 0` disables.
    /// Default: 30.0
    pub time_threshold_secs: f64,

    /// Speed in meters per second above which a new segment starts. `<= 0` disables.
    /// Default: 340.0 (speed of sound, anything faster is a position jump)
    pub velocity_threshold_mps: f64,

    /// Distance model used for the velocity check.
    /// Default: planar approximation
    pub distance_model: DistanceModel,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            time_threshold_secs: 30.0,
            velocity_threshold_mps: 340.0,
            distance_model: DistanceModel::Planar,
        }
    }
}

impl SegmentConfig {
    /// Split on time gaps only.
    pub fn time_only(time_threshold_secs: f64) -> Self {
        Self {
            time_threshold_secs,
            velocity_threshold_mps: 0.0,
            ..Self::default()
        }
    }

    /// Split on velocity outliers only.
    pub fn velocity_only(velocity_threshold_mps: f64, distance_model: DistanceModel) -> Self {
        Self {
            time_threshold_secs: 0.0,
            velocity_threshold_mps,
            distance_model,
        }
    }

    /// Tight thresholds (10 s, 50 m/s) used for compact thin-client paths.
    pub fn compact() -> Self {
        Self {
            time_threshold_secs: 10.0,
            velocity_threshold_mps: 50.0,
            ..Self::default()
        }
    }

    pub fn time_enabled(&self) -> bool {
        self.time_threshold_secs > 0.0
    }

    pub fn velocity_enabled(&self) -> bool {
        self.velocity_threshold_mps > 0.0
    }

    /// Reject NaN and infinite thresholds. Zero and negative values are fine.
    pub fn validate(&self) -> Result<()> {
        if !self.time_threshold_secs.is_finite() {
            return Err(TrajectoryError::InvalidThreshold {
                name: "time",
                value: self.time_threshold_secs,
            });
        }
        if !self.velocity_threshold_mps.is_finite() {
            return Err(TrajectoryError::InvalidThreshold {
                name: "velocity",
                value: self.velocity_threshold_mps,
            });
        }
        Ok(())
    }
}

/// Why a segment boundary was placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitReason {
    TimeGap,
    Velocity,
}

/// Decide whether `next` starts a new segment after `last`.
///
/// `delta_secs` is the positive time from `last` to `next`. The time criterion is
/// checked first and short-circuits the velocity check.
pub fn split_reason(
    last: &TrajectoryPoint,
    next: &TrajectoryPoint,
    delta_secs: f64,
    config: &SegmentConfig,
) -> Result<Option<SplitReason>> {
    if config.time_enabled() && delta_secs >= config.time_threshold_secs {
        return Ok(Some(SplitReason::TimeGap));
    }

    if config.velocity_enabled() {
        let speed = velocity(&last.position, &next.position, delta_secs, config.distance_model)?;
        if speed > config.velocity_threshold_mps {
            return Ok(Some(SplitReason::Velocity));
        }
    }

    Ok(None)
}

/// Positive seconds between two consecutive points, or a [`TrajectoryError::TemporalOrdering`].
fn interval(index: usize, last: &TrajectoryPoint, next: &TrajectoryPoint) -> Result<f64> {
    if next.timestamp <= last.timestamp {
        return Err(TrajectoryError::TemporalOrdering {
            index,
            previous: last.timestamp,
            current: next.timestamp,
        });
    }
    Ok(next.seconds_since(last))
}

/// Partition one device's time-ordered points into segments.
///
/// The concatenation of the returned segments is exactly `points`. Fails without
/// partial output when two consecutive points are not strictly increasing in time.
///
/// # Example
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use trajectory_core::{segment, Position, SegmentConfig, TrajectoryPoint};
///
/// let t0 = Utc.timestamp_opt(0, 0).unwrap();
/// let here = Position::new(0.0, 0.0).unwrap();
/// let points: Vec<_> = [0, 5, 40, 45]
///     .iter()
///     .map(|&s| TrajectoryPoint::new(1, here, t0 + Duration::seconds(s)))
///     .collect();
///
/// let segments = segment(&points, &SegmentConfig::time_only(30.0)).unwrap();
/// assert_eq!(segments, vec![points[..2].to_vec(), points[2..].to_vec()]);
/// ```
pub fn segment(points: &[TrajectoryPoint], config: &SegmentConfig) -> Result<Vec<Segment>> {
    config.validate()?;

    let Some((first, rest)) = points.split_first() else {
        return Ok(Vec::new());
    };

    let mut segments = Vec::new();
    let mut current: Segment = vec![*first];

    for (offset, point) in rest.iter().enumerate() {
        let last = current[current.len() - 1];
        let delta = interval(offset + 1, &last, point)?;

        match split_reason(&last, point, delta, config)? {
            Some(reason) => {
                debug!(
                    "Device {}: {:?} split after {} points at {}",
                    point.device_id,
                    reason,
                    current.len(),
                    point.timestamp
                );
                segments.push(std::mem::replace(&mut current, vec![*point]));
            }
            None => current.push(*point),
        }
    }

    segments.push(current);

    debug!(
        "Segmented {} points into {} segments (time {}s, velocity {}m/s)",
        points.len(),
        segments.len(),
        config.time_threshold_secs,
        config.velocity_threshold_mps
    );

    Ok(segments)
}

/// Split on time gaps only. The usual threshold is 30 seconds.
pub fn split_by_time(points: &[TrajectoryPoint], time_threshold_secs: f64) -> Result<Vec<Segment>> {
    segment(points, &SegmentConfig::time_only(time_threshold_secs))
}

/// Split on velocity outliers only. The usual threshold is 340 m/s.
pub fn split_by_velocity(
    points: &[TrajectoryPoint],
    velocity_threshold_mps: f64,
    distance_model: DistanceModel,
) -> Result<Vec<Segment>> {
    segment(points, &SegmentConfig::velocity_only(velocity_threshold_mps, distance_model))
}

/// Segment many independent device tracks. Results are in input order.
pub fn segment_devices(tracks: &[Vec<TrajectoryPoint>], config: &SegmentConfig) -> Vec<Result<Vec<Segment>>> {
    tracks.iter().map(|track| segment(track, config)).collect()
}

/// Parallel version of [`segment_devices`]. Each track is segmented on its own,
/// so no locking is involved.
#[cfg(feature = "parallel")]
pub fn segment_devices_parallel(
    tracks: &[Vec<TrajectoryPoint>],
    config: &SegmentConfig,
) -> Vec<Result<Vec<Segment>>> {
    tracks.par_iter().map(|track| segment(track, config)).collect()
}

// ============================================================================
// Streaming
// ============================================================================

/// What happened to a point pushed into a [`SegmentTracker`].
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerEvent {
    /// First point; a segment was opened.
    Started,
    /// The point extended the current segment.
    Appended,
    /// The point opened a new segment; `closed` is the finished one.
    Split { reason: SplitReason, closed: Segment },
}

/// Incremental segmenter for a live stream from one device.
///
/// Produces the same segments as [`segment`] on the same input. A rejected point
/// leaves the tracker unchanged.
///
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use trajectory_core::{Position, SegmentConfig, SegmentTracker, TrackerEvent, TrajectoryPoint};
///
/// let t0 = Utc.timestamp_opt(0, 0).unwrap();
/// let here = Position::new(0.0, 0.0).unwrap();
/// let mut tracker = SegmentTracker::new(SegmentConfig::time_only(30.0)).unwrap();
///
/// tracker.push(TrajectoryPoint::new(1, here, t0)).unwrap();
/// let event = tracker.push(TrajectoryPoint::new(1, here, t0 + Duration::seconds(60))).unwrap();
/// assert!(matches!(event, TrackerEvent::Split { .. }));
/// assert_eq!(tracker.finish().unwrap().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct SegmentTracker {
    config: SegmentConfig,
    current: Segment,
    pushed: usize,
}

impl SegmentTracker {
    pub fn new(config: SegmentConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            current: Vec::new(),
            pushed: 0,
        })
    }

    /// Feed the next point of the stream.
    pub fn push(&mut self, point: TrajectoryPoint) -> Result<TrackerEvent> {
        let Some(&last) = self.current.last() else {
            self.current.push(point);
            self.pushed += 1;
            return Ok(TrackerEvent::Started);
        };

        if point.device_id != last.device_id {
            return Err(TrajectoryError::MixedDevices {
                expected: last.device_id,
                found: point.device_id,
            });
        }

        let delta = interval(self.pushed, &last, &point)?;
        let event = match split_reason(&last, &point, delta, &self.config)? {
            Some(reason) => TrackerEvent::Split {
                reason,
                closed: std::mem::replace(&mut self.current, vec![point]),
            },
            None => {
                self.current.push(point);
                TrackerEvent::Appended
            }
        };
        self.pushed += 1;
        Ok(event)
    }

    /// Points of the segment still in progress.
    pub fn current(&self) -> &[TrajectoryPoint] {
        &self.current
    }

    /// Close the stream, returning the in-progress segment if any point was seen.
    pub fn finish(self) -> Option<Segment> {
        if self.current.is_empty() {
            None
        } else {
            Some(self.current)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
