//! Fixed-interval downsampling of range query results.
//!
//! The window `[start, end]` is cut into buckets of `step` seconds starting at
//! `start`. Each bucket keeps the first point whose timestamp falls inside it.
//! Nothing is interpolated, so every output point is an input point.

use chrono::{DateTime, Duration, Utc};
use log::debug;

use crate::error::{Result, TrajectoryError};
use crate::{RangeQuery, TrajectoryPoint};

/// Keep at most one point per `step_seconds` bucket of `[start, end]`.
///
/// `points` must be time-ordered. Output never exceeds `⌈(end − start) / step⌉ + 1`
/// points and every returned timestamp lies inside `[start, end]`.
///
/// # Example
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use trajectory_core::{sample, Position, TrajectoryPoint};
///
/// let t0 = Utc.timestamp_opt(0, 0).unwrap();
/// let here = Position::new(0.0, 0.0).unwrap();
/// let points: Vec<_> = (0..100)
///     .map(|s| TrajectoryPoint::new(1, here, t0 + Duration::seconds(s)))
///     .collect();
///
/// let sampled = sample(&points, t0, t0 + Duration::seconds(99), 10).unwrap();
/// assert_eq!(sampled.len(), 10);
/// assert_eq!(sampled[3].timestamp, t0 + Duration::seconds(30));
/// ```
pub fn sample(
    points: &[TrajectoryPoint],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    step_seconds: i64,
) -> Result<Vec<TrajectoryPoint>> {
    if step_seconds <= 0 {
        return Err(TrajectoryError::InvalidStep(step_seconds));
    }
    let step = Duration::try_seconds(step_seconds).ok_or(TrajectoryError::InvalidStep(step_seconds))?;
    if end < start {
        return Err(TrajectoryError::RangeValidation { start, end });
    }

    let mut sampled = Vec::new();
    let mut cursor = 0;
    let mut current = start;

    while current <= end && cursor < points.len() {
        // Points before the bucket are never sampled
        while cursor < points.len() && points[cursor].timestamp < current {
            cursor += 1;
        }
        let Some(next) = points.get(cursor) else {
            break;
        };
        if next.timestamp > end {
            break;
        }

        // Jump over empty buckets straight to the one holding `next`
        let step_ms = step.num_milliseconds();
        let skipped = (next.timestamp - current).num_milliseconds() / step_ms;
        if skipped > 0 {
            match skipped
                .checked_mul(step_ms)
                .and_then(Duration::try_milliseconds)
                .and_then(|jump| current.checked_add_signed(jump))
            {
                Some(bucket) => current = bucket,
                None => break,
            }
        }

        sampled.push(*next);
        cursor += 1;

        match current.checked_add_signed(step) {
            Some(bucket) => current = bucket,
            None => break,
        }
    }

    debug!(
        "Sampled {} of {} points with a {}s step",
        sampled.len(),
        points.len(),
        step_seconds
    );

    Ok(sampled)
}

/// Step in seconds that keeps a window near `limit` points.
///
/// `max(1, ⌊(end − start) / limit⌋)`. The window must have a positive length.
pub fn step_for_limit(start: DateTime<Utc>, end: DateTime<Utc>, limit: u32) -> Result<i64> {
    if end <= start {
        return Err(TrajectoryError::RangeValidation { start, end });
    }
    if limit == 0 {
        return Err(TrajectoryError::InvalidLimit);
    }
    let span = (end - start).num_seconds();
    Ok((span / i64::from(limit)).max(1))
}

/// Validate `query`, then sample the query device's points inside its window.
pub fn sample_query(
    points: &[TrajectoryPoint],
    query: &RangeQuery,
    step_seconds: i64,
) -> Result<Vec<TrajectoryPoint>> {
    query.validate()?;
    let own: Vec<TrajectoryPoint> = points.iter().filter(|p| query.contains(p)).copied().collect();
    sample(&own, query.start_time, query.end_time, step_seconds)
}
