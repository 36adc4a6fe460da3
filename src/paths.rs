//! Path building and compact projection.
//!
//! A [`Path`] is a segment with the timestamps dropped. A [`PathMini`] goes one
//! step further and flattens every position to a `[latitude, longitude]` pair for
//! thin clients.
//!
//! Note that [`simplify_paths`] is a representation shrink only. It keeps every
//! point; no polyline decimation (Douglas-Peucker or similar) happens here.

use geo::{Coord, LineString};
use log::{debug, warn};

use crate::error::{Result, TrajectoryError};
use crate::geo_utils::{compute_bounds, polyline_length, DistanceModel};
use crate::segmentation::{segment, Segment, SegmentConfig};
use crate::{Bounds, Position, TrajectoryPoint};

/// Ordered positions of one device, ready to render as a polyline.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Path {
    #[cfg_attr(feature = "serde", serde(rename = "id"))]
    pub device_id: i64,
    #[cfg_attr(feature = "serde", serde(rename = "path"))]
    pub points: Vec<Position>,
}

impl Path {
    /// Total length in meters.
    pub fn length_meters(&self, model: DistanceModel) -> f64 {
        polyline_length(&self.points, model)
    }

    /// Bounding box, `None` for an empty path.
    pub fn bounds(&self) -> Option<Bounds> {
        compute_bounds(&self.points)
    }

    /// The path as a `geo` line string (x = longitude, y = latitude).
    pub fn to_line_string(&self) -> LineString<f64> {
        self.points
            .iter()
            .map(|p| Coord { x: p.longitude, y: p.latitude })
            .collect()
    }
}

/// A path flattened to `[latitude, longitude]` pairs.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathMini {
    #[cfg_attr(feature = "serde", serde(rename = "id"))]
    pub device_id: i64,
    #[cfg_attr(feature = "serde", serde(rename = "path"))]
    pub points: Vec<[f64; 2]>,
}

impl From<&Path> for PathMini {
    fn from(path: &Path) -> Self {
        Self {
            device_id: path.device_id,
            points: path.points.iter().map(|p| p.to_pair()).collect(),
        }
    }
}

/// Convert segments into paths, one per non-empty segment.
///
/// The device id comes from each segment's first point. Segments built by hand
/// that mix devices fail with [`TrajectoryError::MixedDevices`].
pub fn build_paths(segments: &[Segment]) -> Result<Vec<Path>> {
    let mut paths = Vec::with_capacity(segments.len());

    for seg in segments {
        let Some(first) = seg.first() else {
            warn!("Skipping empty segment");
            continue;
        };

        if let Some(stray) = seg.iter().find(|p| p.device_id != first.device_id) {
            return Err(TrajectoryError::MixedDevices {
                expected: first.device_id,
                found: stray.device_id,
            });
        }

        paths.push(Path {
            device_id: first.device_id,
            points: seg.iter().map(|p| p.position).collect(),
        });
    }

    Ok(paths)
}

/// Flatten paths to compact coordinate pairs, preserving order.
pub fn simplify_paths(paths: &[Path]) -> Vec<PathMini> {
    paths.iter().map(PathMini::from).collect()
}

/// Segment, build and flatten in one go.
///
/// This is the thin-client pipeline; [`SegmentConfig::compact`] is the usual
/// configuration for it.
pub fn mini_paths(points: &[TrajectoryPoint], config: &SegmentConfig) -> Result<Vec<PathMini>> {
    let segments = segment(points, config)?;
    let paths = build_paths(&segments)?;
    let mini = simplify_paths(&paths);
    debug!(
        "Built {} compact paths from {} points",
        mini.len(),
        points.len()
    );
    Ok(mini)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn t(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap() + Duration::seconds(seconds)
    }

    fn point(device_id: i64, seconds: i64, lat: f64, lng: f64) -> TrajectoryPoint {
        TrajectoryPoint::new(device_id, Position::new(lat, lng).unwrap(), t(seconds))
    }

    fn sample_track() -> Vec<TrajectoryPoint> {
        vec![
            point(3, 0, 51.5074, -0.1278),
            point(3, 2, 51.5075, -0.1279),
            point(3, 4, 51.5076, -0.1280),
            point(3, 60, 51.5090, -0.1300),
            point(3, 62, 51.5091, -0.1301),
        ]
    }

    #[test]
    fn test_build_paths() {
        let track = sample_track();
        let segments = vec![track[..3].to_vec(), track[3..].to_vec()];
        let paths = build_paths(&segments).unwrap();

        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|p| p.device_id == 3));
        assert_eq!(paths[0].points.len(), 3);
        assert_eq!(paths[1].points[0], track[3].position);
    }

    #[test]
    fn test_build_paths_skips_empty_segments() {
        let track = sample_track();
        let segments = vec![Vec::new(), track.clone(), Vec::new()];
        let paths = build_paths(&segments).unwrap();
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].points.len(), track.len());
        assert!(build_paths(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_build_paths_rejects_mixed_devices() {
        let segments = vec![vec![point(1, 0, 0.0, 0.0), point(2, 1, 0.0, 0.0)]];
        assert_eq!(
            build_paths(&segments),
            Err(TrajectoryError::MixedDevices { expected: 1, found: 2 })
        );
    }

    #[test]
    fn test_simplify_paths() {
        let path = Path {
            device_id: 9,
            points: vec![
                Position::new(10.0, 20.0).unwrap(),
                Position::new(-10.5, 170.25).unwrap(),
            ],
        };
        let mini = simplify_paths(std::slice::from_ref(&path));
        assert_eq!(
            mini,
            vec![PathMini { device_id: 9, points: vec![[10.0, 20.0], [-10.5, 170.25]] }]
        );
        assert!(simplify_paths(&[]).is_empty());
    }

    #[test]
    fn test_pipeline_preserves_points() {
        let track = sample_track();
        let mini = mini_paths(&track, &SegmentConfig::compact()).unwrap();

        assert_eq!(mini.len(), 2);
        let flattened: Vec<[f64; 2]> = mini.iter().flat_map(|m| m.points.clone()).collect();
        let original: Vec<[f64; 2]> = track.iter().map(|p| p.position.to_pair()).collect();
        assert_eq!(flattened, original);
    }

    #[test]
    fn test_pipeline_propagates_ordering_error() {
        let mut track = sample_track();
        track.swap(0, 1);
        assert!(matches!(
            mini_paths(&track, &SegmentConfig::default()),
            Err(TrajectoryError::TemporalOrdering { .. })
        ));
    }

    #[test]
    fn test_path_geometry() {
        let path = Path {
            device_id: 1,
            points: vec![Position::new(0.0, 0.0).unwrap(), Position::new(0.0, 1.0).unwrap()],
        };
        let length = path.length_meters(DistanceModel::Haversine);
        assert!((length - 111_195.0).abs() < 1_112.0);

        let bounds = path.bounds().unwrap();
        assert_eq!((bounds.min_lng, bounds.max_lng), (0.0, 1.0));

        let line = path.to_line_string();
        assert_eq!(line.0.len(), 2);
        assert_eq!(line.0[1], Coord { x: 1.0, y: 0.0 });

        let empty = Path { device_id: 1, points: Vec::new() };
        assert!(empty.bounds().is_none());
        assert_eq!(empty.length_meters(DistanceModel::Planar), 0.0);
    }
}
