//! Decoding of live position messages from the ingestion stream.
//!
//! Devices report `{"id", "latitude", "longitude", "timestamp"}` with the
//! timestamp in Unix milliseconds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrajectoryError};
use crate::{Position, TrajectoryPoint};

/// One position report as it arrives on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StreamMessage {
    pub id: i64,
    pub latitude: f64,
    pub longitude: f64,
    /// Unix epoch milliseconds.
    pub timestamp: i64,
}

impl TryFrom<StreamMessage> for TrajectoryPoint {
    type Error = TrajectoryError;

    fn try_from(msg: StreamMessage) -> Result<Self> {
        let position = Position::new(msg.latitude, msg.longitude)?;
        let timestamp = DateTime::<Utc>::from_timestamp_millis(msg.timestamp).ok_or_else(|| {
            TrajectoryError::MalformedMessage(format!("timestamp out of range: {}", msg.timestamp))
        })?;
        Ok(TrajectoryPoint::new(msg.id, position, timestamp))
    }
}

impl From<&TrajectoryPoint> for StreamMessage {
    fn from(point: &TrajectoryPoint) -> Self {
        Self {
            id: point.device_id,
            latitude: point.position.latitude,
            longitude: point.position.longitude,
            timestamp: point.timestamp.timestamp_millis(),
        }
    }
}

/// Decode a JSON stream message into a validated point.
///
/// ```
/// let point = trajectory_core::parse_stream_message(
///     r#"{"id": 4, "latitude": 31.23, "longitude": 121.47, "timestamp": 1700000000000}"#,
/// ).unwrap();
/// assert_eq!(point.device_id, 4);
/// ```
pub fn parse_stream_message(json: &str) -> Result<TrajectoryPoint> {
    let msg: StreamMessage =
        serde_json::from_str(json).map_err(|e| TrajectoryError::MalformedMessage(e.to_string()))?;
    TrajectoryPoint::try_from(msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PathMini, SegmentConfig};

    #[test]
    fn test_parse_valid_message() {
        let point = parse_stream_message(
            r#"{"id": 7, "latitude": 39.9042, "longitude": 116.4074, "timestamp": 1700000000500}"#,
        )
        .unwrap();
        assert_eq!(point.device_id, 7);
        assert_eq!(point.position, Position::new(39.9042, 116.4074).unwrap());
        assert_eq!(point.timestamp.timestamp_millis(), 1_700_000_000_500);
    }

    #[test]
    fn test_parse_missing_field() {
        let err = parse_stream_message(r#"{"id": 7, "latitude": 39.9, "timestamp": 0}"#).unwrap_err();
        assert!(matches!(err, TrajectoryError::MalformedMessage(_)));
    }

    #[test]
    fn test_parse_out_of_range_position() {
        let err = parse_stream_message(
            r#"{"id": 7, "latitude": 95.0, "longitude": 0.0, "timestamp": 0}"#,
        )
        .unwrap_err();
        assert!(matches!(err, TrajectoryError::InvalidPosition { .. }));
    }

    #[test]
    fn test_message_round_trip() {
        let point = parse_stream_message(
            r#"{"id": 2, "latitude": -33.8688, "longitude": 151.2093, "timestamp": 1700000123456}"#,
        )
        .unwrap();
        let msg = StreamMessage::from(&point);
        assert_eq!(TrajectoryPoint::try_from(msg).unwrap(), point);
    }

    #[test]
    fn test_output_field_names() {
        let mini = PathMini { device_id: 5, points: vec![[1.0, 2.0]] };
        let json = serde_json::to_value(&mini).unwrap();
        assert_eq!(json, serde_json::json!({"id": 5, "path": [[1.0, 2.0]]}));

        let config: SegmentConfig =
            serde_json::from_str(r#"{"time_threshold_secs": 10.0, "distance_model": "haversine"}"#).unwrap();
        assert_eq!(config.time_threshold_secs, 10.0);
        assert_eq!(config.velocity_threshold_mps, 340.0);
    }
}
