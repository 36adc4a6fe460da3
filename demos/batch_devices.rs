//! Segment many device tracks in parallel.
//!
//! Run with: cargo run --example batch_devices --features parallel

use chrono::{Duration, TimeZone, Utc};
use std::time::Instant;
use trajectory_core::{segment_devices_parallel, Position, SegmentConfig, TrajectoryPoint};

fn main() {
    println!("Batch Segmentation Example\n");

    let t0 = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    let tracks: Vec<Vec<TrajectoryPoint>> = (0..200)
        .map(|device| {
            (0..5_000)
                .map(|i| {
                    // A 90s pause every 500 samples
                    let seconds = i * 2 + (i / 500) * 90;
                    let position =
                        Position::new(30.0 + i as f64 * 0.00002, 120.0 + device as f64 * 0.01).unwrap();
                    TrajectoryPoint::new(device, position, t0 + Duration::seconds(seconds))
                })
                .collect()
        })
        .collect();

    let start = Instant::now();
    let results = segment_devices_parallel(&tracks, &SegmentConfig::default());
    let elapsed = start.elapsed();

    let segments: usize = results.iter().filter_map(|r| r.as_ref().ok()).map(|s| s.len()).sum();
    let failed = results.iter().filter(|r| r.is_err()).count();
    println!("Tracks: {}", tracks.len());
    println!("Segments: {}", segments);
    println!("Failed tracks: {}", failed);
    println!("Elapsed: {:?}", elapsed);
}
