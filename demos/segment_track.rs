//! Segment one device's track and print the resulting paths.
//!
//! Run with: cargo run --example segment_track

use chrono::{Duration, TimeZone, Utc};
use trajectory_core::{
    build_paths, generate_colors, sample, segment, simplify_paths, DistanceModel, Position,
    SegmentConfig, TrajectoryPoint,
};

fn main() {
    let t0 = Utc.timestamp_opt(1_700_000_000, 0).unwrap();

    // A walk along the Bund with a pause and one GPS jump
    let mut points = Vec::new();
    let mut lat = 31.2336;
    let mut time = 0;
    for i in 0..40 {
        time += if i == 20 { 120 } else { 3 };
        lat += if i == 30 { 0.2 } else { 0.00005 };
        let position = Position::new(lat, 121.4906).unwrap();
        points.push(TrajectoryPoint::new(1, position, t0 + Duration::seconds(time)));
    }

    let config = SegmentConfig::default();
    println!("Trajectory Segmentation Example\n");
    println!(
        "Config: time_threshold={}s, velocity_threshold={}m/s, model={:?}\n",
        config.time_threshold_secs, config.velocity_threshold_mps, config.distance_model
    );

    let segments = segment(&points, &config).unwrap();
    let paths = build_paths(&segments).unwrap();
    let colors = generate_colors(paths.len());

    for (i, (path, color)) in paths.iter().zip(&colors).enumerate() {
        println!(
            "  path {}: {} points, {:.0}m, color {}",
            i,
            path.points.len(),
            path.length_meters(DistanceModel::Haversine),
            color
        );
    }

    let mini = simplify_paths(&paths);
    println!("\nCompact paths: {}", mini.len());

    let end = points[points.len() - 1].timestamp;
    let sampled = sample(&points, t0, end, 30).unwrap();
    println!("Sampled {} of {} points at 30s", sampled.len(), points.len());
}
