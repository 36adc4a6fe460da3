//! Distinct colors for drawing several paths on one map.

const SATURATION: f64 = 0.9;
const VALUE: f64 = 0.9;

/// `n` colors as `#rrggbb`, with hues spread evenly around the wheel.
///
/// ```
/// use trajectory_core::generate_colors;
///
/// let colors = generate_colors(3);
/// assert_eq!(colors, vec!["#e61717", "#17e617", "#1717e6"]);
/// ```
pub fn generate_colors(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| {
            let hue = (360 * i) as f64 / n as f64;
            let [r, g, b] = hsv_to_rgb(hue / 360.0, SATURATION, VALUE);
            format!("#{:02x}{:02x}{:02x}", r, g, b)
        })
        .collect()
}

/// HSV (all components in 0..=1) to 8-bit RGB. Channels round half to even.
fn hsv_to_rgb(hue: f64, saturation: f64, value: f64) -> [u8; 3] {
    let sector = (hue * 6.0).floor();
    let fraction = hue * 6.0 - sector;

    let p = value * (1.0 - saturation);
    let q = value * (1.0 - saturation * fraction);
    let t = value * (1.0 - saturation * (1.0 - fraction));

    let (r, g, b) = match (sector as i64).rem_euclid(6) {
        0 => (value, t, p),
        1 => (q, value, p),
        2 => (p, value, t),
        3 => (p, q, value),
        4 => (t, p, value),
        _ => (value, p, q),
    };

    [r, g, b].map(|channel| (channel * 255.0).round_ties_even().clamp(0.0, 255.0) as u8)
}
