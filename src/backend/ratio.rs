//! Aspect ratio selection for providers that take a ratio label instead of pixels

/// Supported ratio labels in lookup order; earlier entries win ties
pub const ASPECT_RATIOS: [(&str, f64); 9] = [
    ("1:1", 1.0),
    ("2:3", 2.0 / 3.0),
    ("3:2", 3.0 / 2.0),
    ("3:4", 3.0 / 4.0),
    ("4:3", 4.0 / 3.0),
    ("9:16", 9.0 / 16.0),
    ("16:9", 16.0 / 9.0),
    ("9:21", 9.0 / 21.0),
    ("21:9", 21.0 / 9.0),
];

/// Pick the label whose ratio is closest to `width / height`
pub fn closest_aspect_ratio(width: u32, height: u32) -> &'static str {
    let target = f64::from(width) / f64::from(height.max(1));

    let mut best = ASPECT_RATIOS[0];
    for candidate in &ASPECT_RATIOS[1..] {
        if (candidate.1 - target).abs() < (best.1 - target).abs() {
            best = *candidate;
        }
    }
    best.0
}
