//! Tail sampling of route geometry.
//!
//! Drop-offs near the end of a route are the plausible ones, so candidates
//! are drawn only from the trailing slice of the geometry.

use std::collections::HashSet;

use crate::domain::{CoordKey, GeoPoint, Route};

/// Pick up to `count` evenly spaced points from the last `tail_fraction`
/// of `route`'s geometry.
///
/// The final geometry point (the destination) is never returned. Points
/// that round to the same key at `decimals` places are collapsed, keeping
/// the first. The result reflects only this route snapshot; a new route
/// needs a fresh sample.
pub fn sample_tail(route: &Route, count: usize, tail_fraction: f64, decimals: u32) -> Vec<GeoPoint> {
    let geometry = route.geometry();
    // Everything but the destination point
    let usable = geometry.len().saturating_sub(1);
    if usable == 0 || count == 0 {
        return Vec::new();
    }

    let fraction = tail_fraction.clamp(0.0, 1.0);
    let start = ((usable as f64) * (1.0 - fraction)).floor() as usize;
    let start = start.min(usable - 1);
    let tail = &geometry[start..usable];

    let indices: Vec<usize> = if tail.len() <= count {
        (0..tail.len()).collect()
    } else if count == 1 {
        vec![tail.len() - 1]
    } else {
        let step = (tail.len() - 1) as f64 / (count - 1) as f64;
        (0..count)
            .map(|i| ((i as f64) * step).round() as usize)
            .collect()
    };

    let mut seen = HashSet::new();
    indices
        .into_iter()
        .map(|i| tail[i])
        .filter(|p| seen.insert(CoordKey::new(p, decimals)))
        .collect()
}
