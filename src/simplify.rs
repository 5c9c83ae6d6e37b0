//! Freehand path reduction.
//!
//! Pointer sampling produces many nearly collinear points. [`simplify_path`]
//! runs Ramer-Douglas-Peucker over the samples: a point survives only if
//! dropping it would move the polyline by more than `tolerance` pixels.

#[cfg(test)]
#[path = "simplify_test.rs"]
mod simplify_test;

use crate::geometry::Point;

/// Simplify `points` to within `tolerance` pixels.
///
/// The first and last points are kept exactly. A non-empty input always yields
/// at least two points (a lone point is repeated). A tolerance that is zero,
/// negative or not finite returns the input unchanged.
#[must_use]
pub fn simplify_path(points: &[Point], tolerance: f64) -> Vec<Point> {
    let (Some(&first), Some(&last)) = (points.first(), points.last()) else {
        return Vec::new();
    };
    if points.len() == 1 {
        return vec![first, first];
    }
    if !(tolerance.is_finite() && tolerance > 0.0) || points.len() == 2 {
        return points.to_vec();
    }

    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[points.len() - 1] = true;

    // Explicit stack instead of recursion; long strokes can hold thousands of samples.
    let mut stack = vec![(0usize, points.len() - 1)];
    let tol_sq = tolerance * tolerance;
    while let Some((start, end)) = stack.pop() {
        if end <= start + 1 {
            continue;
        }
        let (a, b) = (points[start], points[end]);
        let mut max_sq = 0.0;
        let mut index = start;
        for (i, p) in points.iter().enumerate().take(end).skip(start + 1) {
            let d = segment_distance_sq(*p, a, b);
            if d > max_sq {
                max_sq = d;
                index = i;
            }
        }
        if max_sq > tol_sq {
            keep[index] = true;
            stack.push((start, index));
            stack.push((index, end));
        }
    }

    let mut out: Vec<Point> = points
        .iter()
        .zip(&keep)
        .filter_map(|(p, k)| k.then_some(*p))
        .collect();
    if out.len() < 2 {
        out = vec![first, last];
    }
    out
}

/// Drop consecutive points closer than `min_distance` to the previously kept one.
/// The final input point is always kept.
#[must_use]
pub fn dedup_consecutive(points: &[Point], min_distance: f64) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    for p in points {
        match out.last() {
            Some(last) if last.distance_to(*p) < min_distance => {}
            _ => out.push(*p),
        }
    }
    if let (Some(&tail), Some(kept)) = (points.last(), out.last_mut()) {
        *kept = tail;
    }
    out
}

/// Whether `points` holds at least two distinct points. Stops at the first
/// point that differs from the head.
#[must_use]
pub fn has_distinct_pair(points: &[Point]) -> bool {
    match points.split_first() {
        Some((first, rest)) => rest.iter().any(|p| p != first),
        None => false,
    }
}

/// Number of distinct points in `points`.
#[must_use]
pub fn distinct_count(points: &[Point]) -> usize {
    // `+ 0.0` folds -0.0 into 0.0 so the bit patterns agree with `==`.
    let mut keys: Vec<(u64, u64)> = points.iter().map(|p| ((p.x + 0.0).to_bits(), (p.y + 0.0).to_bits())).collect();
    keys.sort_unstable();
    keys.dedup();
    keys.len()
}

/// Squared distance from `p` to the segment `a..b`.
fn segment_distance_sq(p: Point, a: Point, b: Point) -> f64 {
    let (vx, vy) = (b.x - a.x, b.y - a.y);
    let (wx, wy) = (p.x - a.x, p.y - a.y);
    let len_sq = vx * vx + vy * vy;
    if len_sq == 0.0 {
        return wx * wx + wy * wy;
    }
    let t = ((wx * vx + wy * vy) / len_sq).clamp(0.0, 1.0);
    let (dx, dy) = (p.x - (a.x + t * vx), p.y - (a.y + t * vy));
    dx * dx + dy * dy
}
