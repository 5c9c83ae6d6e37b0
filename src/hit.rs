//! Hit-testing against committed shapes.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::geometry::Point;
use crate::shape::Shape;

/// Ray-casting point-in-polygon test. Paths with fewer than three vertices
/// enclose nothing.
#[must_use]
pub fn point_in_polygon(p: Point, vertices: &[Point]) -> bool {
    if vertices.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = vertices.len() - 1;
    for (i, vi) in vertices.iter().enumerate() {
        let vj = vertices[j];
        if (vi.y > p.y) != (vj.y > p.y) && p.x < (vj.x - vi.x) * (p.y - vi.y) / (vj.y - vi.y) + vi.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// The topmost shape whose canvas geometry contains `p`.
///
/// `shapes` is in insertion order, so the scan runs back to front and the most
/// recently committed shape wins on overlap.
#[must_use]
pub fn topmost_at(shapes: &[Shape], p: Point) -> Option<&Shape> {
    shapes.iter().rev().find(|s| s.canvas.contains(p))
}

/// Whether `p` lies within `radius` of `target`.
#[must_use]
pub fn within_radius(p: Point, target: Point, radius: f64) -> bool {
    p.distance_to(target) <= radius
}
