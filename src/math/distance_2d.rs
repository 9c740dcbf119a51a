use super::{Point2, Vector2, TOLERANCE};

/// Projection of a point onto a bounded segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentProjection {
    /// Projection parameter clamped to `[0, 1]`.
    pub t: f64,
    /// Closest point on the segment.
    pub point: Point2,
    /// Distance from the query point to `point`.
    pub distance: f64,
    /// Perpendicular distance from the query point to the segment's infinite line.
    pub line_distance: f64,
}

/// Euclidean distance between two points.
#[must_use]
pub fn distance(a: &Point2, b: &Point2) -> f64 {
    (b - a).norm()
}

/// Unit direction from `a` to `b`, or `None` when the points coincide.
#[must_use]
pub fn direction(a: &Point2, b: &Point2) -> Option<Vector2> {
    let d = b - a;
    let len = d.norm();
    if len < TOLERANCE {
        return None;
    }
    Some(d / len)
}

/// Projects `p` onto the segment `a → b`.
///
/// Returns `None` for a zero-length segment, which has no direction to project on.
#[must_use]
pub fn project_on_segment(p: &Point2, a: &Point2, b: &Point2) -> Option<SegmentProjection> {
    let d = b - a;
    let len_sq = d.norm_squared();
    if len_sq < TOLERANCE * TOLERANCE {
        return None;
    }

    let to_p = p - a;
    let raw_t = to_p.dot(&d) / len_sq;
    let t = raw_t.clamp(0.0, 1.0);
    let point = a + d * t;

    // |cross| / |d| is the distance to the infinite line.
    let cross = d.x * to_p.y - d.y * to_p.x;
    let line_distance = cross.abs() / len_sq.sqrt();

    Some(SegmentProjection {
        t,
        point,
        distance: (p - point).norm(),
        line_distance,
    })
}

/// Returns the minimum distance from point `p` to the segment `a → b`.
///
/// A zero-length segment degrades to point-to-point distance.
#[must_use]
pub fn point_to_segment_dist(p: &Point2, a: &Point2, b: &Point2) -> f64 {
    project_on_segment(p, a, b).map_or_else(|| distance(p, a), |proj| proj.distance)
}
