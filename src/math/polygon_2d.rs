use super::{Point2, Vector2, TOLERANCE};

/// Computes the signed area of a polygon (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise.
#[must_use]
pub fn signed_area_2d(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Area-weighted centroid of a simple polygon.
///
/// Falls back to the vertex average when the polygon has no area.
#[must_use]
pub fn centroid_2d(points: &[Point2]) -> Option<Point2> {
    if points.is_empty() {
        return None;
    }
    let area = signed_area_2d(points);
    if area.abs() < TOLERANCE {
        return Some(vertex_average(points));
    }
    let n = points.len();
    let (mut cx, mut cy) = (0.0, 0.0);
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        let cross = a.x * b.y - b.x * a.y;
        cx += (a.x + b.x) * cross;
        cy += (a.y + b.y) * cross;
    }
    let k = 1.0 / (6.0 * area);
    Some(Point2::new(cx * k, cy * k))
}

/// Mean of the vertices.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn vertex_average(points: &[Point2]) -> Point2 {
    let n = points.len().max(1) as f64;
    let sum = points
        .iter()
        .fold(Vector2::zeros(), |acc, p| acc + p.coords);
    Point2::from(sum / n)
}

/// Winding-number point-in-polygon test. Points on the boundary are inside.
#[must_use]
pub fn point_in_polygon_2d(point: &Point2, polygon: &[Point2]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    let mut winding = 0_i32;
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[(i + 1) % n];
        let cross = cross_2d(&(b - a), &(point - a));
        if cross.abs() < TOLERANCE
            && point.x >= a.x.min(b.x) - TOLERANCE
            && point.x <= a.x.max(b.x) + TOLERANCE
            && point.y >= a.y.min(b.y) - TOLERANCE
            && point.y <= a.y.max(b.y) + TOLERANCE
        {
            return true;
        }
        if a.y <= point.y {
            if b.y > point.y && cross > 0.0 {
                winding += 1;
            }
        } else if b.y <= point.y && cross < 0.0 {
            winding -= 1;
        }
    }
    winding != 0
}

/// Returns the left-pointing normal of a direction vector (rotated +90°).
#[must_use]
pub fn left_normal(dir: &Vector2) -> Vector2 {
    Vector2::new(-dir.y, dir.x)
}

/// Rotates `point` about `pivot` by `angle` radians (counter-clockwise).
#[must_use]
pub fn rotate_about(point: &Point2, pivot: &Point2, angle: f64) -> Point2 {
    let (s, c) = angle.sin_cos();
    let d = point - pivot;
    pivot + Vector2::new(d.x * c - d.y * s, d.x * s + d.y * c)
}

/// 2D cross product (z component).
#[must_use]
pub fn cross_2d(a: &Vector2, b: &Vector2) -> f64 {
    a.x * b.y - a.y * b.x
}
