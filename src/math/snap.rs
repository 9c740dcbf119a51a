use super::{Point2, Vector2, TOLERANCE};

/// Axis chosen by [`snap_to_axis`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapAxis {
    Horizontal,
    Vertical,
    Diagonal,
}

/// Rounds `value` to the nearest multiple of `step`. A non-positive step
/// leaves the value untouched.
#[must_use]
pub fn snap_to_step(value: f64, step: f64) -> f64 {
    if step <= TOLERANCE {
        return value;
    }
    (value / step).round() * step
}

/// Rounds both coordinates of a point to multiples of `step`.
#[must_use]
pub fn snap_point(point: &Point2, step: f64) -> Point2 {
    Point2::new(snap_to_step(point.x, step), snap_to_step(point.y, step))
}

/// Rounds an angle (radians) to the nearest multiple of `step`.
#[must_use]
pub fn snap_angle(angle: f64, step: f64) -> f64 {
    snap_to_step(angle, step)
}

/// Constrains `raw` so the displacement from `anchor` lies on the horizontal,
/// vertical or 45° diagonal axis with the smallest deviation.
///
/// The deviations compared are `|dy|` (horizontal), `|dx|` (vertical) and
/// `||dx| - |dy||` (diagonal); ties resolve in that order. The displacement is
/// then projected onto the winning axis.
#[must_use]
pub fn snap_to_axis(anchor: &Point2, raw: &Point2) -> (Point2, SnapAxis) {
    let d = raw - anchor;
    let (ax, ay) = (d.x.abs(), d.y.abs());
    let diagonal = (ax - ay).abs();

    if ay <= ax && ay <= diagonal {
        (anchor + Vector2::new(d.x, 0.0), SnapAxis::Horizontal)
    } else if ax <= diagonal {
        (anchor + Vector2::new(0.0, d.y), SnapAxis::Vertical)
    } else {
        let m = (ax + ay) * 0.5;
        (
            anchor + Vector2::new(m.copysign(d.x), m.copysign(d.y)),
            SnapAxis::Diagonal,
        )
    }
}
