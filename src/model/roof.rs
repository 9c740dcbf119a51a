use crate::grid::GridPoint;
use crate::math::distance_2d::{direction, distance};
use crate::math::polygon_2d::{left_normal, vertex_average};
use crate::math::{Point2, Vector2, SEGMENT_EPSILON};

/// Smallest slope width a roof can be built with.
pub const MIN_ROOF_WIDTH: f64 = 0.05;

/// A gable roof: a ridge line plus independent left/right slope widths.
///
/// "Left" is the side of the ridge's left normal (direction rotated +90°).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoofSegment {
    pub start: GridPoint,
    pub end: GridPoint,
    pub left_width: f64,
    pub right_width: f64,
    pub height: f64,
    pub visible: bool,
}

impl RoofSegment {
    /// Creates a roof. Widths and height are clamped to stay positive.
    #[must_use]
    pub fn new(start: GridPoint, end: GridPoint, left_width: f64, right_width: f64, height: f64) -> Self {
        Self {
            start,
            end,
            left_width: left_width.max(MIN_ROOF_WIDTH),
            right_width: right_width.max(MIN_ROOF_WIDTH),
            height: height.max(0.0),
            visible: true,
        }
    }

    /// Creates a symmetric roof of total footprint width `width`.
    #[must_use]
    pub fn symmetric(start: GridPoint, end: GridPoint, width: f64, height: f64) -> Self {
        Self::new(start, end, width * 0.5, width * 0.5, height)
    }

    #[must_use]
    pub fn ridge_length(&self) -> f64 {
        distance(&self.start, &self.end)
    }

    /// A ridge too short to derive faces from.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.ridge_length() < SEGMENT_EPSILON
    }

    /// Unit ridge direction, `None` when degenerate.
    #[must_use]
    pub fn ridge_direction(&self) -> Option<Vector2> {
        if self.is_degenerate() {
            return None;
        }
        direction(&self.start, &self.end)
    }

    /// Ridge direction rotated +90°, pointing at the left slope.
    #[must_use]
    pub fn perp_direction(&self) -> Option<Vector2> {
        self.ridge_direction().map(|d| left_normal(&d))
    }

    #[must_use]
    pub fn ridge_midpoint(&self) -> GridPoint {
        Point2::from((self.start.coords + self.end.coords) * 0.5)
    }

    /// Base corners on the floor plane:
    /// `[start + left, start - right, end - right, end + left]`.
    #[must_use]
    pub fn base_corners(&self) -> Option<[GridPoint; 4]> {
        let perp = self.perp_direction()?;
        let l = perp * self.left_width;
        let r = perp * self.right_width;
        Some([self.start + l, self.start - r, self.end - r, self.end + l])
    }

    /// Centroid of the four base corners; the ridge midpoint when degenerate.
    #[must_use]
    pub fn footprint_centroid(&self) -> GridPoint {
        self.base_corners()
            .map_or_else(|| self.ridge_midpoint(), |c| vertex_average(&c))
    }

    /// Total footprint width across the ridge.
    #[must_use]
    pub fn total_width(&self) -> f64 {
        self.left_width + self.right_width
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn widths_are_clamped_positive() {
        let r = RoofSegment::new(GridPoint::new(0.0, 0.0), GridPoint::new(4.0, 0.0), -1.0, 0.0, 2.0);
        assert!(r.left_width > 0.0);
        assert!(r.right_width > 0.0);
    }

    #[test]
    fn base_corners_follow_left_normal() {
        let r = RoofSegment::new(GridPoint::new(0.0, 0.0), GridPoint::new(4.0, 0.0), 1.0, 2.0, 2.0);
        let c = r.base_corners().unwrap();
        assert_abs_diff_eq!(c[0], GridPoint::new(0.0, 1.0));
        assert_abs_diff_eq!(c[1], GridPoint::new(0.0, -2.0));
        assert_abs_diff_eq!(c[2], GridPoint::new(4.0, -2.0));
        assert_abs_diff_eq!(c[3], GridPoint::new(4.0, 1.0));
        assert_abs_diff_eq!(r.footprint_centroid(), GridPoint::new(2.0, -0.5));
    }

    #[test]
    fn degenerate_ridge_has_no_corners() {
        let p = GridPoint::new(1.0, 1.0);
        let r = RoofSegment::symmetric(p, p, 4.0, 2.0);
        assert!(r.is_degenerate());
        assert!(r.base_corners().is_none());
        assert_eq!(r.footprint_centroid(), p);
    }
}
