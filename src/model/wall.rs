use crate::config::WallDefaults;
use crate::error::{GeometryError, Result};
use crate::grid::GridPoint;
use crate::math::distance_2d::{direction, distance, project_on_segment, SegmentProjection};
use crate::math::polygon_2d::left_normal;
use crate::math::{Point2, Vector2, SEGMENT_EPSILON, TOLERANCE};

/// A straight wall between two grid points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallSegment {
    pub start: GridPoint,
    pub end: GridPoint,
    pub thickness: f64,
    pub height: f64,
    pub visible: bool,
    pub opacity: f64,
}

/// Display geometry for one wall box, corner extension applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallRenderGeometry {
    /// Centre of the box on the floor, in grid units.
    pub center: GridPoint,
    /// Rotation about the vertical axis, `atan2(-dz, dx)`.
    pub rotation: f64,
    /// `length + thickness`.
    pub length: f64,
    pub thickness: f64,
    pub height: f64,
}

impl WallSegment {
    /// Creates a wall with the given defaults.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::ZeroLengthSegment` when `start == end`, and
    /// `GeometryError::NonPositive` for a non-positive thickness or height.
    pub fn new(start: GridPoint, end: GridPoint, defaults: &WallDefaults) -> Result<Self> {
        if distance(&start, &end) < TOLERANCE {
            return Err(GeometryError::ZeroLengthSegment {
                x0: start.x,
                y0: start.y,
                x1: end.x,
                y1: end.y,
            }
            .into());
        }
        if defaults.thickness <= 0.0 {
            return Err(GeometryError::NonPositive {
                parameter: "thickness",
                value: defaults.thickness,
            }
            .into());
        }
        if defaults.height <= 0.0 {
            return Err(GeometryError::NonPositive {
                parameter: "height",
                value: defaults.height,
            }
            .into());
        }
        Ok(Self::anchored(start, defaults).with_end(end))
    }

    /// A zero-length preview wall anchored at `point`.
    ///
    /// Only the freehand builder creates these; they stay degenerate until the
    /// cursor moves and are skipped by all derived geometry.
    #[must_use]
    pub fn anchored(point: GridPoint, defaults: &WallDefaults) -> Self {
        Self {
            start: point,
            end: point,
            thickness: defaults.thickness,
            height: defaults.height,
            visible: true,
            opacity: 1.0,
        }
    }

    /// Returns a copy with a different end point.
    #[must_use]
    pub fn with_end(mut self, end: GridPoint) -> Self {
        self.end = end;
        self
    }

    /// Centreline length in grid units.
    #[must_use]
    pub fn length(&self) -> f64 {
        distance(&self.start, &self.end)
    }

    /// Whether the wall is too short for any length-dependent computation.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.length() < SEGMENT_EPSILON
    }

    /// Unit direction from start to end.
    #[must_use]
    pub fn direction(&self) -> Option<Vector2> {
        if self.is_degenerate() {
            return None;
        }
        direction(&self.start, &self.end)
    }

    /// Rotation about the vertical axis: `atan2(-dz, dx)`.
    #[must_use]
    pub fn rotation(&self) -> f64 {
        let d = self.end - self.start;
        (-d.y).atan2(d.x)
    }

    /// Midpoint of the centreline.
    #[must_use]
    pub fn midpoint(&self) -> GridPoint {
        Point2::from((self.start.coords + self.end.coords) * 0.5)
    }

    /// Rendered length: the centreline extended by half the thickness at each
    /// end, so walls meeting at a shared point close the corner at any angle.
    #[must_use]
    pub fn rendered_length(&self) -> f64 {
        self.length() + self.thickness
    }

    /// Point at wall-local distance `offset` from the start.
    #[must_use]
    pub fn point_at(&self, offset: f64) -> Option<GridPoint> {
        self.direction().map(|dir| self.start + dir * offset)
    }

    /// Projects a point onto the wall. `None` for degenerate walls.
    #[must_use]
    pub fn project(&self, point: &GridPoint) -> Option<SegmentProjection> {
        if self.is_degenerate() {
            return None;
        }
        project_on_segment(point, &self.start, &self.end)
    }

    /// Four floor corners of the extended wall box, counter-clockwise from the
    /// start-side right corner.
    #[must_use]
    pub fn footprint(&self) -> Option<[GridPoint; 4]> {
        let dir = self.direction()?;
        let half = self.thickness * 0.5;
        let along = dir * half;
        let side = left_normal(&dir) * half;
        let s = self.start - along;
        let e = self.end + along;
        Some([s - side, e - side, e + side, s + side])
    }

    /// Box geometry for the rendering layer, or `None` for degenerate walls.
    #[must_use]
    pub fn render_geometry(&self) -> Option<WallRenderGeometry> {
        if self.is_degenerate() {
            return None;
        }
        Some(WallRenderGeometry {
            center: self.midpoint(),
            rotation: self.rotation(),
            length: self.rendered_length(),
            thickness: self.thickness,
            height: self.height,
        })
    }
}

/// Centreline length of a wall.
#[must_use]
pub fn segment_length(wall: &WallSegment) -> f64 {
    wall.length()
}

/// Rotation of a wall about the vertical axis.
#[must_use]
pub fn segment_angle(wall: &WallSegment) -> f64 {
    wall.rotation()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    use approx::assert_abs_diff_eq;

    use super::*;

    fn wall(x0: f64, y0: f64, x1: f64, y1: f64) -> WallSegment {
        WallSegment::new(
            GridPoint::new(x0, y0),
            GridPoint::new(x1, y1),
            &WallDefaults::default(),
        )
        .unwrap()
    }

    #[test]
    fn zero_length_wall_is_rejected() {
        let p = GridPoint::new(2.0, 2.0);
        assert!(WallSegment::new(p, p, &WallDefaults::default()).is_err());
    }

    #[test]
    fn non_positive_thickness_is_rejected() {
        let defaults = WallDefaults {
            thickness: 0.0,
            ..WallDefaults::default()
        };
        let r = WallSegment::new(GridPoint::new(0.0, 0.0), GridPoint::new(1.0, 0.0), &defaults);
        assert!(r.is_err());
    }

    #[test]
    fn rotation_uses_negated_depth() {
        // Grid +y is world +z, so a wall pointing +y turns clockwise seen from above.
        assert_abs_diff_eq!(wall(0.0, 0.0, 0.0, 4.0).rotation(), -FRAC_PI_2);
        assert_abs_diff_eq!(wall(0.0, 0.0, 3.0, -3.0).rotation(), FRAC_PI_4);
        assert_abs_diff_eq!(segment_angle(&wall(0.0, 0.0, 5.0, 0.0)), 0.0);
    }

    #[test]
    fn rendered_length_extends_by_thickness() {
        for w in [
            wall(0.0, 0.0, 4.0, 0.0),
            wall(0.0, 0.0, 3.0, 3.0),
            wall(1.0, 2.0, -2.0, 6.0),
        ] {
            assert_abs_diff_eq!(w.rendered_length(), segment_length(&w) + w.thickness);
        }
    }

    #[test]
    fn footprint_spans_extended_box() {
        let w = wall(0.0, 0.0, 4.0, 0.0);
        let fp = w.footprint().unwrap();
        assert_abs_diff_eq!(fp[0], GridPoint::new(-0.1, -0.1), epsilon = 1e-12);
        assert_abs_diff_eq!(fp[2], GridPoint::new(4.1, 0.1), epsilon = 1e-12);
    }

    #[test]
    fn degenerate_wall_has_no_render_geometry() {
        let w = WallSegment::anchored(GridPoint::new(1.0, 1.0), &WallDefaults::default())
            .with_end(GridPoint::new(1.05, 1.0));
        assert!(w.is_degenerate());
        assert!(w.render_geometry().is_none());
        assert!(w.footprint().is_none());
        assert!(w.project(&GridPoint::new(1.0, 0.0)).is_none());
    }

    #[test]
    fn point_at_walks_along_wall() {
        let w = wall(0.0, 0.0, 0.0, 6.0);
        assert_abs_diff_eq!(w.point_at(2.5).unwrap(), GridPoint::new(0.0, 2.5));
    }
}
