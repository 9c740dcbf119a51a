//! Discrete floor grid and grid/world conversion.
//!
//! Grid points are real-valued pairs measured in cells. World space is Y-up:
//! grid `x` maps to world `x` and grid `y` maps to world `z`, both scaled by
//! the tile size.

use crate::config::GridConfig;
use crate::math::{Point2, Point3};

/// A position on the floor grid, in cells.
pub type GridPoint = Point2;

/// A horizontal world-space position `(x, z)`.
pub type WorldPoint = Point2;

/// The playable floor grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    config: GridConfig,
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(GridConfig::default())
    }
}

impl Grid {
    /// Creates a grid from its configuration.
    #[must_use]
    pub fn new(config: GridConfig) -> Self {
        Self { config }
    }

    /// World-space size of one cell.
    #[must_use]
    pub fn tile_size(&self) -> f64 {
        self.config.tile_size
    }

    /// Converts a grid point to a horizontal world position `(x, z)`.
    #[must_use]
    pub fn to_world(&self, point: &GridPoint) -> WorldPoint {
        to_world(point, self.config.tile_size)
    }

    /// Converts a grid point to a world position at height `y`.
    #[must_use]
    pub fn to_world_3d(&self, point: &GridPoint, y: f64) -> Point3 {
        let w = self.to_world(point);
        Point3::new(w.x, y, w.y)
    }

    /// Converts a world position to the nearest grid intersection.
    ///
    /// Returns `None` when the intersection lies outside the grid extent.
    #[must_use]
    pub fn to_grid(&self, world: &WorldPoint) -> Option<GridPoint> {
        if self.config.tile_size <= 0.0 {
            return None;
        }
        let p = GridPoint::new(
            (world.x / self.config.tile_size).round(),
            (world.y / self.config.tile_size).round(),
        );
        self.contains(&p).then_some(p)
    }

    /// Rounds a grid-space point to the nearest intersection, or `None` when out of range.
    #[must_use]
    pub fn snap(&self, point: &GridPoint) -> Option<GridPoint> {
        let p = GridPoint::new(point.x.round(), point.y.round());
        self.contains(&p).then_some(p)
    }

    /// Whether a grid point lies within the grid extent (inclusive).
    #[must_use]
    pub fn contains(&self, point: &GridPoint) -> bool {
        let h = self.config.half_extent;
        point.x.is_finite()
            && point.y.is_finite()
            && point.x.abs() <= h
            && point.y.abs() <= h
    }
}

/// Converts a grid point to a horizontal world position `(x, z)`.
#[must_use]
pub fn to_world(point: &GridPoint, tile_size: f64) -> WorldPoint {
    WorldPoint::new(point.x * tile_size, point.y * tile_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Grid {
        Grid::new(GridConfig {
            tile_size: 0.5,
            half_extent: 10.0,
        })
    }

    #[test]
    fn world_scales_by_tile() {
        let w = grid().to_world(&GridPoint::new(3.0, -4.0));
        assert_eq!(w, WorldPoint::new(1.5, -2.0));
    }

    #[test]
    fn to_world_3d_maps_grid_y_to_world_z() {
        let w = grid().to_world_3d(&GridPoint::new(2.0, 6.0), 1.25);
        assert_eq!(w, Point3::new(1.0, 1.25, 3.0));
    }

    #[test]
    fn to_grid_rounds_to_nearest_intersection() {
        let g = grid().to_grid(&WorldPoint::new(1.3, -0.6));
        assert_eq!(g, Some(GridPoint::new(3.0, -1.0)));
    }

    #[test]
    fn out_of_range_is_none() {
        assert_eq!(grid().to_grid(&WorldPoint::new(5.3, 0.0)), None);
        assert_eq!(grid().snap(&GridPoint::new(0.0, -10.6)), None);
        assert_eq!(grid().to_grid(&WorldPoint::new(f64::NAN, 0.0)), None);
    }

    #[test]
    fn extent_is_inclusive() {
        assert!(grid().contains(&GridPoint::new(10.0, -10.0)));
        assert_eq!(
            grid().snap(&GridPoint::new(9.6, 0.2)),
            Some(GridPoint::new(10.0, 0.0))
        );
    }
}
