//! Tunable parameters for the editing tools.
//!
//! Every struct has a `Default` carrying the values the editor ships with;
//! callers override individual fields with struct update syntax.

use std::f64::consts::FRAC_PI_4;

/// Grid layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridConfig {
    /// World-space size of one grid cell.
    pub tile_size: f64,
    /// The grid spans `[-half_extent, half_extent]` cells on both axes.
    pub half_extent: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            tile_size: 0.5,
            half_extent: 50.0,
        }
    }
}

/// Properties given to newly drawn walls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallDefaults {
    /// Wall thickness in grid units.
    pub thickness: f64,
    /// Wall height in grid units.
    pub height: f64,
}

impl Default for WallDefaults {
    fn default() -> Self {
        Self {
            thickness: 0.2,
            height: 5.0,
        }
    }
}

/// Door/window placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementConfig {
    /// Maximum distance from the cursor to a wall for the element to snap onto it.
    pub max_snap_distance: f64,
    /// Whether an element away from every wall may be placed on the bare floor.
    /// Off by default: with no wall in range the preview is reported as unplaceable.
    pub allow_free_standing: bool,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            max_snap_distance: 1.0,
            allow_free_standing: false,
        }
    }
}

/// Roof handle dragging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoofConfig {
    pub min_height: f64,
    pub max_height: f64,
    /// Height increment applied while the snap modifier is held.
    pub height_step: f64,
    /// Rotation increment (radians) applied while the snap modifier is held.
    pub rotation_step: f64,
    /// Ridge endpoints are rounded to this precision when a rotation ends.
    pub release_precision: f64,
    /// Lower bound for each slope width.
    pub min_width: f64,
    /// Scale applied to pointer deltas while the fine modifier is held.
    pub fine_factor: f64,
}

impl Default for RoofConfig {
    fn default() -> Self {
        Self {
            min_height: 0.5,
            max_height: 10.0,
            height_step: 0.1,
            rotation_step: FRAC_PI_4,
            release_precision: 0.1,
            min_width: 0.25,
            fine_factor: 0.1,
        }
    }
}

/// Freehand polygon entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolygonConfig {
    /// Two clicks closer together than this (milliseconds) form a double click.
    pub double_click_ms: u64,
}

impl Default for PolygonConfig {
    fn default() -> Self {
        Self {
            double_click_ms: 300,
        }
    }
}

/// All editor parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EditorConfig {
    pub grid: GridConfig,
    pub walls: WallDefaults,
    pub placement: PlacementConfig,
    pub roof: RoofConfig,
    pub polygon: PolygonConfig,
}
