//! Door and window placement against the wall network.

mod tool;

pub use tool::{PlacementTool, ToolEvent, ToolOutput, ToolState};

use crate::config::PlacementConfig;
use crate::grid::GridPoint;
use crate::math::distance_2d::SegmentProjection;
use crate::math::TOLERANCE;
use crate::model::{ElementKind, NodeId, WallMountedElement, WallSegment};

/// Outcome of validating one cursor position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementResult {
    /// Closest point on the chosen wall, or the cursor when free-floating.
    pub grid_position: GridPoint,
    /// Element centre after clamping it inside the wall.
    pub centered_position: GridPoint,
    pub rotation: f64,
    pub can_place: bool,
    pub nearest_wall: Option<NodeId>,
    /// Wall-local distance from the wall start to the element centre.
    pub wall_offset: Option<f64>,
}

impl PlacementResult {
    /// The element this result would commit, if placement is allowed.
    #[must_use]
    pub fn to_element(&self, kind: ElementKind) -> Option<WallMountedElement> {
        if !self.can_place {
            return None;
        }
        Some(match (self.nearest_wall, self.wall_offset) {
            (Some(wall), Some(offset)) => {
                WallMountedElement::on_wall(kind, wall, offset, self.rotation)
            }
            _ => WallMountedElement::free(kind, self.centered_position, self.rotation),
        })
    }
}

/// Validates where an element of a given kind would mount for a cursor position.
///
/// The query is pure: it reads the walls and elements it is given and never
/// mutates them, so it can run on every pointer move.
#[derive(Debug, Clone, Copy)]
pub struct PlacementQuery {
    cursor: GridPoint,
    kind: ElementKind,
    config: PlacementConfig,
    last_rotation: f64,
    ignore: Option<NodeId>,
}

impl PlacementQuery {
    /// Creates a query with the default configuration.
    #[must_use]
    pub fn new(cursor: GridPoint, kind: ElementKind) -> Self {
        Self {
            cursor,
            kind,
            config: PlacementConfig::default(),
            last_rotation: 0.0,
            ignore: None,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: PlacementConfig) -> Self {
        self.config = config;
        self
    }

    /// Rotation reported when no wall is in range.
    #[must_use]
    pub fn with_last_rotation(mut self, rotation: f64) -> Self {
        self.last_rotation = rotation;
        self
    }

    /// Skips `id` during collision checks, for moving an existing element.
    #[must_use]
    pub fn ignoring(mut self, id: NodeId) -> Self {
        self.ignore = Some(id);
        self
    }

    /// Runs the query.
    #[must_use]
    pub fn execute(
        &self,
        walls: &[(NodeId, WallSegment)],
        elements: &[(NodeId, WallMountedElement)],
    ) -> PlacementResult {
        let Some((wall_id, wall, proj)) = self.nearest_wall(walls) else {
            return self.free_floating();
        };

        let width = self.kind.width_cells();
        let half = width * 0.5;
        let length = wall.length();
        let fits = length + TOLERANCE >= width;
        let offset = if fits {
            (proj.t * length).clamp(half, length - half)
        } else {
            length * 0.5
        };

        let span = (offset - half, offset + half);
        let collides = elements
            .iter()
            .filter(|(id, _)| Some(*id) != self.ignore)
            .filter(|(_, e)| e.parent_wall() == Some(wall_id))
            .filter_map(|(_, e)| e.wall_span())
            .any(|other| spans_overlap(span, other));

        let centered_position = wall.point_at(offset).unwrap_or(proj.point);

        PlacementResult {
            grid_position: proj.point,
            centered_position,
            rotation: wall.rotation(),
            can_place: fits && !collides,
            nearest_wall: Some(wall_id),
            wall_offset: Some(offset),
        }
    }

    /// Non-degenerate wall whose infinite line passes closest to the cursor,
    /// within snapping range; the first wins ties.
    ///
    /// The mount point still comes from the clamped projection, so a cursor
    /// beyond a wall end lands on that end.
    fn nearest_wall<'a>(
        &self,
        walls: &'a [(NodeId, WallSegment)],
    ) -> Option<(NodeId, &'a WallSegment, SegmentProjection)> {
        let mut best: Option<(NodeId, &WallSegment, SegmentProjection)> = None;
        for (id, wall) in walls {
            let Some(proj) = wall.project(&self.cursor) else {
                continue;
            };
            if proj.line_distance > self.config.max_snap_distance {
                continue;
            }
            if best.is_none_or(|(_, _, b)| proj.line_distance < b.line_distance) {
                best = Some((*id, wall, proj));
            }
        }
        best
    }

    fn free_floating(&self) -> PlacementResult {
        PlacementResult {
            grid_position: self.cursor,
            centered_position: self.cursor,
            rotation: self.last_rotation,
            can_place: self.config.allow_free_standing,
            nearest_wall: None,
            wall_offset: None,
        }
    }
}

/// Open-interval overlap: elements may touch end to end.
fn spans_overlap(a: (f64, f64), b: (f64, f64)) -> bool {
    a.0 < b.1 - TOLERANCE && b.0 < a.1 - TOLERANCE
}
