use crate::grid::GridPoint;

use super::NodeId;

/// Kind of wall-mounted element. Doors and windows share one collision domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Door,
    Window,
}

impl ElementKind {
    /// Width in grid cells.
    #[must_use]
    pub fn width_cells(self) -> f64 {
        match self {
            Self::Door | Self::Window => 2.0,
        }
    }
}

/// Where an element sits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mount {
    /// Mounted on a wall; `offset` is the wall-local distance from the wall
    /// start to the element centre.
    OnWall { wall: NodeId, offset: f64 },
    /// Standing directly on the floor grid.
    Free { position: GridPoint },
}

/// A door or window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallMountedElement {
    pub kind: ElementKind,
    pub mount: Mount,
    pub rotation: f64,
    pub width_cells: f64,
    pub can_place: bool,
}

impl WallMountedElement {
    /// An element mounted on `wall` with its centre `offset` along it.
    #[must_use]
    pub fn on_wall(kind: ElementKind, wall: NodeId, offset: f64, rotation: f64) -> Self {
        Self {
            kind,
            mount: Mount::OnWall { wall, offset },
            rotation,
            width_cells: kind.width_cells(),
            can_place: true,
        }
    }

    /// A free-standing element at `position`.
    #[must_use]
    pub fn free(kind: ElementKind, position: GridPoint, rotation: f64) -> Self {
        Self {
            kind,
            mount: Mount::Free { position },
            rotation,
            width_cells: kind.width_cells(),
            can_place: true,
        }
    }

    /// Parent wall, if mounted.
    #[must_use]
    pub fn parent_wall(&self) -> Option<NodeId> {
        match self.mount {
            Mount::OnWall { wall, .. } => Some(wall),
            Mount::Free { .. } => None,
        }
    }

    /// Occupied wall-local interval `(from, to)` when mounted.
    #[must_use]
    pub fn wall_span(&self) -> Option<(f64, f64)> {
        match self.mount {
            Mount::OnWall { offset, .. } => {
                let half = self.width_cells * 0.5;
                Some((offset - half, offset + half))
            }
            Mount::Free { .. } => None,
        }
    }
}
