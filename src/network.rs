//! Per-floor view of the wall network.

use crate::grid::GridPoint;
use crate::math::TOLERANCE;
use crate::model::{FloorId, NodeId, NodeRepository, WallSegment};

/// How many walls meet at a shared endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JointKind {
    /// Three or more walls.
    Junction,
    /// Exactly two walls: a corner or a straight continuation.
    Corner,
    /// A single wall ends here.
    DeadEnd,
}

/// A wall endpoint together with every wall that touches it.
#[derive(Debug, Clone)]
pub struct Joint {
    pub point: GridPoint,
    pub kind: JointKind,
    pub walls: Vec<NodeId>,
}

/// Snapshot of the walls on one floor, keyed by node id.
#[derive(Debug, Clone, Default)]
pub struct WallNetwork {
    walls: Vec<(NodeId, WallSegment)>,
}

impl WallNetwork {
    /// Builds a network from explicit walls.
    #[must_use]
    pub fn new(walls: Vec<(NodeId, WallSegment)>) -> Self {
        Self { walls }
    }

    /// Loads the committed walls of a floor.
    #[must_use]
    pub fn load<R: NodeRepository + ?Sized>(repo: &R, floor: FloorId) -> Self {
        Self::new(repo.walls(floor))
    }

    /// Looks a wall up by id.
    #[must_use]
    pub fn segment(&self, id: NodeId) -> Option<&WallSegment> {
        self.walls.iter().find(|(wid, _)| *wid == id).map(|(_, w)| w)
    }

    /// All walls, degenerate ones included.
    pub fn iter(&self) -> impl Iterator<Item = &(NodeId, WallSegment)> {
        self.walls.iter()
    }

    /// Walls long enough for length-dependent geometry.
    pub fn valid(&self) -> impl Iterator<Item = &(NodeId, WallSegment)> {
        self.walls.iter().filter(|(_, w)| !w.is_degenerate())
    }

    /// Ids of walls too short to render; callers may choose to delete them.
    #[must_use]
    pub fn degenerate_ids(&self) -> Vec<NodeId> {
        self.walls
            .iter()
            .filter(|(_, w)| w.is_degenerate())
            .map(|(id, _)| *id)
            .collect()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[(NodeId, WallSegment)] {
        &self.walls
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.walls.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.walls.is_empty()
    }

    /// Valid walls having an endpoint at `point`.
    #[must_use]
    pub fn walls_at(&self, point: &GridPoint) -> Vec<NodeId> {
        self.valid()
            .filter(|(_, w)| same_point(&w.start, point) || same_point(&w.end, point))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Every distinct endpoint of the valid walls, classified by valence.
    #[must_use]
    pub fn joints(&self) -> Vec<Joint> {
        let mut joints: Vec<Joint> = Vec::new();
        for (id, wall) in self.valid() {
            for p in [wall.start, wall.end] {
                if let Some(j) = joints.iter_mut().find(|j| same_point(&j.point, &p)) {
                    j.walls.push(*id);
                } else {
                    joints.push(Joint {
                        point: p,
                        kind: JointKind::DeadEnd,
                        walls: vec![*id],
                    });
                }
            }
        }
        for j in &mut joints {
            j.kind = match j.walls.len() {
                0 | 1 => JointKind::DeadEnd,
                2 => JointKind::Corner,
                _ => JointKind::Junction,
            };
        }
        joints
    }
}

fn same_point(a: &GridPoint, b: &GridPoint) -> bool {
    (a - b).norm_squared() < TOLERANCE * 100.0
}
