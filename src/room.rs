use std::collections::HashMap;

use spade::{ConstrainedDelaunayTriangulation, InsertionError, Point2 as SpadePoint2, Triangulation};

use crate::error::{GeometryError, OperationError, Result, StoreError};
use crate::grid::GridPoint;
use crate::math::distance_2d::distance;
use crate::math::polygon_2d::{centroid_2d, point_in_polygon_2d, signed_area_2d};
use crate::math::{Point3, Vector3, TOLERANCE};
use crate::mesh::TriangleMesh;
use crate::model::{NodeId, NodeRepository, WallSegment};

type Cdt = ConstrainedDelaunayTriangulation<SpadePoint2<f64>>;

/// Closed outline of a room, one vertex per wall start.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomOutline {
    points: Vec<GridPoint>,
}

impl RoomOutline {
    /// Builds an outline from its vertices. Consecutive duplicates and a
    /// repeated closing vertex are dropped.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::TooFewVertices` when fewer than three distinct
    /// vertices remain.
    pub fn new(points: impl IntoIterator<Item = GridPoint>) -> Result<Self> {
        let mut deduped: Vec<GridPoint> = Vec::new();
        for p in points {
            if deduped.last().is_none_or(|last| distance(last, &p) > TOLERANCE) {
                deduped.push(p);
            }
        }
        while deduped.len() > 1
            && deduped
                .first()
                .zip(deduped.last())
                .is_some_and(|(a, b)| distance(a, b) <= TOLERANCE)
        {
            deduped.pop();
        }
        if deduped.len() < 3 {
            return Err(GeometryError::TooFewVertices(deduped.len()).into());
        }
        Ok(Self { points: deduped })
    }

    /// Reads the walls parented to `group` and chains them end to start.
    ///
    /// # Errors
    ///
    /// Returns an error if the group is missing or its walls do not form one
    /// closed loop.
    pub fn from_group<R: NodeRepository + ?Sized>(repo: &R, group: NodeId) -> Result<Self> {
        if repo.node(group).is_none() {
            return Err(StoreError::NodeNotFound(format!("{group:?}")).into());
        }
        let mut walls: Vec<WallSegment> = repo
            .children(group)
            .into_iter()
            .filter_map(|id| repo.node(id)?.node.as_wall().copied())
            .filter(|w| !w.is_degenerate())
            .collect();
        let not_closed = || OperationError::InvalidInput("room walls do not form a closed loop".to_owned());

        if walls.is_empty() {
            return Err(not_closed().into());
        }
        let first = walls.remove(0);
        let mut points = vec![first.start];
        let mut head = first.end;
        while !walls.is_empty() {
            let next = walls
                .iter()
                .position(|w| distance(&w.start, &head) <= TOLERANCE)
                .ok_or_else(not_closed)?;
            let wall = walls.swap_remove(next);
            points.push(wall.start);
            head = wall.end;
        }
        if distance(&head, &first.start) > TOLERANCE {
            return Err(not_closed().into());
        }
        Self::new(points)
    }

    #[must_use]
    pub fn points(&self) -> &[GridPoint] {
        &self.points
    }

    /// Enclosed area in square grid units.
    #[must_use]
    pub fn area(&self) -> f64 {
        signed_area_2d(&self.points).abs()
    }

    #[must_use]
    pub fn is_counter_clockwise(&self) -> bool {
        signed_area_2d(&self.points) > 0.0
    }

    #[must_use]
    pub fn perimeter(&self) -> f64 {
        let n = self.points.len();
        (0..n)
            .map(|i| distance(&self.points[i], &self.points[(i + 1) % n]))
            .sum()
    }

    #[must_use]
    pub fn centroid(&self) -> Option<GridPoint> {
        centroid_2d(&self.points)
    }

    /// Whether `point` lies inside the outline or on its boundary.
    #[must_use]
    pub fn contains(&self, point: &GridPoint) -> bool {
        point_in_polygon_2d(point, &self.points)
    }

    /// Triangulates the floor at height `elevation`, Y-up with upward normals.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::Triangulation` if a vertex cannot be inserted
    /// or two outline edges cross, as in a bow-tie.
    #[allow(clippy::cast_possible_truncation)]
    pub fn triangulate(&self, elevation: f64) -> Result<TriangleMesh> {
        let loop_2d: Vec<_> = self
            .points
            .iter()
            .map(|p| SpadePoint2::new(p.x, p.y))
            .collect();

        let mut cdt = Cdt::new();
        insert_constraint_loop(&mut cdt, &loop_2d)?;

        let mut mesh = TriangleMesh::default();
        let mut vertex_map: HashMap<usize, u32> = HashMap::new();
        for face in cdt.inner_faces() {
            // Every outline edge is a constraint, so each triangle lies wholly
            // inside or outside the room and its centroid decides which.
            let [a, b, c] = face.positions();
            let center = GridPoint::new((a.x + b.x + c.x) / 3.0, (a.y + b.y + c.y) / 3.0);
            if !self.contains(&center) {
                continue;
            }
            let mut tri = [0u32; 3];
            for (slot, vh) in tri.iter_mut().zip(face.vertices()) {
                let key = vh.fix().index();
                *slot = *vertex_map.entry(key).or_insert_with(|| {
                    let pos = vh.position();
                    mesh.vertices.push(Point3::new(pos.x, elevation, pos.y));
                    mesh.normals.push(Vector3::y());
                    (mesh.vertices.len() - 1) as u32
                });
            }
            // Lifting y onto +z mirrors spade's counter-clockwise winding.
            mesh.indices.push([tri[0], tri[2], tri[1]]);
        }
        Ok(mesh)
    }
}

fn insert_constraint_loop(cdt: &mut Cdt, points: &[SpadePoint2<f64>]) -> Result<()> {
    let mut handles = Vec::with_capacity(points.len());
    for &pt in points {
        let h = cdt
            .insert(pt)
            .map_err(|e: InsertionError| GeometryError::Triangulation(format!("insert: {e}")))?;
        handles.push(h);
    }
    for i in 0..handles.len() {
        let from = handles[i];
        let to = handles[(i + 1) % handles.len()];
        if from == to {
            continue;
        }
        if !cdt.can_add_constraint(from, to) {
            return Err(GeometryError::Triangulation(format!("outline edge {i} crosses another edge")).into());
        }
        cdt.add_constraint(from, to);
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::config::WallDefaults;
    use crate::mesh::triangle_normal;
    use crate::model::{FloorData, Group, MemoryStore, Node, NodeRecord};

    fn p(x: f64, y: f64) -> GridPoint {
        GridPoint::new(x, y)
    }

    fn l_shape() -> RoomOutline {
        RoomOutline::new([
            p(0.0, 0.0),
            p(4.0, 0.0),
            p(4.0, 2.0),
            p(2.0, 2.0),
            p(2.0, 4.0),
            p(0.0, 4.0),
        ])
        .unwrap()
    }

    fn mesh_area(mesh: &TriangleMesh) -> f64 {
        mesh.indices
            .iter()
            .map(|t| {
                let [a, b, c] = t.map(|i| mesh.vertices[i as usize]);
                (b - a).cross(&(c - a)).norm() * 0.5
            })
            .sum()
    }

    #[test]
    fn duplicates_and_closing_vertex_are_dropped() {
        let r = RoomOutline::new([p(0.0, 0.0), p(4.0, 0.0), p(4.0, 0.0), p(4.0, 4.0), p(0.0, 0.0)]).unwrap();
        assert_eq!(r.points().len(), 3);
        assert!(RoomOutline::new([p(0.0, 0.0), p(1.0, 0.0), p(0.0, 0.0)]).is_err());
    }

    #[test]
    fn measures_l_shape() {
        let r = l_shape();
        assert_abs_diff_eq!(r.area(), 12.0);
        assert_abs_diff_eq!(r.perimeter(), 16.0);
        assert!(r.is_counter_clockwise());
        assert!(r.contains(&p(1.0, 3.0)));
        assert!(!r.contains(&p(3.0, 3.0)));
        assert!(r.contains(&p(4.0, 1.0)));
    }

    #[test]
    fn concave_floor_triangulates_to_its_area() {
        let mesh = l_shape().triangulate(0.0).unwrap();
        assert_eq!(mesh.triangle_count(), 4);
        assert_abs_diff_eq!(mesh_area(&mesh), 12.0, epsilon = 1e-9);
        for t in &mesh.indices {
            let tri = t.map(|i| mesh.vertices[i as usize]);
            assert!(triangle_normal(&tri).unwrap().y > 0.0);
        }
    }

    #[test]
    fn clockwise_outline_triangulates_the_same() {
        let mut pts = l_shape().points().to_vec();
        pts.reverse();
        let r = RoomOutline::new(pts).unwrap();
        assert!(!r.is_counter_clockwise());
        let mesh = r.triangulate(2.5).unwrap();
        assert_abs_diff_eq!(mesh_area(&mesh), 12.0, epsilon = 1e-9);
        assert!(mesh.vertices.iter().all(|v| v.y == 2.5));
    }

    #[test]
    fn outline_is_read_back_from_room_walls() {
        let mut store = MemoryStore::new();
        let floor = store.add_floor(FloorData {
            name: "ground".into(),
            elevation: 0.0,
        });
        let group = store
            .add_node(NodeRecord::new(floor, Node::Group(Group { name: "room".into() })))
            .unwrap();
        let corners = [p(0.0, 0.0), p(3.0, 0.0), p(3.0, 2.0), p(0.0, 2.0)];
        // Insert out of order; chaining follows endpoints.
        for i in [2, 0, 3, 1] {
            let w = WallSegment::new(corners[i], corners[(i + 1) % 4], &WallDefaults::default()).unwrap();
            store
                .add_node(NodeRecord::new(floor, Node::Wall(w)).with_parent(group))
                .unwrap();
        }
        let room = RoomOutline::from_group(&store, group).unwrap();
        assert_eq!(room.points().len(), 4);
        assert_abs_diff_eq!(room.area(), 6.0);
        assert_abs_diff_eq!(room.centroid().unwrap(), p(1.5, 1.0));
    }

    #[test]
    fn crossing_outline_is_a_triangulation_error() {
        let bow_tie = RoomOutline::new([p(0.0, 0.0), p(4.0, 0.0), p(0.0, 4.0), p(4.0, 4.0)]).unwrap();
        assert!(matches!(
            bow_tie.triangulate(0.0),
            Err(crate::FloorplanError::Geometry(GeometryError::Triangulation(_)))
        ));
    }

    #[test]
    fn open_wall_run_is_not_a_room() {
        let mut store = MemoryStore::new();
        let floor = store.add_floor(FloorData {
            name: "ground".into(),
            elevation: 0.0,
        });
        let group = store
            .add_node(NodeRecord::new(floor, Node::Group(Group { name: "run".into() })))
            .unwrap();
        for (a, b) in [(p(0.0, 0.0), p(3.0, 0.0)), (p(3.0, 0.0), p(3.0, 3.0))] {
            let w = WallSegment::new(a, b, &WallDefaults::default()).unwrap();
            store
                .add_node(NodeRecord::new(floor, Node::Wall(w)).with_parent(group))
                .unwrap();
        }
        assert!(RoomOutline::from_group(&store, group).is_err());
    }
}
