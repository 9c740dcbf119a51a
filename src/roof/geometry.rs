use crate::grid::GridPoint;
use crate::math::{Point3, TOLERANCE};
use crate::mesh::{triangle_normal, TriangleMesh};
use crate::model::RoofSegment;

/// Which part of the gable solid a face belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoofFaceKind {
    /// Triangle under the ridge start.
    GableStart,
    /// Triangle under the ridge end.
    GableEnd,
    /// Slope on the left-normal side of the ridge.
    SlopeLeft,
    /// Slope on the other side.
    SlopeRight,
}

/// One face of the roof solid, as triangles with outward winding.
#[derive(Debug, Clone, PartialEq)]
pub struct RoofFace {
    pub kind: RoofFaceKind,
    pub triangles: Vec<[Point3; 3]>,
}

/// Derived gable roof solid.
///
/// Points are in grid units, Y-up: grid `(x, y)` becomes `(x, height, y)`.
#[derive(Debug, Clone, PartialEq)]
pub struct RoofGeometry {
    /// `[start + left, start - right, end - right, end + left]` at base height.
    pub base_corners: [Point3; 4],
    /// Ridge start and end, raised by the roof height.
    pub ridge: [Point3; 2],
    pub faces: Vec<RoofFace>,
}

impl RoofGeometry {
    /// Flattens every face into one flat-shaded mesh.
    #[must_use]
    pub fn to_mesh(&self) -> TriangleMesh {
        let mut mesh = TriangleMesh::default();
        for face in &self.faces {
            for tri in &face.triangles {
                mesh.push_flat_triangle(*tri);
            }
        }
        mesh
    }

    /// The mesh in world units.
    #[must_use]
    pub fn to_world(&self, tile_size: f64) -> TriangleMesh {
        self.to_mesh().scaled(tile_size)
    }

    #[must_use]
    pub fn face(&self, kind: RoofFaceKind) -> Option<&RoofFace> {
        self.faces.iter().find(|f| f.kind == kind)
    }
}

/// Builds the four-face gable solid of a roof segment.
pub struct BuildRoof {
    segment: RoofSegment,
    base_height: f64,
}

impl BuildRoof {
    /// Creates a new `BuildRoof` operation. `base_height` is where the slopes
    /// meet the walls.
    #[must_use]
    pub fn new(segment: RoofSegment, base_height: f64) -> Self {
        Self {
            segment,
            base_height,
        }
    }

    /// Executes the derivation. Degenerate ridges yield `None`.
    #[must_use]
    pub fn execute(&self) -> Option<RoofGeometry> {
        let corners = self.segment.base_corners()?;
        let base = self.base_height;
        let top = base + self.segment.height;

        let lift = |p: &GridPoint, y: f64| Point3::new(p.x, y, p.y);
        let [sl, sr, er, el] = corners.map(|c| lift(&c, base));
        let rs = lift(&self.segment.start, top);
        let re = lift(&self.segment.end, top);

        let interior = {
            let c = self.segment.footprint_centroid();
            lift(&c, base + self.segment.height / 3.0)
        };
        let outward = |tri: [Point3; 3]| orient_outward(tri, &interior);

        let faces = vec![
            RoofFace {
                kind: RoofFaceKind::GableStart,
                triangles: vec![outward([sl, sr, rs])],
            },
            RoofFace {
                kind: RoofFaceKind::GableEnd,
                triangles: vec![outward([er, el, re])],
            },
            RoofFace {
                kind: RoofFaceKind::SlopeLeft,
                triangles: vec![outward([sl, rs, re]), outward([sl, re, el])],
            },
            RoofFace {
                kind: RoofFaceKind::SlopeRight,
                triangles: vec![outward([sr, er, re]), outward([sr, re, rs])],
            },
        ];

        Some(RoofGeometry {
            base_corners: [sl, sr, er, el],
            ridge: [rs, re],
            faces,
        })
    }
}

/// Geometry for every renderable roof; degenerate ridges are skipped.
#[must_use]
pub fn build_roofs(segments: &[RoofSegment], base_height: f64) -> Vec<RoofGeometry> {
    segments
        .iter()
        .filter(|s| s.visible)
        .filter_map(|s| BuildRoof::new(*s, base_height).execute())
        .collect()
}

/// Flips the triangle when its normal faces the solid's interior point.
fn orient_outward(tri: [Point3; 3], interior: &Point3) -> [Point3; 3] {
    let Some(n) = triangle_normal(&tri) else {
        return tri;
    };
    let center = Point3::from((tri[0].coords + tri[1].coords + tri[2].coords) / 3.0);
    if n.dot(&(center - interior)) < -TOLERANCE {
        [tri[0], tri[2], tri[1]]
    } else {
        tri
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::math::Vector3;

    fn roof(left: f64, right: f64) -> RoofSegment {
        RoofSegment::new(GridPoint::new(0.0, 0.0), GridPoint::new(6.0, 0.0), left, right, 2.0)
    }

    #[test]
    fn gable_has_four_faces_six_triangles() {
        let g = BuildRoof::new(roof(2.0, 2.0), 5.0).execute().unwrap();
        assert_eq!(g.faces.len(), 4);
        assert_eq!(g.to_mesh().triangle_count(), 6);
        assert_abs_diff_eq!(g.ridge[0], Point3::new(0.0, 7.0, 0.0));
        assert_abs_diff_eq!(g.ridge[1], Point3::new(6.0, 7.0, 0.0));
        for c in g.base_corners {
            assert_abs_diff_eq!(c.y, 5.0);
        }
    }

    #[test]
    fn asymmetric_widths_place_corners_independently() {
        let g = BuildRoof::new(roof(1.0, 3.0), 0.0).execute().unwrap();
        assert_abs_diff_eq!(g.base_corners[0], Point3::new(0.0, 0.0, 1.0));
        assert_abs_diff_eq!(g.base_corners[1], Point3::new(0.0, 0.0, -3.0));
        assert_abs_diff_eq!(g.base_corners[2], Point3::new(6.0, 0.0, -3.0));
        assert_abs_diff_eq!(g.base_corners[3], Point3::new(6.0, 0.0, 1.0));
    }

    #[test]
    fn faces_point_outward() {
        let g = BuildRoof::new(roof(1.5, 2.5), 3.0).execute().unwrap();
        let mesh = g.to_mesh();
        let left = g.face(RoofFaceKind::SlopeLeft).unwrap();
        let n = triangle_normal(&left.triangles[0]).unwrap();
        // Left slope faces +z (grid +y) and up.
        assert!(n.z > 0.0 && n.y > 0.0, "n={n:?}");
        let start = g.face(RoofFaceKind::GableStart).unwrap();
        let n = triangle_normal(&start.triangles[0]).unwrap();
        assert!(n.dot(&Vector3::new(-1.0, 0.0, 0.0)) > 0.99, "n={n:?}");
        assert!(mesh.normals.iter().all(|n| n.y >= -1e-9));
    }

    #[test]
    fn degenerate_ridge_yields_no_faces() {
        let p = GridPoint::new(2.0, 2.0);
        let seg = RoofSegment::symmetric(p, p, 4.0, 2.0);
        assert!(BuildRoof::new(seg, 0.0).execute().is_none());
        assert!(build_roofs(&[seg, roof(1.0, 1.0)], 0.0).len() == 1);
    }

    #[test]
    fn world_mesh_scales_by_tile() {
        let g = BuildRoof::new(roof(2.0, 2.0), 0.0).execute().unwrap();
        let world = g.to_world(0.5);
        let max_x = world.vertices.iter().map(|p| p.x).fold(f64::MIN, f64::max);
        assert_abs_diff_eq!(max_x, 3.0);
    }
}
