use crate::math::{Point3, Vector3, TOLERANCE};

/// A triangle mesh handed to the rendering layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3>,
    /// Vertex normals.
    pub normals: Vec<Vector3>,
    /// Triangle indices (each triple defines a triangle).
    pub indices: Vec<[u32; 3]>,
}

impl TriangleMesh {
    /// Appends a flat-shaded triangle with its own three vertices.
    #[allow(clippy::cast_possible_truncation)]
    pub fn push_flat_triangle(&mut self, tri: [Point3; 3]) {
        let normal = triangle_normal(&tri).unwrap_or_else(Vector3::y);
        let base = self.vertices.len() as u32;
        for p in tri {
            self.vertices.push(p);
            self.normals.push(normal);
        }
        self.indices.push([base, base + 1, base + 2]);
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Returns a copy with every position multiplied by `factor`.
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            vertices: self.vertices.iter().map(|p| Point3::from(p.coords * factor)).collect(),
            normals: self.normals.clone(),
            indices: self.indices.clone(),
        }
    }
}

/// Unit normal of a triangle following the right-hand rule, `None` when degenerate.
#[must_use]
pub fn triangle_normal(tri: &[Point3; 3]) -> Option<Vector3> {
    let n = (tri[1] - tri[0]).cross(&(tri[2] - tri[0]));
    let len = n.norm();
    if len < TOLERANCE {
        return None;
    }
    Some(n / len)
}
