pub mod distance_2d;
pub mod polygon_2d;
pub mod snap;

/// 2D point type. Grid-space points use `x` and `y`.
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point type. World-space points are Y-up with the floor on XZ.
pub type Point3 = nalgebra::Point3<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Segments shorter than this (in grid units) are degenerate: they are kept as
/// data but skipped by every computation that divides by their length.
pub const SEGMENT_EPSILON: f64 = 0.1;
