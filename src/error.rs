use thiserror::Error;

/// Top-level error type for the floor-plan engine.
///
/// Geometry queries report infeasible input through sentinels (`None`,
/// `can_place == false`) and never return these errors. They are reserved for
/// building invalid records and for misuse of the node repository.
#[derive(Debug, Error)]
pub enum FloorplanError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Operation(#[from] OperationError),
}

/// Errors raised when constructing geometric records.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("zero-length segment between ({x0}, {y0}) and ({x1}, {y1})")]
    ZeroLengthSegment { x0: f64, y0: f64, x1: f64, y1: f64 },

    #[error("{parameter} = {value} must be positive")]
    NonPositive { parameter: &'static str, value: f64 },

    #[error("polygon needs at least 3 distinct vertices, got {0}")]
    TooFewVertices(usize),

    #[error("triangulation failed: {0}")]
    Triangulation(String),
}

/// Errors raised by a node repository.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("floor not found")]
    FloorNotFound,

    #[error("node not found: {0}")]
    NodeNotFound(String),

    #[error("node is still live and cannot be restored: {0}")]
    NodeAlive(String),

    #[error("parent node not found on the same floor: {0}")]
    InvalidParent(String),
}

/// Errors related to editing operations.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unexpected node kind: expected {expected}")]
    WrongKind { expected: &'static str },
}

/// Convenience type alias for results using [`FloorplanError`].
pub type Result<T> = std::result::Result<T, FloorplanError>;
