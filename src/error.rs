use thiserror::Error;

/// Top-level error type for the Curvis kernel.
#[derive(Debug, Error)]
pub enum CurvisError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Operation(#[from] OperationError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("parameter {parameter} = {value} is out of range [{min}, {max}]")]
    ParameterOutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,

    #[error("surface pair does not intersect near the given points")]
    NoIntersection,
}

/// Errors related to topological operations.
///
/// These signal contract violations by the topology builder and are
/// never produced by recoverable numeric conditions.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("entity not found: {0}")]
    EntityNotFound(&'static str),

    #[error("edge already has two faces")]
    FaceSlotsOccupied,

    #[error("face is not adjacent to this edge")]
    FaceNotAdjacent,

    #[error("edge vertices have not been materialized")]
    VerticesNotMade,

    #[error("boundary loop is open: no continuation from the current vertex")]
    OpenLoop,

    #[error("loop tracing visited more edges than are available")]
    LoopBoundExceeded,

    #[error("edge orientation is inconsistent between its two faces")]
    InconsistentOrientation,

    #[error("invalid topology: {0}")]
    InvalidTopology(String),
}

/// Errors related to kernel operations.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("operation failed: {0}")]
    Failed(String),
}

/// Convenience type alias for results using [`CurvisError`].
pub type Result<T> = std::result::Result<T, CurvisError>;
