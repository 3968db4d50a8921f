use thiserror::Error;

/// Top-level error type for contour budget analysis.
#[derive(Debug, Error)]
pub enum ContourError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Errors related to the geometric preconditions of an operation.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("at least {required} points are required, got {actual}")]
    TooFewPoints { required: usize, actual: usize },

    #[error("reference area must be positive, got {area}")]
    ZeroArea { area: f64 },

    #[error("degenerate geometry: {0}")]
    Degenerate(String),
}

/// Errors raised when an operation is called outside its contract.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("requested {requested} points, below the floor of {floor}")]
    BelowFloor { requested: usize, floor: usize },
}

/// Errors related to search and batch configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("parameter {parameter} = {value} is out of range [{min}, {max}]")]
    OutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Errors reported by a contour source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("structure not found: {0}")]
    StructureNotFound(String),

    #[error("unreadable contour input: {0}")]
    Unreadable(String),
}

/// Convenience type alias for results using [`ContourError`].
pub type Result<T> = std::result::Result<T, ContourError>;
