//! Result and Error types for r2s-geometry

/// Type alias for Result<T, geometry::Error>
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `r2s-geometry` crate
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed input/output stream")]
    IOError(#[from] std::io::Error),

    #[error("failed to (de)serialise")]
    FailedSerde(#[from] serde_json::Error),

    #[error("invalid bounding box: {0}")]
    InvalidBoundingBox(String),

    #[error("cell {0} not found in geometry")]
    UnknownCell(u32),

    #[error("cell {0} has no bounding box and none was supplied")]
    MissingBoundingBox(u32),
}
