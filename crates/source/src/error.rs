//! Result and Error types for r2s-source

/// Type alias for Result<T, source::Error>
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `r2s-source` crate
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed input/output stream")]
    IOError(#[from] std::io::Error),

    #[error("failed to (de)serialise")]
    FailedSerde(#[from] serde_json::Error),

    #[error(transparent)]
    Geometry(#[from] r2s_geometry::Error),

    #[error("no point inside cell {cell} after {attempts} attempts")]
    RejectionLimit { cell: u32, attempts: u64 },

    #[error("source for cell {0} has no strength to sample from")]
    ZeroStrength(u32),
}
