//! Result and Error types for r2s-volume

/// Type alias for Result<T, volume::Error>
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `r2s-volume` crate
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Geometry(#[from] r2s_geometry::Error),

    #[error("invalid volume settings: {0}")]
    InvalidSettings(String),
}
