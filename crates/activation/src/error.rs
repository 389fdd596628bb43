//! Result and Error types for r2s-activation

/// Type alias for Result<T, activation::Error>
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `r2s-activation` crate
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed input/output stream")]
    IOError(#[from] std::io::Error),

    #[error("failed CSV operation")]
    Csv(#[from] csv::Error),

    #[error("failed binary (de)serialization")]
    FailedBinaryOp(#[from] Box<bincode::ErrorKind>),

    #[error(transparent)]
    Geometry(#[from] r2s_geometry::Error),

    #[error(transparent)]
    Chain(#[from] r2s_chain::Error),

    #[error("cell {0} has no positive volume")]
    MissingVolume(u32),

    #[error("cell {0} is void, nothing to activate")]
    MissingMaterial(u32),

    #[error("cell {cell} is filled with unknown material {material}")]
    UnknownMaterial { cell: u32, material: u32 },

    #[error("no flux or cross section data for cell {0}")]
    MissingFluxData(u32),

    #[error("expected {expected} entries in cell order, found {found}")]
    OrderMismatch { expected: usize, found: usize },

    #[error("numerical instability: {0}")]
    NumericalInstability(String),

    #[error("unknown schedule \"{0}\"")]
    UnknownSchedule(String),

    #[error("invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("cooling time of {0} days does not fall on a step boundary")]
    UnknownCoolingCheckpoint(u32),

    #[error("no depletion state at position {0}")]
    UnknownState(usize),

    #[error("invalid distribution: {0}")]
    InvalidDistribution(String),
}
