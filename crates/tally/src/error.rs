//! Result and Error types for r2s-tally

/// Type alias for Result<T, tally::Error>
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `r2s-tally` crate
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed input/output stream")]
    IOError(#[from] std::io::Error),

    #[error("failed CSV operation")]
    Csv(#[from] csv::Error),

    #[error("failed to (de)serialise")]
    FailedSerde(#[from] serde_json::Error),

    #[error("failed to infer particle type from \"{0}\"")]
    FailedToInferParticle(String),

    #[error("invalid response function: {0}")]
    InvalidResponse(String),

    #[error("no {score} result for cell {cell}")]
    MissingResult { score: String, cell: u32 },

    #[error("cell {0} has no positive volume")]
    MissingVolume(u32),

    #[error("cell {0} has no positive density")]
    MissingDensity(u32),

    #[error("invalid value: {0}")]
    InvalidValue(String),
}
