//! Result and Error types for r2s-workflow

// crate modules
use crate::stage::Stage;

/// Type alias for Result<T, workflow::Error>
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `r2s-workflow` crate
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed input/output stream")]
    IOError(#[from] std::io::Error),

    #[error("failed to parse TOML configuration")]
    FailedToml(#[from] toml::de::Error),

    #[error("failed to read or write stage settings")]
    FailedJson(#[from] serde_json::Error),

    #[error(transparent)]
    Geometry(#[from] r2s_geometry::Error),

    #[error(transparent)]
    Volume(#[from] r2s_volume::Error),

    #[error(transparent)]
    Chain(#[from] r2s_chain::Error),

    #[error(transparent)]
    Activation(#[from] r2s_activation::Error),

    #[error(transparent)]
    Source(#[from] r2s_source::Error),

    #[error(transparent)]
    Tally(#[from] r2s_tally::Error),

    #[error("transport engine failure: {0}")]
    Engine(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("artifact {0} is older than its inputs")]
    StaleArtifact(std::path::PathBuf),

    #[error("{stage} stage failed")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Attach the stage that was running when the error happened
    pub fn in_stage(self, stage: Stage) -> Self {
        match self {
            Self::Stage { .. } => self,
            other => Self::Stage {
                stage,
                source: Box::new(other),
            },
        }
    }
}
