//! Result and Error types for r2s-chain

/// Type alias for Result<T, chain::Error>
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `r2s-chain` crate
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed input/output stream")]
    IOError(#[from] std::io::Error),

    #[error("failed XML operation")]
    XmlError(#[from] quick_xml::Error),

    #[error("failed to read XML attribute")]
    XmlAttrError(#[from] quick_xml::events::attributes::AttrError),

    #[error("parser failed: {0}")]
    ParseError(String),

    #[error("nuclide \"{0}\" not found in chain")]
    UnknownNuclide(String),

    #[error("malformed chain: {0}")]
    MalformedChain(String),
}
