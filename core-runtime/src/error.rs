//! Errors raised while setting up the pipeline.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A tunable is out of range or the config document is malformed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The config claims a capability the repository does not offer.
    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
