//! Error types for token acquisition.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// No token endpoint is configured for the requested service name.
    #[error("no token endpoint configured for service '{0}'")]
    UnknownService(String),

    /// The token endpoint could not be reached.
    #[error("token request for service '{service}' failed: {source}")]
    Request {
        service: String,
        #[source]
        source: reqwest::Error,
    },

    /// The token endpoint answered with a non-success status.
    #[error("token endpoint for service '{service}' returned status {status}")]
    Status { service: String, status: u16 },

    /// The token response body could not be decoded.
    #[error("token response for service '{service}' could not be decoded: {source}")]
    Decode {
        service: String,
        #[source]
        source: reqwest::Error,
    },
}
