//! Error type shared by the business-logic layer.
//!
//! Domain rule violations map to `Conflict` / `NotFound` / `Forbidden` /
//! `InvalidArgument` with a fixed message. Downstream HTTP failures are
//! wrapped into `ServiceCall`, carrying the upstream status code; transport
//! failures (DNS, TLS, timeouts) keep the source error instead.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("call to {service} failed with status {status}")]
    ServiceCall { service: String, status: u16 },

    #[error("call to {service} failed: {source}")]
    ServiceUnavailable {
        service: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("crypto error: {0}")]
    Crypto(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("{0}")]
    Internal(String),
}

impl From<hanse_token_client::Error> for Error {
    fn from(err: hanse_token_client::Error) -> Self {
        match err {
            hanse_token_client::Error::UnknownService(service) => Error::Configuration(format!(
                "no token endpoint configured for service '{service}'"
            )),
            hanse_token_client::Error::Status { service, status } => {
                Error::ServiceCall { service, status }
            }
            hanse_token_client::Error::Request { service, source }
            | hanse_token_client::Error::Decode { service, source } => {
                Error::ServiceUnavailable { service, source }
            }
        }
    }
}
