//! OAuth client-credentials token provider for external portal services.
//!
//! Every outbound partner call (business-partner registry, SD factory, DAPS,
//! DIM) is bearer-authenticated. This crate owns the token lifecycle: it knows
//! the token endpoint per named service, fetches tokens with the
//! client-credentials grant and caches them until shortly before expiry.

mod error;
mod provider;

pub use error::{Error, Result};
pub use provider::{fetch_token, TokenEndpoint, TokenProvider};
