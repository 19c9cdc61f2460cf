//! Administration backend for a multi-tenant B2B dataspace portal.
//!
//! The crate is organized as a thin orchestration layer:
//!
//! - [`models`] — relational entities and the process/step vocabulary
//! - [`db`] — typed repository traits plus Postgres and in-memory stores
//! - [`clients`] — reqwest clients for the external partner services
//! - [`services`] — business rules (validation + single-step transitions)
//! - [`workers`] — background execution of pending process steps
//!
//! HTTP routing, auth middleware and schema migrations live outside this
//! crate; everything here is reachable from the service API or the
//! `portal-worker` binary.

pub mod clients;
pub mod config;
pub mod crypto;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;
pub mod workers;

pub use error::{Error, Result};
