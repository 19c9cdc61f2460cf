//! Repository layer: typed repository traits with Postgres and in-memory
//! implementations.

pub mod memory;
pub mod store;
pub mod traits;

pub use memory::InMemoryPortalStore;
pub use store::PostgresPortalStore;
pub use traits::{
    CompanyRepository, ConnectorRepository, DocumentRepository, OnboardingRepository,
    PortalStore, ProcessRepository, ServiceAccountRepository, StaticDataRepository,
};
