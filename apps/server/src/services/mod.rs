//! Business logic layer.
//!
//! Services orchestrate operations by coordinating repositories, applying
//! business rules and calling external partner services. Rules are linear
//! validation plus single-step state transitions guarded by enum comparisons.

pub mod documents;
pub mod network;
pub mod onboarding;
pub mod process;
pub mod self_description;
pub mod service_accounts;
pub mod static_data;

pub use documents::DocumentService;
pub use network::PartnerNetworkService;
pub use onboarding::OnboardingService;
pub use process::ProcessService;
pub use self_description::SelfDescriptionService;
pub use service_accounts::ServiceAccountService;
pub use static_data::StaticDataService;
