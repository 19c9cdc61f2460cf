//! Domain model: relational entities and the process/step vocabulary.

pub mod company;
pub mod connector;
pub mod document;
pub mod identity;
pub mod onboarding;
pub mod pagination;
pub mod process;
pub mod static_data;

pub use company::{Bpn, Company, CompanyStatus};
pub use connector::{Connector, ConnectorStatus};
pub use document::{Document, DocumentStatus, DocumentType};
pub use identity::{ServiceAccount, ServiceAccountKind, ServiceAccountStatus};
pub use onboarding::{CallbackSettings, OnboardingProviderDetail};
pub use pagination::{Page, PageMeta};
pub use process::{Process, ProcessStep, ProcessStepStatus, ProcessStepType, ProcessType};
pub use static_data::{Language, LicenseType, LocalizedName, OperatorBpn, UseCase};
