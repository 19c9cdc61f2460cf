//! Repository trait definitions.
//!
//! Services and workers look up a capability through [`PortalStore`] and stay
//! unaware of the backing store. The Postgres implementation maps rows
//! one-to-one; the in-memory implementation backs tests and local runs.

use crate::error::Result;
use crate::models::{
    Bpn, Company, Connector, ConnectorStatus, Document, Language, LicenseType,
    OnboardingProviderDetail, OperatorBpn, Page, Process, ProcessStep, ProcessStepStatus,
    ProcessStepType, ServiceAccount, ServiceAccountStatus, UseCase,
};
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait CompanyRepository: Send + Sync {
    async fn get_company(&self, id: Uuid) -> Result<Option<Company>>;

    /// Company whose registration process is the given one.
    async fn get_company_for_process(&self, process_id: Uuid) -> Result<Option<Company>>;

    /// Active member companies, optionally restricted to the given BPNs.
    async fn get_active_member_companies(
        &self,
        bpns: &[Bpn],
        page: u32,
        page_size: u32,
    ) -> Result<Page<Company>>;

    async fn attach_sd_document(&self, company_id: Uuid, document_id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait ConnectorRepository: Send + Sync {
    async fn get_connector(&self, id: Uuid) -> Result<Option<Connector>>;

    async fn get_connector_for_process(&self, process_id: Uuid) -> Result<Option<Connector>>;

    async fn update_connector_registration(
        &self,
        connector_id: Uuid,
        daps_client_id: Option<String>,
        sd_document_id: Option<Uuid>,
        status: ConnectorStatus,
    ) -> Result<()>;
}

#[async_trait]
pub trait ServiceAccountRepository: Send + Sync {
    async fn get_service_account(&self, id: Uuid) -> Result<Option<ServiceAccount>>;

    /// Account whose deletion process is the given one.
    async fn get_service_account_for_process(
        &self,
        process_id: Uuid,
    ) -> Result<Option<ServiceAccount>>;

    async fn update_service_account_status(
        &self,
        id: Uuid,
        status: ServiceAccountStatus,
    ) -> Result<()>;

    /// Transition the account to `PENDING_DELETION` and link the deletion
    /// process in one write.
    async fn mark_pending_deletion(&self, id: Uuid, process_id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait DocumentRepository: Send + Sync {
    async fn get_document(&self, id: Uuid) -> Result<Option<Document>>;

    /// Frame-contract documents that are not inactive.
    async fn get_frame_documents(&self) -> Result<Vec<Document>>;

    async fn insert_document(&self, document: &Document) -> Result<()>;
}

#[async_trait]
pub trait OnboardingRepository: Send + Sync {
    async fn is_onboarding_service_provider(&self, company_id: Uuid) -> Result<bool>;

    async fn get_provider_detail(
        &self,
        company_id: Uuid,
    ) -> Result<Option<OnboardingProviderDetail>>;

    async fn upsert_provider_detail(&self, detail: &OnboardingProviderDetail) -> Result<()>;
}

#[async_trait]
pub trait ProcessRepository: Send + Sync {
    async fn get_process(&self, id: Uuid) -> Result<Option<Process>>;

    async fn get_steps(&self, process_id: Uuid) -> Result<Vec<ProcessStep>>;

    async fn create_process(&self, process: &Process, steps: &[ProcessStep]) -> Result<()>;

    async fn insert_step(&self, step: &ProcessStep) -> Result<()>;

    /// Persist a retrigger transition as one unit of work: the completed
    /// retrigger step and the newly scheduled next step.
    async fn save_transition(&self, completed: &ProcessStep, next: &ProcessStep) -> Result<()>;

    /// Exclusively claim the next `Todo` step of one of the given types for
    /// the given worker. Returns `None` when nothing is claimable.
    async fn claim_next_step(
        &self,
        step_types: &[ProcessStepType],
        worker_id: &str,
    ) -> Result<Option<ProcessStep>>;

    async fn finish_step(
        &self,
        step_id: Uuid,
        status: ProcessStepStatus,
        message: Option<String>,
    ) -> Result<()>;
}

#[async_trait]
pub trait StaticDataRepository: Send + Sync {
    async fn get_use_cases(&self) -> Result<Vec<UseCase>>;

    async fn get_license_types(&self) -> Result<Vec<LicenseType>>;

    async fn get_languages(&self) -> Result<Vec<Language>>;

    async fn get_operator_bpns(&self) -> Result<Vec<OperatorBpn>>;
}

/// Capability lookup: one store object serves every typed repository.
pub trait PortalStore:
    CompanyRepository
    + ConnectorRepository
    + ServiceAccountRepository
    + DocumentRepository
    + OnboardingRepository
    + ProcessRepository
    + StaticDataRepository
{
}

impl<T> PortalStore for T where
    T: CompanyRepository
        + ConnectorRepository
        + ServiceAccountRepository
        + DocumentRepository
        + OnboardingRepository
        + ProcessRepository
        + StaticDataRepository
{
}
