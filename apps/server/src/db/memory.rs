//! In-memory `PortalStore` implementation.
//!
//! Backs deterministic tests and local development runs without a database.
//! All mutation goes through one mutex, which also gives the worker claim the
//! required exclusivity.

use crate::db::traits::{
    CompanyRepository, ConnectorRepository, DocumentRepository, OnboardingRepository,
    ProcessRepository, ServiceAccountRepository, StaticDataRepository,
};
use crate::error::{Error, Result};
use crate::models::{
    Bpn, Company, CompanyStatus, Connector, ConnectorStatus, Document, Language, LicenseType,
    OnboardingProviderDetail, OperatorBpn, Page, Process, ProcessStep, ProcessStepStatus,
    ProcessStepType, ServiceAccount, ServiceAccountStatus, UseCase,
};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
struct State {
    companies: HashMap<Uuid, Company>,
    connectors: HashMap<Uuid, Connector>,
    service_accounts: HashMap<Uuid, ServiceAccount>,
    documents: HashMap<Uuid, Document>,
    provider_details: HashMap<Uuid, OnboardingProviderDetail>,
    onboarding_service_providers: HashSet<Uuid>,
    processes: HashMap<Uuid, Process>,
    steps: Vec<ProcessStep>,
    use_cases: Vec<UseCase>,
    license_types: Vec<LicenseType>,
    languages: Vec<Language>,
    operator_bpns: Vec<OperatorBpn>,
}

#[derive(Default)]
pub struct InMemoryPortalStore {
    state: Mutex<State>,
}

/// A process never holds two `Todo` steps of the same type.
fn reject_duplicate_todo<'a>(
    existing: impl IntoIterator<Item = &'a ProcessStep>,
    new: &ProcessStep,
) -> Result<()> {
    if new.status != ProcessStepStatus::Todo {
        return Ok(());
    }
    let pending = existing.into_iter().any(|s| {
        s.process_id == new.process_id
            && s.step_type == new.step_type
            && s.status == ProcessStepStatus::Todo
    });
    if pending {
        return Err(Error::Conflict(format!(
            "process {} already has a pending {} step",
            new.process_id, new.step_type
        )));
    }
    Ok(())
}

impl InMemoryPortalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_company(&self, company: Company) {
        self.state.lock().unwrap().companies.insert(company.id, company);
    }

    pub fn insert_connector(&self, connector: Connector) {
        self.state.lock().unwrap().connectors.insert(connector.id, connector);
    }

    pub fn insert_service_account(&self, account: ServiceAccount) {
        self.state.lock().unwrap().service_accounts.insert(account.id, account);
    }

    pub fn insert_document_row(&self, document: Document) {
        self.state.lock().unwrap().documents.insert(document.id, document);
    }

    pub fn insert_provider_detail_row(&self, detail: OnboardingProviderDetail) {
        self.state.lock().unwrap().provider_details.insert(detail.company_id, detail);
    }

    pub fn grant_onboarding_service_provider(&self, company_id: Uuid) {
        self.state.lock().unwrap().onboarding_service_providers.insert(company_id);
    }

    pub fn insert_use_case(&self, use_case: UseCase) {
        self.state.lock().unwrap().use_cases.push(use_case);
    }

    pub fn insert_license_type(&self, license_type: LicenseType) {
        self.state.lock().unwrap().license_types.push(license_type);
    }

    pub fn insert_language(&self, language: Language) {
        self.state.lock().unwrap().languages.push(language);
    }

    pub fn insert_operator_bpn(&self, operator: OperatorBpn) {
        self.state.lock().unwrap().operator_bpns.push(operator);
    }

    /// Snapshot of all steps of a process, insertion-ordered.
    pub fn steps_of(&self, process_id: Uuid) -> Vec<ProcessStep> {
        self.state
            .lock()
            .unwrap()
            .steps
            .iter()
            .filter(|s| s.process_id == process_id)
            .cloned()
            .collect()
    }

    /// All processes currently stored, for test assertions.
    pub fn processes(&self) -> Vec<Process> {
        self.state.lock().unwrap().processes.values().cloned().collect()
    }
}

#[async_trait]
impl CompanyRepository for InMemoryPortalStore {
    async fn get_company(&self, id: Uuid) -> Result<Option<Company>> {
        Ok(self.state.lock().unwrap().companies.get(&id).cloned())
    }

    async fn get_company_for_process(&self, process_id: Uuid) -> Result<Option<Company>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .companies
            .values()
            .find(|c| c.registration_process_id == Some(process_id))
            .cloned())
    }

    async fn get_active_member_companies(
        &self,
        bpns: &[Bpn],
        page: u32,
        page_size: u32,
    ) -> Result<Page<Company>> {
        let state = self.state.lock().unwrap();
        let mut matching: Vec<Company> = state
            .companies
            .values()
            .filter(|c| c.status == CompanyStatus::Active)
            .filter(|c| match &c.bpn {
                Some(bpn) => bpns.is_empty() || bpns.contains(bpn),
                None => false,
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        let total = matching.len() as u64;
        let start = (page as usize).saturating_mul(page_size as usize);
        let content: Vec<Company> = matching
            .into_iter()
            .skip(start)
            .take(page_size as usize)
            .collect();
        Ok(Page::new(total, page, page_size, content))
    }

    async fn attach_sd_document(&self, company_id: Uuid, document_id: Uuid) -> Result<()> {
        if let Some(company) = self.state.lock().unwrap().companies.get_mut(&company_id) {
            company.sd_document_id = Some(document_id);
        }
        Ok(())
    }
}

#[async_trait]
impl ConnectorRepository for InMemoryPortalStore {
    async fn get_connector(&self, id: Uuid) -> Result<Option<Connector>> {
        Ok(self.state.lock().unwrap().connectors.get(&id).cloned())
    }

    async fn get_connector_for_process(&self, process_id: Uuid) -> Result<Option<Connector>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .connectors
            .values()
            .find(|c| c.process_id == Some(process_id))
            .cloned())
    }

    async fn update_connector_registration(
        &self,
        connector_id: Uuid,
        daps_client_id: Option<String>,
        sd_document_id: Option<Uuid>,
        status: ConnectorStatus,
    ) -> Result<()> {
        if let Some(connector) = self.state.lock().unwrap().connectors.get_mut(&connector_id) {
            if daps_client_id.is_some() {
                connector.daps_client_id = daps_client_id;
            }
            if sd_document_id.is_some() {
                connector.sd_document_id = sd_document_id;
            }
            connector.status = status;
        }
        Ok(())
    }
}

#[async_trait]
impl ServiceAccountRepository for InMemoryPortalStore {
    async fn get_service_account(&self, id: Uuid) -> Result<Option<ServiceAccount>> {
        Ok(self.state.lock().unwrap().service_accounts.get(&id).cloned())
    }

    async fn get_service_account_for_process(
        &self,
        process_id: Uuid,
    ) -> Result<Option<ServiceAccount>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .service_accounts
            .values()
            .find(|a| a.deletion_process_id == Some(process_id))
            .cloned())
    }

    async fn update_service_account_status(
        &self,
        id: Uuid,
        status: ServiceAccountStatus,
    ) -> Result<()> {
        if let Some(account) = self.state.lock().unwrap().service_accounts.get_mut(&id) {
            account.status = status;
        }
        Ok(())
    }

    async fn mark_pending_deletion(&self, id: Uuid, process_id: Uuid) -> Result<()> {
        if let Some(account) = self.state.lock().unwrap().service_accounts.get_mut(&id) {
            account.status = ServiceAccountStatus::PendingDeletion;
            account.deletion_process_id = Some(process_id);
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentRepository for InMemoryPortalStore {
    async fn get_document(&self, id: Uuid) -> Result<Option<Document>> {
        Ok(self.state.lock().unwrap().documents.get(&id).cloned())
    }

    async fn get_frame_documents(&self) -> Result<Vec<Document>> {
        let mut docs: Vec<Document> = self
            .state
            .lock()
            .unwrap()
            .documents
            .values()
            .filter(|d| {
                d.doc_type == crate::models::DocumentType::FrameContract
                    && d.status != crate::models::DocumentStatus::Inactive
            })
            .cloned()
            .collect();
        docs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(docs)
    }

    async fn insert_document(&self, document: &Document) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .documents
            .insert(document.id, document.clone());
        Ok(())
    }
}

#[async_trait]
impl OnboardingRepository for InMemoryPortalStore {
    async fn is_onboarding_service_provider(&self, company_id: Uuid) -> Result<bool> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .onboarding_service_providers
            .contains(&company_id))
    }

    async fn get_provider_detail(
        &self,
        company_id: Uuid,
    ) -> Result<Option<OnboardingProviderDetail>> {
        Ok(self.state.lock().unwrap().provider_details.get(&company_id).cloned())
    }

    async fn upsert_provider_detail(&self, detail: &OnboardingProviderDetail) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .provider_details
            .insert(detail.company_id, detail.clone());
        Ok(())
    }
}

#[async_trait]
impl ProcessRepository for InMemoryPortalStore {
    async fn get_process(&self, id: Uuid) -> Result<Option<Process>> {
        Ok(self.state.lock().unwrap().processes.get(&id).cloned())
    }

    async fn get_steps(&self, process_id: Uuid) -> Result<Vec<ProcessStep>> {
        Ok(self.steps_of(process_id))
    }

    async fn create_process(&self, process: &Process, steps: &[ProcessStep]) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        for (idx, step) in steps.iter().enumerate() {
            reject_duplicate_todo(&state.steps, step)?;
            reject_duplicate_todo(&steps[..idx], step)?;
        }
        state.processes.insert(process.id, process.clone());
        state.steps.extend(steps.iter().cloned());
        Ok(())
    }

    async fn insert_step(&self, step: &ProcessStep) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        reject_duplicate_todo(&state.steps, step)?;
        state.steps.push(step.clone());
        Ok(())
    }

    async fn save_transition(&self, completed: &ProcessStep, next: &ProcessStep) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        // The completed step no longer counts as pending.
        reject_duplicate_todo(
            state.steps.iter().filter(|s| s.id != completed.id),
            next,
        )?;
        if let Some(existing) = state.steps.iter_mut().find(|s| s.id == completed.id) {
            existing.status = completed.status;
            existing.message = completed.message.clone();
        }
        state.steps.push(next.clone());
        if let Some(process) = state.processes.get_mut(&completed.process_id) {
            process.version = Uuid::new_v4();
        }
        Ok(())
    }

    async fn claim_next_step(
        &self,
        step_types: &[ProcessStepType],
        worker_id: &str,
    ) -> Result<Option<ProcessStep>> {
        let mut state = self.state.lock().unwrap();
        let candidate = state
            .steps
            .iter_mut()
            .filter(|s| {
                s.status == ProcessStepStatus::Todo
                    && s.claimed_by.is_none()
                    && step_types.contains(&s.step_type)
            })
            .min_by_key(|s| s.created_at);
        Ok(candidate.map(|step| {
            step.claimed_by = Some(worker_id.to_string());
            step.clone()
        }))
    }

    async fn finish_step(
        &self,
        step_id: Uuid,
        status: ProcessStepStatus,
        message: Option<String>,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(step) = state.steps.iter_mut().find(|s| s.id == step_id) {
            step.status = status;
            step.message = message;
        }
        Ok(())
    }
}

#[async_trait]
impl StaticDataRepository for InMemoryPortalStore {
    async fn get_use_cases(&self) -> Result<Vec<UseCase>> {
        Ok(self.state.lock().unwrap().use_cases.clone())
    }

    async fn get_license_types(&self) -> Result<Vec<LicenseType>> {
        Ok(self.state.lock().unwrap().license_types.clone())
    }

    async fn get_languages(&self) -> Result<Vec<Language>> {
        Ok(self.state.lock().unwrap().languages.clone())
    }

    async fn get_operator_bpns(&self) -> Result<Vec<OperatorBpn>> {
        Ok(self.state.lock().unwrap().operator_bpns.clone())
    }
}
