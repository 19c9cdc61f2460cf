//! Shared fixtures for the integration tests.
//!
//! Everything runs against the in-memory store and recording client stubs;
//! no database or network access required.

#![allow(dead_code)]

use async_trait::async_trait;
use hanse::clients::{
    BusinessPartnerPush, ConnectorRegistrar, ConnectorRegistration, PartnerDataPush,
    ProviderCallback, ProviderCallbackPayload, SelfDescriptionIssuer, TechnicalUserDeleter,
};
use hanse::config::{
    CipherKind, CipherModeConfig, ClientsConfig, Config, DatabaseConfig, DocumentsConfig,
    EncryptionConfig, ExternalServiceConfig, LoggingConfig, OperatorConfig, WorkerConfig,
};
use hanse::crypto::CryptoService;
use hanse::db::InMemoryPortalStore;
use hanse::models::{
    Bpn, CallbackSettings, Company, CompanyStatus, Connector, ConnectorStatus, Document,
    DocumentStatus, DocumentType, Process, ProcessStep, ProcessStepType, ProcessType,
    ServiceAccount, ServiceAccountKind, ServiceAccountStatus,
};
use hanse::services::SelfDescriptionService;
use hanse::workers::{ProcessWorker, WorkerState};
use hanse::{Error, Result};
use hanse_token_client::TokenEndpoint;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub fn bpn(s: &str) -> Bpn {
    s.parse().expect("valid test bpn")
}

pub fn active_company(name: &str, bpn_str: &str) -> Company {
    Company {
        id: Uuid::new_v4(),
        name: name.to_string(),
        bpn: Some(bpn(bpn_str)),
        status: CompanyStatus::Active,
        onboarding_provider_id: None,
        registration_process_id: None,
        sd_document_id: None,
    }
}

pub fn connector(company_id: Uuid) -> Connector {
    Connector {
        id: Uuid::new_v4(),
        name: "Test Connector".to_string(),
        url: "https://connector.example.org".to_string(),
        company_id,
        status: ConnectorStatus::Pending,
        daps_client_id: None,
        sd_document_id: None,
        process_id: None,
    }
}

pub fn service_account(kind: ServiceAccountKind) -> ServiceAccount {
    ServiceAccount {
        id: Uuid::new_v4(),
        client_id: format!("sa-{}", Uuid::new_v4()),
        name: "Test Account".to_string(),
        company_id: Uuid::new_v4(),
        kind,
        status: ServiceAccountStatus::Active,
        deletion_process_id: None,
    }
}

pub fn document(company_id: Uuid, doc_type: DocumentType, status: DocumentStatus) -> Document {
    Document {
        id: Uuid::new_v4(),
        name: "test-document.pdf".to_string(),
        content: b"content".to_vec(),
        media_type: "application/pdf".to_string(),
        doc_type,
        status,
        company_id,
        created_at: chrono::Utc::now(),
    }
}

/// Create a process of the given type holding the given steps, all `Todo`.
pub async fn seed_process(
    store: &InMemoryPortalStore,
    process_type: ProcessType,
    step_types: &[ProcessStepType],
) -> Uuid {
    use hanse::db::ProcessRepository;

    let process = Process::new(process_type);
    let steps: Vec<ProcessStep> = step_types
        .iter()
        .map(|t| ProcessStep::new(process.id, *t))
        .collect();
    store
        .create_process(&process, &steps)
        .await
        .expect("seed process");
    process.id
}

pub fn encryption_config() -> EncryptionConfig {
    EncryptionConfig {
        default_mode_index: 1,
        modes: vec![
            CipherModeConfig {
                index: 1,
                cipher: CipherKind::Aes256Gcm,
                key: "11".repeat(32),
            },
            CipherModeConfig {
                index: 2,
                cipher: CipherKind::Chacha20Poly1305,
                key: "22".repeat(32),
            },
        ],
    }
}

pub fn crypto() -> Arc<CryptoService> {
    Arc::new(CryptoService::from_config(&encryption_config()).expect("test crypto"))
}

fn token_endpoint() -> TokenEndpoint {
    TokenEndpoint {
        token_url: "https://auth.example.org/token".to_string(),
        client_id: "portal".to_string(),
        client_secret: "secret".to_string(),
        scope: None,
        expiry_skew_seconds: 30,
    }
}

fn external_service() -> ExternalServiceConfig {
    ExternalServiceConfig {
        base_url: "https://service.example.org".to_string(),
        token: token_endpoint(),
    }
}

pub fn test_config() -> Config {
    Config {
        database: DatabaseConfig {
            url: "postgres://unused".to_string(),
            pool_min_size: 1,
            pool_max_size: 2,
            pool_timeout_seconds: 5,
        },
        workers: WorkerConfig::default(),
        logging: LoggingConfig::default(),
        encryption: encryption_config(),
        clients: ClientsConfig {
            bpdm: external_service(),
            sd_factory: external_service(),
            daps: external_service(),
            dim: external_service(),
        },
        documents: DocumentsConfig::default(),
        operator: OperatorConfig {
            operator_name: "Portal Operator".to_string(),
            operator_bpn: "BPNL000000000000".to_string(),
        },
    }
}

fn unavailable(service: &str) -> Error {
    Error::ServiceCall {
        service: service.to_string(),
        status: 502,
    }
}

/// Records pushed partner data; fails every call when `fail` is set.
#[derive(Default)]
pub struct RecordingBpdm {
    pub fail: bool,
    pub pushes: Mutex<Vec<PartnerDataPush>>,
}

#[async_trait]
impl BusinessPartnerPush for RecordingBpdm {
    async fn push(&self, input: &PartnerDataPush) -> Result<()> {
        if self.fail {
            return Err(unavailable("bpdm"));
        }
        self.pushes.lock().unwrap().push(input.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingSdFactory {
    pub fail: bool,
    pub legal_person_calls: Mutex<Vec<Bpn>>,
    pub connector_calls: Mutex<Vec<(Bpn, String)>>,
}

#[async_trait]
impl SelfDescriptionIssuer for RecordingSdFactory {
    async fn issue_legal_person(&self, bpn: &Bpn) -> Result<serde_json::Value> {
        if self.fail {
            return Err(unavailable("sd-factory"));
        }
        self.legal_person_calls.lock().unwrap().push(bpn.clone());
        Ok(serde_json::json!({ "type": "LegalPerson", "holder": bpn.as_str() }))
    }

    async fn issue_connector(
        &self,
        bpn: &Bpn,
        connector_url: &str,
    ) -> Result<serde_json::Value> {
        if self.fail {
            return Err(unavailable("sd-factory"));
        }
        self.connector_calls
            .lock()
            .unwrap()
            .push((bpn.clone(), connector_url.to_string()));
        Ok(serde_json::json!({ "type": "ServiceOffering", "holder": bpn.as_str() }))
    }
}

#[derive(Default)]
pub struct RecordingDaps {
    pub fail: bool,
    pub registrations: Mutex<Vec<ConnectorRegistration>>,
}

#[async_trait]
impl ConnectorRegistrar for RecordingDaps {
    async fn register(&self, registration: &ConnectorRegistration) -> Result<String> {
        if self.fail {
            return Err(unavailable("daps"));
        }
        let mut registrations = self.registrations.lock().unwrap();
        registrations.push(registration.clone());
        Ok(format!("daps-client-{}", registrations.len()))
    }
}

#[derive(Default)]
pub struct RecordingDim {
    pub fail: bool,
    pub deleted: Mutex<Vec<String>>,
}

#[async_trait]
impl TechnicalUserDeleter for RecordingDim {
    async fn delete(&self, client_id: &str) -> Result<()> {
        if self.fail {
            return Err(unavailable("dim"));
        }
        self.deleted.lock().unwrap().push(client_id.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingCallback {
    pub fail: bool,
    pub notifications: Mutex<Vec<(CallbackSettings, ProviderCallbackPayload)>>,
}

#[async_trait]
impl ProviderCallback for RecordingCallback {
    async fn notify(
        &self,
        settings: &CallbackSettings,
        payload: &ProviderCallbackPayload,
    ) -> Result<()> {
        if self.fail {
            return Err(unavailable("provider-callback"));
        }
        self.notifications
            .lock()
            .unwrap()
            .push((settings.clone(), payload.clone()));
        Ok(())
    }
}

/// Worker wired against the in-memory store and recording stubs, with
/// handles to everything a test wants to assert on.
pub struct WorkerHarness {
    pub store: Arc<InMemoryPortalStore>,
    pub crypto: Arc<CryptoService>,
    pub bpdm: Arc<RecordingBpdm>,
    pub sd_factory: Arc<RecordingSdFactory>,
    pub daps: Arc<RecordingDaps>,
    pub dim: Arc<RecordingDim>,
    pub callback: Arc<RecordingCallback>,
    pub worker: ProcessWorker,
}

impl WorkerHarness {
    pub fn new() -> Self {
        Self::with_clients(
            Arc::new(RecordingBpdm::default()),
            Arc::new(RecordingSdFactory::default()),
            Arc::new(RecordingDaps::default()),
            Arc::new(RecordingDim::default()),
            Arc::new(RecordingCallback::default()),
        )
    }

    pub fn with_clients(
        bpdm: Arc<RecordingBpdm>,
        sd_factory: Arc<RecordingSdFactory>,
        daps: Arc<RecordingDaps>,
        dim: Arc<RecordingDim>,
        callback: Arc<RecordingCallback>,
    ) -> Self {
        let store = Arc::new(InMemoryPortalStore::new());
        let crypto = crypto();
        let self_description = Arc::new(SelfDescriptionService::new(
            store.clone(),
            sd_factory.clone(),
            daps.clone(),
        ));
        let state = WorkerState::new(
            Arc::new(test_config()),
            store.clone(),
            crypto.clone(),
            bpdm.clone(),
            daps.clone(),
            dim.clone(),
            callback.clone(),
            self_description,
        );
        let worker = ProcessWorker::new(state);
        Self {
            store,
            crypto,
            bpdm,
            sd_factory,
            daps,
            dim,
            callback,
            worker,
        }
    }
}
