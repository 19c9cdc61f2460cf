//! Clients for external partner services.
//!
//! Each external system sits behind a trait so services and workers can be
//! exercised without network access; the reqwest implementations share the
//! bearer-token provider from `hanse-token-client`.

pub mod bpdm;
pub mod callback;
pub mod daps;
pub mod dim;
pub mod sd_factory;

use crate::error::{Error, Result};
use crate::models::Bpn;
use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

pub use bpdm::BpdmClient;
pub use callback::OnboardingCallbackClient;
pub use daps::DapsClient;
pub use dim::DimClient;
pub use sd_factory::SdFactoryClient;

/// Company data forwarded to the business-partner registry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerDataPush {
    pub external_id: Uuid,
    pub legal_name: String,
    pub bpn: Option<Bpn>,
}

/// Connector registration request for the DAPS.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorRegistration {
    pub name: String,
    pub referring_connector: String,
    pub bpn: Bpn,
}

/// Registration-completed notification sent to an onboarding service
/// provider's callback endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderCallbackPayload {
    pub external_id: Uuid,
    pub bpn: Option<Bpn>,
    pub status: String,
}

#[async_trait]
pub trait BusinessPartnerPush: Send + Sync {
    async fn push(&self, input: &PartnerDataPush) -> Result<()>;
}

#[async_trait]
pub trait SelfDescriptionIssuer: Send + Sync {
    async fn issue_legal_person(&self, bpn: &Bpn) -> Result<serde_json::Value>;

    async fn issue_connector(&self, bpn: &Bpn, connector_url: &str)
        -> Result<serde_json::Value>;
}

#[async_trait]
pub trait ConnectorRegistrar: Send + Sync {
    /// Register a connector; returns the client id issued by the DAPS.
    async fn register(&self, registration: &ConnectorRegistration) -> Result<String>;
}

#[async_trait]
pub trait TechnicalUserDeleter: Send + Sync {
    async fn delete(&self, client_id: &str) -> Result<()>;
}

#[async_trait]
pub trait ProviderCallback: Send + Sync {
    /// Notify an onboarding service provider using its stored credentials.
    async fn notify(
        &self,
        settings: &crate::models::CallbackSettings,
        payload: &ProviderCallbackPayload,
    ) -> Result<()>;
}

pub(crate) fn send_error(service: &str, source: reqwest::Error) -> Error {
    Error::ServiceUnavailable {
        service: service.to_string(),
        source,
    }
}

pub(crate) fn ensure_success(service: &str, response: &reqwest::Response) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(Error::ServiceCall {
            service: service.to_string(),
            status: status.as_u16(),
        })
    }
}
