//! Connectors registered by member companies.

use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectorStatus {
    Pending,
    Active,
    Inactive,
}

impl ConnectorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectorStatus::Pending => "PENDING",
            ConnectorStatus::Active => "ACTIVE",
            ConnectorStatus::Inactive => "INACTIVE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(ConnectorStatus::Pending),
            "ACTIVE" => Some(ConnectorStatus::Active),
            "INACTIVE" => Some(ConnectorStatus::Inactive),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Connector {
    pub id: Uuid,
    pub name: String,
    pub url: String,
    pub company_id: Uuid,
    pub status: ConnectorStatus,
    /// Client id issued by the DAPS; absent until registration ran.
    pub daps_client_id: Option<String>,
    pub sd_document_id: Option<Uuid>,
    /// Registration process driving SD issuance and DAPS registration.
    pub process_id: Option<Uuid>,
}
