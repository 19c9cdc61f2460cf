//! Technical users (service accounts).

use serde::Serialize;
use uuid::Uuid;

/// Where the credential principal lives.
///
/// `Own` accounts are managed in the portal's own identity provider and can
/// be removed synchronously. `Dim` accounts live in the decentralized
/// identity-management wallet and are removed by an asynchronous process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceAccountKind {
    Own,
    Dim,
}

impl ServiceAccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceAccountKind::Own => "OWN",
            ServiceAccountKind::Dim => "DIM",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "OWN" => Some(ServiceAccountKind::Own),
            "DIM" => Some(ServiceAccountKind::Dim),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceAccountStatus {
    Active,
    Inactive,
    PendingDeletion,
    Deleted,
}

impl ServiceAccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceAccountStatus::Active => "ACTIVE",
            ServiceAccountStatus::Inactive => "INACTIVE",
            ServiceAccountStatus::PendingDeletion => "PENDING_DELETION",
            ServiceAccountStatus::Deleted => "DELETED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ACTIVE" => Some(ServiceAccountStatus::Active),
            "INACTIVE" => Some(ServiceAccountStatus::Inactive),
            "PENDING_DELETION" => Some(ServiceAccountStatus::PendingDeletion),
            "DELETED" => Some(ServiceAccountStatus::Deleted),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceAccount {
    pub id: Uuid,
    /// Client id of the credential in the identity system.
    pub client_id: String,
    pub name: String,
    pub company_id: Uuid,
    pub kind: ServiceAccountKind,
    pub status: ServiceAccountStatus,
    /// Set while a DIM deletion process is pending for this account.
    pub deletion_process_id: Option<Uuid>,
}
