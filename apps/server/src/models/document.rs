//! Stored documents.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentType {
    FrameContract,
    SelfDescription,
    SeedData,
    CommercialRegisterExtract,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::FrameContract => "FRAME_CONTRACT",
            DocumentType::SelfDescription => "SELF_DESCRIPTION",
            DocumentType::SeedData => "SEED_DATA",
            DocumentType::CommercialRegisterExtract => "COMMERCIAL_REGISTER_EXTRACT",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "FRAME_CONTRACT" => Some(DocumentType::FrameContract),
            "SELF_DESCRIPTION" => Some(DocumentType::SelfDescription),
            "SEED_DATA" => Some(DocumentType::SeedData),
            "COMMERCIAL_REGISTER_EXTRACT" => Some(DocumentType::CommercialRegisterExtract),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    Pending,
    Locked,
    Inactive,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Pending => "PENDING",
            DocumentStatus::Locked => "LOCKED",
            DocumentStatus::Inactive => "INACTIVE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(DocumentStatus::Pending),
            "LOCKED" => Some(DocumentStatus::Locked),
            "INACTIVE" => Some(DocumentStatus::Inactive),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    pub id: Uuid,
    pub name: String,
    pub content: Vec<u8>,
    pub media_type: String,
    pub doc_type: DocumentType,
    pub status: DocumentStatus,
    pub company_id: Uuid,
    pub created_at: DateTime<Utc>,
}
