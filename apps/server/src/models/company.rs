//! Companies and business partner numbers.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

const BPN_LEN: usize = 16;
const BPN_PREFIX: &str = "BPNL";

/// Business partner number of a legal entity.
///
/// Normalized to uppercase at the parsing boundary; every layer below works
/// with the canonical form only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Bpn(String);

impl Bpn {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Bpn {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        if normalized.len() != BPN_LEN
            || !normalized.starts_with(BPN_PREFIX)
            || !normalized[BPN_PREFIX.len()..]
                .chars()
                .all(|c| c.is_ascii_alphanumeric())
        {
            return Err(Error::InvalidArgument(format!(
                "'{s}' is not a valid business partner number"
            )));
        }
        Ok(Bpn(normalized))
    }
}

impl fmt::Display for Bpn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Deserialization goes through `FromStr` so the normalization and validation
// boundary also holds for decoded payloads.
impl<'de> Deserialize<'de> for Bpn {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompanyStatus {
    Pending,
    Active,
    Rejected,
    Deleted,
}

impl CompanyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompanyStatus::Pending => "PENDING",
            CompanyStatus::Active => "ACTIVE",
            CompanyStatus::Rejected => "REJECTED",
            CompanyStatus::Deleted => "DELETED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(CompanyStatus::Pending),
            "ACTIVE" => Some(CompanyStatus::Active),
            "REJECTED" => Some(CompanyStatus::Rejected),
            "DELETED" => Some(CompanyStatus::Deleted),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub bpn: Option<Bpn>,
    pub status: CompanyStatus,
    /// Set when the company was onboarded by an onboarding service provider;
    /// the provider receives the registration callback.
    pub onboarding_provider_id: Option<Uuid>,
    /// Registration process driving callbacks, partner-data push and SD
    /// issuance for this company.
    pub registration_process_id: Option<Uuid>,
    pub sd_document_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bpn_is_normalized_to_uppercase() {
        let bpn: Bpn = "bpnl000000000001".parse().unwrap();
        assert_eq!(bpn.as_str(), "BPNL000000000001");
    }

    #[test]
    fn bpn_rejects_wrong_length_and_prefix() {
        assert!("BPNL0001".parse::<Bpn>().is_err());
        assert!("BPNS000000000001".parse::<Bpn>().is_err());
        assert!("BPNL0000000000!1".parse::<Bpn>().is_err());
        assert!("".parse::<Bpn>().is_err());
    }

    #[test]
    fn bpn_deserialization_validates_and_normalizes() {
        let bpn: Bpn = serde_json::from_str("\"bpnl000000000001\"").unwrap();
        assert_eq!(bpn.as_str(), "BPNL000000000001");
        assert!(serde_json::from_str::<Bpn>("\"not-a-bpn\"").is_err());
    }
}
