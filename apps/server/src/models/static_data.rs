//! Static reference data.

use crate::models::Bpn;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct UseCase {
    pub id: Uuid,
    pub name: String,
    pub shortname: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LicenseType {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LocalizedName {
    pub language: String,
    pub long_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Language {
    /// ISO 639-1 short name ("de", "en").
    pub short_name: String,
    pub long_names: Vec<LocalizedName>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OperatorBpn {
    pub operator_name: String,
    pub bpn: Bpn,
}
