//! Static reference-data lookups.

use crate::config::OperatorConfig;
use crate::db::PortalStore;
use crate::error::Result;
use crate::models::{Bpn, Language, LicenseType, OperatorBpn, UseCase};
use std::str::FromStr;
use std::sync::Arc;

pub struct StaticDataService {
    store: Arc<dyn PortalStore>,
    operator: OperatorConfig,
}

impl StaticDataService {
    pub fn new(store: Arc<dyn PortalStore>, operator: OperatorConfig) -> Self {
        Self { store, operator }
    }

    pub async fn get_use_cases(&self) -> Result<Vec<UseCase>> {
        self.store.get_use_cases().await
    }

    pub async fn get_license_types(&self) -> Result<Vec<LicenseType>> {
        self.store.get_license_types().await
    }

    pub async fn get_languages(&self) -> Result<Vec<Language>> {
        self.store.get_languages().await
    }

    /// Operator identifiers: the configured portal operator merged with the
    /// repository-managed rows, deduplicated by BPN.
    pub async fn get_operator_bpns(&self) -> Result<Vec<OperatorBpn>> {
        let configured = OperatorBpn {
            operator_name: self.operator.operator_name.clone(),
            bpn: Bpn::from_str(&self.operator.operator_bpn)?,
        };

        let mut operators = vec![configured];
        for row in self.store.get_operator_bpns().await? {
            if !operators.iter().any(|o| o.bpn == row.bpn) {
                operators.push(row);
            }
        }
        Ok(operators)
    }
}
