//! Technical user (service account) lifecycle.

use crate::db::PortalStore;
use crate::error::{Error, Result};
use crate::models::{
    Process, ProcessStep, ProcessStepType, ProcessType, ServiceAccountKind, ServiceAccountStatus,
};
use std::sync::Arc;
use uuid::Uuid;

pub struct ServiceAccountService {
    store: Arc<dyn PortalStore>,
}

impl ServiceAccountService {
    pub fn new(store: Arc<dyn PortalStore>) -> Self {
        Self { store }
    }

    /// Delete a service account.
    ///
    /// Only active accounts can be deleted. `Own` accounts are removed
    /// synchronously. `Dim` accounts transition to `PendingDeletion` and a
    /// technical-user process with a pending `DeleteDimTechnicalUser` step is
    /// enqueued; the worker finalizes the deletion once the wallet confirms.
    pub async fn delete(&self, account_id: Uuid) -> Result<ServiceAccountStatus> {
        let account = self
            .store
            .get_service_account(account_id)
            .await?
            .ok_or_else(|| Error::NotFound {
                entity: "service account",
                id: account_id.to_string(),
            })?;

        if account.status != ServiceAccountStatus::Active {
            return Err(Error::Conflict(format!(
                "service account {account_id} is {} and cannot be deleted",
                account.status.as_str()
            )));
        }

        match account.kind {
            ServiceAccountKind::Own => {
                self.store
                    .update_service_account_status(account_id, ServiceAccountStatus::Deleted)
                    .await?;
                tracing::info!(%account_id, "service account deleted");
                Ok(ServiceAccountStatus::Deleted)
            }
            ServiceAccountKind::Dim => {
                let process = Process::new(ProcessType::TechnicalUser);
                let step =
                    ProcessStep::new(process.id, ProcessStepType::DeleteDimTechnicalUser);
                self.store.create_process(&process, &[step]).await?;
                self.store
                    .mark_pending_deletion(account_id, process.id)
                    .await?;
                tracing::info!(%account_id, process_id = %process.id, "DIM deletion process enqueued");
                Ok(ServiceAccountStatus::PendingDeletion)
            }
        }
    }
}
