//! Polling worker that executes claimable process steps.

use crate::clients::{PartnerDataPush, ProviderCallbackPayload};
use crate::error::{Error, Result};
use crate::models::{
    Company, Connector, ProcessStep, ProcessStepStatus, ProcessStepType, ServiceAccount,
    ServiceAccountStatus,
};
use crate::services::onboarding::decrypt_settings;
use crate::workers::WorkerState;
use tokio::sync::watch;
use tokio::time::{interval, Duration, MissedTickBehavior};
use uuid::Uuid;

pub struct ProcessWorker {
    state: WorkerState,
    worker_id: String,
}

impl ProcessWorker {
    pub fn new(state: WorkerState) -> Self {
        let worker_id = format!("portal-worker-{}", Uuid::new_v4());
        Self { state, worker_id }
    }

    pub fn worker_id(&self) -> &str {
        &self.worker_id
    }

    /// Poll for claimable steps until the shutdown signal flips to `true`.
    ///
    /// Each tick drains at most `workers.batch_size` steps so a long backlog
    /// cannot starve the shutdown check.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let poll = Duration::from_secs(self.state.config.workers.poll_interval_seconds.max(1));
        let batch_size = self.state.config.workers.batch_size;

        let mut ticker = interval(poll);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            worker_id = %self.worker_id,
            poll_interval_seconds = poll.as_secs(),
            batch_size,
            "process worker started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                changed = shutdown.changed() => {
                    // A dropped sender means the supervisor is gone; stop too.
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
            }

            for _ in 0..batch_size {
                if *shutdown.borrow() {
                    break;
                }
                match self.process_once().await {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(e) => {
                        // Claim or bookkeeping failure, typically the database
                        // going away. Back off until the next tick.
                        tracing::error!(worker_id = %self.worker_id, error = %e, "worker poll failed");
                        break;
                    }
                }
            }
        }

        tracing::info!(worker_id = %self.worker_id, "process worker stopped");
        Ok(())
    }

    /// Claim and execute a single step. Returns `Ok(false)` when no step was
    /// claimable.
    ///
    /// Execution failure is recorded on the step, not propagated: the step is
    /// finished as `Failed` with the error message and its retrigger marker is
    /// scheduled so an operator can revive it.
    pub async fn process_once(&self) -> Result<bool> {
        let step = match self
            .state
            .store
            .claim_next_step(&ProcessStepType::EXECUTABLE, &self.worker_id)
            .await?
        {
            Some(step) => step,
            None => return Ok(false),
        };

        tracing::info!(
            worker_id = %self.worker_id,
            process_id = %step.process_id,
            step_type = %step.step_type,
            "executing process step"
        );

        match self.execute(&step).await {
            Ok(()) => {
                self.state
                    .store
                    .finish_step(step.id, ProcessStepStatus::Done, None)
                    .await?;
            }
            Err(e) => {
                tracing::warn!(
                    process_id = %step.process_id,
                    step_type = %step.step_type,
                    error = %e,
                    "process step failed"
                );
                self.state
                    .store
                    .finish_step(step.id, ProcessStepStatus::Failed, Some(e.to_string()))
                    .await?;
                self.schedule_retrigger_marker(&step).await?;
            }
        }

        Ok(true)
    }

    async fn execute(&self, step: &ProcessStep) -> Result<()> {
        match step.step_type {
            ProcessStepType::PushBusinessPartnerData => {
                self.push_business_partner_data(step.process_id).await
            }
            ProcessStepType::IssueSelfDescription => {
                self.issue_self_description(step.process_id).await
            }
            ProcessStepType::RegisterConnector => self.register_connector(step.process_id).await,
            ProcessStepType::TriggerProviderCallback => {
                self.trigger_provider_callback(step.process_id).await
            }
            ProcessStepType::DeleteDimTechnicalUser => {
                self.delete_dim_technical_user(step.process_id).await
            }
            other => Err(Error::Internal(format!(
                "step type {other} is not executable"
            ))),
        }
    }

    /// Insert the step's retrigger marker unless the process already has one
    /// pending, so repeated failures stay revivable with a single retrigger.
    async fn schedule_retrigger_marker(&self, failed: &ProcessStep) -> Result<()> {
        let marker = match failed.step_type.retrigger_marker() {
            Some(marker) => marker,
            None => return Ok(()),
        };

        match self
            .state
            .store
            .insert_step(&ProcessStep::new(failed.process_id, marker))
            .await
        {
            Ok(()) => Ok(()),
            // Another worker got there first; one pending marker is enough.
            Err(Error::Conflict(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn push_business_partner_data(&self, process_id: Uuid) -> Result<()> {
        let company = self.company_for_process(process_id).await?;
        self.state
            .bpdm
            .push(&PartnerDataPush {
                external_id: company.id,
                legal_name: company.name.clone(),
                bpn: company.bpn.clone(),
            })
            .await
    }

    /// Issuance target depends on what the process belongs to: a company
    /// registration gets a legal-participant SD, a connector registration a
    /// connector SD.
    async fn issue_self_description(&self, process_id: Uuid) -> Result<()> {
        if let Some(company) = self.state.store.get_company_for_process(process_id).await? {
            self.state
                .self_description
                .issue_for_company(company.id)
                .await?;
            return Ok(());
        }
        if let Some(connector) = self
            .state
            .store
            .get_connector_for_process(process_id)
            .await?
        {
            self.state
                .self_description
                .issue_for_connector(connector.id)
                .await?;
            return Ok(());
        }
        Err(Error::Conflict(format!(
            "process {process_id} has neither a company nor a connector to issue for"
        )))
    }

    async fn register_connector(&self, process_id: Uuid) -> Result<()> {
        let connector = self.connector_for_process(process_id).await?;
        if connector.daps_client_id.is_some() {
            tracing::debug!(connector_id = %connector.id, "connector already registered");
            return Ok(());
        }

        let bpn = self
            .state
            .store
            .get_company(connector.company_id)
            .await?
            .and_then(|c| c.bpn)
            .ok_or_else(|| {
                Error::Conflict(format!(
                    "company {} has no business partner number",
                    connector.company_id
                ))
            })?;

        let client_id = self
            .state
            .daps
            .register(&crate::clients::ConnectorRegistration {
                name: connector.name.clone(),
                referring_connector: connector.url.clone(),
                bpn,
            })
            .await?;
        self.state
            .store
            .update_connector_registration(
                connector.id,
                Some(client_id),
                connector.sd_document_id,
                connector.status,
            )
            .await
    }

    async fn trigger_provider_callback(&self, process_id: Uuid) -> Result<()> {
        let company = self.company_for_process(process_id).await?;
        let provider_id = match company.onboarding_provider_id {
            Some(id) => id,
            None => {
                // Self-registered companies have nobody to notify.
                tracing::debug!(company_id = %company.id, "company has no onboarding provider");
                return Ok(());
            }
        };

        let detail = self
            .state
            .store
            .get_provider_detail(provider_id)
            .await?
            .ok_or_else(|| Error::NotFound {
                entity: "onboarding provider detail",
                id: provider_id.to_string(),
            })?;
        let settings = decrypt_settings(&self.state.crypto, &detail)?;

        self.state
            .provider_callback
            .notify(
                &settings,
                &ProviderCallbackPayload {
                    external_id: company.id,
                    bpn: company.bpn.clone(),
                    status: "COMPLETED".to_string(),
                },
            )
            .await
    }

    async fn delete_dim_technical_user(&self, process_id: Uuid) -> Result<()> {
        let account = self.account_for_process(process_id).await?;
        self.state.dim.delete(&account.client_id).await?;
        self.state
            .store
            .update_service_account_status(account.id, ServiceAccountStatus::Deleted)
            .await?;
        tracing::info!(account_id = %account.id, "dim technical user deleted");
        Ok(())
    }

    async fn company_for_process(&self, process_id: Uuid) -> Result<Company> {
        self.state
            .store
            .get_company_for_process(process_id)
            .await?
            .ok_or_else(|| Error::NotFound {
                entity: "company for process",
                id: process_id.to_string(),
            })
    }

    async fn connector_for_process(&self, process_id: Uuid) -> Result<Connector> {
        self.state
            .store
            .get_connector_for_process(process_id)
            .await?
            .ok_or_else(|| Error::NotFound {
                entity: "connector for process",
                id: process_id.to_string(),
            })
    }

    async fn account_for_process(&self, process_id: Uuid) -> Result<ServiceAccount> {
        self.state
            .store
            .get_service_account_for_process(process_id)
            .await?
            .ok_or_else(|| Error::NotFound {
                entity: "service account for process",
                id: process_id.to_string(),
            })
    }
}
