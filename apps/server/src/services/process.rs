//! Manual retriggering of failed process steps.

use crate::db::PortalStore;
use crate::error::{Error, Result};
use crate::models::{ProcessStep, ProcessStepStatus, ProcessStepType};
use std::sync::Arc;
use uuid::Uuid;

pub struct ProcessService {
    store: Arc<dyn PortalStore>,
}

impl ProcessService {
    pub fn new(store: Arc<dyn PortalStore>) -> Self {
        Self { store }
    }

    /// Consume a pending retrigger step and schedule its mapped next step.
    ///
    /// The process must exist, `step_type` must be a retrigger variant, the
    /// process must currently hold that step in `Todo`, and the mapped next
    /// step must not already be pending. Both writes land in one unit of
    /// work. Returns the scheduled step type.
    pub async fn retrigger(
        &self,
        process_id: Uuid,
        step_type: ProcessStepType,
    ) -> Result<ProcessStepType> {
        let next_type = step_type.retrigger_target().ok_or_else(|| {
            Error::Conflict(format!("step {step_type} is not retriggerable"))
        })?;

        self.store
            .get_process(process_id)
            .await?
            .ok_or_else(|| Error::NotFound {
                entity: "process",
                id: process_id.to_string(),
            })?;

        let steps = self.store.get_steps(process_id).await?;
        let pending = steps
            .iter()
            .find(|s| s.step_type == step_type && s.status == ProcessStepStatus::Todo)
            .ok_or_else(|| {
                Error::Conflict(format!(
                    "process {process_id} has no pending {step_type} step"
                ))
            })?;

        if steps
            .iter()
            .any(|s| s.step_type == next_type && s.status == ProcessStepStatus::Todo)
        {
            return Err(Error::Conflict(format!(
                "process {process_id} already has a pending {next_type} step"
            )));
        }

        let mut completed = pending.clone();
        completed.status = ProcessStepStatus::Done;
        let next = ProcessStep::new(process_id, next_type);

        self.store.save_transition(&completed, &next).await?;

        tracing::info!(%process_id, retrigger = %step_type, scheduled = %next_type, "process step retriggered");
        Ok(next_type)
    }
}
