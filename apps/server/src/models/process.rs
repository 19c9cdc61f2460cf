//! Process/step vocabulary and the retrigger lookup table.
//!
//! A process is a flat bag of steps. Workers execute `Todo` steps; a failed
//! step is revived manually by inserting its `Retrigger*` counterpart, which
//! maps to exactly one next step.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessType {
    PartnerOnboarding,
    TechnicalUser,
}

impl ProcessType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessType::PartnerOnboarding => "PARTNER_ONBOARDING",
            ProcessType::TechnicalUser => "TECHNICAL_USER",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PARTNER_ONBOARDING" => Some(ProcessType::PartnerOnboarding),
            "TECHNICAL_USER" => Some(ProcessType::TechnicalUser),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessStepType {
    PushBusinessPartnerData,
    RetriggerPushBusinessPartnerData,
    IssueSelfDescription,
    RetriggerIssueSelfDescription,
    RegisterConnector,
    RetriggerRegisterConnector,
    TriggerProviderCallback,
    RetriggerTriggerProviderCallback,
    DeleteDimTechnicalUser,
    RetriggerDeleteDimTechnicalUser,
}

impl ProcessStepType {
    pub const ALL: [ProcessStepType; 10] = [
        ProcessStepType::PushBusinessPartnerData,
        ProcessStepType::RetriggerPushBusinessPartnerData,
        ProcessStepType::IssueSelfDescription,
        ProcessStepType::RetriggerIssueSelfDescription,
        ProcessStepType::RegisterConnector,
        ProcessStepType::RetriggerRegisterConnector,
        ProcessStepType::TriggerProviderCallback,
        ProcessStepType::RetriggerTriggerProviderCallback,
        ProcessStepType::DeleteDimTechnicalUser,
        ProcessStepType::RetriggerDeleteDimTechnicalUser,
    ];

    /// Step types executed by the background worker (everything that is not
    /// a manual retrigger marker).
    pub const EXECUTABLE: [ProcessStepType; 5] = [
        ProcessStepType::PushBusinessPartnerData,
        ProcessStepType::IssueSelfDescription,
        ProcessStepType::RegisterConnector,
        ProcessStepType::TriggerProviderCallback,
        ProcessStepType::DeleteDimTechnicalUser,
    ];

    /// The retrigger lookup table: each retrigger step maps to exactly one
    /// next step; all other steps are not retriggerable.
    pub fn retrigger_target(self) -> Option<ProcessStepType> {
        match self {
            ProcessStepType::RetriggerPushBusinessPartnerData => {
                Some(ProcessStepType::PushBusinessPartnerData)
            }
            ProcessStepType::RetriggerIssueSelfDescription => {
                Some(ProcessStepType::IssueSelfDescription)
            }
            ProcessStepType::RetriggerRegisterConnector => {
                Some(ProcessStepType::RegisterConnector)
            }
            ProcessStepType::RetriggerTriggerProviderCallback => {
                Some(ProcessStepType::TriggerProviderCallback)
            }
            ProcessStepType::RetriggerDeleteDimTechnicalUser => {
                Some(ProcessStepType::DeleteDimTechnicalUser)
            }
            _ => None,
        }
    }

    pub fn is_retrigger(self) -> bool {
        self.retrigger_target().is_some()
    }

    /// Inverse of [`retrigger_target`](Self::retrigger_target): the marker
    /// step a worker schedules when execution of this step fails.
    pub fn retrigger_marker(self) -> Option<ProcessStepType> {
        ProcessStepType::ALL
            .iter()
            .copied()
            .find(|t| t.retrigger_target() == Some(self))
    }

    pub fn process_type(self) -> ProcessType {
        match self {
            ProcessStepType::DeleteDimTechnicalUser
            | ProcessStepType::RetriggerDeleteDimTechnicalUser => ProcessType::TechnicalUser,
            _ => ProcessType::PartnerOnboarding,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessStepType::PushBusinessPartnerData => "PUSH_BUSINESS_PARTNER_DATA",
            ProcessStepType::RetriggerPushBusinessPartnerData => {
                "RETRIGGER_PUSH_BUSINESS_PARTNER_DATA"
            }
            ProcessStepType::IssueSelfDescription => "ISSUE_SELF_DESCRIPTION",
            ProcessStepType::RetriggerIssueSelfDescription => "RETRIGGER_ISSUE_SELF_DESCRIPTION",
            ProcessStepType::RegisterConnector => "REGISTER_CONNECTOR",
            ProcessStepType::RetriggerRegisterConnector => "RETRIGGER_REGISTER_CONNECTOR",
            ProcessStepType::TriggerProviderCallback => "TRIGGER_PROVIDER_CALLBACK",
            ProcessStepType::RetriggerTriggerProviderCallback => {
                "RETRIGGER_TRIGGER_PROVIDER_CALLBACK"
            }
            ProcessStepType::DeleteDimTechnicalUser => "DELETE_DIM_TECHNICAL_USER",
            ProcessStepType::RetriggerDeleteDimTechnicalUser => {
                "RETRIGGER_DELETE_DIM_TECHNICAL_USER"
            }
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        ProcessStepType::ALL.iter().copied().find(|t| t.as_str() == s)
    }
}

impl std::fmt::Display for ProcessStepType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessStepStatus {
    Todo,
    Done,
    Skipped,
    Failed,
}

impl ProcessStepStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessStepStatus::Todo => "TODO",
            ProcessStepStatus::Done => "DONE",
            ProcessStepStatus::Skipped => "SKIPPED",
            ProcessStepStatus::Failed => "FAILED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "TODO" => Some(ProcessStepStatus::Todo),
            "DONE" => Some(ProcessStepStatus::Done),
            "SKIPPED" => Some(ProcessStepStatus::Skipped),
            "FAILED" => Some(ProcessStepStatus::Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Process {
    pub id: Uuid,
    pub process_type: ProcessType,
    /// Bumped on every step mutation; rows written with a stale version lose.
    pub version: Uuid,
}

impl Process {
    pub fn new(process_type: ProcessType) -> Self {
        Self {
            id: Uuid::new_v4(),
            process_type,
            version: Uuid::new_v4(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProcessStep {
    pub id: Uuid,
    pub process_id: Uuid,
    pub step_type: ProcessStepType,
    pub status: ProcessStepStatus,
    /// Failure message recorded by the worker; empty for other statuses.
    pub message: Option<String>,
    /// Worker id that claimed the step for execution.
    pub claimed_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ProcessStep {
    pub fn new(process_id: Uuid, step_type: ProcessStepType) -> Self {
        Self {
            id: Uuid::new_v4(),
            process_id,
            step_type,
            status: ProcessStepStatus::Todo,
            message: None,
            claimed_by: None,
            created_at: Utc::now(),
        }
    }
}
