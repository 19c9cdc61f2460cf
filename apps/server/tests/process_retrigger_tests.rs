//! Manual retrigger of failed process steps.

mod support;

use hanse::db::ProcessRepository;
use hanse::models::{Process, ProcessStep, ProcessStepStatus, ProcessStepType, ProcessType};
use hanse::services::ProcessService;
use hanse::Error;
use std::sync::Arc;
use support::*;
use uuid::Uuid;

#[tokio::test]
async fn retrigger_consumes_marker_and_schedules_next_step() {
    let store = Arc::new(hanse::db::InMemoryPortalStore::new());
    let process_id = seed_process(
        &store,
        ProcessType::PartnerOnboarding,
        &[ProcessStepType::RetriggerPushBusinessPartnerData],
    )
    .await;
    let service = ProcessService::new(store.clone());

    let scheduled = service
        .retrigger(
            process_id,
            ProcessStepType::RetriggerPushBusinessPartnerData,
        )
        .await
        .unwrap();
    assert_eq!(scheduled, ProcessStepType::PushBusinessPartnerData);

    let steps = store.steps_of(process_id);
    assert_eq!(steps.len(), 2);
    let marker = steps
        .iter()
        .find(|s| s.step_type == ProcessStepType::RetriggerPushBusinessPartnerData)
        .unwrap();
    assert_eq!(marker.status, ProcessStepStatus::Done);
    let next = steps
        .iter()
        .find(|s| s.step_type == ProcessStepType::PushBusinessPartnerData)
        .unwrap();
    assert_eq!(next.status, ProcessStepStatus::Todo);
}

#[tokio::test]
async fn non_retrigger_step_type_is_rejected() {
    let store = Arc::new(hanse::db::InMemoryPortalStore::new());
    let process_id = seed_process(
        &store,
        ProcessType::PartnerOnboarding,
        &[ProcessStepType::PushBusinessPartnerData],
    )
    .await;
    let service = ProcessService::new(store);

    let err = service
        .retrigger(process_id, ProcessStepType::PushBusinessPartnerData)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
}

#[tokio::test]
async fn unknown_process_is_not_found() {
    let store = Arc::new(hanse::db::InMemoryPortalStore::new());
    let service = ProcessService::new(store);

    let err = service
        .retrigger(
            Uuid::new_v4(),
            ProcessStepType::RetriggerIssueSelfDescription,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}

#[tokio::test]
async fn retrigger_without_pending_marker_is_a_conflict() {
    let store = Arc::new(hanse::db::InMemoryPortalStore::new());
    // Marker exists but was already consumed.
    let process_id = seed_process(
        &store,
        ProcessType::PartnerOnboarding,
        &[ProcessStepType::RetriggerIssueSelfDescription],
    )
    .await;
    let marker = store.steps_of(process_id).pop().unwrap();
    store
        .finish_step(marker.id, ProcessStepStatus::Done, None)
        .await
        .unwrap();
    let service = ProcessService::new(store);

    let err = service
        .retrigger(process_id, ProcessStepType::RetriggerIssueSelfDescription)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
}

#[tokio::test]
async fn retrigger_with_next_step_already_pending_is_a_conflict() {
    let store = Arc::new(hanse::db::InMemoryPortalStore::new());
    let process_id = seed_process(
        &store,
        ProcessType::PartnerOnboarding,
        &[
            ProcessStepType::RetriggerRegisterConnector,
            ProcessStepType::RegisterConnector,
        ],
    )
    .await;
    let service = ProcessService::new(store.clone());

    let err = service
        .retrigger(process_id, ProcessStepType::RetriggerRegisterConnector)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));

    // The failed attempt must not have consumed the marker.
    let steps = store.steps_of(process_id);
    assert!(steps
        .iter()
        .any(|s| s.step_type == ProcessStepType::RetriggerRegisterConnector
            && s.status == ProcessStepStatus::Todo));
}

#[tokio::test]
async fn inserting_a_second_pending_step_of_the_same_type_is_rejected() {
    let store = Arc::new(hanse::db::InMemoryPortalStore::new());
    let process_id = seed_process(
        &store,
        ProcessType::PartnerOnboarding,
        &[ProcessStepType::PushBusinessPartnerData],
    )
    .await;

    let err = store
        .insert_step(&ProcessStep::new(
            process_id,
            ProcessStepType::PushBusinessPartnerData,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
    assert_eq!(store.steps_of(process_id).len(), 1);

    // Once the pending step is finished the type may be scheduled again.
    let first = store.steps_of(process_id).pop().unwrap();
    store
        .finish_step(first.id, ProcessStepStatus::Failed, Some("boom".to_string()))
        .await
        .unwrap();
    store
        .insert_step(&ProcessStep::new(
            process_id,
            ProcessStepType::PushBusinessPartnerData,
        ))
        .await
        .unwrap();
    assert_eq!(store.steps_of(process_id).len(), 2);
}

#[tokio::test]
async fn process_creation_rejects_duplicate_pending_steps() {
    let store = Arc::new(hanse::db::InMemoryPortalStore::new());
    let process = Process::new(ProcessType::PartnerOnboarding);
    let steps = [
        ProcessStep::new(process.id, ProcessStepType::PushBusinessPartnerData),
        ProcessStep::new(process.id, ProcessStepType::PushBusinessPartnerData),
    ];

    let err = store.create_process(&process, &steps).await.unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
    assert!(store.processes().is_empty());
}
