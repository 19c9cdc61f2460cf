//! Document access rules.

mod support;

use hanse::config::DocumentsConfig;
use hanse::models::{DocumentStatus, DocumentType};
use hanse::services::DocumentService;
use hanse::Error;
use std::sync::Arc;
use support::*;
use uuid::Uuid;

#[tokio::test]
async fn owner_can_read_its_document() {
    let store = Arc::new(hanse::db::InMemoryPortalStore::new());
    let company_id = Uuid::new_v4();
    let doc = document(company_id, DocumentType::CommercialRegisterExtract, DocumentStatus::Pending);
    let doc_id = doc.id;
    store.insert_document_row(doc);
    let service = DocumentService::new(store, DocumentsConfig::default());

    let fetched = service.get_document(doc_id, company_id).await.unwrap();
    assert_eq!(fetched.id, doc_id);
}

#[tokio::test]
async fn other_companies_are_forbidden() {
    let store = Arc::new(hanse::db::InMemoryPortalStore::new());
    let doc = document(Uuid::new_v4(), DocumentType::CommercialRegisterExtract, DocumentStatus::Pending);
    let doc_id = doc.id;
    store.insert_document_row(doc);
    let service = DocumentService::new(store, DocumentsConfig::default());

    let err = service.get_document(doc_id, Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, Error::Forbidden(_)));
}

#[tokio::test]
async fn missing_document_is_not_found() {
    let store = Arc::new(hanse::db::InMemoryPortalStore::new());
    let service = DocumentService::new(store, DocumentsConfig::default());

    let err = service.get_document(Uuid::new_v4(), Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}

#[tokio::test]
async fn seed_data_access_is_gated_by_configuration() {
    let store = Arc::new(hanse::db::InMemoryPortalStore::new());
    let doc = document(Uuid::new_v4(), DocumentType::SeedData, DocumentStatus::Pending);
    let doc_id = doc.id;
    store.insert_document_row(doc);

    let disabled = DocumentService::new(store.clone(), DocumentsConfig::default());
    let err = disabled.get_seed_data(doc_id).await.unwrap_err();
    assert!(matches!(err, Error::Forbidden(_)));

    let enabled = DocumentService::new(
        store,
        DocumentsConfig {
            seed_access_enabled: true,
        },
    );
    let fetched = enabled.get_seed_data(doc_id).await.unwrap();
    assert_eq!(fetched.id, doc_id);
}

#[tokio::test]
async fn seed_data_endpoint_rejects_other_document_types() {
    let store = Arc::new(hanse::db::InMemoryPortalStore::new());
    let doc = document(Uuid::new_v4(), DocumentType::FrameContract, DocumentStatus::Pending);
    let doc_id = doc.id;
    store.insert_document_row(doc);
    let service = DocumentService::new(
        store,
        DocumentsConfig {
            seed_access_enabled: true,
        },
    );

    let err = service.get_seed_data(doc_id).await.unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
}

#[tokio::test]
async fn frame_documents_exclude_inactive_ones() {
    let store = Arc::new(hanse::db::InMemoryPortalStore::new());
    let active = document(Uuid::new_v4(), DocumentType::FrameContract, DocumentStatus::Locked);
    let active_id = active.id;
    store.insert_document_row(active);
    store.insert_document_row(document(
        Uuid::new_v4(),
        DocumentType::FrameContract,
        DocumentStatus::Inactive,
    ));
    store.insert_document_row(document(
        Uuid::new_v4(),
        DocumentType::SeedData,
        DocumentStatus::Pending,
    ));
    let service = DocumentService::new(store, DocumentsConfig::default());

    let frames = service.get_frame_documents().await.unwrap();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].id, active_id);
}
