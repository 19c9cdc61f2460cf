//! Document access rules.

use crate::config::DocumentsConfig;
use crate::db::PortalStore;
use crate::error::{Error, Result};
use crate::models::{Document, DocumentType};
use std::sync::Arc;
use uuid::Uuid;

pub struct DocumentService {
    store: Arc<dyn PortalStore>,
    config: DocumentsConfig,
}

impl DocumentService {
    pub fn new(store: Arc<dyn PortalStore>, config: DocumentsConfig) -> Self {
        Self { store, config }
    }

    /// Fetch a document on behalf of a company; only the owning company may
    /// read it.
    pub async fn get_document(&self, document_id: Uuid, company_id: Uuid) -> Result<Document> {
        let document = self.require_document(document_id).await?;
        if document.company_id != company_id {
            return Err(Error::Forbidden(format!(
                "company {company_id} is not permitted to access document {document_id}"
            )));
        }
        Ok(document)
    }

    /// Fetch a seed-data document.
    ///
    /// Seed data are test fixtures; access is configuration-gated and denied
    /// in production deployments regardless of ownership.
    pub async fn get_seed_data(&self, document_id: Uuid) -> Result<Document> {
        if !self.config.seed_access_enabled {
            return Err(Error::Forbidden(
                "seed data access is disabled in this environment".to_string(),
            ));
        }
        let document = self.require_document(document_id).await?;
        if document.doc_type != DocumentType::SeedData {
            return Err(Error::Conflict(format!(
                "document {document_id} is not a seed data document"
            )));
        }
        Ok(document)
    }

    /// Active frame-contract documents, visible to every member.
    pub async fn get_frame_documents(&self) -> Result<Vec<Document>> {
        self.store.get_frame_documents().await
    }

    async fn require_document(&self, document_id: Uuid) -> Result<Document> {
        self.store
            .get_document(document_id)
            .await?
            .ok_or_else(|| Error::NotFound {
                entity: "document",
                id: document_id.to_string(),
            })
    }
}
