//! Self-description document issuance.

use crate::clients::{ConnectorRegistrar, ConnectorRegistration, SelfDescriptionIssuer};
use crate::db::PortalStore;
use crate::error::{Error, Result};
use crate::models::{Bpn, ConnectorStatus, Document, DocumentStatus, DocumentType};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

pub struct SelfDescriptionService {
    store: Arc<dyn PortalStore>,
    sd_factory: Arc<dyn SelfDescriptionIssuer>,
    daps: Arc<dyn ConnectorRegistrar>,
}

impl SelfDescriptionService {
    pub fn new(
        store: Arc<dyn PortalStore>,
        sd_factory: Arc<dyn SelfDescriptionIssuer>,
        daps: Arc<dyn ConnectorRegistrar>,
    ) -> Self {
        Self {
            store,
            sd_factory,
            daps,
        }
    }

    /// Request a legal-participant self-description for a company and persist
    /// the returned document.
    pub async fn issue_for_company(&self, company_id: Uuid) -> Result<Uuid> {
        let company = self
            .store
            .get_company(company_id)
            .await?
            .ok_or_else(|| Error::NotFound {
                entity: "company",
                id: company_id.to_string(),
            })?;
        let bpn = company.bpn.as_ref().ok_or_else(|| {
            Error::Conflict(format!(
                "company {company_id} has no business partner number"
            ))
        })?;

        let payload = self.sd_factory.issue_legal_person(bpn).await?;
        let document = self
            .persist_document(&company.name, company_id, &payload)
            .await?;
        self.store.attach_sd_document(company_id, document).await?;

        tracing::info!(%company_id, document_id = %document, "self-description issued");
        Ok(document)
    }

    /// Request a connector self-description; registers the connector with the
    /// DAPS first when it has no client there yet.
    pub async fn issue_for_connector(&self, connector_id: Uuid) -> Result<Uuid> {
        let connector = self
            .store
            .get_connector(connector_id)
            .await?
            .ok_or_else(|| Error::NotFound {
                entity: "connector",
                id: connector_id.to_string(),
            })?;
        let bpn = self.company_bpn(connector.company_id).await?;

        let daps_client_id = match &connector.daps_client_id {
            Some(existing) => existing.clone(),
            None => {
                self.daps
                    .register(&ConnectorRegistration {
                        name: connector.name.clone(),
                        referring_connector: connector.url.clone(),
                        bpn: bpn.clone(),
                    })
                    .await?
            }
        };

        let payload = self.sd_factory.issue_connector(&bpn, &connector.url).await?;
        let document = self
            .persist_document(&connector.name, connector.company_id, &payload)
            .await?;
        self.store
            .update_connector_registration(
                connector_id,
                Some(daps_client_id),
                Some(document),
                ConnectorStatus::Active,
            )
            .await?;

        tracing::info!(%connector_id, document_id = %document, "connector self-description issued");
        Ok(document)
    }

    async fn company_bpn(&self, company_id: Uuid) -> Result<Bpn> {
        let company = self
            .store
            .get_company(company_id)
            .await?
            .ok_or_else(|| Error::NotFound {
                entity: "company",
                id: company_id.to_string(),
            })?;
        company.bpn.ok_or_else(|| {
            Error::Conflict(format!(
                "company {company_id} has no business partner number"
            ))
        })
    }

    async fn persist_document(
        &self,
        subject: &str,
        company_id: Uuid,
        payload: &serde_json::Value,
    ) -> Result<Uuid> {
        let content = serde_json::to_vec(payload)
            .map_err(|e| Error::Internal(format!("failed to serialize SD document: {e}")))?;
        let document = Document {
            id: Uuid::new_v4(),
            name: format!("SelfDescription_{subject}.json"),
            content,
            media_type: "application/json".to_string(),
            doc_type: DocumentType::SelfDescription,
            status: DocumentStatus::Locked,
            company_id,
            created_at: Utc::now(),
        };
        self.store.insert_document(&document).await?;
        Ok(document.id)
    }
}
