//! Self-description factory client.
//!
//! The factory issues signed verifiable-credential documents describing a
//! participant or a connector; the returned JSON is persisted verbatim as a
//! document.

use super::{ensure_success, send_error, SelfDescriptionIssuer};
use crate::error::Result;
use crate::models::Bpn;
use async_trait::async_trait;
use hanse_token_client::TokenProvider;
use serde_json::json;
use std::sync::Arc;

const SERVICE: &str = "sd-factory";

pub struct SdFactoryClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<TokenProvider>,
}

impl SdFactoryClient {
    pub fn new(http: reqwest::Client, base_url: String, tokens: Arc<TokenProvider>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        }
    }

    async fn request_document(&self, body: serde_json::Value) -> Result<serde_json::Value> {
        let token = self.tokens.get_token(SERVICE).await?;
        let url = format!("{}/api/rel3/selfdescription", self.base_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| send_error(SERVICE, e))?;
        ensure_success(SERVICE, &response)?;

        response.json().await.map_err(|e| send_error(SERVICE, e))
    }
}

#[async_trait]
impl SelfDescriptionIssuer for SdFactoryClient {
    async fn issue_legal_person(&self, bpn: &Bpn) -> Result<serde_json::Value> {
        self.request_document(json!({
            "type": "LegalParticipant",
            "holder": bpn,
        }))
        .await
    }

    async fn issue_connector(
        &self,
        bpn: &Bpn,
        connector_url: &str,
    ) -> Result<serde_json::Value> {
        self.request_document(json!({
            "type": "ServiceOffering",
            "holder": bpn,
            "providedBy": connector_url,
        }))
        .await
    }
}
