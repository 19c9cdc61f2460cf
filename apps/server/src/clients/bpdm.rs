//! Business Partner Data Management (BPDM) client.

use super::{ensure_success, send_error, BusinessPartnerPush, PartnerDataPush};
use crate::error::Result;
use async_trait::async_trait;
use hanse_token_client::TokenProvider;
use std::sync::Arc;

const SERVICE: &str = "bpdm";

pub struct BpdmClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<TokenProvider>,
}

impl BpdmClient {
    pub fn new(http: reqwest::Client, base_url: String, tokens: Arc<TokenProvider>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        }
    }
}

#[async_trait]
impl BusinessPartnerPush for BpdmClient {
    async fn push(&self, input: &PartnerDataPush) -> Result<()> {
        let token = self.tokens.get_token(SERVICE).await?;
        let url = format!("{}/api/catena/input/business-partners", self.base_url);

        let response = self
            .http
            .put(&url)
            .bearer_auth(token)
            .json(&[input])
            .send()
            .await
            .map_err(|e| send_error(SERVICE, e))?;
        ensure_success(SERVICE, &response)?;

        tracing::info!(external_id = %input.external_id, "pushed business partner data");
        Ok(())
    }
}
