//! Decentralized identity management (DIM) client.

use super::{ensure_success, send_error, TechnicalUserDeleter};
use crate::error::Result;
use async_trait::async_trait;
use hanse_token_client::TokenProvider;
use std::sync::Arc;

const SERVICE: &str = "dim";

pub struct DimClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<TokenProvider>,
}

impl DimClient {
    pub fn new(http: reqwest::Client, base_url: String, tokens: Arc<TokenProvider>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        }
    }
}

#[async_trait]
impl TechnicalUserDeleter for DimClient {
    async fn delete(&self, client_id: &str) -> Result<()> {
        let token = self.tokens.get_token(SERVICE).await?;
        let url = format!(
            "{}/api/dim/technical-user/{}",
            self.base_url,
            urlencoding::encode(client_id)
        );

        let response = self
            .http
            .delete(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| send_error(SERVICE, e))?;
        ensure_success(SERVICE, &response)?;

        tracing::info!(client_id, "requested DIM technical user deletion");
        Ok(())
    }
}
