//! Dynamic Attribute Provisioning Service (DAPS) client.

use super::{ensure_success, send_error, ConnectorRegistrar, ConnectorRegistration};
use crate::error::{Error, Result};
use async_trait::async_trait;
use hanse_token_client::TokenProvider;
use serde::Deserialize;
use std::sync::Arc;

const SERVICE: &str = "daps";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DapsRegistrationResponse {
    client_id: String,
}

pub struct DapsClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<TokenProvider>,
}

impl DapsClient {
    pub fn new(http: reqwest::Client, base_url: String, tokens: Arc<TokenProvider>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        }
    }
}

#[async_trait]
impl ConnectorRegistrar for DapsClient {
    async fn register(&self, registration: &ConnectorRegistration) -> Result<String> {
        let token = self.tokens.get_token(SERVICE).await?;
        let url = format!("{}/api/v1/daps", self.base_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(registration)
            .send()
            .await
            .map_err(|e| send_error(SERVICE, e))?;
        ensure_success(SERVICE, &response)?;

        let body: DapsRegistrationResponse =
            response.json().await.map_err(|e| send_error(SERVICE, e))?;
        if body.client_id.is_empty() {
            return Err(Error::Internal(
                "DAPS registration returned an empty client id".to_string(),
            ));
        }
        Ok(body.client_id)
    }
}
