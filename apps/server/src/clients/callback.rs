//! Onboarding service provider callback client.
//!
//! Unlike the other clients this one has no static token endpoint: every
//! provider stores its own auth url and client credentials, so the token is
//! fetched per call with the generic client-credentials helper.

use super::{ensure_success, send_error, ProviderCallback, ProviderCallbackPayload};
use crate::error::Result;
use crate::models::CallbackSettings;
use async_trait::async_trait;
use hanse_token_client::{fetch_token, TokenEndpoint};

const SERVICE: &str = "onboarding-provider";

pub struct OnboardingCallbackClient {
    http: reqwest::Client,
}

impl OnboardingCallbackClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ProviderCallback for OnboardingCallbackClient {
    async fn notify(
        &self,
        settings: &CallbackSettings,
        payload: &ProviderCallbackPayload,
    ) -> Result<()> {
        let endpoint = TokenEndpoint {
            token_url: settings.auth_url.clone(),
            client_id: settings.client_id.clone(),
            client_secret: settings.client_secret.clone(),
            scope: None,
            expiry_skew_seconds: 0,
        };
        let (token, _) = fetch_token(&self.http, SERVICE, &endpoint).await?;

        let response = self
            .http
            .post(&settings.callback_url)
            .bearer_auth(token)
            .json(payload)
            .send()
            .await
            .map_err(|e| send_error(SERVICE, e))?;
        ensure_success(SERVICE, &response)?;

        tracing::info!(external_id = %payload.external_id, "provider callback delivered");
        Ok(())
    }
}
