//! Onboarding service provider callback settings.

use crate::crypto::CryptoService;
use crate::db::PortalStore;
use crate::error::{Error, Result};
use crate::models::{CallbackSettings, OnboardingProviderDetail};
use std::sync::Arc;
use url::Url;
use uuid::Uuid;

pub struct OnboardingService {
    store: Arc<dyn PortalStore>,
    crypto: Arc<CryptoService>,
}

impl OnboardingService {
    pub fn new(store: Arc<dyn PortalStore>, crypto: Arc<CryptoService>) -> Self {
        Self { store, crypto }
    }

    /// Store callback settings for an onboarding service provider, sealing
    /// the client secret with the default cipher mode.
    pub async fn set_callback(&self, company_id: Uuid, settings: CallbackSettings) -> Result<()> {
        self.require_provider(company_id).await?;

        for (label, value) in [
            ("callback_url", &settings.callback_url),
            ("auth_url", &settings.auth_url),
        ] {
            Url::parse(value).map_err(|_| {
                Error::InvalidArgument(format!("{label} '{value}' is not a valid url"))
            })?;
        }
        if settings.client_id.is_empty() || settings.client_secret.is_empty() {
            return Err(Error::InvalidArgument(
                "client_id and client_secret must not be empty".to_string(),
            ));
        }

        let sealed = self.crypto.encrypt(settings.client_secret.as_bytes())?;
        let detail = OnboardingProviderDetail {
            company_id,
            callback_url: settings.callback_url,
            auth_url: settings.auth_url,
            client_id: settings.client_id,
            client_secret: sealed.ciphertext,
            initialization_vector: sealed.nonce,
            encryption_mode: sealed.mode_index,
        };
        self.store.upsert_provider_detail(&detail).await?;
        tracing::info!(%company_id, "onboarding callback settings stored");
        Ok(())
    }

    /// Fetch callback settings with the secret decrypted using the cipher
    /// mode recorded on the row.
    pub async fn get_callback(&self, company_id: Uuid) -> Result<CallbackSettings> {
        self.require_provider(company_id).await?;

        let detail = self
            .store
            .get_provider_detail(company_id)
            .await?
            .ok_or_else(|| Error::NotFound {
                entity: "onboarding provider detail",
                id: company_id.to_string(),
            })?;

        decrypt_settings(&self.crypto, &detail)
    }

    async fn require_provider(&self, company_id: Uuid) -> Result<()> {
        if !self.store.is_onboarding_service_provider(company_id).await? {
            return Err(Error::Forbidden(format!(
                "company {company_id} is not an onboarding service provider"
            )));
        }
        Ok(())
    }
}

/// Shared with the worker, which needs the decrypted credentials to deliver
/// the provider callback.
pub fn decrypt_settings(
    crypto: &CryptoService,
    detail: &OnboardingProviderDetail,
) -> Result<CallbackSettings> {
    let secret = crypto.decrypt(
        &detail.client_secret,
        &detail.initialization_vector,
        detail.encryption_mode,
    )?;
    let client_secret = String::from_utf8(secret)
        .map_err(|_| Error::Crypto("decrypted secret is not valid utf-8".to_string()))?;
    Ok(CallbackSettings {
        callback_url: detail.callback_url.clone(),
        auth_url: detail.auth_url.clone(),
        client_id: detail.client_id.clone(),
        client_secret,
    })
}
