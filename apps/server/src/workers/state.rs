//! Shared state for the process worker.

use crate::clients::{
    BpdmClient, BusinessPartnerPush, ConnectorRegistrar, DapsClient, DimClient,
    OnboardingCallbackClient, ProviderCallback, SdFactoryClient, TechnicalUserDeleter,
};
use crate::config::Config;
use crate::crypto::CryptoService;
use crate::db::{PortalStore, PostgresPortalStore};
use crate::error::Result;
use crate::services::SelfDescriptionService;
use hanse_token_client::TokenProvider;
use sqlx::postgres::PgPoolOptions;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct WorkerState {
    pub config: Arc<Config>,
    pub store: Arc<dyn PortalStore>,
    pub crypto: Arc<CryptoService>,
    pub bpdm: Arc<dyn BusinessPartnerPush>,
    pub daps: Arc<dyn ConnectorRegistrar>,
    pub dim: Arc<dyn TechnicalUserDeleter>,
    pub provider_callback: Arc<dyn ProviderCallback>,
    pub self_description: Arc<SelfDescriptionService>,
}

impl WorkerState {
    /// Assemble state from parts. Tests pass an in-memory store and stub
    /// clients here; [`init`](Self::init) is the production path.
    pub fn new(
        config: Arc<Config>,
        store: Arc<dyn PortalStore>,
        crypto: Arc<CryptoService>,
        bpdm: Arc<dyn BusinessPartnerPush>,
        daps: Arc<dyn ConnectorRegistrar>,
        dim: Arc<dyn TechnicalUserDeleter>,
        provider_callback: Arc<dyn ProviderCallback>,
        self_description: Arc<SelfDescriptionService>,
    ) -> Self {
        Self {
            config,
            store,
            crypto,
            bpdm,
            daps,
            dim,
            provider_callback,
            self_description,
        }
    }

    /// Connect to Postgres and wire the reqwest-backed partner clients.
    pub async fn init(config: Config) -> Result<Self> {
        let db = &config.database;
        let pool = PgPoolOptions::new()
            .min_connections(db.pool_min_size)
            .max_connections(db.pool_max_size)
            .acquire_timeout(Duration::from_secs(db.pool_timeout_seconds))
            .connect(&db.url)
            .await?;
        let store: Arc<dyn PortalStore> = Arc::new(PostgresPortalStore::new(pool));

        let crypto = Arc::new(CryptoService::from_config(&config.encryption)?);

        let http = reqwest::Client::new();
        let endpoints = HashMap::from([
            ("bpdm".to_string(), config.clients.bpdm.token.clone()),
            ("sd-factory".to_string(), config.clients.sd_factory.token.clone()),
            ("daps".to_string(), config.clients.daps.token.clone()),
            ("dim".to_string(), config.clients.dim.token.clone()),
        ]);
        let tokens = Arc::new(TokenProvider::new(http.clone(), endpoints));

        let bpdm: Arc<dyn BusinessPartnerPush> = Arc::new(BpdmClient::new(
            http.clone(),
            config.clients.bpdm.base_url.clone(),
            tokens.clone(),
        ));
        let sd_factory = Arc::new(SdFactoryClient::new(
            http.clone(),
            config.clients.sd_factory.base_url.clone(),
            tokens.clone(),
        ));
        let daps: Arc<dyn ConnectorRegistrar> = Arc::new(DapsClient::new(
            http.clone(),
            config.clients.daps.base_url.clone(),
            tokens.clone(),
        ));
        let dim: Arc<dyn TechnicalUserDeleter> = Arc::new(DimClient::new(
            http.clone(),
            config.clients.dim.base_url.clone(),
            tokens,
        ));
        let provider_callback: Arc<dyn ProviderCallback> =
            Arc::new(OnboardingCallbackClient::new(http));

        let self_description = Arc::new(SelfDescriptionService::new(
            store.clone(),
            sd_factory,
            daps.clone(),
        ));

        Ok(Self {
            config: Arc::new(config),
            store,
            crypto,
            bpdm,
            daps,
            dim,
            provider_callback,
            self_description,
        })
    }
}
