//! Token provider with per-service endpoint configuration and caching.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

fn default_expiry_skew() -> u64 {
    30
}

/// Token endpoint settings for one named external service.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenEndpoint {
    pub token_url: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub scope: Option<String>,
    /// Seconds subtracted from `expires_in` so a token is refreshed before
    /// the upstream actually rejects it.
    #[serde(default = "default_expiry_skew")]
    pub expiry_skew_seconds: u64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    300
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_valid(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Fetch a bearer token with the client-credentials grant.
///
/// Exposed separately from [`TokenProvider`] because provider-callback
/// credentials are stored per tenant row rather than in the static service
/// configuration, yet use the same grant.
pub async fn fetch_token(
    http: &reqwest::Client,
    service: &str,
    endpoint: &TokenEndpoint,
) -> Result<(String, Duration)> {
    let mut form = vec![
        ("grant_type", "client_credentials"),
        ("client_id", endpoint.client_id.as_str()),
        ("client_secret", endpoint.client_secret.as_str()),
    ];
    if let Some(scope) = &endpoint.scope {
        form.push(("scope", scope.as_str()));
    }

    let response = http
        .post(&endpoint.token_url)
        .form(&form)
        .send()
        .await
        .map_err(|source| Error::Request {
            service: service.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::Status {
            service: service.to_string(),
            status: status.as_u16(),
        });
    }

    let body: TokenResponse = response.json().await.map_err(|source| Error::Decode {
        service: service.to_string(),
        source,
    })?;

    let lifetime = Duration::from_secs(
        body.expires_in
            .saturating_sub(endpoint.expiry_skew_seconds)
            .max(1),
    );

    Ok((body.access_token, lifetime))
}

/// Caching token provider keyed by service name.
///
/// Cheap to share behind an `Arc`; the cache lock is never held across an
/// await point, so concurrent refreshes of the same service may race but each
/// race only costs a redundant token request.
pub struct TokenProvider {
    http: reqwest::Client,
    endpoints: HashMap<String, TokenEndpoint>,
    cache: Mutex<HashMap<String, CachedToken>>,
}

impl TokenProvider {
    pub fn new(http: reqwest::Client, endpoints: HashMap<String, TokenEndpoint>) -> Self {
        Self {
            http,
            endpoints,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Return a valid bearer token for the named service, fetching a fresh
    /// one when the cached token is absent or expired.
    pub async fn get_token(&self, service: &str) -> Result<String> {
        let now = Instant::now();
        {
            let cache = self.cache.lock().unwrap();
            if let Some(cached) = cache.get(service) {
                if cached.is_valid(now) {
                    return Ok(cached.access_token.clone());
                }
            }
        }

        let endpoint = self
            .endpoints
            .get(service)
            .ok_or_else(|| Error::UnknownService(service.to_string()))?;

        let (access_token, lifetime) = fetch_token(&self.http, service, endpoint).await?;
        tracing::debug!(service, lifetime_secs = lifetime.as_secs(), "token refreshed");

        let mut cache = self.cache.lock().unwrap();
        cache.insert(
            service.to_string(),
            CachedToken {
                access_token: access_token.clone(),
                expires_at: now + lifetime,
            },
        );

        Ok(access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cached_token_expires() {
        let now = Instant::now();
        let token = CachedToken {
            access_token: "t".to_string(),
            expires_at: now + Duration::from_secs(10),
        };
        assert!(token.is_valid(now));
        assert!(!token.is_valid(now + Duration::from_secs(10)));
        assert!(!token.is_valid(now + Duration::from_secs(60)));
    }

    #[tokio::test]
    async fn unknown_service_is_rejected_without_network_access() {
        let provider = TokenProvider::new(reqwest::Client::new(), HashMap::new());
        let err = provider.get_token("bpdm").await.unwrap_err();
        assert!(matches!(err, Error::UnknownService(s) if s == "bpdm"));
    }
}
