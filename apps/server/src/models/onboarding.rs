//! Onboarding service provider callback settings.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Persisted row: the client secret is sealed with the cipher mode recorded
/// in `encryption_mode`; `initialization_vector` carries the AEAD nonce.
#[derive(Debug, Clone)]
pub struct OnboardingProviderDetail {
    pub company_id: Uuid,
    pub callback_url: String,
    pub auth_url: String,
    pub client_id: String,
    pub client_secret: Vec<u8>,
    pub initialization_vector: Vec<u8>,
    pub encryption_mode: u32,
}

/// Plaintext view exchanged with the caller; the secret only exists decrypted
/// in memory, never in a log line or a repository row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackSettings {
    pub callback_url: String,
    pub auth_url: String,
    pub client_id: String,
    pub client_secret: String,
}
