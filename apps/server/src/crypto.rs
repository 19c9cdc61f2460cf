//! Symmetric sealing of stored provider-callback secrets.
//!
//! Each onboarding-provider row records the cipher-mode index it was sealed
//! with, so decryption works for any configured mode while new secrets always
//! use the configured default. Modes are AEAD ciphers; a tampered ciphertext
//! or a wrong key surfaces as [`Error::Crypto`], never as garbage plaintext.

use crate::config::{CipherKind, EncryptionConfig};
use crate::error::{Error, Result};
use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::Aes256Gcm;
use chacha20poly1305::ChaCha20Poly1305;
use std::collections::HashMap;

const KEY_LEN: usize = 32;

/// Result of sealing a secret: everything that must be persisted to get the
/// plaintext back later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    pub ciphertext: Vec<u8>,
    pub nonce: Vec<u8>,
    pub mode_index: u32,
}

#[derive(Clone)]
struct Mode {
    kind: CipherKind,
    key: Vec<u8>,
}

#[derive(Clone)]
pub struct CryptoService {
    default_index: u32,
    modes: HashMap<u32, Mode>,
}

impl CryptoService {
    pub fn from_config(config: &EncryptionConfig) -> Result<Self> {
        let mut modes = HashMap::new();
        for mode in &config.modes {
            let key = hex::decode(&mode.key)
                .map_err(|_| Error::Configuration(format!("mode {}: key is not valid hex", mode.index)))?;
            if key.len() != KEY_LEN {
                return Err(Error::Configuration(format!(
                    "mode {}: key must be {KEY_LEN} bytes, got {}",
                    mode.index,
                    key.len()
                )));
            }
            if modes
                .insert(
                    mode.index,
                    Mode {
                        kind: mode.cipher,
                        key,
                    },
                )
                .is_some()
            {
                return Err(Error::Configuration(format!(
                    "duplicate encryption mode index {}",
                    mode.index
                )));
            }
        }
        if !modes.contains_key(&config.default_mode_index) {
            return Err(Error::Configuration(format!(
                "default_mode_index {} has no matching mode",
                config.default_mode_index
            )));
        }
        Ok(Self {
            default_index: config.default_mode_index,
            modes,
        })
    }

    /// Seal a secret with the default mode.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Sealed> {
        self.encrypt_with_mode(plaintext, self.default_index)
    }

    /// Seal a secret with an explicitly selected mode.
    pub fn encrypt_with_mode(&self, plaintext: &[u8], mode_index: u32) -> Result<Sealed> {
        let mode = self.mode(mode_index)?;
        let (ciphertext, nonce) = match mode.kind {
            CipherKind::Aes256Gcm => {
                let cipher = Aes256Gcm::new_from_slice(&mode.key)
                    .map_err(|e| Error::Crypto(e.to_string()))?;
                let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
                let ciphertext = cipher
                    .encrypt(&nonce, plaintext)
                    .map_err(|_| Error::Crypto("encryption failed".to_string()))?;
                (ciphertext, nonce.to_vec())
            }
            CipherKind::Chacha20Poly1305 => {
                let cipher = ChaCha20Poly1305::new_from_slice(&mode.key)
                    .map_err(|e| Error::Crypto(e.to_string()))?;
                let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);
                let ciphertext = cipher
                    .encrypt(&nonce, plaintext)
                    .map_err(|_| Error::Crypto("encryption failed".to_string()))?;
                (ciphertext, nonce.to_vec())
            }
        };
        Ok(Sealed {
            ciphertext,
            nonce,
            mode_index,
        })
    }

    /// Open a sealed secret using the mode index recorded next to it.
    pub fn decrypt(&self, ciphertext: &[u8], nonce: &[u8], mode_index: u32) -> Result<Vec<u8>> {
        let mode = self.mode(mode_index)?;
        match mode.kind {
            CipherKind::Aes256Gcm => {
                let cipher = Aes256Gcm::new_from_slice(&mode.key)
                    .map_err(|e| Error::Crypto(e.to_string()))?;
                cipher
                    .decrypt(aes_gcm::Nonce::from_slice(nonce), ciphertext)
                    .map_err(|_| Error::Crypto("decryption failed".to_string()))
            }
            CipherKind::Chacha20Poly1305 => {
                let cipher = ChaCha20Poly1305::new_from_slice(&mode.key)
                    .map_err(|e| Error::Crypto(e.to_string()))?;
                cipher
                    .decrypt(chacha20poly1305::Nonce::from_slice(nonce), ciphertext)
                    .map_err(|_| Error::Crypto("decryption failed".to_string()))
            }
        }
    }

    fn mode(&self, index: u32) -> Result<&Mode> {
        self.modes.get(&index).ok_or_else(|| {
            Error::Configuration(format!("encryption mode {index} is not configured"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CipherModeConfig;

    fn config() -> EncryptionConfig {
        EncryptionConfig {
            default_mode_index: 1,
            modes: vec![
                CipherModeConfig {
                    index: 1,
                    cipher: CipherKind::Aes256Gcm,
                    key: "11".repeat(32),
                },
                CipherModeConfig {
                    index: 2,
                    cipher: CipherKind::Chacha20Poly1305,
                    key: "22".repeat(32),
                },
            ],
        }
    }

    #[test]
    fn seals_with_default_mode_and_opens_any_mode() {
        let crypto = CryptoService::from_config(&config()).unwrap();

        let sealed = crypto.encrypt(b"hunter2").unwrap();
        assert_eq!(sealed.mode_index, 1);
        assert_eq!(crypto.decrypt(&sealed.ciphertext, &sealed.nonce, 1).unwrap(), b"hunter2");

        let sealed = crypto.encrypt_with_mode(b"hunter2", 2).unwrap();
        assert_eq!(sealed.mode_index, 2);
        assert_eq!(crypto.decrypt(&sealed.ciphertext, &sealed.nonce, 2).unwrap(), b"hunter2");
    }

    #[test]
    fn tampered_ciphertext_is_rejected() {
        let crypto = CryptoService::from_config(&config()).unwrap();
        let mut sealed = crypto.encrypt(b"secret").unwrap();
        sealed.ciphertext[0] ^= 0xff;
        let err = crypto.decrypt(&sealed.ciphertext, &sealed.nonce, 1).unwrap_err();
        assert!(matches!(err, Error::Crypto(_)));
    }

    #[test]
    fn unknown_mode_index_is_a_configuration_error() {
        let crypto = CryptoService::from_config(&config()).unwrap();
        let sealed = crypto.encrypt(b"secret").unwrap();
        let err = crypto.decrypt(&sealed.ciphertext, &sealed.nonce, 9).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn short_key_is_rejected() {
        let mut cfg = config();
        cfg.modes[0].key = "11".repeat(16);
        assert!(CryptoService::from_config(&cfg).is_err());
    }
}
