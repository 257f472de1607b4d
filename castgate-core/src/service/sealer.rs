//! Sealed-cookie primitive using AES-256-GCM
//!
//! Contract: `seal(payload, ttl) -> token`, `unseal(token) -> payload`.
//! Tokens are tamper-evident and expire; anything satisfying that contract
//! could be swapped in, callers never look inside a token.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Key, Nonce,
};
use base64::Engine;
use chrono::{Duration, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{Error, Result};

/// AES-256-GCM nonce size (96 bits / 12 bytes)
const NONCE_SIZE: usize = 12;

/// Key version byte prepended to sealed payloads for future key rotation.
const KEY_VERSION: u8 = 0x01;

#[derive(Serialize)]
struct SealEnvelope<'a, T> {
    exp: i64,
    data: &'a T,
}

#[derive(Deserialize)]
struct OpenEnvelope<T> {
    exp: i64,
    data: T,
}

/// Seals small serde payloads into opaque, expiring cookie values
#[derive(Clone)]
pub struct CookieSealer {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for CookieSealer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieSealer")
            .field("cipher", &"[REDACTED]")
            .finish()
    }
}

impl CookieSealer {
    /// Create a sealer from a 32-byte key
    pub fn new(key_bytes: &[u8]) -> Result<Self> {
        if key_bytes.len() != 32 {
            return Err(Error::Sealing(format!(
                "seal key must be exactly 32 bytes, got {}",
                key_bytes.len()
            )));
        }
        let key = Key::<Aes256Gcm>::from_slice(key_bytes);
        Ok(Self {
            cipher: Aes256Gcm::new(key),
        })
    }

    /// Create from a 64-character hex key string
    pub fn from_hex_key(hex_key: &str) -> Result<Self> {
        let key_bytes =
            hex::decode(hex_key).map_err(|e| Error::Sealing(format!("invalid hex key: {e}")))?;
        Self::new(&key_bytes)
    }

    /// Create with a fresh random key. Tokens sealed with it become
    /// unreadable once the process exits.
    #[must_use]
    pub fn ephemeral() -> Self {
        let mut key_bytes = [0u8; 32];
        OsRng.fill_bytes(&mut key_bytes);
        Self {
            cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key_bytes)),
        }
    }

    /// Seal a payload into an opaque token valid for `ttl`
    pub fn seal<T: Serialize>(&self, payload: &T, ttl: Duration) -> Result<String> {
        let envelope = SealEnvelope {
            exp: (Utc::now() + ttl).timestamp(),
            data: payload,
        };
        let plaintext = serde_json::to_vec(&envelope)
            .map_err(|e| Error::Sealing(format!("failed to serialize payload: {e}")))?;

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_ref())
            .map_err(|e| Error::Sealing(format!("encryption failed: {e}")))?;

        let mut combined = Vec::with_capacity(1 + NONCE_SIZE + ciphertext.len());
        combined.push(KEY_VERSION);
        combined.extend_from_slice(&nonce_bytes);
        combined.extend_from_slice(&ciphertext);

        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(combined))
    }

    /// Open a sealed token. Fails on tampering, a wrong key, or expiry.
    pub fn unseal<T: DeserializeOwned>(&self, token: &str) -> Result<T> {
        let combined = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|e| Error::Sealing(format!("invalid token encoding: {e}")))?;

        if combined.len() < 1 + NONCE_SIZE {
            return Err(Error::Sealing("token too short".to_string()));
        }
        if combined[0] != KEY_VERSION {
            return Err(Error::Sealing(format!(
                "unsupported seal version: {}",
                combined[0]
            )));
        }

        let nonce = Nonce::from_slice(&combined[1..=NONCE_SIZE]);
        let plaintext = self
            .cipher
            .decrypt(nonce, &combined[1 + NONCE_SIZE..])
            .map_err(|_| Error::Sealing("token failed authentication".to_string()))?;

        let envelope: OpenEnvelope<T> = serde_json::from_slice(&plaintext)
            .map_err(|e| Error::Sealing(format!("failed to parse payload: {e}")))?;

        if Utc::now().timestamp() > envelope.exp {
            return Err(Error::Sealing("token expired".to_string()));
        }
        Ok(envelope.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SessionIdentity;

    #[test]
    fn test_roundtrip() {
        let sealer = CookieSealer::ephemeral();
        let identity = SessionIdentity {
            id: "42".to_string(),
            username: "streamer".to_string(),
            discriminator: "0001".to_string(),
            avatar: "abc".to_string(),
        };
        let token = sealer.seal(&identity, Duration::days(1)).expect("seal");
        let opened: SessionIdentity = sealer.unseal(&token).expect("unseal");
        assert_eq!(opened, identity);
    }

    #[test]
    fn test_tampering_is_detected() {
        let sealer = CookieSealer::ephemeral();
        let token = sealer.seal(&"state".to_string(), Duration::minutes(15)).expect("seal");

        let mut raw = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(&token)
            .expect("decode");
        let last = raw.len() - 1;
        raw[last] ^= 0x01;
        let forged = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(raw);

        assert!(sealer.unseal::<String>(&forged).is_err());
    }

    #[test]
    fn test_wrong_key_fails() {
        let token = CookieSealer::ephemeral()
            .seal(&"state".to_string(), Duration::minutes(15))
            .expect("seal");
        assert!(CookieSealer::ephemeral().unseal::<String>(&token).is_err());
    }

    #[test]
    fn test_expired_token_fails() {
        let sealer = CookieSealer::ephemeral();
        let token = sealer
            .seal(&"state".to_string(), Duration::minutes(-1))
            .expect("seal");
        assert!(sealer.unseal::<String>(&token).is_err());
    }

    #[test]
    fn test_garbage_is_rejected() {
        let sealer = CookieSealer::ephemeral();
        assert!(sealer.unseal::<String>("not a token").is_err());
        assert!(sealer.unseal::<String>("").is_err());
    }
}
