//! Discord interaction request signatures.
//!
//! Discord signs `timestamp ++ raw body` with the application's Ed25519 key
//! and sends the hex signature and timestamp as headers. Requests that fail
//! the check must be answered with 401.

use ed25519_dalek::{Signature, VerifyingKey};
use thiserror::Error;

pub const DISCORD_SIGNATURE_HEADER: &str = "x-signature-ed25519";
pub const DISCORD_TIMESTAMP_HEADER: &str = "x-signature-timestamp";

const PUBLIC_KEY_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublicKeyError {
    #[error("public key is not hex: {0}")]
    NotHex(String),
    #[error("public key must be {PUBLIC_KEY_LEN} bytes (got {0})")]
    WrongLength(usize),
    #[error("public key is not a valid ed25519 key")]
    InvalidKey,
}

/// Verifies interaction requests against the application public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionVerifier {
    key: VerifyingKey,
}

impl InteractionVerifier {
    /// Parse the hex public key shown on the application's developer page.
    pub fn from_hex(public_key: &str) -> Result<Self, PublicKeyError> {
        let bytes = hex::decode(public_key.trim())
            .map_err(|error| PublicKeyError::NotHex(error.to_string()))?;
        let bytes = <[u8; PUBLIC_KEY_LEN]>::try_from(bytes.as_slice())
            .map_err(|_| PublicKeyError::WrongLength(bytes.len()))?;
        let key = VerifyingKey::from_bytes(&bytes).map_err(|_| PublicKeyError::InvalidKey)?;
        Ok(Self { key })
    }

    /// Whether `signature_hex` signs `timestamp` followed by `body`.
    pub fn verify(&self, timestamp: &str, body: &[u8], signature_hex: &str) -> bool {
        let Ok(raw) = hex::decode(signature_hex.trim()) else {
            return false;
        };
        let Ok(raw) = <[u8; Signature::BYTE_SIZE]>::try_from(raw.as_slice()) else {
            return false;
        };
        let signature = Signature::from_bytes(&raw);
        let mut message = Vec::with_capacity(timestamp.len() + body.len());
        message.extend_from_slice(timestamp.as_bytes());
        message.extend_from_slice(body);
        self.key.verify_strict(&message, &signature).is_ok()
    }
}
