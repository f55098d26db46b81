//! Robinhood crypto API request signing.
//!
//! Every request carries three headers: the API key, the current Unix
//! timestamp, and an Ed25519 signature over
//! `api_key + timestamp + path + method + body`. The pieces are concatenated
//! with no separators, so the verifier must rebuild the exact same string.

use std::fmt;

use base64::prelude::*;
use ed25519_dalek::{Signer as _, SigningKey, VerifyingKey};
use zeroize::Zeroizing;

use crate::Result;

pub const API_KEY_HEADER: &str = "x-api-key";
pub const SIGNATURE_HEADER: &str = "x-signature";
pub const TIMESTAMP_HEADER: &str = "x-timestamp";

/// Header values produced for one signed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeaders {
    pub api_key: String,
    pub signature: String,
    pub timestamp: String,
}

impl SignatureHeaders {
    /// Returns the headers as `(name, value)` pairs in wire order.
    pub fn pairs(&self) -> [(&'static str, &str); 3] {
        [
            (API_KEY_HEADER, self.api_key.as_str()),
            (SIGNATURE_HEADER, self.signature.as_str()),
            (TIMESTAMP_HEADER, self.timestamp.as_str()),
        ]
    }
}

/// Holds the API key and Ed25519 private key used to sign requests.
#[derive(Clone)]
pub struct Signer {
    api_key: String,
    signing_key: SigningKey,
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("api_key", &self.api_key)
            .field("verifying_key", &BASE64_STANDARD.encode(self.verifying_key().as_bytes()))
            .finish_non_exhaustive()
    }
}

impl Signer {
    /// Builds a signer from the API key and a base64-encoded 32-byte seed.
    ///
    /// # Errors
    ///
    /// Returns [`SpreadlogError::Signing`](crate::SpreadlogError::Signing) if
    /// the seed is not valid base64 or does not decode to exactly 32 bytes.
    pub fn from_base64_seed(api_key: impl Into<String>, base64_seed: &str) -> Result<Self> {
        let seed = Zeroizing::new(BASE64_STANDARD.decode(base64_seed.trim()).map_err(|e| {
            crate::SpreadlogError::Signing(format!("invalid base64 private key: {e}"))
        })?);

        let seed: Zeroizing<[u8; 32]> =
            Zeroizing::new(seed.as_slice().try_into().map_err(|_| {
                crate::SpreadlogError::Signing(format!(
                    "private key seed must be 32 bytes, got {}",
                    seed.len()
                ))
            })?);

        Ok(Self {
            api_key: api_key.into(),
            signing_key: SigningKey::from_bytes(&seed),
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Public half of the signing key, for verifying counterparts.
    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Signs one request and returns the headers to attach to it.
    ///
    /// `body` is the empty string for requests without a body; it still
    /// takes part in the signed message.
    pub fn sign(&self, timestamp: i64, path: &str, method: &str, body: &str) -> SignatureHeaders {
        let message = signing_message(&self.api_key, timestamp, path, method, body);
        let signature = self.signing_key.sign(message.as_bytes());

        SignatureHeaders {
            api_key: self.api_key.clone(),
            signature: BASE64_STANDARD.encode(signature.to_bytes()),
            timestamp: timestamp.to_string(),
        }
    }
}

/// Builds the exact string that gets signed.
pub fn signing_message(
    api_key: &str,
    timestamp: i64,
    path: &str,
    method: &str,
    body: &str,
) -> String {
    format!("{api_key}{timestamp}{path}{method}{body}")
}

/// Current UTC time in whole seconds since the Unix epoch.
pub fn current_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}
