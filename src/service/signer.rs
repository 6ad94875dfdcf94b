//! Command parameter signing.
//!
//! The gateway expects a two-layer encoding: the `message` field is the
//! URL-safe base64 of the params JSON, and the detached signature covers
//! that *encoded* string, not the raw JSON. Signing the raw JSON produces
//! signatures the gateway rejects.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use p256::ecdsa::signature::RandomizedDigestSigner;
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use p256::pkcs8::DecodePrivateKey;
use rand::rngs::OsRng;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::error::BridgeError;

/// Encoded params plus the detached signature over them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedMessage {
    /// Base64url (unpadded) of the params JSON.
    pub encoded_message: String,
    /// Base64url (unpadded) of the DER-encoded ECDSA signature over
    /// `encoded_message`.
    pub signature: String,
}

/// Signs command parameters with the process-wide P-256 private key.
///
/// Immutable after construction; shared across concurrent flows.
#[derive(Clone)]
pub struct Signer {
    key: SigningKey,
}

impl Signer {
    /// Wraps an existing signing key.
    #[must_use]
    pub const fn new(key: SigningKey) -> Self {
        Self { key }
    }

    /// Loads a P-256 private key from PEM.
    ///
    /// Accepts both SEC1 (`BEGIN EC PRIVATE KEY`) and PKCS#8
    /// (`BEGIN PRIVATE KEY`) documents.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::InvalidPrivateKey`] if the PEM is neither a
    /// valid SEC1 nor PKCS#8 P-256 key.
    pub fn from_pem(pem: &str) -> Result<Self, BridgeError> {
        if pem.contains("BEGIN EC PRIVATE KEY") {
            let secret = p256::SecretKey::from_sec1_pem(pem)
                .map_err(|e| BridgeError::InvalidPrivateKey(format!("sec1: {e}")))?;
            return Ok(Self::new(SigningKey::from(secret)));
        }
        let key = SigningKey::from_pkcs8_pem(pem)
            .map_err(|e| BridgeError::InvalidPrivateKey(format!("pkcs8: {e}")))?;
        Ok(Self::new(key))
    }

    /// Returns the public half of the signing key.
    #[must_use]
    pub fn verifying_key(&self) -> VerifyingKey {
        *self.key.verifying_key()
    }

    /// Encodes and signs a params object.
    ///
    /// The params are serialized in the caller's key order. Signatures are
    /// randomized, so signing the same params twice yields two different
    /// but equally valid signatures.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Serialization`] if the params cannot be
    /// serialized.
    pub fn sign(&self, params: &Map<String, Value>) -> Result<SignedMessage, BridgeError> {
        let json = serde_json::to_vec(params)?;
        let encoded_message = URL_SAFE_NO_PAD.encode(json);

        let digest = Sha256::new_with_prefix(encoded_message.as_bytes());
        let signature: Signature = self.key.sign_digest_with_rng(&mut OsRng, digest);
        let signature = URL_SAFE_NO_PAD.encode(signature.to_der().as_bytes());

        Ok(SignedMessage {
            encoded_message,
            signature,
        })
    }
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer").finish_non_exhaustive()
    }
}
