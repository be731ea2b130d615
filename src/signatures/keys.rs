//! Key generation and text encoding.
//!
//! Keys are ECDSA P-256. Private keys travel as PKCS#8, public keys as SPKI,
//! both encoded through the RFC 7468 PEM codec of the `pkcs8` / `spki`
//! crates. Exported text is the 64-column base64 body alone by default so it
//! matches previously exported key files; decoding accepts full PEM documents
//! as well as bare bodies.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use pkcs8::{DecodePrivateKey, EncodePrivateKey, LineEnding};
use rand_core::OsRng;
use sha2::{Digest, Sha256};
use signature::{Signer, Verifier};
use spki::{DecodePublicKey, EncodePublicKey};

use crate::config::DigiSignConfig;
use crate::error::{Error, Result};

const PEM_BOUNDARY: &str = "-----";

/// Sign-only P-256 private key.
#[derive(Clone)]
pub struct PrivateKey(SigningKey);

impl PrivateKey {
    /// Derive the matching public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey(*self.0.verifying_key())
    }

    /// Sign `message` with ECDSA/SHA-256, returning the raw `r || s` bytes.
    pub(crate) fn sign_raw(&self, message: &[u8]) -> Result<Vec<u8>> {
        let signature: Signature = self
            .0
            .try_sign(message)
            .map_err(|e| Error::Signing(e.to_string()))?;
        Ok(signature.to_bytes().to_vec())
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PrivateKey").field(&"[REDACTED]").finish()
    }
}

/// Verify-only P-256 public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicKey(VerifyingKey);

impl PublicKey {
    /// Check a raw `r || s` signature over `message`.
    ///
    /// A signature of the wrong length simply fails to verify.
    pub(crate) fn verify_raw(&self, message: &[u8], signature: &[u8]) -> bool {
        match Signature::from_slice(signature) {
            Ok(signature) => self.0.verify(message, &signature).is_ok(),
            Err(_) => false,
        }
    }

    /// Lowercase hex SHA-256 of the SPKI encoding.
    pub fn fingerprint(&self) -> Result<String> {
        let der = self
            .0
            .to_public_key_der()
            .map_err(|e| Error::KeyFormat(e.to_string()))?;
        let digest = Sha256::digest(der.as_bytes());
        Ok(digest.iter().map(|b| format!("{:02x}", b)).collect())
    }
}

/// A freshly generated signing keypair.
#[derive(Debug, Clone)]
pub struct KeyPair {
    /// Public half, safe to publish to a registry
    pub public_key: PublicKey,
    /// Private half, stays with the signer
    pub private_key: PrivateKey,
}

/// Generates keys and converts them to and from text.
#[derive(Debug, Clone, Default)]
pub struct KeyCodec {
    armored: bool,
}

impl KeyCodec {
    /// Create a codec producing header-less 64-column text.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a codec from configuration.
    pub fn with_config(config: &DigiSignConfig) -> Self {
        Self {
            armored: config.armored_keys,
        }
    }

    /// Generate a fresh P-256 keypair.
    pub fn generate() -> KeyPair {
        let signing_key = SigningKey::random(&mut OsRng);
        let public_key = PublicKey(*signing_key.verifying_key());
        KeyPair {
            public_key,
            private_key: PrivateKey(signing_key),
        }
    }

    /// Encode a private key as wrapped base64 PKCS#8.
    pub fn encode_private(&self, key: &PrivateKey) -> Result<String> {
        let pem = key
            .0
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| Error::KeyFormat(e.to_string()))?;
        Ok(self.finish(&pem))
    }

    /// Encode a public key as wrapped base64 SPKI.
    pub fn encode_public(&self, key: &PublicKey) -> Result<String> {
        let pem = key
            .0
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| Error::KeyFormat(e.to_string()))?;
        Ok(self.finish(&pem))
    }

    /// Decode a private key from PKCS#8 text, with or without armor.
    pub fn decode_private(text: &str) -> Result<PrivateKey> {
        let key = match armored(text) {
            Some(pem) => SigningKey::from_pkcs8_pem(pem),
            None => SigningKey::from_pkcs8_der(&decode_bare(text)?),
        };
        key.map(PrivateKey)
            .map_err(|e| Error::KeyFormat(format!("not a P-256 PKCS#8 private key: {}", e)))
    }

    /// Decode a public key from SPKI text, with or without armor.
    pub fn decode_public(text: &str) -> Result<PublicKey> {
        let key = match armored(text) {
            Some(pem) => VerifyingKey::from_public_key_pem(pem),
            None => VerifyingKey::from_public_key_der(&decode_bare(text)?),
        };
        key.map(PublicKey)
            .map_err(|e| Error::KeyFormat(format!("not a P-256 SPKI public key: {}", e)))
    }

    /// Keep the PEM document, or just its base64 body when armor is off.
    fn finish(&self, pem: &str) -> String {
        if self.armored {
            return pem.to_string();
        }
        pem.lines()
            .filter(|line| !line.starts_with(PEM_BOUNDARY))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// The PEM document in `text`, if it carries encapsulation boundaries.
fn armored(text: &str) -> Option<&str> {
    let text = text.trim();
    text.starts_with(PEM_BOUNDARY).then_some(text)
}

/// Base64-decode header-less key text, ignoring line breaks and indentation.
fn decode_bare(text: &str) -> Result<Vec<u8>> {
    let body: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if body.is_empty() {
        return Err(Error::KeyFormat("empty key text".to_string()));
    }

    STANDARD
        .decode(body.as_bytes())
        .map_err(|e| Error::KeyFormat(format!("invalid base64: {}", e)))
}
