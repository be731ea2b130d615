//! Document signing implementation.
//!
//! This module handles the creation of detached signatures appended to documents.

use std::io::Read;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{SecondsFormat, Utc};
use sha2::{Digest, Sha256};

use super::keys::{KeyCodec, PrivateKey};
use super::types::{SignaturePackage, ALGORITHM, SIGNATURE_END, SIGNATURE_START};
use crate::error::{Error, Result};

/// Document signer that appends signature packages.
#[derive(Debug, Clone, Default)]
pub struct DocumentSigner {
    schema_version: Option<u32>,
}

impl DocumentSigner {
    /// Create a signer producing legacy (unversioned) packages.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp packages with an explicit schema version.
    pub fn with_schema_version(mut self, version: u32) -> Self {
        self.schema_version = Some(version);
        self
    }

    /// Sign a document and return the signed copy.
    ///
    /// This is the main signing method that:
    /// 1. Computes the SHA-256 digest of the document
    /// 2. Signs the digest with ECDSA/SHA-256 (which hashes the digest again)
    /// 3. Appends the serialized package between the signature sentinels
    pub fn sign(&self, original: &[u8], key: &PrivateKey, username: &str) -> Result<Vec<u8>> {
        let package = self.create_package(original, key, username)?;
        let json = serde_json::to_string(&package)
            .map_err(|e| Error::Signing(format!("cannot serialize signature package: {}", e)))?;

        let mut signed = Vec::with_capacity(
            original.len() + SIGNATURE_START.len() + json.len() + SIGNATURE_END.len(),
        );
        signed.extend_from_slice(original);
        signed.extend_from_slice(SIGNATURE_START.as_bytes());
        signed.extend_from_slice(json.as_bytes());
        signed.extend_from_slice(SIGNATURE_END.as_bytes());

        log::info!(
            "Signed {} bytes as '{}' ({} bytes with signature)",
            original.len(),
            username,
            signed.len()
        );
        Ok(signed)
    }

    /// Sign with a private key given as encoded text.
    pub fn sign_encoded(
        &self,
        original: &[u8],
        encoded_key: &str,
        username: &str,
    ) -> Result<Vec<u8>> {
        let key = KeyCodec::decode_private(encoded_key)
            .map_err(|e| Error::Signing(format!("cannot import private key: {}", e)))?;
        self.sign(original, &key, username)
    }

    /// Read a document to the end and sign it.
    pub fn sign_reader<R: Read>(
        &self,
        mut source: R,
        key: &PrivateKey,
        username: &str,
    ) -> Result<Vec<u8>> {
        let mut original = Vec::new();
        source
            .read_to_end(&mut original)
            .map_err(|e| Error::Signing(format!("cannot read document: {}", e)))?;
        self.sign(&original, key, username)
    }

    /// Build the signature package for a document without embedding it.
    pub fn create_package(
        &self,
        original: &[u8],
        key: &PrivateKey,
        username: &str,
    ) -> Result<SignaturePackage> {
        if username.is_empty() {
            return Err(Error::Signing("username must not be empty".to_string()));
        }

        let digest = compute_digest(original);
        let signature = key.sign_raw(&digest)?;

        Ok(SignaturePackage {
            signature: STANDARD.encode(signature),
            document_hash: STANDARD.encode(digest),
            original_size: original.len() as u64,
            username: username.to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            algorithm: ALGORITHM.to_string(),
            version: self.schema_version,
        })
    }
}

/// SHA-256 digest of the document content.
pub(crate) fn compute_digest(data: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().to_vec()
}
