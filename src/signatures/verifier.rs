//! Signed document verification.
//!
//! Verification never fails: every outcome, including malformed input and
//! registry failures, becomes a [`VerificationResult`] the caller can render
//! directly. Checks run in order and stop at the first failure:
//!
//! 1. a signature block is present
//! 2. the embedded signer is the claimed signer
//! 3. the content digest matches the signed digest
//! 4. the claimed signer is known to the registry
//! 5. the signature verifies under the registered public key
//!
//! The identity and integrity checks run before the registry is contacted.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::extractor::SignatureExtractor;
use super::keys::KeyCodec;
use super::signer::compute_digest;
use super::types::{SignaturePackage, VerificationResult, VerificationStatus};
use crate::error::{Error, Result};
use crate::registry::KeyRegistry;

/// Verifier for signed documents, resolving signers through a key registry.
#[derive(Debug, Clone)]
pub struct DocumentVerifier<R> {
    registry: R,
}

impl<R: KeyRegistry> DocumentVerifier<R> {
    /// Create a verifier backed by `registry`.
    pub fn new(registry: R) -> Self {
        Self { registry }
    }

    /// The registry used to resolve public keys.
    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Verify that `document` is unmodified and signed by `claimed_username`.
    pub async fn verify(&self, document: &[u8], claimed_username: &str) -> VerificationResult {
        let result = match self.try_verify(document, claimed_username).await {
            Ok(result) => result,
            Err(e) => {
                log::warn!("Verification for '{}' aborted: {}", claimed_username, e);
                VerificationResult::new(
                    VerificationStatus::Error,
                    format!("Verification failed: {}", e),
                    None,
                )
            },
        };

        log::info!(
            "Verification for '{}': {:?} ({})",
            claimed_username,
            result.status,
            result.message
        );
        result
    }

    async fn try_verify(
        &self,
        document: &[u8],
        claimed_username: &str,
    ) -> Result<VerificationResult> {
        let package = match SignatureExtractor::extract(document) {
            Some(package) => package,
            None => {
                return Ok(VerificationResult::new(
                    VerificationStatus::NotSigned,
                    "Document is not signed: no signature found",
                    None,
                ));
            },
        };
        let details = package.details();

        if !package.is_supported_version() {
            return Ok(VerificationResult::new(
                VerificationStatus::Error,
                format!(
                    "Verification failed: unsupported signature package version {}",
                    package.version.unwrap_or_default()
                ),
                Some(details),
            ));
        }

        if package.username != claimed_username {
            return Ok(VerificationResult::new(
                VerificationStatus::IdentityMismatch,
                format!(
                    "Signer mismatch: document was signed by '{}', not '{}'",
                    package.username, claimed_username
                ),
                Some(details),
            ));
        }

        let original = original_content(document, &package);
        let computed_hash = STANDARD.encode(compute_digest(original));
        if computed_hash != package.document_hash {
            log::debug!(
                "Digest mismatch over {} bytes: computed {}, signed {}",
                original.len(),
                computed_hash,
                package.document_hash
            );
            return Ok(VerificationResult::new(
                VerificationStatus::Modified,
                "Document has been modified after signing",
                Some(details),
            ));
        }

        let encoded_key = match self.registry.lookup(claimed_username).await? {
            Some(key) => key,
            None => {
                return Ok(VerificationResult::new(
                    VerificationStatus::UserNotFound,
                    format!("User '{}' not found in the key registry", claimed_username),
                    None,
                ));
            },
        };

        let public_key = KeyCodec::decode_public(&encoded_key)?;
        let signature = decode_field("signature", &package.signature)?;
        let signed_hash = decode_field("documentHash", &package.document_hash)?;

        if public_key.verify_raw(&signed_hash, &signature) {
            Ok(VerificationResult::new(
                VerificationStatus::Valid,
                format!(
                    "Signature is valid: document is authentic and unmodified since '{}' signed it",
                    package.username
                ),
                Some(details),
            ))
        } else {
            Ok(VerificationResult::new(
                VerificationStatus::SignatureInvalid,
                format!(
                    "Signature does not match the public key registered for '{}'",
                    claimed_username
                ),
                Some(details),
            ))
        }
    }
}

/// The signed region: the first `original_size` bytes, clamped to the document.
fn original_content<'a>(document: &'a [u8], package: &SignaturePackage) -> &'a [u8] {
    let size = usize::try_from(package.original_size).unwrap_or(usize::MAX);
    &document[..size.min(document.len())]
}

fn decode_field(name: &str, value: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(value)
        .map_err(|e| Error::MalformedPackage(format!("{} is not valid base64: {}", name, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::MemoryRegistry;
    use crate::signatures::keys::PublicKey;
    use crate::signatures::signer::DocumentSigner;
    use crate::signatures::types::{ALGORITHM, SIGNATURE_END, SIGNATURE_START};

    fn registry_with(username: &str, key: &PublicKey) -> MemoryRegistry {
        let registry = MemoryRegistry::new();
        registry
            .register(username, &KeyCodec::new().encode_public(key).unwrap())
            .unwrap();
        registry
    }

    /// Replace the embedded package with an edited copy.
    fn rewrite_package(signed: &[u8], edit: impl FnOnce(&mut SignaturePackage)) -> Vec<u8> {
        let mut package = SignatureExtractor::extract(signed).unwrap();
        edit(&mut package);
        let mut doc = SignatureExtractor::strip(signed).to_vec();
        doc.extend_from_slice(SIGNATURE_START.as_bytes());
        doc.extend_from_slice(serde_json::to_string(&package).unwrap().as_bytes());
        doc.extend_from_slice(SIGNATURE_END.as_bytes());
        doc
    }

    #[test]
    fn test_original_content_is_clamped() {
        let package = SignaturePackage {
            signature: String::new(),
            document_hash: String::new(),
            original_size: 100,
            username: "alice".to_string(),
            timestamp: String::new(),
            algorithm: ALGORITHM.to_string(),
            version: None,
        };
        assert_eq!(original_content(b"short", &package), b"short");
    }

    #[tokio::test]
    async fn test_valid_signature() {
        let pair = KeyCodec::generate();
        let signed = DocumentSigner::new()
            .sign(b"contract", &pair.private_key, "alice")
            .unwrap();
        let verifier = DocumentVerifier::new(registry_with("alice", &pair.public_key));

        let result = verifier.verify(&signed, "alice").await;
        assert!(result.is_valid);
        assert_eq!(result.status, VerificationStatus::Valid);
        let details = result.details.unwrap();
        assert_eq!(details.signer, "alice");
        assert_eq!(details.algorithm, ALGORITHM);
    }

    #[tokio::test]
    async fn test_wrong_key_is_signature_invalid() {
        let signer_pair = KeyCodec::generate();
        let other_pair = KeyCodec::generate();
        let signed = DocumentSigner::new()
            .sign(b"contract", &signer_pair.private_key, "alice")
            .unwrap();
        let verifier = DocumentVerifier::new(registry_with("alice", &other_pair.public_key));

        let result = verifier.verify(&signed, "alice").await;
        assert!(!result.is_valid);
        assert_eq!(result.status, VerificationStatus::SignatureInvalid);
        assert!(result.message.contains("does not match"));
        assert!(result.details.is_some());
    }

    #[tokio::test]
    async fn test_forged_hash_is_detected_as_modification() {
        let pair = KeyCodec::generate();
        let signed = DocumentSigner::new()
            .sign(b"contract", &pair.private_key, "alice")
            .unwrap();
        let forged = rewrite_package(&signed, |p| {
            p.document_hash = STANDARD.encode(compute_digest(b"other"));
        });
        let verifier = DocumentVerifier::new(registry_with("alice", &pair.public_key));

        let result = verifier.verify(&forged, "alice").await;
        assert_eq!(result.status, VerificationStatus::Modified);
    }

    #[tokio::test]
    async fn test_tampered_signature_bytes() {
        let pair = KeyCodec::generate();
        let signed = DocumentSigner::new()
            .sign(b"contract", &pair.private_key, "alice")
            .unwrap();
        let forged = rewrite_package(&signed, |p| {
            let mut sig = STANDARD.decode(&p.signature).unwrap();
            sig[10] ^= 0x01;
            p.signature = STANDARD.encode(sig);
        });
        let verifier = DocumentVerifier::new(registry_with("alice", &pair.public_key));

        let result = verifier.verify(&forged, "alice").await;
        assert_eq!(result.status, VerificationStatus::SignatureInvalid);
    }

    #[tokio::test]
    async fn test_short_signature_is_signature_invalid() {
        let pair = KeyCodec::generate();
        let signed = DocumentSigner::new()
            .sign(b"contract", &pair.private_key, "alice")
            .unwrap();
        let forged = rewrite_package(&signed, |p| p.signature = STANDARD.encode([1u8; 10]));
        let verifier = DocumentVerifier::new(registry_with("alice", &pair.public_key));

        let result = verifier.verify(&forged, "alice").await;
        assert_eq!(result.status, VerificationStatus::SignatureInvalid);
    }

    #[tokio::test]
    async fn test_malformed_signature_base64_is_error_result() {
        let pair = KeyCodec::generate();
        let signed = DocumentSigner::new()
            .sign(b"contract", &pair.private_key, "alice")
            .unwrap();
        let forged = rewrite_package(&signed, |p| p.signature = "***".to_string());
        let verifier = DocumentVerifier::new(registry_with("alice", &pair.public_key));

        let result = verifier.verify(&forged, "alice").await;
        assert!(!result.is_valid);
        assert_eq!(result.status, VerificationStatus::Error);
        assert!(result.message.starts_with("Verification failed:"));
        assert!(result.message.contains("signature is not valid base64"));
    }

    #[tokio::test]
    async fn test_malformed_registry_key_is_error_result() {
        let pair = KeyCodec::generate();
        let signed = DocumentSigner::new()
            .sign(b"contract", &pair.private_key, "alice")
            .unwrap();
        let registry = MemoryRegistry::new();
        registry.register("alice", "garbage!").unwrap();

        let result = DocumentVerifier::new(registry).verify(&signed, "alice").await;
        assert_eq!(result.status, VerificationStatus::Error);
        assert!(result.message.contains("Invalid key format"));
        assert!(result.details.is_none());
    }

    #[tokio::test]
    async fn test_unsupported_version() {
        let pair = KeyCodec::generate();
        let signed = DocumentSigner::new()
            .with_schema_version(2)
            .sign(b"contract", &pair.private_key, "alice")
            .unwrap();
        let registry = registry_with("alice", &pair.public_key);
        let verifier = DocumentVerifier::new(&registry);

        let result = verifier.verify(&signed, "alice").await;
        assert_eq!(result.status, VerificationStatus::Error);
        assert_eq!(
            result.message,
            "Verification failed: unsupported signature package version 2"
        );
        assert_eq!(registry.lookup_count(), 0);
    }

    #[tokio::test]
    async fn test_versioned_package_verifies() {
        let pair = KeyCodec::generate();
        let signed = DocumentSigner::new()
            .with_schema_version(1)
            .sign(b"contract", &pair.private_key, "alice")
            .unwrap();
        let verifier = DocumentVerifier::new(registry_with("alice", &pair.public_key));
        assert!(verifier.verify(&signed, "alice").await.is_valid);
    }
}
