//! Digital signature types and data structures.
//!
//! This module defines the embedded signature package and the structured
//! result returned by verification.

use serde::{Deserialize, Serialize};

/// Algorithm label written into every signature package.
pub const ALGORITHM: &str = "ECDSA-P256-SHA256";

/// Line that opens an embedded signature block.
pub const SIGNATURE_START: &str = "\n%DigiSign-Signature-Start\n";

/// Line that closes an embedded signature block.
pub const SIGNATURE_END: &str = "\n%DigiSign-Signature-End\n";

/// Package schema version understood by this crate.
pub const SCHEMA_VERSION: u32 = 1;

/// Signer metadata and signature appended to a signed document.
///
/// Field order matches the serialized JSON of previously signed documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignaturePackage {
    /// Base64 of the raw `r || s` signature
    pub signature: String,
    /// Base64 of the SHA-256 digest of the original content
    pub document_hash: String,
    /// Byte length of the original content
    pub original_size: u64,
    /// Signer's registry username
    pub username: String,
    /// Signing time, ISO-8601 UTC
    pub timestamp: String,
    /// Algorithm label, always [`ALGORITHM`] for packages produced here
    pub algorithm: String,
    /// Schema version; absent in legacy packages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
}

impl SignaturePackage {
    /// Signer-facing details of this package.
    pub fn details(&self) -> SignatureDetails {
        SignatureDetails {
            signer: self.username.clone(),
            timestamp: self.timestamp.clone(),
            algorithm: self.algorithm.clone(),
        }
    }

    /// Whether this crate understands the package schema.
    pub fn is_supported_version(&self) -> bool {
        matches!(self.version, None | Some(SCHEMA_VERSION))
    }
}

/// Signer metadata reported alongside a verification result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureDetails {
    /// Name of the signer
    pub signer: String,
    /// Signing time
    pub timestamp: String,
    /// Signature algorithm label
    pub algorithm: String,
}

/// Verification status of a signed document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VerificationStatus {
    /// Signature is valid and the document is unmodified
    Valid,
    /// No signature block was found
    NotSigned,
    /// The embedded signer is not the claimed signer
    IdentityMismatch,
    /// Content digest differs from the signed digest
    Modified,
    /// Claimed signer has no key in the registry
    UserNotFound,
    /// Signature does not verify under the signer's public key
    SignatureInvalid,
    /// Verification could not complete (malformed data, registry failure)
    Error,
}

impl VerificationStatus {
    /// Check if the status indicates a valid signature.
    pub fn is_valid(&self) -> bool {
        matches!(self, VerificationStatus::Valid)
    }
}

/// Result of signature verification.
///
/// Serializes as `{"isValid", "status", "message", "details"?}` so callers can
/// render it without further processing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    /// Whether the document is authentic and unmodified
    pub is_valid: bool,
    /// Which check decided the outcome
    pub status: VerificationStatus,
    /// Human-readable outcome
    pub message: String,
    /// Signer metadata, when a package was found and the failure is attributable to it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<SignatureDetails>,
}

impl VerificationResult {
    /// Build a result; `is_valid` follows from `status`.
    pub fn new(
        status: VerificationStatus,
        message: impl Into<String>,
        details: Option<SignatureDetails>,
    ) -> Self {
        Self {
            is_valid: status.is_valid(),
            status,
            message: message.into(),
            details,
        }
    }
}
