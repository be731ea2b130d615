//! Document digital signatures module.
//!
//! This module provides functionality for signing arbitrary documents with a
//! detached ECDSA P-256 signature appended to the content, and for verifying
//! such documents against a registry of signers' public keys.
//!
//! ## Features
//!
//! - **Key Handling**: Generate P-256 keypairs, export/import PKCS#8 and SPKI text
//! - **Signature Creation**: Append a signed package to any byte sequence
//! - **Signature Extraction**: Locate the package in a signed document
//! - **Signature Verification**: Integrity, identity, and cryptographic checks
//!
//! ## Example
//!
//! ```ignore
//! use digisign::registry::MemoryRegistry;
//! use digisign::signatures::{DocumentSigner, DocumentVerifier, KeyCodec};
//!
//! let pair = KeyCodec::generate();
//! let registry = MemoryRegistry::new();
//! registry.register("alice", &KeyCodec::new().encode_public(&pair.public_key)?)?;
//!
//! let signed = DocumentSigner::new().sign(b"contract", &pair.private_key, "alice")?;
//! let result = DocumentVerifier::new(&registry).verify(&signed, "alice").await;
//! assert!(result.is_valid);
//! ```
//!
//! ## Signed Document Layout
//!
//! ```text
//! <original bytes>\n%DigiSign-Signature-Start\n<package JSON>\n%DigiSign-Signature-End\n
//! ```
//!
//! The signature covers `SHA-256(document)` passed as the message to
//! ECDSA/SHA-256, so the curve operation signs the digest of the digest.

mod extractor;
mod keys;
mod signer;
mod types;
mod verifier;

pub use extractor::SignatureExtractor;
pub use keys::{KeyCodec, KeyPair, PrivateKey, PublicKey};
pub use signer::DocumentSigner;
pub use types::{
    SignatureDetails, SignaturePackage, VerificationResult, VerificationStatus, ALGORITHM,
    SCHEMA_VERSION, SIGNATURE_END, SIGNATURE_START,
};
pub use verifier::DocumentVerifier;
