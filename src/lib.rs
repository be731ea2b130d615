// Allow unused for tests
#![cfg_attr(test, allow(dead_code))]

//! # DigiSign
//!
//! Tamper-evident document signing in Rust: append a detached ECDSA P-256
//! signature to any document, then verify integrity and signer identity
//! against a registry of public keys.
//!
//! ## Core Features
//!
//! - **Key Encoding**: P-256 keypairs exported as base64 PKCS#8 / SPKI text
//! - **Signing**: SHA-256 digest of the document, signed and embedded as JSON
//!   between fixed sentinel lines after the unmodified content
//! - **Extraction**: Locate and parse the embedded signature package
//! - **Verification**: Structured results for every outcome; verification
//!   never returns an error to the caller
//! - **Registries**: In-memory and directory-backed public key registries
//!
//! ## Quick Start
//!
//! ```ignore
//! use digisign::registry::MemoryRegistry;
//! use digisign::signatures::{DocumentSigner, DocumentVerifier, KeyCodec};
//!
//! # async fn run() -> digisign::Result<()> {
//! let pair = KeyCodec::generate();
//! let registry = MemoryRegistry::new();
//! registry.register("alice", &KeyCodec::new().encode_public(&pair.public_key)?)?;
//!
//! let signed = DocumentSigner::new().sign(b"report", &pair.private_key, "alice")?;
//! let result = DocumentVerifier::new(&registry).verify(&signed, "alice").await;
//! println!("{}", result.message);
//! # Ok(())
//! # }
//! ```
//!
//! ## License
//!
//! Licensed under either of:
//!
//! * Apache License, Version 2.0 ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
//! * MIT license ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)
//!
//! at your option.

#![warn(missing_docs)]

// Error handling
pub mod error;

// Configuration
pub mod config;

// Key registries
pub mod registry;

// Digital signatures
pub mod signatures;

pub use config::DigiSignConfig;
pub use error::{Error, Result};
pub use registry::{DirectoryRegistry, KeyRegistry, MemoryRegistry};
pub use signatures::{
    DocumentSigner, DocumentVerifier, KeyCodec, KeyPair, PrivateKey, PublicKey, SignatureExtractor,
    SignaturePackage, VerificationResult, VerificationStatus,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = "digisign";
