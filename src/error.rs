//! Error types for the signing library.
//!
//! Signing and key handling propagate these errors to the caller. Verification
//! never does: it folds every failure into a [`VerificationResult`].
//!
//! [`VerificationResult`]: crate::signatures::VerificationResult

/// Result type alias for signing library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while handling keys, signing, or talking to a registry.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Key text is not valid base64 or not a P-256 PKCS#8/SPKI container
    #[error("Invalid key format: {0}")]
    KeyFormat(String),

    /// Signature generation failed
    #[error("Signing failed: {0}")]
    Signing(String),

    /// Signature package fields cannot be decoded
    #[error("Malformed signature package: {0}")]
    MalformedPackage(String),

    /// Key registry unreachable or returned an unusable response
    #[error("Registry transport failure: {0}")]
    Transport(String),

    /// Username already has a key of record
    #[error("Username already registered: {0}")]
    UsernameTaken(String),

    /// Username cannot be stored by the registry
    #[error("Invalid username: {0:?}")]
    InvalidUsername(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
