//! Integration tests for the directory-backed key registry.

use digisign::registry::{DirectoryRegistry, KeyRegistry};
use digisign::signatures::{DocumentSigner, DocumentVerifier, KeyCodec, VerificationStatus};
use digisign::Error;
use std::fs;
use tempfile::tempdir;

#[tokio::test]
async fn test_register_and_lookup() {
    let dir = tempdir().unwrap();
    let registry = DirectoryRegistry::new(dir.path().join("registry"));

    registry.register("alice", "KEYTEXT").unwrap();

    assert_eq!(registry.lookup("alice").await.unwrap(), Some("KEYTEXT".to_string()));
    assert_eq!(registry.lookup("bob").await.unwrap(), None);
    assert!(dir.path().join("registry").join("alice.pub").exists());
}

#[test]
fn test_duplicate_registration_is_rejected() {
    let dir = tempdir().unwrap();
    let registry = DirectoryRegistry::new(dir.path());

    registry.register("alice", "FIRST").unwrap();
    let err = registry.register("alice", "SECOND").unwrap_err();
    assert!(matches!(err, Error::UsernameTaken(_)));

    let stored = fs::read_to_string(dir.path().join("alice.pub")).unwrap();
    assert_eq!(stored, "FIRST");
}

#[test]
fn test_registration_leaves_only_complete_key_files() {
    let dir = tempdir().unwrap();
    let registry = DirectoryRegistry::new(dir.path());
    let key = "A".repeat(64 * 1024);

    registry.register("alice", &key).unwrap();
    assert!(registry.register("alice", "SECOND").is_err());
    registry.register("bob", "BOBKEY").unwrap();

    let mut names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["alice.pub", "bob.pub"]);
    assert_eq!(fs::read_to_string(dir.path().join("alice.pub")).unwrap(), key);
}

#[test]
fn test_failed_registration_leaves_no_entry() {
    let dir = tempdir().unwrap();
    // The registry root is a plain file, so nothing can be staged inside it.
    let root = dir.path().join("not-a-dir");
    fs::write(&root, "").unwrap();
    let registry = DirectoryRegistry::new(&root);

    assert!(matches!(registry.register("alice", "KEY"), Err(Error::Io(_))));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[tokio::test]
async fn test_path_like_usernames() {
    let dir = tempdir().unwrap();
    let registry = DirectoryRegistry::new(dir.path());

    let err = registry.register("../escape", "KEY").unwrap_err();
    assert!(matches!(err, Error::InvalidUsername(_)));
    assert_eq!(registry.lookup("../escape").await.unwrap(), None);
    assert_eq!(registry.lookup("").await.unwrap(), None);
}

#[tokio::test]
async fn test_unreadable_entry_is_transport_failure() {
    let dir = tempdir().unwrap();
    let registry = DirectoryRegistry::new(dir.path());

    // A directory where the key file should be cannot be read as text.
    fs::create_dir(dir.path().join("alice.pub")).unwrap();
    let err = registry.lookup("alice").await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
}

#[tokio::test]
async fn test_verify_against_directory_registry() {
    let dir = tempdir().unwrap();
    let registry = DirectoryRegistry::new(dir.path());
    let pair = KeyCodec::generate();
    registry
        .register("alice", &KeyCodec::new().encode_public(&pair.public_key).unwrap())
        .unwrap();

    let signed = DocumentSigner::new()
        .sign(b"minutes of the meeting", &pair.private_key, "alice")
        .unwrap();

    let verifier = DocumentVerifier::new(registry);
    let result = verifier.verify(&signed, "alice").await;
    assert!(result.is_valid, "unexpected result: {:?}", result);

    let result = verifier.verify(&signed, "carol").await;
    assert_eq!(result.status, VerificationStatus::IdentityMismatch);
}

#[tokio::test]
async fn test_verify_with_unregistered_signer() {
    let dir = tempdir().unwrap();
    let pair = KeyCodec::generate();
    let signed = DocumentSigner::new()
        .sign(b"minutes", &pair.private_key, "dave")
        .unwrap();

    let result = DocumentVerifier::new(DirectoryRegistry::new(dir.path()))
        .verify(&signed, "dave")
        .await;
    assert_eq!(result.status, VerificationStatus::UserNotFound);
}
