//! End-to-end tests for the activation orchestrator against a file-backed
//! store in a scratch directory. Tests share the directory, so they run
//! serially and each starts from a clean slate.

use std::path::PathBuf;
use std::time::Duration;

use serial_test::serial;

use activation::activation::{EntitlementState, ProActivation};
use activation::storage::CredentialStore;
use activation::token;

fn test_dir() -> PathBuf {
    std::env::temp_dir().join("profitcalc-activation-tests")
}

/// Remove any state left behind by a previous test and return a file-only
/// store rooted in the scratch directory.
async fn fresh_store() -> CredentialStore {
    let dir = test_dir();
    let _ = tokio::fs::remove_dir_all(&dir).await;
    CredentialStore::file_only(dir)
}

#[tokio::test]
#[serial]
async fn state_is_unverified_before_init() {
    let activation = ProActivation::new(fresh_store().await);
    assert_eq!(activation.state(), EntitlementState::Unverified);
    assert!(!activation.is_entitled());
}

#[tokio::test]
#[serial]
async fn init_without_credential_is_not_entitled() {
    let activation = ProActivation::new(fresh_store().await);
    activation.init().await;
    assert_eq!(activation.state(), EntitlementState::NotEntitled);
    assert!(!activation.is_entitled());
}

#[tokio::test]
#[serial]
async fn pro2024_activates_end_to_end() {
    let store = fresh_store().await;
    let activation = ProActivation::new(store.clone());
    activation.init().await;

    let before = token::now_ms();
    assert!(activation.submit_code("PRO2024").await.unwrap());
    let after = token::now_ms();

    assert!(activation.is_entitled());

    let stored = store.load().await.expect("credential should be persisted");
    assert!(token::verify(Some(&stored)));
    // The credential dies once the clock passes issue time + TTL.
    assert!(!token::verify_at(&stored, after + token::TOKEN_TTL_MS + 1));
    assert!(token::verify_at(&stored, before + 1));
}

#[tokio::test]
#[serial]
async fn unknown_codes_are_rejected() {
    let store = fresh_store().await;
    let activation = ProActivation::new(store.clone());
    activation.init().await;

    for code in ["", "   ", "WRONG", "PRO 2024", "PRO2025"] {
        assert!(
            !activation.submit_code(code).await.unwrap(),
            "code should not activate: {code:?}"
        );
        assert!(!activation.is_entitled());
    }

    assert_eq!(store.load().await, None, "nothing should have been persisted");
}

#[tokio::test]
#[serial]
async fn codes_match_regardless_of_case_and_surrounding_whitespace() {
    let activation = ProActivation::new(fresh_store().await);
    activation.init().await;

    assert!(activation.submit_code(" pro2024 ").await.unwrap());
    assert!(activation.is_entitled());
}

#[tokio::test]
#[serial]
async fn valid_stored_credential_entitles_on_startup() {
    let store = fresh_store().await;
    let credential = token::issue().unwrap();
    store.save(credential.as_str()).await.unwrap();

    let activation = ProActivation::new(store);
    activation.init().await;
    assert!(activation.is_entitled());
}

#[tokio::test]
#[serial]
async fn garbage_stored_credential_is_cleared_on_startup() {
    let store = fresh_store().await;
    store.save("definitely-not-a-credential").await.unwrap();

    let activation = ProActivation::new(store.clone());
    activation.init().await;

    assert!(!activation.is_entitled());
    assert_eq!(store.load().await, None, "invalid credential should be cleared");
}

#[tokio::test]
#[serial]
async fn expired_stored_credential_is_cleared_on_startup() {
    let store = fresh_store().await;
    let expired = token::issue_at(
        token::now_ms() - token::TOKEN_TTL_MS - 1000,
        "old-device".to_string(),
    )
    .unwrap();
    store.save(expired.as_str()).await.unwrap();

    let activation = ProActivation::new(store.clone());
    activation.init().await;

    assert!(!activation.is_entitled());
    assert_eq!(store.load().await, None, "expired credential should be cleared");
}

#[tokio::test]
#[serial]
async fn reissuing_fully_replaces_the_stored_credential() {
    let store = fresh_store().await;
    let activation = ProActivation::new(store.clone());
    activation.init().await;

    assert!(activation.submit_code("PRO2024").await.unwrap());
    let first = store.load().await.unwrap();

    tokio::time::sleep(Duration::from_millis(5)).await;

    assert!(activation.submit_code("VIP888").await.unwrap());
    let second = store.load().await.unwrap();

    assert_ne!(first, second);
    // The first envelope stays valid on its own terms; replacement only
    // changes what is stored, it does not revoke anything.
    assert!(token::verify(Some(&first)));
    assert!(token::verify(Some(&second)));
}

#[tokio::test]
#[serial]
async fn rejected_code_leaves_existing_entitlement_alone() {
    let store = fresh_store().await;
    let activation = ProActivation::new(store.clone());
    activation.init().await;

    assert!(activation.submit_code("STARTUP").await.unwrap());
    let stored = store.load().await.unwrap();

    assert!(!activation.submit_code("WRONG").await.unwrap());
    assert!(activation.is_entitled());
    assert_eq!(store.load().await.as_deref(), Some(stored.as_str()));
}

#[tokio::test]
#[serial]
async fn shutdown_discards_a_completing_issuance() {
    let activation = ProActivation::new(fresh_store().await);
    activation.init().await;
    activation.shutdown();

    // The issuance itself succeeds, but the torn-down handle is not updated.
    assert!(activation.submit_code("PRO2024").await.unwrap());
    assert!(!activation.is_entitled());
}

#[tokio::test]
#[serial]
async fn concurrent_submissions_serialize() {
    let store = fresh_store().await;
    let activation = ProActivation::new(store.clone());
    activation.init().await;

    let (a, b) = tokio::join!(
        activation.submit_code("PRO2024"),
        activation.submit_code("VIP888")
    );

    assert!(a.unwrap());
    assert!(b.unwrap());
    assert!(activation.is_entitled());

    // Whichever issuance won the race last, storage holds one coherent,
    // verifiable credential.
    let stored = store.load().await.unwrap();
    assert!(token::verify(Some(&stored)));
}
