//! Activation orchestration.
//!
//! [`ProActivation`] is the single owner of the entitlement state. The
//! application root constructs one at startup, calls [`ProActivation::init`]
//! once, and reads [`ProActivation::is_entitled`] from then on. There is
//! exactly one writer (this type) over exactly one mutable resource (the
//! stored credential), so issuance is serialized with a single async mutex
//! and state reads stay lock-free.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use tokio::sync::Mutex;

use crate::digest::{digest_code, is_reference_digest};
use crate::errors::ActivationResult;
use crate::storage::CredentialStore;
use crate::token;

/// Entitlement as seen by the rest of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EntitlementState {
    /// Startup verification has not completed yet.
    Unverified = 0,
    NotEntitled = 1,
    Entitled = 2,
}

impl EntitlementState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => EntitlementState::Unverified,
            1 => EntitlementState::NotEntitled,
            _ => EntitlementState::Entitled,
        }
    }
}

/// Owner of the entitlement state and the stored credential.
pub struct ProActivation {
    store: CredentialStore,
    state: AtomicU8,
    /// Cleared by [`ProActivation::shutdown`]. An issuance that completes
    /// after shutdown is discarded instead of mutating state for a consumer
    /// that no longer exists.
    alive: AtomicBool,
    /// Serializes issuance: at most one in-flight `submit_code` wins, and a
    /// new credential always fully replaces the previous one in storage.
    issue_lock: Mutex<()>,
}

impl ProActivation {
    pub fn new(store: CredentialStore) -> Self {
        Self {
            store,
            state: AtomicU8::new(EntitlementState::Unverified as u8),
            alive: AtomicBool::new(true),
            issue_lock: Mutex::new(()),
        }
    }

    /// Startup pass: load the persisted credential and verify it. An
    /// invalid or expired credential is cleared from storage so it is not
    /// re-checked on every launch.
    pub async fn init(&self) {
        let stored = self.store.load().await;

        if token::verify(stored.as_deref()) {
            log::debug!("Stored credential verified, pro features enabled");
            self.set_state(EntitlementState::Entitled);
        } else {
            if stored.is_some() {
                log::info!("Stored credential invalid or expired, clearing");
                self.store.clear().await;
            }
            self.set_state(EntitlementState::NotEntitled);
        }
    }

    pub fn state(&self) -> EntitlementState {
        EntitlementState::from_u8(self.state.load(Ordering::SeqCst))
    }

    pub fn is_entitled(&self) -> bool {
        self.state() == EntitlementState::Entitled
    }

    /// Submit an activation code.
    ///
    /// Returns `Ok(true)` when the code matched and a credential was issued,
    /// `Ok(false)` when it did not match. Any number of attempts is allowed;
    /// there is no lockout. A signing failure surfaces as an error and the
    /// user may simply retry.
    ///
    /// A persistence failure after successful signing is downgraded to a
    /// warning: the session stays entitled, but the credential will not
    /// survive a restart.
    pub async fn submit_code(&self, code: &str) -> ActivationResult<bool> {
        let _issuing = self.issue_lock.lock().await;

        let digest = digest_code(code);
        if !is_reference_digest(&digest) {
            log::debug!("Activation code did not match the reference set");
            return Ok(false);
        }

        let credential = token::issue()?;

        if let Err(e) = self.store.save(credential.as_str()).await {
            log::warn!("Credential issued but not persisted, entitlement is session-only: {e}");
        }

        self.set_state(EntitlementState::Entitled);
        Ok(true)
    }

    /// Mark this handle as torn down. An issuance already in flight may
    /// still complete, but its result is discarded; the user can resubmit
    /// against a fresh handle.
    pub fn shutdown(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    fn set_state(&self, next: EntitlementState) {
        if self.alive.load(Ordering::SeqCst) {
            self.state.store(next as u8, Ordering::SeqCst);
        }
    }
}
