//! Signed, expiring activation credentials.
//!
//! A credential is a JSON payload, an HMAC-SHA256 signature over the exact
//! serialized payload bytes, and an outer base64(JSON) envelope holding both.
//! The signing key is the shared salt embedded in the binary; see the crate
//! docs for what that does and does not protect against.
//!
//! Verification is fail-closed: any malformed, truncated, or tampered input
//! comes back as `false`, never as an error. "Not entitled" and "tampered"
//! are indistinguishable on purpose.

use std::fmt;

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use chrono::Utc;
use ring::hmac;
use serde::{Deserialize, Serialize};

use crate::device::device_marker;
use crate::errors::{ActivationError, ActivationResult};
use crate::ACTIVATION_SALT;

/// How long an issued credential stays valid: 30 days, in milliseconds.
pub const TOKEN_TTL_MS: i64 = 1000 * 60 * 60 * 24 * 30;

/// Maximum device-marker length carried in a payload, in characters.
const DEVICE_FIELD_MAX_LEN: usize = 64;

/// Credential status. Only one value exists today; the field is on the wire
/// so it stays an enum rather than an implied constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialStatus {
    Active,
}

/// The signed payload. Field order is the canonical wire order — the
/// signature covers the serialized bytes, so reordering fields breaks
/// verification of previously issued tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialPayload {
    /// Always `active` for tokens this crate issues.
    pub status: CredentialStatus,
    /// Issue time, milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Best-effort device description, at most 64 characters.
    pub device: String,
    /// Expiry, milliseconds since the Unix epoch. `timestamp + TOKEN_TTL_MS`.
    pub exp: i64,
}

/// Outer envelope: the payload exactly as signed, plus the signature.
#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    payload: String,
    signature: String,
}

/// An issued credential in its stored form. Opaque to everything but
/// [`verify`]; persistence treats it as a plain string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedCredential(String);

impl SignedCredential {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SignedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// HMAC-SHA256 over the serialized payload, base64-encoded.
fn sign_payload(payload: &str) -> String {
    let key = hmac::Key::new(hmac::HMAC_SHA256, ACTIVATION_SALT.as_bytes());
    B64.encode(hmac::sign(&key, payload.as_bytes()))
}

/// Mint a credential valid from now for [`TOKEN_TTL_MS`].
pub fn issue() -> ActivationResult<SignedCredential> {
    issue_at(now_ms(), device_marker())
}

/// Deterministic core of [`issue`]: mint a credential for a given clock
/// reading and device marker.
pub fn issue_at(now_ms: i64, device: String) -> ActivationResult<SignedCredential> {
    let device: String = device.chars().take(DEVICE_FIELD_MAX_LEN).collect();

    let payload = CredentialPayload {
        status: CredentialStatus::Active,
        timestamp: now_ms,
        device,
        exp: now_ms + TOKEN_TTL_MS,
    };

    let payload_json = serde_json::to_string(&payload)
        .map_err(|e| ActivationError::Signing(format!("payload serialization failed: {e}")))?;
    let signature = sign_payload(&payload_json);

    let envelope = serde_json::to_string(&Envelope {
        payload: payload_json,
        signature,
    })
    .map_err(|e| ActivationError::Signing(format!("envelope serialization failed: {e}")))?;

    Ok(SignedCredential(B64.encode(envelope)))
}

/// Verify a stored credential against the current clock. `None` means no
/// credential is stored and is simply not valid.
pub fn verify(credential: Option<&str>) -> bool {
    match credential {
        Some(c) => verify_at(c, now_ms()),
        None => false,
    }
}

/// Pure verification against an explicit clock reading. Safe to call
/// repeatedly; has no side effects and never panics on hostile input.
pub fn verify_at(credential: &str, now_ms: i64) -> bool {
    if credential.is_empty() {
        return false;
    }

    let decoded = match B64.decode(credential) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };

    let envelope: Envelope = match serde_json::from_slice(&decoded) {
        Ok(e) => e,
        Err(_) => return false,
    };

    // Signature first: the payload is only trusted once the HMAC matches.
    if sign_payload(&envelope.payload) != envelope.signature {
        return false;
    }

    let payload: serde_json::Value = match serde_json::from_str(&envelope.payload) {
        Ok(v) => v,
        Err(_) => return false,
    };

    // A missing or non-numeric expiry is invalid, never "no expiry".
    match payload.get("exp").and_then(serde_json::Value::as_i64) {
        Some(exp) => exp > now_ms,
        None => false,
    }
}
