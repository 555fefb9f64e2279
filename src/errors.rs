//! Error types for the activation subsystem.
//!
//! The taxonomy is intentionally small. A code that fails to digest is simply
//! a code that matches nothing, and a credential that fails to verify is
//! simply not valid — neither is an error the caller can act on, so neither
//! is represented here. What remains is the two paths that genuinely need to
//! surface: the signing primitive failing, and persistence failing.

use thiserror::Error;

pub type ActivationResult<T> = Result<T, ActivationError>;

#[derive(Debug, Error)]
pub enum ActivationError {
    /// The signing primitive failed while minting a credential.
    /// Surfaced to the caller of `submit_code` as a failed activation.
    #[error("signing failed: {0}")]
    Signing(String),

    /// Credential persistence failed. Read failures are never reported
    /// through this variant (an unreadable credential is an absent one);
    /// only write failures reach the caller.
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
}
