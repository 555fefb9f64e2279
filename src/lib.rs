//! Offline pro-tier activation for the ProfitCalc desktop app.
//!
//! A user enters an activation code. The code is digested with a legacy
//! transform and compared against a table of digests embedded in the binary;
//! on a match, a signed, expiring credential is minted and stored locally.
//! Every subsequent startup re-verifies the stored credential without any
//! server round-trip.
//!
//! ## Security Model
//!
//! Everything here runs on the user's machine, including the signing key, so
//! the only claim this crate makes is **casual tamper resistance**:
//!
//! A user cannot:
//! - Flip a byte in the stored credential (HMAC check fails)
//! - Edit the payload to extend the expiry (HMAC check fails)
//! - Keep a copied credential alive forever (tokens expire after 30 days)
//!
//! A user with a disassembler and some patience can:
//! - Recover the embedded key and forge credentials
//!
//! That asymmetry is accepted and deliberate. Do not "harden" this scheme:
//! the digest transform and the token wire format are compatibility contracts
//! with already-distributed reference data and stored tokens.

pub mod activation;
pub mod device;
pub mod digest;
pub mod errors;
pub mod storage;
pub mod token;

/// Shared salt. Doubles as the digest suffix and the HMAC signing key.
/// Ships inside the client binary, so it is not a secret.
pub(crate) const ACTIVATION_SALT: &str = "_PROFIT_SECURE_2024";
