//! Legacy activation-code digest.
//!
//! Activation codes are never shipped in cleartext. Instead the binary embeds
//! a digest per valid code, and a submitted code is digested with the same
//! transform and checked for membership.
//!
//! The transform is deliberately weak (reverse + fixed suffix + base64) and
//! is a wire-compatibility contract with the embedded reference table: the
//! trim/uppercase/reverse/suffix order must be preserved bit-for-bit or
//! previously valid codes stop matching. Do not replace it with a real hash.

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;

use crate::ACTIVATION_SALT;

/// Digests embedded at build time, one per valid activation code.
pub const REFERENCE_DIGESTS: [&str; 6] = [
    "NDIwMk9SUF9QUk9GSVRfU0VDVVJFXzIwMjQ=",
    "ODg4UElWX1BST0ZJVF9TRUNVUkVfMjAyNA==",
    "TklNREFfUFJPRklUX1NFQ1VSRV8yMDI0",
    "MDVFTEFTX1BST0ZJVF9TRUNVUkVfMjAyNA==",
    "UFVUUkFUU19QUk9GSVRfU0VDVVJFXzIwMjQ=",
    "WEFNVElGT1JQX1BST0ZJVF9TRUNVUkVfMjAyNA==",
];

/// Digest a user-entered activation code for comparison against
/// [`REFERENCE_DIGESTS`].
///
/// Algorithm: trim surrounding whitespace, uppercase, reverse the character
/// sequence, append the fixed salt, base64-encode. Case- and surrounding-
/// whitespace-insensitive by construction. Every step is total, so this
/// never fails; a code that matches nothing just produces a digest outside
/// the reference set.
pub fn digest_code(code: &str) -> String {
    let reversed: String = code.trim().to_uppercase().chars().rev().collect();
    B64.encode(format!("{reversed}{ACTIVATION_SALT}"))
}

/// Check a digest for membership in the embedded reference table.
pub fn is_reference_digest(digest: &str) -> bool {
    REFERENCE_DIGESTS.contains(&digest)
}
