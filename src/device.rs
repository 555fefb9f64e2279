//! Best-effort device description embedded in issued credentials.
//!
//! The marker is context for support and debugging only. It is never
//! compared during verification and is not a security boundary — copying a
//! credential between machines is bounded by the token expiry, not by this.

use std::env;

/// Maximum marker length in characters.
const DEVICE_MARKER_MAX_LEN: usize = 64;

/// Returns a short description of the current device, truncated to 64
/// characters. Never fails; components that cannot be determined are simply
/// omitted, and an empty string is acceptable.
pub fn device_marker() -> String {
    let hostname = env::var("HOSTNAME")
        .or_else(|_| env::var("COMPUTERNAME"))
        .unwrap_or_default();

    let marker = format!("{} {} {}", env::consts::OS, env::consts::ARCH, hostname);
    truncate_chars(marker.trim(), DEVICE_MARKER_MAX_LEN)
}

/// Truncate on a character boundary, not a byte offset.
fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
