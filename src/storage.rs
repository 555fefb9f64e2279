//! Credential persistence.
//!
//! The stored credential is a single opaque string. This module tries the OS
//! keyring first and falls back to a file in the app data directory:
//!
//! - Windows: `%APPDATA%\profitcalc\`
//! - macOS: `~/Library/Application Support/profitcalc/`
//! - Linux: `~/.local/share/profitcalc/`
//!
//! Read failures of any kind are reported as an absent credential — the
//! verifier fails closed, so an unreadable token and no token are the same
//! outcome. Write failures are real errors: the caller must not silently
//! believe a credential was persisted when it was not.

use std::io::ErrorKind;
use std::path::PathBuf;

use tokio::fs;

use crate::errors::ActivationResult;

/// Storage key for the activation credential. Used verbatim as the keyring
/// entry name and the fallback file name; existing installs depend on it.
pub const STORAGE_KEY: &str = "profitcalc_secure_token_v1";

/// Service name for keyring storage.
const KEYRING_SERVICE: &str = "profitcalc";

/// Handle to the credential's storage location.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    dir: Option<PathBuf>,
    use_keyring: bool,
}

impl CredentialStore {
    /// Default store: keyring first, app data directory as fallback.
    pub fn new() -> Self {
        Self {
            dir: dirs::data_dir().map(|p| p.join("profitcalc")),
            use_keyring: true,
        }
    }

    /// File-only store rooted at an explicit directory. Used by tests and
    /// portable installs where the keyring is unavailable or unwanted.
    pub fn file_only(dir: PathBuf) -> Self {
        Self {
            dir: Some(dir),
            use_keyring: false,
        }
    }

    fn file_path(&self) -> Option<PathBuf> {
        self.dir.as_ref().map(|dir| dir.join(STORAGE_KEY))
    }

    /// Load the stored credential, or `None` if absent or unreadable.
    pub async fn load(&self) -> Option<String> {
        if self.use_keyring {
            match load_from_keyring() {
                Ok(data) => {
                    log::debug!("Loaded credential from keyring");
                    return Some(data);
                }
                Err(e) => {
                    log::debug!("Keyring load failed: {e}");
                }
            }
        }

        let path = self.file_path()?;
        match fs::read_to_string(&path).await {
            Ok(data) => {
                log::debug!("Loaded credential from {}", path.display());
                Some(data)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                log::debug!("Credential file load failed: {e}");
                None
            }
        }
    }

    /// Persist a credential, replacing whatever was stored before.
    ///
    /// Tries the keyring first and verifies the save by reading it back;
    /// falls back to file storage otherwise.
    pub async fn save(&self, credential: &str) -> ActivationResult<()> {
        if self.use_keyring {
            match save_to_keyring(credential) {
                Ok(()) => {
                    if read_back_matches(load_from_keyring(), credential) {
                        log::debug!("Saved credential to keyring");
                        return Ok(());
                    }
                    log::debug!("Keyring save verification failed, falling back to file");
                }
                Err(e) => {
                    log::debug!("Keyring save failed: {e}, falling back to file");
                }
            }
        }

        let dir = self.dir.clone().ok_or_else(|| {
            std::io::Error::new(
                ErrorKind::NotFound,
                "could not determine app data directory",
            )
        })?;

        fs::create_dir_all(&dir).await?;
        let path = dir.join(STORAGE_KEY);
        fs::write(&path, credential).await?;
        log::debug!("Saved credential to {}", path.display());
        Ok(())
    }

    /// Remove any stored credential. Best effort; an already-absent
    /// credential is not an error.
    pub async fn clear(&self) {
        if self.use_keyring {
            if let Err(e) = clear_from_keyring() {
                log::debug!("Keyring clear failed: {e}");
            }
        }

        if let Some(path) = self.file_path() {
            match fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => log::debug!("Credential file clear failed: {e}"),
            }
        }
    }
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Check a keyring read-back against the credential that was just saved.
/// A load error counts as a mismatch; the error itself is never compared.
fn read_back_matches(loaded: Result<String, keyring::Error>, credential: &str) -> bool {
    loaded.is_ok_and(|stored| stored == credential)
}

// === Keyring Operations ===

fn save_to_keyring(data: &str) -> Result<(), keyring::Error> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, STORAGE_KEY)?;
    entry.set_password(data)
}

fn load_from_keyring() -> Result<String, keyring::Error> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, STORAGE_KEY)?;
    entry.get_password()
}

fn clear_from_keyring() -> Result<(), keyring::Error> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, STORAGE_KEY)?;
    entry.delete_credential()
}
