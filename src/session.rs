use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// The identity persisted across runs. Absence of the session file
/// means unauthenticated; the password is never stored locally.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredUser {
    pub id: i64,
    pub username: String,
    pub email: String,
}

/// File-backed session storage with explicit init (load at startup)
/// and teardown (clear on logout). Passed to the operations that need
/// the current identity rather than held as an ambient global.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Restore the stored identity, if any. A corrupt file is treated
    /// as unauthenticated rather than an error.
    pub fn load(&self) -> Option<StoredUser> {
        let raw = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str::<StoredUser>(&raw) {
            Ok(user) => {
                debug!(user_id = user.id, "restored session");
                Some(user)
            }
            Err(error) => {
                warn!(path = %self.path.display(), %error, "unreadable session file, ignoring");
                None
            }
        }
    }

    pub fn save(&self, user: &StoredUser) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_vec_pretty(user)?)?;
        debug!(user_id = user.id, path = %self.path.display(), "session saved");
        Ok(())
    }

    pub fn clear(&self) -> anyhow::Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
