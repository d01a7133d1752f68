//! Remembering who this client is across reconnects.
//!
//! The store itself never touches disk. The client driver loads an
//! [`Identity`] through an [`IdentityStore`] at startup and saves it
//! whenever the server confirms a join.
//!
//! # Why a trait?
//!
//! Tests want an in-memory store; a desktop client wants a file that
//! disappears when the user logs out. Both plug in behind the same seam.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::{Identity, SessionError};

/// File name used under the runtime directory.
const IDENTITY_FILE: &str = "identity.json";

/// Loads, saves, and forgets the player identity.
///
/// # Trait bounds
///
/// - `Send + Sync`: the client may live on any runtime thread.
/// - `'static`: boxed and held for the client's whole life.
pub trait IdentityStore: Send + Sync + 'static {
    /// `Ok(None)` when nothing has been saved.
    fn load(&self) -> Result<Option<Identity>, SessionError>;

    fn save(&self, identity: &Identity) -> Result<(), SessionError>;

    fn clear(&self) -> Result<(), SessionError>;
}

// ---------------------------------------------------------------------------
// MemoryIdentityStore
// ---------------------------------------------------------------------------

/// Keeps the identity in process memory only.
#[derive(Debug, Default)]
pub struct MemoryIdentityStore {
    slot: Mutex<Option<Identity>>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `identity`.
    pub fn with(identity: Identity) -> Self {
        Self {
            slot: Mutex::new(Some(identity)),
        }
    }

    fn slot(&self) -> Result<std::sync::MutexGuard<'_, Option<Identity>>, SessionError> {
        self.slot
            .lock()
            .map_err(|_| SessionError::Identity("identity lock poisoned".into()))
    }
}

impl IdentityStore for MemoryIdentityStore {
    fn load(&self) -> Result<Option<Identity>, SessionError> {
        Ok(self.slot()?.clone())
    }

    fn save(&self, identity: &Identity) -> Result<(), SessionError> {
        *self.slot()? = Some(identity.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.slot()? = None;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FileIdentityStore
// ---------------------------------------------------------------------------

/// Keeps the identity in a JSON file.
///
/// The default location is `$XDG_RUNTIME_DIR/clueless/identity.json`. That
/// directory is cleared at logout, so the identity lasts one user session.
/// Without `XDG_RUNTIME_DIR` it falls back to `clueless-<user>` under the
/// shared temp directory, or `clueless-<pid>` when no user name is set.
#[derive(Debug, Clone)]
pub struct FileIdentityStore {
    path: PathBuf,
}

impl FileIdentityStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// A store at [`FileIdentityStore::default_path`].
    pub fn session_scoped() -> Self {
        Self::new(Self::default_path())
    }

    pub fn default_path() -> PathBuf {
        let user = std::env::var_os("USER").or_else(|| std::env::var_os("USERNAME"));
        default_path_in(std::env::var_os("XDG_RUNTIME_DIR"), user)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn io_error(action: &str, path: &Path, err: impl std::fmt::Display) -> SessionError {
    SessionError::Identity(format!("{action} {}: {err}", path.display()))
}

impl IdentityStore for FileIdentityStore {
    fn load(&self) -> Result<Option<Identity>, SessionError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(io_error("read", &self.path, err)),
        };
        let identity = serde_json::from_slice(&bytes)
            .map_err(|err| io_error("parse", &self.path, err))?;
        Ok(Some(identity))
    }

    fn save(&self, identity: &Identity) -> Result<(), SessionError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|err| io_error("create", dir, err))?;
        }
        let json = serde_json::to_vec_pretty(identity)
            .map_err(|err| io_error("encode", &self.path, err))?;
        fs::write(&self.path, json).map_err(|err| io_error("write", &self.path, err))?;
        tracing::debug!(path = %self.path.display(), "identity saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error("remove", &self.path, err)),
        }
    }
}

/// The runtime dir if set, else a per-user (or per-process) directory
/// under the temp dir. The temp dir is shared between users, so the
/// directory name carries the owner.
fn default_path_in(runtime_dir: Option<OsString>, user: Option<OsString>) -> PathBuf {
    if let Some(dir) = runtime_dir.filter(|dir| !dir.is_empty()) {
        return PathBuf::from(dir).join("clueless").join(IDENTITY_FILE);
    }
    let owner = user
        .filter(|name| !name.is_empty())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| std::process::id().to_string());
    std::env::temp_dir()
        .join(format!("clueless-{owner}"))
        .join(IDENTITY_FILE)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use clueless_protocol::GameId;

    use super::*;

    fn scratch_path() -> PathBuf {
        static NEXT: AtomicU32 = AtomicU32::new(0);
        let n = NEXT.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir()
            .join(format!("clueless-identity-test-{}-{n}", std::process::id()))
            .join(IDENTITY_FILE)
    }

    fn alice() -> Identity {
        Identity::named("alice", GameId::from("g1"))
    }

    #[test]
    fn test_memory_store_save_load_clear() {
        let store = MemoryIdentityStore::new();
        assert_eq!(store.load().unwrap(), None);

        store.save(&alice()).unwrap();
        assert_eq!(store.load().unwrap(), Some(alice()));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_file_store_missing_file_is_none() {
        let store = FileIdentityStore::new(scratch_path());
        assert_eq!(store.load().unwrap(), None);
        // Clearing nothing is fine.
        store.clear().unwrap();
    }

    #[test]
    fn test_file_store_round_trips_through_disk() {
        let path = scratch_path();
        let store = FileIdentityStore::new(&path);

        store.save(&alice()).unwrap();
        assert!(path.exists());
        assert_eq!(FileIdentityStore::new(&path).load().unwrap(), Some(alice()));

        store.clear().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_file_store_corrupt_file_is_identity_error() {
        let path = scratch_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"not json").unwrap();

        let err = FileIdentityStore::new(&path).load().unwrap_err();
        assert!(matches!(err, SessionError::Identity(_)));
    }

    #[test]
    fn test_default_path_ends_with_identity_file() {
        let path = FileIdentityStore::default_path();
        assert!(path.ends_with(IDENTITY_FILE));
    }

    #[test]
    fn test_default_path_prefers_runtime_dir() {
        let path = default_path_in(Some("/run/user/1000".into()), Some("alice".into()));
        assert_eq!(path, PathBuf::from("/run/user/1000/clueless/identity.json"));
    }

    #[test]
    fn test_default_path_temp_fallback_is_per_user() {
        let alice = default_path_in(None, Some("alice".into()));
        let bob = default_path_in(Some("".into()), Some("bob".into()));
        assert_ne!(alice, bob);
        assert!(alice.starts_with(std::env::temp_dir()));
        assert!(alice.ends_with("clueless-alice/identity.json"));
        assert!(bob.ends_with("clueless-bob/identity.json"));
    }

    #[test]
    fn test_default_path_without_user_is_per_process() {
        let path = default_path_in(None, None);
        let dir = format!("clueless-{}", std::process::id());
        assert!(path.ends_with(Path::new(&dir).join(IDENTITY_FILE)));
    }

    #[test]
    fn test_trait_object_usable() {
        let store: Box<dyn IdentityStore> = Box::new(MemoryIdentityStore::with(alice()));
        assert_eq!(store.load().unwrap().unwrap().name, "alice");
    }
}
