//! Session token storage.
//!
//! A [`Session`] is an explicit handle passed to the API client and the views.
//! It holds at most one opaque bearer token; presence alone means "logged in".
//! There is no expiry check, refresh or decoding.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, warn};

use crate::error::SessionError;

/// Key under which the token is persisted.
pub const TOKEN_KEY: &str = "token";

/// Synchronous backing storage for the session token.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<String>, SessionError>;
    fn save(&self, token: &str) -> Result<(), SessionError>;
    fn clear(&self) -> Result<(), SessionError>;
}

/// In-process token storage. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, SessionError> {
        Ok(self.token.read().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn save(&self, token: &str) -> Result<(), SessionError> {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Token persisted in a small JSON document on disk.
///
/// The document is a flat string map; only [`TOKEN_KEY`] is ever written.
/// No cross-process locking: concurrent writers are last-write-wins.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, SessionError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => return Err(self.io_error(source)),
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|source| SessionError::Malformed {
            path: self.path.display().to_string(),
            source,
        })
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let body = serde_json::to_string_pretty(map).map_err(|source| SessionError::Malformed {
            path: self.path.display().to_string(),
            source,
        })?;
        write_private(&self.path, &body).map_err(|e| self.io_error(e))
    }

    fn io_error(&self, source: io::Error) -> SessionError {
        SessionError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, SessionError> {
        Ok(self.read_map()?.remove(TOKEN_KEY))
    }

    fn save(&self, token: &str) -> Result<(), SessionError> {
        // A malformed file is replaced rather than blocking login.
        let mut map = self.read_map().unwrap_or_default();
        map.insert(TOKEN_KEY.to_string(), token.to_string());
        self.write_map(&map)
    }

    fn clear(&self) -> Result<(), SessionError> {
        let mut map = self.read_map().unwrap_or_default();
        map.remove(TOKEN_KEY);
        if map.is_empty() {
            return match fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(self.io_error(e)),
            };
        }
        self.write_map(&map)
    }
}

/// Write `body` to `path`, readable by the owner only on unix. Existing files
/// are truncated and have their mode tightened.
fn write_private(path: &Path, body: &str) -> io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(body.as_bytes())
}

/// Cloneable handle to the current authentication state.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn TokenStore>,
}

impl Session {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }

    /// Session backed by a [`MemoryTokenStore`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryTokenStore::new()))
    }

    /// Session persisted at `path`.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(FileTokenStore::new(path)))
    }

    pub fn set_token(&self, token: &str) -> Result<(), SessionError> {
        self.store.save(token)?;
        debug!("Session token stored");
        Ok(())
    }

    /// The persisted token. Storage read failures are logged and reported as
    /// no token, which sends the user back to login.
    pub fn token(&self) -> Option<String> {
        match self.store.load() {
            Ok(token) => token,
            Err(e) => {
                warn!("Failed to read session token: {}", e);
                None
            }
        }
    }

    pub fn remove_token(&self) -> Result<(), SessionError> {
        self.store.clear()?;
        debug!("Session token cleared");
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some_and(|t| !t.is_empty())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "praise_session_test_{}_{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir.join("session.json")
    }

    #[test]
    fn memory_session_roundtrip() {
        let session = Session::in_memory();
        assert!(!session.is_authenticated());
        assert_eq!(session.token(), None);

        session.set_token("abc.def.ghi").unwrap();
        assert_eq!(session.token().as_deref(), Some("abc.def.ghi"));
        assert!(session.is_authenticated());

        session.remove_token().unwrap();
        assert_eq!(session.token(), None);
        assert!(!session.is_authenticated());
    }

    #[test]
    fn latest_token_wins() {
        let session = Session::in_memory();
        for token in ["one", "two", "three"] {
            session.set_token(token).unwrap();
            assert_eq!(session.token().as_deref(), Some(token));
        }
    }

    #[test]
    fn empty_token_is_not_authenticated() {
        let session = Session::in_memory();
        session.set_token("").unwrap();
        assert_eq!(session.token().as_deref(), Some(""));
        assert!(!session.is_authenticated());
    }

    #[test]
    fn clones_share_state() {
        let session = Session::in_memory();
        let other = session.clone();
        session.set_token("shared").unwrap();
        assert!(other.is_authenticated());
        other.remove_token().unwrap();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn file_session_survives_reopen() {
        let path = temp_path("reopen");

        Session::file(&path).set_token("persisted").unwrap();
        let reopened = Session::file(&path);
        assert_eq!(reopened.token().as_deref(), Some("persisted"));

        reopened.remove_token().unwrap();
        assert!(!path.exists());
        assert!(!Session::file(&path).is_authenticated());
    }

    #[test]
    fn file_store_writes_single_key() {
        let path = temp_path("single_key");
        let store = FileTokenStore::new(&path);
        store.save("t1").unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        let map: BTreeMap<String, String> = serde_json::from_str(&raw).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(TOKEN_KEY).map(String::as_str), Some("t1"));
    }

    #[test]
    fn malformed_file_reads_as_logged_out_and_is_replaced_on_login() {
        let path = temp_path("malformed");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "not json").unwrap();

        let session = Session::file(&path);
        assert!(!session.is_authenticated());
        assert!(matches!(
            FileTokenStore::new(&path).load(),
            Err(SessionError::Malformed { .. })
        ));

        session.set_token("fresh").unwrap();
        assert_eq!(session.token().as_deref(), Some("fresh"));
    }

    #[cfg(unix)]
    #[test]
    fn token_file_is_private_to_owner() {
        use std::os::unix::fs::PermissionsExt;

        let path = temp_path("private");
        FileTokenStore::new(&path).save("secret").unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);

        // A file left world-readable by something else is tightened on save.
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();
        FileTokenStore::new(&path).save("rotated").unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(Session::file(&path).token().as_deref(), Some("rotated"));
    }

    #[test]
    fn clearing_missing_file_is_ok() {
        let path = temp_path("missing");
        assert!(FileTokenStore::new(&path).clear().is_ok());
    }
}
