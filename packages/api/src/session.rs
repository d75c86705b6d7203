//! Bearer token storage.

use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use crate::ApiError;

/// Where the bearer token lives between requests.
pub trait TokenStore: Send + Sync {
    /// Current token, if any.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Io`] if a backing file cannot be read.
    fn load(&self) -> Result<Option<String>, ApiError>;

    /// Replaces the token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Io`] if a backing file cannot be written.
    fn save(&self, token: &str) -> Result<(), ApiError>;

    /// Forgets the token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Io`] if a backing file cannot be removed.
    fn clear(&self) -> Result<(), ApiError>;
}

/// Token held in process memory.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, ApiError> {
        Ok(self
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, token: &str) -> Result<(), ApiError> {
        let mut guard = self
            .token
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), ApiError> {
        let mut guard = self
            .token
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = None;
        Ok(())
    }
}

/// Token persisted in a plain-text file.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, ApiError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => {
                let token = text.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, token: &str) -> Result<(), ApiError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, token)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), ApiError> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// The logged-in user's credentials. Cheap to clone; clones share the
/// store.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn TokenStore>,
}

impl Session {
    #[must_use]
    pub fn new(store: impl TokenStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Token to send as `Authorization: Bearer`. Store errors are logged
    /// and treated as logged out.
    #[must_use]
    pub fn bearer(&self) -> Option<String> {
        self.store.load().unwrap_or_else(|e| {
            log::error!("Failed to load session token: {e}");
            None
        })
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.bearer().is_some()
    }

    /// Stores a freshly issued token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Io`] if the store cannot be written.
    pub fn login(&self, token: &str) -> Result<(), ApiError> {
        self.store.save(token)
    }

    /// Clears the token after the server rejected it.
    pub fn teardown(&self) {
        log::warn!("Session rejected by server; clearing stored token");
        if let Err(e) = self.store.clear() {
            log::error!("Failed to clear session token: {e}");
        }
    }
}
