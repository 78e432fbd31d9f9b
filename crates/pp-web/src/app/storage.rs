//! Browser storage and the sign-in slot kept in it.

use backend_client::TokenStore;
use tracing::warn;

/// Where [`BrowserStorage`] keeps its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageType {
    /// `localStorage`, kept across reloads and tabs.
    Local,
    /// Nothing is stored; reads miss and writes succeed.
    None,
}

/// Thin wrapper over `localStorage`, inert outside the browser.
#[derive(Debug, Clone, Copy)]
pub struct BrowserStorage {
    storage_type: StorageType,
}

impl BrowserStorage {
    pub fn new(storage_type: StorageType) -> Self {
        Self { storage_type }
    }

    #[cfg(feature = "web")]
    fn backend(&self) -> Result<Option<web_sys::Storage>, String> {
        let window = web_sys::window().ok_or_else(|| "Window not available".to_string())?;
        let storage = match self.storage_type {
            StorageType::Local => window.local_storage(),
            StorageType::None => return Ok(None),
        };
        storage.map_err(|e| format!("{:?}", e))
    }

    pub fn get(&self, key: &str) -> Option<String> {
        #[cfg(feature = "web")]
        {
            let storage = self.backend().ok()??;
            match storage.get_item(key) {
                Ok(value) => value,
                Err(e) => {
                    warn!(key, error = ?e, "failed to read from storage");
                    None
                }
            }
        }
        #[cfg(not(feature = "web"))]
        {
            let _ = key;
            None
        }
    }

    pub fn set(&self, key: &str, value: &str) -> Result<(), String> {
        #[cfg(feature = "web")]
        {
            let Some(storage) = self.backend()? else {
                return Ok(());
            };
            storage
                .set_item(key, value)
                .map_err(|e| format!("Failed to set item in storage '{}': {:?}", key, e))
        }
        #[cfg(not(feature = "web"))]
        {
            let _ = (key, value);
            Ok(())
        }
    }

    pub fn remove(&self, key: &str) -> Result<(), String> {
        #[cfg(feature = "web")]
        {
            let Some(storage) = self.backend()? else {
                return Ok(());
            };
            storage
                .remove_item(key)
                .map_err(|e| format!("Failed to remove item from storage '{}': {:?}", key, e))
        }
        #[cfg(not(feature = "web"))]
        {
            let _ = key;
            Ok(())
        }
    }
}

pub const AUTH_STORAGE_KEY: &str = "pp.auth";

/// Keeps the backend sign-in under [`AUTH_STORAGE_KEY`] so it survives reloads.
pub struct BrowserTokenStore {
    storage: BrowserStorage,
    key: &'static str,
}

impl BrowserTokenStore {
    pub fn new(storage: BrowserStorage) -> Self {
        Self {
            storage,
            key: AUTH_STORAGE_KEY,
        }
    }

    /// Local storage when running in the browser, nothing otherwise.
    pub fn local() -> Self {
        let storage_type = if cfg!(feature = "web") { StorageType::Local } else { StorageType::None };
        Self::new(BrowserStorage::new(storage_type))
    }
}

impl TokenStore for BrowserTokenStore {
    fn load(&self) -> Option<String> {
        self.storage.get(self.key)
    }

    fn save(&self, value: &str) {
        if let Err(err) = self.storage.set(self.key, value) {
            warn!(error = %err, "could not persist sign-in");
        }
    }

    fn clear(&self) {
        if let Err(err) = self.storage.remove(self.key) {
            warn!(error = %err, "could not clear saved sign-in");
        }
    }
}
