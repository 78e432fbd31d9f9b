//! Where the client keeps its sign-in between runs.

use std::sync::{Mutex, PoisonError};

use session_core::MaybeSendSync;

/// Key-less slot for the serialized sign-in.
pub trait TokenStore: MaybeSendSync {
    fn load(&self) -> Option<String>;
    fn save(&self, value: &str);
    fn clear(&self);
}

/// Keeps the sign-in for the lifetime of the process only.
#[derive(Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<String> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn save(&self, value: &str) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(value.to_string());
    }

    fn clear(&self) {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).take();
    }
}
