use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use crate::{core::errors::CoreError, domain::AppState};

use super::{Result, StorageBackend};

/// In-process backend. Clones share the stored document, so one handle can
/// inspect what another handle persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    document: Arc<Mutex<Option<AppState>>>,
    fail_saves: Arc<AtomicBool>,
    saves: Arc<Mutex<usize>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following `save` fail until switched off again.
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> Option<AppState> {
        self.document.lock().ok().and_then(|guard| guard.clone())
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.lock().map(|guard| *guard).unwrap_or(0)
    }

    fn replace(&self, state: Option<AppState>) {
        if let Ok(mut guard) = self.document.lock() {
            *guard = state;
        }
    }
}

impl StorageBackend for MemoryStorage {
    fn load(&self) -> Result<Option<AppState>> {
        Ok(self.snapshot())
    }

    fn save(&self, state: &AppState) -> Result<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(CoreError::Storage("storage unavailable".into()));
        }
        self.replace(Some(state.clone()));
        if let Ok(mut count) = self.saves.lock() {
            *count += 1;
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.replace(None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_document() {
        let storage = MemoryStorage::new();
        let observer = storage.clone();
        storage.save(&AppState::default()).unwrap();
        assert!(observer.snapshot().is_some());
        assert_eq!(observer.save_count(), 1);

        observer.fail_saves(true);
        assert!(storage.save(&AppState::default()).is_err());
        assert_eq!(observer.save_count(), 1);
    }
}
