use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;

use super::CanonicalMapping;
use super::error::{MappingLoadError, PersistenceError};
use super::store::MappingStore;

/// In-memory [`MappingStore`] that records writes.
#[derive(Debug, Default)]
pub struct MemoryMappingStore {
    stored: Mutex<Option<CanonicalMapping>>,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
    fail_loads: AtomicBool,
}

impl MemoryMappingStore {
    /// Creates a store holding `mapping`.
    pub fn new(mapping: CanonicalMapping) -> Self {
        Self {
            stored: Mutex::new(Some(mapping)),
            ..Default::default()
        }
    }

    /// Creates a store with nothing in it; `load` fails with `NotFound`.
    pub fn missing() -> Self {
        Self::default()
    }

    /// Number of successful `persist` calls.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Returns the last stored mapping.
    pub fn stored(&self) -> Option<CanonicalMapping> {
        self.stored.lock().clone()
    }

    /// Makes subsequent `persist` calls fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Makes subsequent `load` calls fail as malformed.
    pub fn set_fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }
}

impl MappingStore for MemoryMappingStore {
    fn load(&self) -> Result<CanonicalMapping, MappingLoadError> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(MappingLoadError::Malformed {
                path: "memory".into(),
                reason: "injected load failure".to_string(),
            });
        }

        self.stored
            .lock()
            .clone()
            .ok_or_else(|| MappingLoadError::NotFound {
                path: "memory".into(),
            })
    }

    fn persist(&self, mapping: &CanonicalMapping) -> Result<(), PersistenceError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PersistenceError::Rejected {
                reason: "injected write failure".to_string(),
            });
        }

        *self.stored.lock() = Some(mapping.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
