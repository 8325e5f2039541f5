//! Backend contract for sealed storage.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::error::StorageError;

/// Where sealed blobs live.
///
/// [`SealedStorage`](crate::SealedStorage) hashes every caller key before it
/// reaches a backend and seals every value, so implementations see opaque
/// hex keys and opaque byte blobs; they hold no plaintext and need no crypto
/// of their own. A credential vault or an on-disk defaults store plugs in
/// here.
pub trait StorageBackend: Send + Sync {
    /// Returns the blob for `key`, or `None` when absent.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Writes the blob for `key`. `None` removes the entry.
    fn set(&self, key: &str, value: Option<&[u8]>) -> Result<(), StorageError>;

    /// Removes `key`; absent keys are not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Process-memory backend.
///
/// Blobs live in a mutex-guarded map and vanish with the process. Handy as
/// the default backing store and in tests, where it doubles as a window
/// onto what actually got persisted.
///
/// # Examples
///
/// ```rust
/// use sealed_di::{MemoryBackend, StorageBackend};
///
/// let backend = MemoryBackend::new();
/// backend.set("k", Some(b"blob")).unwrap();
/// assert_eq!(backend.get("k").unwrap(), Some(b"blob".to_vec()));
/// assert_eq!(backend.len(), 1);
/// ```
#[derive(Default)]
pub struct MemoryBackend {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBackend {
    pub fn new() -> MemoryBackend {
        MemoryBackend::default()
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        self.blobs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.lock().is_empty()
    }

    /// Snapshot of the stored keys, in no particular order.
    pub fn keys(&self) -> Vec<String> {
        self.blobs.lock().keys().cloned().collect()
    }
}

impl StorageBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.blobs.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: Option<&[u8]>) -> Result<(), StorageError> {
        let mut blobs = self.blobs.lock();
        match value {
            Some(bytes) => {
                blobs.insert(key.to_owned(), bytes.to_vec());
            }
            None => {
                blobs.remove(key);
            }
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.blobs.lock().remove(key);
        Ok(())
    }
}
