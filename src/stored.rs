//! Field-like accessors bound to one sealed storage slot.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::storage::SealedStorage;

/// One storage slot with an optional fallback value.
///
/// A `Stored` bundles a storage handle with a fixed key so call sites read
/// and write one setting without repeating either. Reads fall back to the
/// configured default when the slot is empty or unreadable.
///
/// # Examples
///
/// ```rust
/// use sealed_di::{MemoryBackend, SealedStorage, Stored};
/// use std::sync::Arc;
///
/// let storage = Arc::new(SealedStorage::new(Arc::new(MemoryBackend::new())));
/// let volume = Stored::with_default(storage.clone(), "audio.volume", 5u8);
///
/// assert_eq!(volume.get(), Some(5));
/// volume.set(Some(&11));
/// assert_eq!(volume.get(), Some(11));
/// volume.clear();
/// assert_eq!(volume.get(), Some(5));
/// ```
pub struct Stored<V> {
    storage: Arc<SealedStorage>,
    key: String,
    default: Option<V>,
}

impl<V> Stored<V>
where
    V: Serialize + DeserializeOwned + Clone,
{
    /// Binds a slot with no fallback.
    pub fn new(storage: Arc<SealedStorage>, key: impl Into<String>) -> Stored<V> {
        Stored {
            storage,
            key: key.into(),
            default: None,
        }
    }

    /// Binds a slot that falls back to `default` while empty.
    pub fn with_default(
        storage: Arc<SealedStorage>,
        key: impl Into<String>,
        default: V,
    ) -> Stored<V> {
        Stored {
            storage,
            key: key.into(),
            default: Some(default),
        }
    }

    /// The key this slot reads and writes.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The stored value, the configured fallback, or `None`.
    pub fn get(&self) -> Option<V> {
        self.storage
            .value(&self.key)
            .or_else(|| self.default.clone())
    }

    /// Like [`Stored::get`], bottoming out at `V::default()`.
    pub fn get_or_default(&self) -> V
    where
        V: Default,
    {
        self.get().unwrap_or_default()
    }

    /// Writes the slot. `None` removes the stored value (reads then see the
    /// configured fallback again).
    pub fn set(&self, value: Option<&V>) {
        self.storage.set_value(&self.key, value);
    }

    /// Removes the stored value.
    pub fn clear(&self) {
        self.storage.remove(&self.key);
    }
}
