//! Sealed storage: AEAD-sealed values over a pluggable backend.
//!
//! Caller keys are hashed (SHA-512, hex) before they reach the backend and
//! values are sealed with AES-256-GCM, so a backend compromise leaks neither
//! key names nor contents. Failures never cross the accessor boundary:
//! they are handed to an injectable error hook and the accessor reports
//! "no value".

mod backend;

pub use backend::{MemoryBackend, StorageBackend};

use std::sync::Arc;

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng, Payload};
use aes_gcm::{Aes256Gcm, Nonce};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha512};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::StorageError;

// 96-bit AES-GCM nonce, prefixed to every sealed blob.
const NONCE_LEN: usize = 12;

type ErrorHook = Arc<dyn Fn(&StorageError) + Send + Sync>;

/// 256-bit sealing key, scrubbed from memory on drop.
///
/// Generate a fresh one per store, or rebuild from saved bytes when sealed
/// data must outlive the process.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SealKey([u8; 32]);

impl SealKey {
    /// Fresh random key from the operating system RNG.
    pub fn generate() -> SealKey {
        SealKey(Aes256Gcm::generate_key(&mut OsRng).into())
    }

    pub fn from_bytes(bytes: [u8; 32]) -> SealKey {
        SealKey(bytes)
    }
}

/// Encrypting key-value store over a pluggable [`StorageBackend`].
///
/// Every write hashes the caller's key and seals the value (fresh random
/// nonce per write, blob layout `nonce ‖ ciphertext ‖ tag`); every read
/// reverses it. Optional authentication bytes bind blobs to this store:
/// a store configured with different bytes cannot open them.
///
/// Accessors are soft: any backend, sealing, or encoding failure goes to
/// the hook installed with [`SealedStorage::on_error`] and the accessor
/// returns `None` (or does nothing). No panic, no `Result`.
///
/// # Examples
///
/// ```rust
/// use sealed_di::{MemoryBackend, SealedStorage};
/// use std::sync::Arc;
///
/// let storage = SealedStorage::new(Arc::new(MemoryBackend::new()));
///
/// storage.set_string("motd", Some("welcome"));
/// assert_eq!(storage.string("motd"), Some("welcome".to_string()));
///
/// storage.set_value("retries", Some(&3u32));
/// assert_eq!(storage.value::<u32>("retries"), Some(3));
///
/// storage.set_string("motd", None);
/// assert_eq!(storage.string("motd"), None);
/// ```
pub struct SealedStorage {
    backend: Arc<dyn StorageBackend>,
    key: SealKey,
    aad: Option<Vec<u8>>,
    error_hook: RwLock<Option<ErrorHook>>,
}

impl SealedStorage {
    /// Builds a store with a freshly generated key.
    ///
    /// Sealed data is unreadable once the store is gone; use
    /// [`SealedStorage::with_key`] when values must survive it.
    pub fn new(backend: Arc<dyn StorageBackend>) -> SealedStorage {
        SealedStorage::with_key(backend, SealKey::generate())
    }

    /// Builds a store sealing with the given key.
    pub fn with_key(backend: Arc<dyn StorageBackend>, key: SealKey) -> SealedStorage {
        SealedStorage {
            backend,
            key,
            aad: None,
            error_hook: RwLock::new(None),
        }
    }

    /// Adds authentication bytes mixed into every seal and required by
    /// every open. Blobs written under different bytes fail to open.
    pub fn with_authentication(mut self, aad: impl Into<Vec<u8>>) -> SealedStorage {
        self.aad = Some(aad.into());
        self
    }

    /// Installs the error hook, replacing any previous one.
    pub fn on_error<F>(&self, hook: F)
    where
        F: Fn(&StorageError) + Send + Sync + 'static,
    {
        *self.error_hook.write() = Some(Arc::new(hook));
    }

    /// Removes the error hook; later failures are silently swallowed.
    pub fn clear_error_hook(&self) {
        *self.error_hook.write() = None;
    }

    /// Raw bytes stored under `key`, unsealed.
    pub fn bytes(&self, key: &str) -> Option<Vec<u8>> {
        match self.try_bytes(key) {
            Ok(value) => value,
            Err(err) => {
                self.report(err);
                None
            }
        }
    }

    /// Seals and stores raw bytes under `key`. `None` removes the entry.
    pub fn set_bytes(&self, key: &str, value: Option<&[u8]>) {
        if let Err(err) = self.try_set_bytes(key, value) {
            self.report(err);
        }
    }

    /// UTF-8 string stored under `key`.
    pub fn string(&self, key: &str) -> Option<String> {
        let bytes = self.bytes(key)?;
        match String::from_utf8(bytes) {
            Ok(value) => Some(value),
            Err(_) => {
                self.report(StorageError::new(format!(
                    "value for key '{}' is not valid UTF-8",
                    key
                )));
                None
            }
        }
    }

    /// Seals and stores a UTF-8 string under `key`. `None` removes the
    /// entry.
    pub fn set_string(&self, key: &str, value: Option<&str>) {
        self.set_bytes(key, value.map(str::as_bytes));
    }

    /// Decodes the value stored under `key`.
    ///
    /// Values are JSON-encoded before sealing, so anything `Deserialize`
    /// round-trips here.
    pub fn value<V: DeserializeOwned>(&self, key: &str) -> Option<V> {
        let bytes = self.bytes(key)?;
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(err) => {
                self.report(err.into());
                None
            }
        }
    }

    /// Encodes, seals, and stores a value under `key`. `None` removes the
    /// entry.
    pub fn set_value<V: Serialize>(&self, key: &str, value: Option<&V>) {
        match value {
            Some(value) => match serde_json::to_vec(value) {
                Ok(bytes) => self.set_bytes(key, Some(&bytes)),
                Err(err) => self.report(err.into()),
            },
            None => self.set_bytes(key, None),
        }
    }

    /// Whether any value is stored under `key`. Does not unseal.
    pub fn contains(&self, key: &str) -> bool {
        match self.backend.get(&Self::hashed(key)) {
            Ok(value) => value.is_some(),
            Err(err) => {
                self.report(err);
                false
            }
        }
    }

    /// Removes the entry under `key`, if any.
    pub fn remove(&self, key: &str) {
        if let Err(err) = self.backend.remove(&Self::hashed(key)) {
            self.report(err);
        }
    }

    /// Stores each pair only when its key holds no value yet.
    ///
    /// Existing entries are left untouched, so this is safe to run on every
    /// startup to lay down initial values.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sealed_di::{MemoryBackend, SealedStorage};
    /// use std::sync::Arc;
    ///
    /// let storage = SealedStorage::new(Arc::new(MemoryBackend::new()));
    /// storage.set_value("volume", Some(&11u8));
    ///
    /// storage.register_defaults([("volume", 5u8), ("brightness", 7u8)]);
    /// assert_eq!(storage.value::<u8>("volume"), Some(11));
    /// assert_eq!(storage.value::<u8>("brightness"), Some(7));
    /// ```
    pub fn register_defaults<K, V, I>(&self, defaults: I)
    where
        K: AsRef<str>,
        V: Serialize,
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in defaults {
            let key = key.as_ref();
            if !self.contains(key) {
                self.set_value(key, Some(&value));
            }
        }
    }

    fn try_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        match self.backend.get(&Self::hashed(key))? {
            Some(blob) => Ok(Some(self.open(&blob)?)),
            None => Ok(None),
        }
    }

    fn try_set_bytes(&self, key: &str, value: Option<&[u8]>) -> Result<(), StorageError> {
        match value {
            Some(plaintext) => {
                let blob = self.seal(plaintext)?;
                self.backend.set(&Self::hashed(key), Some(&blob))
            }
            None => self.backend.remove(&Self::hashed(key)),
        }
    }

    fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>, StorageError> {
        let cipher = Aes256Gcm::new((&self.key.0).into());
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let payload = Payload {
            msg: plaintext,
            aad: self.aad.as_deref().unwrap_or(&[]),
        };
        let sealed = cipher
            .encrypt(&nonce, payload)
            .map_err(|_| StorageError::new("sealing failed"))?;

        let mut blob = Vec::with_capacity(NONCE_LEN + sealed.len());
        blob.extend_from_slice(nonce.as_slice());
        blob.extend_from_slice(&sealed);
        Ok(blob)
    }

    fn open(&self, blob: &[u8]) -> Result<Vec<u8>, StorageError> {
        if blob.len() < NONCE_LEN {
            return Err(StorageError::new("sealed blob is truncated"));
        }
        let (nonce, sealed) = blob.split_at(NONCE_LEN);
        let cipher = Aes256Gcm::new((&self.key.0).into());
        let payload = Payload {
            msg: sealed,
            aad: self.aad.as_deref().unwrap_or(&[]),
        };
        cipher
            .decrypt(Nonce::from_slice(nonce), payload)
            .map_err(|_| StorageError::new("failed to open sealed blob: wrong key, wrong authentication bytes, or tampering"))
    }

    // SHA-512 over the caller key; backends only ever see the hex digest.
    fn hashed(key: &str) -> String {
        let mut hasher = Sha512::new();
        hasher.update(key.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn report(&self, err: StorageError) {
        let hook = self.error_hook.read().as_ref().cloned();
        if let Some(hook) = hook {
            hook(&err);
        }
    }
}
