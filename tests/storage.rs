//! Sealed storage over a shared in-memory backend: round trips, at-rest
//! opacity, soft failure reporting, and `Stored` slot accessors.

use sealed_di::{MemoryBackend, SealKey, SealedStorage, StorageBackend, Stored};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

// Nonce prefix plus the GCM tag.
const SEAL_OVERHEAD: usize = 12 + 16;

// ===== Round trips =====

#[test]
fn test_string_round_trip() {
    let storage = SealedStorage::new(Arc::new(MemoryBackend::new()));

    storage.set_string("motd", Some("welcome back"));
    assert_eq!(storage.string("motd"), Some("welcome back".to_string()));
    assert!(storage.contains("motd"));
}

#[test]
fn test_bytes_round_trip() {
    let storage = SealedStorage::new(Arc::new(MemoryBackend::new()));

    storage.set_bytes("raw", Some(&[0u8, 159, 146, 150]));
    assert_eq!(storage.bytes("raw"), Some(vec![0u8, 159, 146, 150]));
}

#[test]
fn test_typed_value_round_trip() {
    #[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
    struct Profile {
        name: String,
        level: u8,
    }

    let storage = SealedStorage::new(Arc::new(MemoryBackend::new()));
    let profile = Profile {
        name: "kes".to_string(),
        level: 9,
    };

    storage.set_value("profile", Some(&profile));
    assert_eq!(storage.value::<Profile>("profile"), Some(profile));
}

#[test]
fn test_missing_key_reads_none() {
    let storage = SealedStorage::new(Arc::new(MemoryBackend::new()));

    assert_eq!(storage.string("absent"), None);
    assert_eq!(storage.bytes("absent"), None);
    assert_eq!(storage.value::<u32>("absent"), None);
    assert!(!storage.contains("absent"));
}

#[test]
fn test_set_none_removes_the_entry() {
    let backend = Arc::new(MemoryBackend::new());
    let storage = SealedStorage::new(backend.clone());

    storage.set_string("temp", Some("here"));
    assert_eq!(backend.len(), 1);

    storage.set_string("temp", None);
    assert!(backend.is_empty());
    assert_eq!(storage.string("temp"), None);
}

#[test]
fn test_remove_drops_the_entry() {
    let backend = Arc::new(MemoryBackend::new());
    let storage = SealedStorage::new(backend.clone());

    storage.set_value("count", Some(&3u32));
    storage.remove("count");
    assert!(backend.is_empty());
    // Removing an absent key is fine.
    storage.remove("count");
}

// ===== At-rest opacity =====

#[test]
fn test_backend_sees_neither_keys_nor_plaintext() {
    let backend = Arc::new(MemoryBackend::new());
    let storage = SealedStorage::new(backend.clone());

    storage.set_string("password", Some("hunter2"));

    let keys = backend.keys();
    assert_eq!(keys.len(), 1);
    // SHA-512 hex digest, not the caller's key.
    assert_eq!(keys[0].len(), 128);
    assert_ne!(keys[0], "password");

    let blob = backend.get(&keys[0]).unwrap().unwrap();
    assert_eq!(blob.len(), "hunter2".len() + SEAL_OVERHEAD);
    assert!(blob.windows(7).all(|window| window != b"hunter2"));
}

#[test]
fn test_rewriting_a_value_changes_the_blob() {
    let backend = Arc::new(MemoryBackend::new());
    let storage = SealedStorage::new(backend.clone());

    storage.set_string("motd", Some("same text"));
    let first = backend.get(&backend.keys()[0]).unwrap().unwrap();

    storage.set_string("motd", Some("same text"));
    let second = backend.get(&backend.keys()[0]).unwrap().unwrap();

    // Fresh nonce per seal.
    assert_ne!(first, second);
    assert_eq!(storage.string("motd"), Some("same text".to_string()));
}

// ===== Keys and authentication =====

#[test]
fn test_wrong_key_fails_soft_and_fires_the_hook() {
    let backend = Arc::new(MemoryBackend::new());

    let writer = SealedStorage::with_key(backend.clone(), SealKey::from_bytes([7u8; 32]));
    writer.set_string("token", Some("secret"));

    let reader = SealedStorage::with_key(backend.clone(), SealKey::from_bytes([8u8; 32]));
    let failures = Arc::new(AtomicU32::new(0));
    let failures_clone = failures.clone();
    reader.on_error(move |err| {
        assert!(err.message().contains("failed to open"));
        failures_clone.fetch_add(1, Ordering::SeqCst);
    });

    assert_eq!(reader.string("token"), None);
    assert_eq!(failures.load(Ordering::SeqCst), 1);

    // Presence checks skip unsealing, so the entry is still visible.
    assert!(reader.contains("token"));
}

#[test]
fn test_same_key_reopens_another_store_s_blobs() {
    let backend = Arc::new(MemoryBackend::new());
    let key = SealKey::from_bytes([42u8; 32]);

    let writer = SealedStorage::with_key(backend.clone(), key.clone());
    writer.set_value("retries", Some(&5u32));

    let reader = SealedStorage::with_key(backend, key);
    assert_eq!(reader.value::<u32>("retries"), Some(5));
}

#[test]
fn test_authentication_bytes_bind_blobs_to_their_store() {
    let backend = Arc::new(MemoryBackend::new());
    let key = SealKey::from_bytes([9u8; 32]);

    let device_a = SealedStorage::with_key(backend.clone(), key.clone())
        .with_authentication("device-a");
    device_a.set_string("pin", Some("0000"));

    // Same key, different authentication bytes: open fails.
    let device_b = SealedStorage::with_key(backend.clone(), key.clone())
        .with_authentication("device-b");
    assert_eq!(device_b.string("pin"), None);

    // Same key, no authentication bytes: open fails too.
    let bare = SealedStorage::with_key(backend.clone(), key.clone());
    assert_eq!(bare.string("pin"), None);

    // Matching bytes open fine.
    let twin = SealedStorage::with_key(backend, key).with_authentication("device-a");
    assert_eq!(twin.string("pin"), Some("0000".to_string()));
}

// ===== Error hook =====

#[test]
fn test_cleared_hook_stops_reporting() {
    let backend = Arc::new(MemoryBackend::new());
    SealedStorage::with_key(backend.clone(), SealKey::from_bytes([1u8; 32]))
        .set_string("k", Some("v"));

    let reader = SealedStorage::with_key(backend, SealKey::from_bytes([2u8; 32]));
    let failures = Arc::new(AtomicU32::new(0));
    let failures_clone = failures.clone();
    reader.on_error(move |_| {
        failures_clone.fetch_add(1, Ordering::SeqCst);
    });

    assert_eq!(reader.string("k"), None);
    assert_eq!(failures.load(Ordering::SeqCst), 1);

    reader.clear_error_hook();
    assert_eq!(reader.string("k"), None);
    assert_eq!(failures.load(Ordering::SeqCst), 1);
}

#[test]
fn test_successful_reads_never_fire_the_hook() {
    let storage = SealedStorage::new(Arc::new(MemoryBackend::new()));
    storage.on_error(|err| panic!("unexpected storage error: {}", err));

    storage.set_value("width", Some(&640u32));
    assert_eq!(storage.value::<u32>("width"), Some(640));
    assert_eq!(storage.string("missing"), None); // Absence is not an error
}

// ===== Defaults =====

#[test]
fn test_register_defaults_fills_only_empty_slots() {
    let storage = SealedStorage::new(Arc::new(MemoryBackend::new()));
    storage.set_value("width", Some(&640u32));

    storage.register_defaults([("width", 1024u32), ("height", 768u32)]);

    assert_eq!(storage.value::<u32>("width"), Some(640));
    assert_eq!(storage.value::<u32>("height"), Some(768));

    // Running it again changes nothing.
    storage.register_defaults([("width", 800u32), ("height", 600u32)]);
    assert_eq!(storage.value::<u32>("width"), Some(640));
    assert_eq!(storage.value::<u32>("height"), Some(768));
}

// ===== Stored slots =====

#[test]
fn test_stored_reads_fall_back_to_the_default() {
    let storage = Arc::new(SealedStorage::new(Arc::new(MemoryBackend::new())));
    let volume = Stored::with_default(storage.clone(), "audio.volume", 5u8);

    assert_eq!(volume.get(), Some(5));

    volume.set(Some(&11));
    assert_eq!(volume.get(), Some(11));
    // The write went through to storage, not just the slot.
    assert_eq!(storage.value::<u8>("audio.volume"), Some(11));

    volume.clear();
    assert_eq!(volume.get(), Some(5));
}

#[test]
fn test_stored_without_default_reads_none() {
    let storage = Arc::new(SealedStorage::new(Arc::new(MemoryBackend::new())));
    let nickname: Stored<String> = Stored::new(storage, "profile.nickname");

    assert_eq!(nickname.get(), None);
    assert_eq!(nickname.get_or_default(), String::new());

    nickname.set(Some(&"kes".to_string()));
    assert_eq!(nickname.get(), Some("kes".to_string()));

    nickname.set(None);
    assert_eq!(nickname.get(), None);
}

#[test]
fn test_stored_slots_on_one_key_share_state() {
    let storage = Arc::new(SealedStorage::new(Arc::new(MemoryBackend::new())));
    let writer: Stored<u32> = Stored::new(storage.clone(), "session.count");
    let reader = Stored::with_default(storage, "session.count", 0u32);

    writer.set(Some(&3));
    assert_eq!(reader.get(), Some(3));

    writer.clear();
    assert_eq!(reader.get(), Some(0)); // Back to the fallback
    assert_eq!(reader.key(), "session.count");
}
