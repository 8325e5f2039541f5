#![no_main]

use libfuzzer_sys::fuzz_target;
use sealed_di::{MemoryBackend, SealKey, SealedStorage, StorageBackend};
use std::sync::Arc;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let split = (data[0] as usize % data.len()).max(1);
    let (head, tail) = data.split_at(split);
    let key = String::from_utf8_lossy(head).into_owned();

    let backend = Arc::new(MemoryBackend::new());
    let storage = SealedStorage::with_key(backend.clone(), SealKey::from_bytes([7u8; 32]));

    storage.set_bytes(&key, Some(tail));
    assert_eq!(storage.bytes(&key).as_deref(), Some(tail));
    assert!(storage.contains(&key));

    // A store sealing under a different key fails soft, never panics.
    let stranger = SealedStorage::with_key(backend.clone(), SealKey::from_bytes([8u8; 32]));
    assert_eq!(stranger.bytes(&key), None);
    assert!(stranger.contains(&key));

    // So does opening a corrupted blob.
    for stored_key in backend.keys() {
        let mut blob = backend.get(&stored_key).unwrap().unwrap();
        if let Some(byte) = blob.first_mut() {
            *byte ^= 0xff;
        }
        backend.set(&stored_key, Some(&blob)).unwrap();
    }
    assert_eq!(storage.bytes(&key), None);

    storage.set_bytes(&key, None);
    assert!(!storage.contains(&key));
    assert!(backend.is_empty());
});
