#![no_main]

use libfuzzer_sys::fuzz_target;
use sealed_di::{Injector, Key, Scope, Tag};
use std::sync::Arc;

const TAGS: [Tag; 4] = [
    Tag::new("alpha"),
    Tag::new("beta"),
    Tag::new("gamma"),
    Tag::MOCK,
];

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let injector = Injector::new();

    // Each byte after the first drives one registration.
    for &byte in data[1..].iter().take(64) {
        let tag = TAGS[(byte & 0x03) as usize];
        let grouped = byte & 0x04 != 0;
        let use_factory = byte & 0x08 != 0;
        let value = byte as u32;

        let binding = injector.bind::<u32>().tagged(tag);
        let binding = if grouped { binding.in_group("g") } else { binding };
        if use_factory {
            binding.to_factory(move || Arc::new(value));
        } else {
            binding.to_instance(Arc::new(value));
        }
    }

    // The first byte drives the query shape.
    let control = data[0];
    let scope = if control & 0x01 != 0 {
        Scope::Instance
    } else {
        Scope::Singleton
    };
    let qualify = control & 0x02 != 0;
    let tag = TAGS[((control >> 2) & 0x03) as usize];
    let grouped_query = control & 0x10 != 0;

    let build = || {
        let query = injector.query::<u32>().scoped(scope);
        let query = if qualify { query.qualified(tag) } else { query };
        if grouped_query {
            query.in_group("g")
        } else {
            query
        }
    };

    // Both call shapes agree, errors carry the failing key, and an
    // identical query keeps succeeding (or keeps failing) afterwards.
    let first = build().resolve();
    let optional = build().resolve_opt();
    assert_eq!(first.is_ok(), optional.is_some());

    if let Err(err) = &first {
        assert_eq!(err.key(), Key::of::<u32>());
        assert_eq!(err.qualifiers().is_empty(), !qualify);
    }

    let again = build().resolve();
    assert_eq!(first.is_ok(), again.is_ok());
});
