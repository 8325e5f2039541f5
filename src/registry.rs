//! Append-only keyed multi-registry with group partitions.

use std::collections::HashMap;

use crate::candidate::Candidate;
use crate::key::Key;

/// Pure data structure behind the injector: ordered candidate lists per key,
/// plus lazily created per-group sub-registries. All resolution policy lives
/// above this layer.
///
/// Nothing is ever removed or replaced; registration is append-only and
/// duplicates are allowed. Group sub-registries are plain owned values, so
/// they live inside whatever exclusivity domain guards the parent.
#[derive(Default)]
pub(crate) struct Registry {
    entries: HashMap<Key, Vec<Candidate>>,
    groups: HashMap<String, Registry>,
}

impl Registry {
    pub(crate) fn new() -> Registry {
        Registry::default()
    }

    /// Appends to the key's list, creating it on first registration.
    /// Insertion order is preserved; first registered comes first.
    pub(crate) fn append(&mut self, key: Key, candidate: Candidate) {
        self.entries.entry(key).or_default().push(candidate);
    }

    /// The candidate list for `key`, or `None` when never registered.
    pub(crate) fn candidates(&self, key: &Key) -> Option<&[Candidate]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Read-only lookup of a group partition.
    pub(crate) fn group(&self, name: &str) -> Option<&Registry> {
        self.groups.get(name)
    }

    /// Get-or-create a group partition. A given name maps to the same
    /// sub-registry for the life of the parent.
    pub(crate) fn group_mut(&mut self, name: &str) -> &mut Registry {
        if !self.groups.contains_key(name) {
            self.groups.insert(name.to_owned(), Registry::new());
        }
        // Present: ensured just above.
        self.groups.get_mut(name).unwrap()
    }
}
