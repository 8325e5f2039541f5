//! Registry keys identifying dependency kinds.

use std::any::TypeId;
use std::fmt;

/// Key for candidate storage and lookup.
///
/// A key names one dependency kind: the concrete type or trait object the
/// caller registers and resolves by. The `TypeId` carries identity, the type
/// name rides along purely for diagnostics, so two keys built from the same
/// type are always equal regardless of how the name renders.
///
/// Group membership is not part of the key; groups are separate partitions
/// of the registry keyed by the same `Key` values.
///
/// # Examples
///
/// ```rust
/// use sealed_di::Key;
///
/// trait Mailer: Send + Sync {}
///
/// let a = Key::of::<String>();
/// let b = Key::of::<String>();
/// assert_eq!(a, b);
/// assert_ne!(a, Key::of::<u64>());
///
/// // Trait object types are keys too.
/// let m = Key::of::<dyn Mailer>();
/// assert!(m.display_name().contains("Mailer"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Key {
    id: TypeId,
    name: &'static str,
}

impl Key {
    /// Builds the key for `D`, which may be a trait object type.
    #[inline(always)]
    pub fn of<D: ?Sized + 'static>() -> Key {
        Key {
            id: TypeId::of::<D>(),
            name: std::any::type_name::<D>(),
        }
    }

    /// Human-readable type name for error messages and logs.
    pub fn display_name(&self) -> &'static str {
        self.name
    }

    /// The identity token behind this key.
    pub fn type_id(&self) -> TypeId {
        self.id
    }
}

// Hot path: TypeId-only comparison, the name is diagnostics-only.
impl PartialEq for Key {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Key {}

impl std::hash::Hash for Key {
    #[inline(always)]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
