//! Resolution scopes controlling caching behavior.

/// How a resolved value may be cached and shared.
///
/// The scope travels with the query, not the registration: the same
/// candidate list can serve cached singletons to one call site and fresh
/// values to another.
///
/// # Examples
///
/// ```rust
/// use sealed_di::{Injector, Scope};
/// use std::sync::Arc;
///
/// struct Sequence(u64);
///
/// let injector = Injector::new();
/// injector.bind::<Sequence>().to_factory(|| Arc::new(Sequence(7)));
///
/// // Singleton: the first factory product is promoted and shared.
/// let a = injector.resolve::<Sequence>().unwrap();
/// let b = injector.resolve::<Sequence>().unwrap();
/// assert!(Arc::ptr_eq(&a, &b));
///
/// // Instance: every query builds afresh.
/// let c = injector.query::<Sequence>().scoped(Scope::Instance).resolve().unwrap();
/// assert!(!Arc::ptr_eq(&a, &c));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Shared value, cached across resolutions.
    ///
    /// A ready instance is returned as-is. A factory product is promoted
    /// into the registry as a new instance candidate (when no instance
    /// existed yet), so later singleton queries observe the same handle.
    Singleton,
    /// Fresh value per resolution, never cached.
    ///
    /// Ready instances are skipped entirely; only factories can satisfy an
    /// instance-scoped query, and their products are never promoted.
    Instance,
}
