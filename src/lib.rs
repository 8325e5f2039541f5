//! # sealed-di
//!
//! Qualifier-aware dependency resolution with sealed, pluggable property
//! storage.
//!
//! Two halves share this crate. The [`Injector`] keeps append-only candidate
//! lists per dependency kind and resolves them through a staged algorithm
//! (plain lookup, qualifier filtering, mock override). [`SealedStorage`]
//! keeps settings encrypted at rest over any [`StorageBackend`], with
//! [`Stored`] as per-slot sugar. The halves compose but do not depend on
//! each other.
//!
//! ## Features
//!
//! - **Legal ambiguity**: registering twice for one kind is not an error;
//!   queries disambiguate with qualifier tags and mock markers
//! - **Singleton promotion**: the first singleton-scoped factory product is
//!   cached as an instance candidate, exactly once, even under contention
//! - **Group partitions**: named sub-registries with top-level fallback
//! - **Recovery hook**: failed resolutions trigger a callback that may
//!   register just-in-time, then retry once
//! - **Sealed storage**: SHA-512-hashed keys, AES-256-GCM-sealed values,
//!   soft error handling through an injectable hook
//! - **Thread-safe throughout**: registration and resolution interleave
//!   freely from any number of threads
//!
//! ## Quick Start
//!
//! ```rust
//! use sealed_di::{Injector, Tag};
//! use std::sync::Arc;
//!
//! const PRIMARY: Tag = Tag::new("primary");
//!
//! trait Database: Send + Sync {
//!     fn url(&self) -> &'static str;
//! }
//!
//! struct Postgres;
//! impl Database for Postgres {
//!     fn url(&self) -> &'static str {
//!         "postgres://primary"
//!     }
//! }
//!
//! struct Sqlite;
//! impl Database for Sqlite {
//!     fn url(&self) -> &'static str {
//!         "sqlite::memory:"
//!     }
//! }
//!
//! let injector = Injector::new();
//! injector.bind::<dyn Database>().tagged(PRIMARY).to_instance(Arc::new(Postgres));
//! injector.bind::<dyn Database>().to_instance(Arc::new(Sqlite));
//!
//! // Two candidates for one kind: the qualifier picks.
//! let db = injector.query::<dyn Database>().qualified(PRIMARY).resolve()?;
//! assert_eq!(db.url(), "postgres://primary");
//! # Ok::<(), sealed_di::InjectError>(())
//! ```
//!
//! ## Mock Override
//!
//! ```rust
//! use sealed_di::Injector;
//! use std::sync::Arc;
//!
//! trait Clock: Send + Sync {
//!     fn now(&self) -> u64;
//! }
//!
//! struct SystemClock;
//! impl Clock for SystemClock {
//!     fn now(&self) -> u64 {
//!         1_724_000_000
//!     }
//! }
//!
//! struct FrozenClock;
//! impl Clock for FrozenClock {
//!     fn now(&self) -> u64 {
//!         42
//!     }
//! }
//!
//! let injector = Injector::new();
//! injector.bind::<dyn Clock>().to_instance(Arc::new(SystemClock));
//!
//! // A test overrides the real candidate without touching it.
//! injector.bind::<dyn Clock>().as_mock().to_instance(Arc::new(FrozenClock));
//!
//! let clock = injector.resolve::<dyn Clock>()?;
//! assert_eq!(clock.now(), 42);
//! # Ok::<(), sealed_di::InjectError>(())
//! ```
//!
//! ## Group Partitions
//!
//! ```rust
//! use sealed_di::Injector;
//! use std::sync::Arc;
//!
//! struct Quota(u32);
//!
//! let injector = Injector::new();
//! injector.register(Arc::new(Quota(100)));
//! injector.bind::<Quota>().in_group("premium").to_instance(Arc::new(Quota(1_000)));
//!
//! let basic = injector.resolve::<Quota>()?;
//! let premium = injector.query::<Quota>().in_group("premium").resolve()?;
//! assert_eq!((basic.0, premium.0), (100, 1_000));
//! # Ok::<(), sealed_di::InjectError>(())
//! ```
//!
//! ## Sealed Storage
//!
//! ```rust
//! use sealed_di::{MemoryBackend, SealedStorage, Stored};
//! use std::sync::Arc;
//!
//! let storage = Arc::new(SealedStorage::new(Arc::new(MemoryBackend::new())));
//! storage.register_defaults([("telemetry.enabled", false)]);
//!
//! let enabled: Stored<bool> = Stored::new(storage.clone(), "telemetry.enabled");
//! assert_eq!(enabled.get(), Some(false));
//! enabled.set(Some(&true));
//! assert_eq!(enabled.get(), Some(true));
//! ```

// Module declarations
pub mod error;
pub mod injector;
pub mod key;
pub mod scope;
pub mod storage;
pub mod stored;
pub mod tag;

// Internal modules
mod candidate;
mod registry;

// Re-export core types
pub use error::{InjectError, InjectResult, StorageError};
pub use injector::{Binding, Injector, Resolution};
pub use key::Key;
pub use scope::Scope;
pub use storage::{MemoryBackend, SealKey, SealedStorage, StorageBackend};
pub use stored::Stored;
pub use tag::{Tag, TagSet};
