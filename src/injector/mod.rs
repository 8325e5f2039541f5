//! The injector: registration surface, query surface, and the recovery hook.

mod algorithm;

use std::any::{Any, TypeId};
use std::marker::PhantomData;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};

use crate::candidate::{downcast_handle, AnyHandle, Candidate};
use crate::error::{InjectError, InjectResult};
use crate::key::Key;
use crate::registry::Registry;
use crate::scope::Scope;
use crate::tag::{Tag, TagSet};

use self::algorithm::ParamsRef;

type RecoveryHook = Arc<dyn Fn(&InjectError) + Send + Sync>;

/// Thread-safe dependency registry and resolver.
///
/// One `Injector` owns one registry: per-key, ordered, append-only candidate
/// lists, partitioned further by named groups. Registration and resolution
/// may interleave freely from any number of threads; every operation runs
/// under one exclusive lock, so each call observes a consistent registry and
/// singleton promotion happens exactly once per key.
///
/// Factories registered through [`Injector::bind`] run while that lock is
/// held. They must not call back into the same injector; the lock is not
/// re-entrant. The one sanctioned re-entry point is the recovery hook (see
/// [`Injector::set_recovery_hook`]), which always runs with the lock
/// released.
///
/// Use [`Injector::standard`] for the process-wide instance, or
/// [`Injector::new`] for an isolated one (tests want the latter).
///
/// # Examples
///
/// ```rust
/// use sealed_di::{Injector, Tag};
/// use std::sync::Arc;
///
/// trait Mailer: Send + Sync {
///     fn send(&self, to: &str) -> String;
/// }
///
/// struct Smtp;
/// impl Mailer for Smtp {
///     fn send(&self, to: &str) -> String {
///         format!("smtp -> {}", to)
///     }
/// }
///
/// let injector = Injector::new();
/// injector.bind::<dyn Mailer>().to_instance(Arc::new(Smtp));
///
/// let mailer = injector.resolve::<dyn Mailer>()?;
/// assert_eq!(mailer.send("ops"), "smtp -> ops");
/// # Ok::<(), sealed_di::InjectError>(())
/// ```
pub struct Injector {
    state: Mutex<Registry>,
    recovery: RwLock<Option<RecoveryHook>>,
}

static STANDARD: Lazy<Injector> = Lazy::new(Injector::new);

impl Injector {
    /// Creates an empty, isolated injector.
    pub fn new() -> Injector {
        Injector {
            state: Mutex::new(Registry::new()),
            recovery: RwLock::new(None),
        }
    }

    /// The process-wide injector, created on first use and never torn down.
    ///
    /// Registrations against it are visible everywhere in the process, which
    /// is what application wiring wants and test isolation does not; tests
    /// should prefer [`Injector::new`].
    pub fn standard() -> &'static Injector {
        &STANDARD
    }

    /// Starts a registration for `D`.
    ///
    /// Registration is pure appending: nothing is validated, replaced, or
    /// deduplicated, and ambiguity surfaces at resolution time, not here.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sealed_di::{Injector, Tag};
    /// use std::sync::Arc;
    ///
    /// const REPLICA: Tag = Tag::new("replica");
    ///
    /// struct Conn(&'static str);
    ///
    /// let injector = Injector::new();
    /// injector.bind::<Conn>().tagged(REPLICA).to_instance(Arc::new(Conn("r1")));
    /// injector.bind::<Conn>().in_group("reporting").to_factory(|| Arc::new(Conn("fresh")));
    /// ```
    pub fn bind<D>(&self) -> Binding<'_, D>
    where
        D: ?Sized + Send + Sync + 'static,
    {
        Binding {
            injector: self,
            tags: TagSet::new(),
            group: None,
            _marker: PhantomData,
        }
    }

    /// Registers a ready value for `D` with no tags and no group.
    ///
    /// Shorthand for `bind::<D>().to_instance(value)`.
    pub fn register<D>(&self, value: Arc<D>)
    where
        D: ?Sized + Send + Sync + 'static,
    {
        self.bind::<D>().to_instance(value);
    }

    /// Starts a query for `D`.
    ///
    /// The default query has [`Scope::Singleton`], no qualifiers, and no
    /// group.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sealed_di::{Injector, Scope, Tag};
    /// use std::sync::Arc;
    ///
    /// const PRIMARY: Tag = Tag::new("primary");
    ///
    /// struct Conn(&'static str);
    ///
    /// let injector = Injector::new();
    /// injector.bind::<Conn>().tagged(PRIMARY).to_instance(Arc::new(Conn("p")));
    /// injector.bind::<Conn>().to_instance(Arc::new(Conn("other")));
    ///
    /// let conn = injector.query::<Conn>().qualified(PRIMARY).resolve()?;
    /// assert_eq!(conn.0, "p");
    /// # Ok::<(), sealed_di::InjectError>(())
    /// ```
    pub fn query<D>(&self) -> Resolution<'_, D>
    where
        D: ?Sized + Send + Sync + 'static,
    {
        Resolution {
            injector: self,
            scope: Scope::Singleton,
            qualifiers: TagSet::new(),
            group: None,
            _marker: PhantomData,
        }
    }

    /// Resolves `D` with the default query.
    ///
    /// Shorthand for `query::<D>().resolve()`.
    pub fn resolve<D>(&self) -> InjectResult<Arc<D>>
    where
        D: ?Sized + Send + Sync + 'static,
    {
        self.query::<D>().resolve()
    }

    /// Resolves `D` with the default query, dropping the error detail.
    ///
    /// Shorthand for `query::<D>().resolve_opt()`.
    pub fn resolve_opt<D>(&self) -> Option<Arc<D>>
    where
        D: ?Sized + Send + Sync + 'static,
    {
        self.query::<D>().resolve_opt()
    }

    /// Installs the recovery hook, replacing any previous one.
    ///
    /// The hook runs after a resolution fails, with the registry lock
    /// released, and may register candidates, including for the failing
    /// key. The failed resolution is then retried exactly once; a second
    /// failure is returned without re-invoking the hook.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sealed_di::Injector;
    /// use std::sync::Arc;
    ///
    /// struct Fallback(u16);
    ///
    /// let injector = Arc::new(Injector::new());
    /// let wiring = injector.clone();
    /// injector.set_recovery_hook(move |_err| {
    ///     wiring.register(Arc::new(Fallback(8080)));
    /// });
    ///
    /// let value = injector.resolve::<Fallback>()?;
    /// assert_eq!(value.0, 8080);
    /// # Ok::<(), sealed_di::InjectError>(())
    /// ```
    pub fn set_recovery_hook<F>(&self, hook: F)
    where
        F: Fn(&InjectError) + Send + Sync + 'static,
    {
        *self.recovery.write() = Some(Arc::new(hook));
    }

    /// Removes the recovery hook; later failures return their error
    /// directly.
    pub fn clear_recovery_hook(&self) {
        *self.recovery.write() = None;
    }

    fn append(&self, group: Option<String>, key: Key, candidate: Candidate) {
        let mut state = self.state.lock();
        match group {
            Some(name) => state.group_mut(&name).append(key, candidate),
            None => state.append(key, candidate),
        }
    }
}

impl Default for Injector {
    fn default() -> Injector {
        Injector::new()
    }
}

/// In-flight registration for one dependency kind.
///
/// Built by [`Injector::bind`]; collects tags and an optional group, then
/// commits through one of the `to_*` terminals. Dropping a binding without
/// calling a terminal registers nothing.
pub struct Binding<'i, D: ?Sized> {
    injector: &'i Injector,
    tags: TagSet,
    group: Option<String>,
    _marker: PhantomData<D>,
}

impl<'i, D> Binding<'i, D>
where
    D: ?Sized + Send + Sync + 'static,
{
    /// Attaches one capability tag.
    pub fn tagged(mut self, tag: Tag) -> Self {
        self.tags.insert(tag);
        self
    }

    /// Attaches several capability tags.
    pub fn tagged_by<I>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = Tag>,
    {
        self.tags.extend(tags);
        self
    }

    /// Marks the candidate as a test stand-in. Shorthand for
    /// `tagged(Tag::MOCK)`.
    pub fn as_mock(self) -> Self {
        self.tagged(Tag::MOCK)
    }

    /// Registers into the named group partition instead of the top level.
    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Commits a ready value.
    pub fn to_instance(self, value: Arc<D>) {
        let Binding {
            injector,
            tags,
            group,
            ..
        } = self;
        injector.append(group, Key::of::<D>(), Candidate::instance(value, tags));
    }

    /// Commits a zero-argument factory.
    ///
    /// The factory runs under the registry lock and must not call back into
    /// the injector. Its product may be promoted to a cached instance by a
    /// singleton-scoped query.
    pub fn to_factory<F>(self, build: F)
    where
        F: Fn() -> Arc<D> + Send + Sync + 'static,
    {
        let Binding {
            injector,
            tags,
            group,
            ..
        } = self;
        injector.append(group, Key::of::<D>(), Candidate::factory(build, tags));
    }

    /// Commits a single-parameter factory.
    ///
    /// The candidate participates only in queries supplying a `P`; its
    /// products are never cached. The same locking rule as
    /// [`Binding::to_factory`] applies.
    pub fn to_factory_with<P, F>(self, build: F)
    where
        P: 'static,
        F: Fn(&P) -> Arc<D> + Send + Sync + 'static,
    {
        let Binding {
            injector,
            tags,
            group,
            ..
        } = self;
        injector.append(group, Key::of::<D>(), Candidate::param_factory(build, tags));
    }
}

/// In-flight query for one dependency kind.
///
/// Built by [`Injector::query`]; collects scope, qualifiers, and an optional
/// group, then resolves through one of the terminals. The same staged
/// algorithm backs all three:
///
/// 1. the whole candidate list, hoping for a lone candidate;
/// 2. the qualifier-filtered subset (tags must cover the qualifiers);
/// 3. the mock-tagged survivors.
///
/// The first stage to isolate exactly one usable candidate wins; running out
/// of stages is [`InjectError::MoreThanOne`].
pub struct Resolution<'i, D: ?Sized> {
    injector: &'i Injector,
    scope: Scope,
    qualifiers: TagSet,
    group: Option<String>,
    _marker: PhantomData<D>,
}

impl<'i, D> Resolution<'i, D>
where
    D: ?Sized + Send + Sync + 'static,
{
    /// Sets the scope. Defaults to [`Scope::Singleton`].
    pub fn scoped(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// Adds one qualifier tag.
    pub fn qualified(mut self, tag: Tag) -> Self {
        self.qualifiers.insert(tag);
        self
    }

    /// Adds several qualifier tags.
    pub fn qualified_by<I>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = Tag>,
    {
        self.qualifiers.extend(tags);
        self
    }

    /// Targets the named group partition, falling back to the top level
    /// when the group has no list for this key.
    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Runs the query.
    pub fn resolve(self) -> InjectResult<Arc<D>> {
        let Resolution {
            injector,
            scope,
            qualifiers,
            group,
            ..
        } = self;
        let handle =
            injector.resolve_erased(Key::of::<D>(), scope, &qualifiers, group.as_deref(), None)?;
        Ok(typed(&handle))
    }

    /// Runs the query, dropping the error detail.
    pub fn resolve_opt(self) -> Option<Arc<D>> {
        self.resolve().ok()
    }

    /// Runs the query with factory parameters.
    ///
    /// Only a single-parameter factory registered against the same `P` can
    /// consume them; the built value is never cached. Candidates of other
    /// provider kinds still participate in their own algorithm steps.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sealed_di::{Injector, Scope};
    /// use std::sync::Arc;
    ///
    /// struct Greeting(String);
    ///
    /// let injector = Injector::new();
    /// injector
    ///     .bind::<Greeting>()
    ///     .to_factory_with(|name: &String| Arc::new(Greeting(format!("hi {}", name))));
    ///
    /// let greeting = injector
    ///     .query::<Greeting>()
    ///     .scoped(Scope::Instance)
    ///     .resolve_with(&"ada".to_string())?;
    /// assert_eq!(greeting.0, "hi ada");
    /// # Ok::<(), sealed_di::InjectError>(())
    /// ```
    pub fn resolve_with<P>(self, params: &P) -> InjectResult<Arc<D>>
    where
        P: 'static,
    {
        let Resolution {
            injector,
            scope,
            qualifiers,
            group,
            ..
        } = self;
        let params = ParamsRef {
            id: TypeId::of::<P>(),
            value: params as &dyn Any,
        };
        let handle = injector.resolve_erased(
            Key::of::<D>(),
            scope,
            &qualifiers,
            group.as_deref(),
            Some(&params),
        )?;
        Ok(typed(&handle))
    }
}

fn typed<D>(handle: &AnyHandle) -> Arc<D>
where
    D: ?Sized + Send + Sync + 'static,
{
    // Every registration path pins the payload type to the key built from
    // the same D, so a miss here is registry corruption.
    downcast_handle::<D>(handle).expect("candidate payload matches its key")
}
