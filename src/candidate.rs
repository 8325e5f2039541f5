//! Candidate records: type-erased providers plus their capability tags.

use std::any::{Any, TypeId};
use std::sync::Arc;

use crate::tag::{Tag, TagSet};

/// Type-erased handle to a registered value.
///
/// The payload is always the typed handle `Arc<D>`, for sized and trait
/// object `D` alike, so resolution has a single downcast path and cached
/// candidates keep handle identity across resolutions.
pub(crate) type AnyHandle = Arc<dyn Any + Send + Sync>;

/// Zero-argument factory, erased at the registration boundary.
pub(crate) type FactoryFn = Arc<dyn Fn() -> AnyHandle + Send + Sync>;

/// Single-parameter factory. Yields `None` when the erased parameters are
/// not the type the factory was registered against.
pub(crate) type ParamFactoryFn = Arc<dyn Fn(&dyn Any) -> Option<AnyHandle> + Send + Sync>;

/// How a candidate produces its value.
pub(crate) enum Provider {
    /// Ready value, shared as-is.
    Instance(AnyHandle),
    /// Built on demand; eligible for singleton promotion.
    Factory(FactoryFn),
    /// Built on demand from caller-supplied parameters; never cached.
    ParamFactory {
        param: TypeId,
        build: ParamFactoryFn,
    },
}

/// One registration: a provider and the tags it was registered under.
pub(crate) struct Candidate {
    pub(crate) tags: TagSet,
    pub(crate) provider: Provider,
}

impl Candidate {
    pub(crate) fn instance<D>(value: Arc<D>, tags: TagSet) -> Candidate
    where
        D: ?Sized + Send + Sync + 'static,
    {
        Candidate {
            tags,
            provider: Provider::Instance(Arc::new(value) as AnyHandle),
        }
    }

    pub(crate) fn factory<D, F>(build: F, tags: TagSet) -> Candidate
    where
        D: ?Sized + Send + Sync + 'static,
        F: Fn() -> Arc<D> + Send + Sync + 'static,
    {
        let erased: FactoryFn = Arc::new(move || Arc::new(build()) as AnyHandle);
        Candidate {
            tags,
            provider: Provider::Factory(erased),
        }
    }

    pub(crate) fn param_factory<D, P, F>(build: F, tags: TagSet) -> Candidate
    where
        D: ?Sized + Send + Sync + 'static,
        P: 'static,
        F: Fn(&P) -> Arc<D> + Send + Sync + 'static,
    {
        let erased: ParamFactoryFn = Arc::new(move |params: &dyn Any| {
            params
                .downcast_ref::<P>()
                .map(|p| Arc::new(build(p)) as AnyHandle)
        });
        Candidate {
            tags,
            provider: Provider::ParamFactory {
                param: TypeId::of::<P>(),
                build: erased,
            },
        }
    }

    /// Wraps an already-erased value produced by a factory, keeping the
    /// factory's tags so qualified queries keep matching the cached result.
    pub(crate) fn promoted(value: AnyHandle, tags: TagSet) -> Candidate {
        Candidate {
            tags,
            provider: Provider::Instance(value),
        }
    }

    pub(crate) fn is_instance(&self) -> bool {
        matches!(self.provider, Provider::Instance(_))
    }

    pub(crate) fn is_mock(&self) -> bool {
        self.tags.contains(Tag::MOCK)
    }
}

/// Recovers the typed handle an erased value was stored as.
///
/// Every registration path pins the payload type `Arc<D>` to the key built
/// from the same `D`, so a miss here means registry corruption, not a user
/// error.
pub(crate) fn downcast_handle<D>(handle: &AnyHandle) -> Option<Arc<D>>
where
    D: ?Sized + Send + Sync + 'static,
{
    handle.downcast_ref::<Arc<D>>().map(Arc::clone)
}
