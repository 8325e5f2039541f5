//! The staged resolution algorithm.
//!
//! Everything here runs inside the injector's exclusive lock, factory
//! invocation included: promotion has to be atomic with the candidate scan
//! for concurrent singleton queries to build exactly once. The only code
//! deliberately run outside the lock is the recovery hook.

use std::any::{Any, TypeId};

use crate::candidate::{AnyHandle, Candidate, Provider};
use crate::error::InjectError;
use crate::key::Key;
use crate::scope::Scope;
use crate::tag::TagSet;

use super::Injector;

/// Borrowed, type-erased view of caller-supplied factory parameters.
pub(super) struct ParamsRef<'p> {
    pub(super) id: TypeId,
    pub(super) value: &'p dyn Any,
}

enum StageOutcome {
    /// A value to hand back as-is.
    Value(AnyHandle),
    /// A factory product to cache as an instance candidate, then hand back.
    Promote { value: AnyHandle, tags: TagSet },
    /// No stage isolated a single usable candidate.
    Ambiguous,
}

impl Injector {
    /// Full resolution: one locked pass and, on failure, the recovery hook
    /// outside the lock followed by a single retry.
    pub(super) fn resolve_erased(
        &self,
        key: Key,
        scope: Scope,
        qualifiers: &TagSet,
        group: Option<&str>,
        params: Option<&ParamsRef<'_>>,
    ) -> Result<AnyHandle, InjectError> {
        let err = match self.resolve_locked(key, scope, qualifiers, group, params) {
            Ok(handle) => return Ok(handle),
            Err(err) => err,
        };

        // No lock held here, so the hook may register freely, including
        // for the key this very resolution is about.
        let hook = self.recovery.read().as_ref().cloned();
        match hook {
            Some(hook) => {
                hook(&err);
                self.resolve_locked(key, scope, qualifiers, group, params)
            }
            None => Err(err),
        }
    }

    fn resolve_locked(
        &self,
        key: Key,
        scope: Scope,
        qualifiers: &TagSet,
        group: Option<&str>,
        params: Option<&ParamsRef<'_>>,
    ) -> Result<AnyHandle, InjectError> {
        let mut state = self.state.lock();

        // Group partition first, top level as fallback. The fallback picks
        // the list, not a second resolution attempt: a grouped query that
        // fails over a group-local list does not get retried at the top.
        let list = match group {
            Some(name) => state
                .group(name)
                .and_then(|sub| sub.candidates(&key))
                .or_else(|| state.candidates(&key)),
            None => state.candidates(&key),
        };
        let list = match list {
            Some(list) => list,
            None => {
                return Err(InjectError::NotFound {
                    key,
                    qualifiers: qualifiers.clone(),
                    group: group.map(str::to_owned),
                })
            }
        };

        match run_stages(list, scope, qualifiers, params) {
            StageOutcome::Value(handle) => Ok(handle),
            StageOutcome::Promote { value, tags } => {
                // Cache through the same partition the query named, exactly
                // as an explicit registration would have.
                let record = Candidate::promoted(value.clone(), tags);
                match group {
                    Some(name) => state.group_mut(name).append(key, record),
                    None => state.append(key, record),
                }
                Ok(value)
            }
            StageOutcome::Ambiguous => Err(InjectError::MoreThanOne {
                key,
                qualifiers: qualifiers.clone(),
                group: group.map(str::to_owned),
            }),
        }
    }
}

fn run_stages(
    list: &[Candidate],
    scope: Scope,
    qualifiers: &TagSet,
    params: Option<&ParamsRef<'_>>,
) -> StageOutcome {
    let mut working: Vec<&Candidate> = list.iter().collect();

    // Unfiltered attempt: a lone candidate needs no disambiguation.
    if let Some(outcome) = try_single(&working, scope, params) {
        return outcome;
    }

    // Qualifier pass. A candidate participates when its tags cover every
    // qualifier on the query.
    if !qualifiers.is_empty() {
        let qualified: Vec<&Candidate> = working
            .iter()
            .copied()
            .filter(|c| c.tags.is_superset_of(qualifiers))
            .collect();
        if let Some(outcome) = try_single(&qualified, scope, params) {
            return outcome;
        }
        // A subset still holding several contenders narrows the field for
        // the mock pass; an empty or lone-but-unusable subset leaves the
        // working set as it was.
        if qualified.len() > 1 {
            working = qualified;
        }
    }

    // Mock pass: test stand-ins get the last word.
    let mocks: Vec<&Candidate> = working.iter().copied().filter(|c| c.is_mock()).collect();
    if let Some(outcome) = try_single(&mocks, scope, params) {
        return outcome;
    }

    StageOutcome::Ambiguous
}

/// One attempt at isolating a single usable candidate, in fixed precedence:
/// ready instance (singleton scope only), parameterized factory, then
/// zero-argument factory. `None` sends the caller on to the next stage.
fn try_single(
    candidates: &[&Candidate],
    scope: Scope,
    params: Option<&ParamsRef<'_>>,
) -> Option<StageOutcome> {
    let instance_count = candidates.iter().filter(|c| c.is_instance()).count();

    // A lone ready instance satisfies singleton queries directly. Instance
    // scope skips it: the caller asked for a fresh value.
    if scope == Scope::Singleton && instance_count == 1 {
        for candidate in candidates {
            if let Provider::Instance(handle) = &candidate.provider {
                return Some(StageOutcome::Value(handle.clone()));
            }
        }
    }

    // Parameterized build: exactly one factory registered against this
    // parameter type. The product is never cached and never registered.
    if let Some(params) = params {
        let mut matching = candidates.iter().filter_map(|c| match &c.provider {
            Provider::ParamFactory { param, build } if *param == params.id => Some(build),
            _ => None,
        });
        if let (Some(build), None) = (matching.next(), matching.next()) {
            if let Some(value) = build(params.value) {
                return Some(StageOutcome::Value(value));
            }
        }
    }

    // Zero-argument build: exactly one factory.
    let mut factories = candidates.iter().filter_map(|c| match &c.provider {
        Provider::Factory(build) => Some((build, &c.tags)),
        _ => None,
    });
    if let (Some((build, tags)), None) = (factories.next(), factories.next()) {
        let value = build();
        return Some(match scope {
            Scope::Instance => StageOutcome::Value(value),
            // The first singleton product becomes the cached instance, but
            // only when no ready instance was competing in this set.
            Scope::Singleton if instance_count == 0 => StageOutcome::Promote {
                value,
                tags: tags.clone(),
            },
            Scope::Singleton => StageOutcome::Value(value),
        });
    }

    None
}
