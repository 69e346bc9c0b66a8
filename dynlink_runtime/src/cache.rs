//! Per-call-site inline cache
//!
//! The cache holds at most one (type guard, target) pair. The pair is an
//! immutable `Arc` published under a lock, so a reader always sees a guard
//! together with the target resolved for it. Concurrent misses may resolve
//! redundantly; the last one to publish wins.
//!
//! ## States
//!
//! - `Unlinked`: nothing cached, the next call misses.
//! - `Linked(T)`: calls whose receiver has concrete type `T` hit.
//! - `Megamorphic`: only reachable when a [`RelinkPolicy`] threshold is set;
//!   every call resolves and nothing is installed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::call_site::CallSite;
use crate::config::DispatchConfig;
use crate::error::{ResolutionError, ResolutionResult, RuntimeError, RuntimeResult};
use crate::finder::{ArrayFinderFactory, FindRequest, FinderFactory};
use crate::target::ResolutionTarget;
use crate::value::{ReceiverShape, RuntimeType, Value};

/// Predicate over the receiver's concrete type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeGuard {
    expected: RuntimeType,
}

impl TypeGuard {
    pub fn new(expected: RuntimeType) -> Self {
        TypeGuard { expected }
    }

    #[inline]
    pub fn matches(&self, receiver_type: &RuntimeType) -> bool {
        self.expected == *receiver_type
    }

    pub fn expected(&self) -> &RuntimeType {
        &self.expected
    }
}

#[derive(Debug)]
struct CacheEntry {
    guard: TypeGuard,
    target: ResolutionTarget,
}

/// Contents of the cache slot; every transition happens under its lock
#[derive(Debug)]
enum Slot {
    Unlinked,
    Linked(Arc<CacheEntry>),
    Megamorphic,
}

/// Observable cache state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheState {
    Unlinked,
    Linked(RuntimeType),
    Megamorphic,
}

/// When a call site stops caching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RelinkPolicy {
    /// Relinks tolerated before going megamorphic; `None` relinks forever
    pub megamorphic_threshold: Option<u64>,
}

impl RelinkPolicy {
    /// Never stop relinking
    pub const UNBOUNDED: RelinkPolicy = RelinkPolicy {
        megamorphic_threshold: None,
    };
}

/// Snapshot of cache counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Successful resolutions (finder produced a target)
    pub resolutions: u64,
    pub hits: u64,
    pub misses: u64,
    /// Replacements of an installed entry
    pub relinks: u64,
}

#[derive(Debug, Default)]
struct Counters {
    resolutions: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    relinks: AtomicU64,
}

/// Inline cache bound to one call site
#[derive(Debug)]
pub struct InlineCache {
    site: Arc<CallSite>,
    slot: RwLock<Slot>,
    policy: RelinkPolicy,
    array_finders: Arc<dyn FinderFactory>,
    object_finders: Option<Arc<dyn FinderFactory>>,
    counters: Counters,
}

impl InlineCache {
    /// Unlinked cache for `site`, resolving array receivers only
    pub fn new(site: Arc<CallSite>) -> Self {
        InlineCache {
            site,
            slot: RwLock::new(Slot::Unlinked),
            policy: RelinkPolicy::UNBOUNDED,
            array_finders: Arc::new(ArrayFinderFactory),
            object_finders: None,
            counters: Counters::default(),
        }
    }

    /// Unlinked cache using the relink policy from `config`
    pub fn from_config(site: Arc<CallSite>, config: &DispatchConfig) -> Self {
        InlineCache::new(site).with_policy(config.relink_policy())
    }

    pub fn with_policy(mut self, policy: RelinkPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Finder factory for receivers that are not array-shaped
    pub fn with_object_finders(mut self, factory: Arc<dyn FinderFactory>) -> Self {
        self.object_finders = Some(factory);
        self
    }

    pub fn site(&self) -> &CallSite {
        &self.site
    }

    /// Dispatch a call; `args` holds the receiver first.
    ///
    /// Resolution failures propagate unchanged and leave the cache as it was.
    pub fn invoke(&self, args: &[Value]) -> RuntimeResult<Value> {
        let receiver = args.first().ok_or_else(|| {
            RuntimeError::argument_error(format!(
                "{} called without a receiver",
                self.site.name()
            ))
        })?;
        let receiver_type = receiver.runtime_type();

        if let Some(entry) = self.cached_entry() {
            if entry.guard.matches(&receiver_type) {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(
                    operation = self.site.name(),
                    receiver = %receiver_type,
                    "inline cache hit"
                );
                return entry.target.invoke(args);
            }
        }

        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        let target = self.resolve(&receiver_type, args)?;
        self.install(receiver_type, target.clone());
        target.invoke(args)
    }

    /// Current state
    pub fn state(&self) -> CacheState {
        match &*self.slot.read() {
            Slot::Unlinked => CacheState::Unlinked,
            Slot::Linked(entry) => CacheState::Linked(entry.guard.expected().clone()),
            Slot::Megamorphic => CacheState::Megamorphic,
        }
    }

    /// Target currently installed, if any
    pub fn cached_target(&self) -> Option<ResolutionTarget> {
        self.cached_entry().map(|entry| entry.target.clone())
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            resolutions: self.counters.resolutions.load(Ordering::Relaxed),
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            relinks: self.counters.relinks.load(Ordering::Relaxed),
        }
    }

    fn cached_entry(&self) -> Option<Arc<CacheEntry>> {
        match &*self.slot.read() {
            Slot::Linked(entry) => Some(Arc::clone(entry)),
            Slot::Unlinked | Slot::Megamorphic => None,
        }
    }

    fn resolve(
        &self,
        receiver_type: &RuntimeType,
        args: &[Value],
    ) -> ResolutionResult<ResolutionTarget> {
        let factory = match receiver_type.shape() {
            ReceiverShape::Array => &self.array_finders,
            ReceiverShape::Object => match &self.object_finders {
                Some(factory) => factory,
                None => {
                    return Err(ResolutionError::unsupported(
                        self.site.name(),
                        receiver_type.to_string(),
                    ))
                }
            },
        };

        let request = FindRequest {
            site: &self.site,
            receiver_type,
            args,
        };
        let target = factory.create(request).find()?;
        self.counters.resolutions.fetch_add(1, Ordering::Relaxed);
        Ok(target)
    }

    fn install(&self, receiver_type: RuntimeType, target: ResolutionTarget) {
        let mut slot = self.slot.write();
        let relinking = match &*slot {
            Slot::Megamorphic => return,
            Slot::Unlinked => false,
            Slot::Linked(_) => true,
        };

        if relinking {
            let relinks = self.counters.relinks.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(threshold) = self.policy.megamorphic_threshold {
                if relinks > threshold {
                    *slot = Slot::Megamorphic;
                    tracing::debug!(
                        operation = self.site.name(),
                        relinks,
                        "call site went megamorphic"
                    );
                    return;
                }
            }
            tracing::debug!(
                operation = self.site.name(),
                receiver = %receiver_type,
                "relinking call site"
            );
        } else {
            tracing::debug!(
                operation = self.site.name(),
                receiver = %receiver_type,
                "linking call site"
            );
        }

        *slot = Slot::Linked(Arc::new(CacheEntry {
            guard: TypeGuard::new(receiver_type),
            target,
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::{ElementType, TypedArray};

    fn ints() -> Value {
        Value::array(TypedArray::I64(vec![1, 2, 3]))
    }

    fn strs() -> Value {
        Value::array(TypedArray::Str(vec!["x".to_string()]))
    }

    #[test]
    fn test_guard() {
        let guard = TypeGuard::new(RuntimeType::Array(ElementType::I64));
        assert!(guard.matches(&RuntimeType::Array(ElementType::I64)));
        assert!(!guard.matches(&RuntimeType::Array(ElementType::Str)));
    }

    #[test]
    fn test_unlinked_then_linked() {
        let cache = InlineCache::new(Arc::new(CallSite::generic("size", 0)));
        assert_eq!(cache.state(), CacheState::Unlinked);
        assert_eq!(cache.invoke(&[ints()]).unwrap(), Value::I64(3));
        assert_eq!(
            cache.state(),
            CacheState::Linked(RuntimeType::Array(ElementType::I64))
        );
        assert_eq!(cache.invoke(&[ints()]).unwrap(), Value::I64(3));
        let stats = cache.stats();
        assert_eq!(stats.resolutions, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_failure_keeps_prior_entry() {
        let cache = InlineCache::new(Arc::new(CallSite::generic("head", 0)));
        cache.invoke(&[ints()]).unwrap();
        let before = cache.cached_target().unwrap();

        let err = cache.invoke(&[Value::from("not an array")]).unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::Resolution(ResolutionError::UnsupportedOperation { .. })
        ));
        assert!(cache.cached_target().unwrap().ptr_eq(&before));
    }

    #[test]
    fn test_megamorphic_threshold() {
        let policy = RelinkPolicy {
            megamorphic_threshold: Some(1),
        };
        let cache =
            InlineCache::new(Arc::new(CallSite::generic("isEmpty", 0))).with_policy(policy);
        cache.invoke(&[ints()]).unwrap();
        cache.invoke(&[strs()]).unwrap();
        assert_eq!(
            cache.state(),
            CacheState::Linked(RuntimeType::Array(ElementType::Str))
        );
        cache.invoke(&[ints()]).unwrap();
        assert_eq!(cache.state(), CacheState::Megamorphic);

        // still answers, resolving every time
        let before = cache.stats().resolutions;
        assert_eq!(cache.invoke(&[ints()]).unwrap(), Value::Bool(false));
        assert_eq!(cache.stats().resolutions, before + 1);
        assert!(cache.cached_target().is_none());
    }

    #[test]
    fn test_missing_receiver() {
        let cache = InlineCache::new(Arc::new(CallSite::generic("size", 0)));
        assert!(matches!(
            cache.invoke(&[]),
            Err(RuntimeError::ArgumentError(_))
        ));
        assert_eq!(cache.state(), CacheState::Unlinked);
    }

    #[test]
    fn test_megamorphic_slot_refuses_install() {
        let policy = RelinkPolicy {
            megamorphic_threshold: Some(0),
        };
        let site = Arc::new(CallSite::generic("size", 0));
        let cache = InlineCache::new(Arc::clone(&site)).with_policy(policy);
        cache.invoke(&[ints()]).unwrap();
        cache.invoke(&[strs()]).unwrap();
        assert_eq!(cache.state(), CacheState::Megamorphic);

        // a miss that resolved before the transition publishes afterwards
        let receiver_type = strs().runtime_type();
        let late = cache.resolve(&receiver_type, &[strs()]).unwrap();
        cache.install(receiver_type, late);
        assert_eq!(cache.state(), CacheState::Megamorphic);
        assert!(cache.cached_target().is_none());

        let hits = cache.stats().hits;
        cache.invoke(&[strs()]).unwrap();
        assert_eq!(cache.stats().hits, hits);
    }
}
