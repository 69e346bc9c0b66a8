//! Tests for the per-call-site inline cache.

mod common;

use std::sync::Arc;

use common::*;
use dynlink_runtime::error::{ResolutionResult, RuntimeResult};
use dynlink_runtime::finder::{FindRequest, FinderFactory, MethodFinder};
use dynlink_runtime::prelude::*;
use dynlink_runtime::target::RawOperation;
use pretty_assertions::assert_eq;

// ==================== Linking ====================

#[test]
fn test_same_type_resolves_once() {
    let cache = cache_for("size", 0);
    for n in 0..10 {
        let arr = ints(&vec![0; n]);
        assert_eq!(cache.invoke(&[arr]).unwrap(), Value::I64(n as i64));
    }
    let stats = cache.stats();
    assert_eq!(stats.resolutions, 1);
    assert_eq!(stats.hits, 9);
    assert_eq!(stats.relinks, 0);
}

#[test]
fn test_type_change_relinks_once() {
    let cache = cache_for("head", 0);
    assert_eq!(cache.invoke(&[ints(&[1, 2])]).unwrap(), Value::I64(1));
    assert_eq!(cache.invoke(&[ints(&[3])]).unwrap(), Value::I64(3));
    assert_eq!(cache.stats().resolutions, 1);

    assert_eq!(cache.invoke(&[letters()]).unwrap(), Value::from("a"));
    assert_eq!(cache.invoke(&[strings(&["q"])]).unwrap(), Value::from("q"));
    let stats = cache.stats();
    assert_eq!(stats.resolutions, 2);
    assert_eq!(stats.relinks, 1);
    assert_eq!(
        cache.state(),
        CacheState::Linked(RuntimeType::Array(ElementType::Str))
    );
}

#[test]
fn test_hit_reuses_installed_target() {
    let cache = cache_for("get", 1);
    cache.invoke(&[letters(), Value::I64(0)]).unwrap();
    let installed = cache.cached_target().unwrap();
    cache.invoke(&[letters(), Value::I64(2)]).unwrap();
    assert!(cache.cached_target().unwrap().ptr_eq(&installed));
    assert_eq!(installed.receiver_type(), &RuntimeType::Array(ElementType::Str));
}

// ==================== Failures ====================

#[test]
fn test_resolution_failure_leaves_state() {
    let cache = cache_for("size", 0);
    let err = cache.invoke(&[Value::I64(4)]).unwrap_err();
    insta::assert_snapshot!(err, @"size is not supported on Int64");
    assert_eq!(cache.state(), CacheState::Unlinked);
    assert_eq!(cache.stats().resolutions, 0);
}

#[test]
fn test_arity_failure_is_not_cached() {
    let cache = cache_for("get", 0);
    for _ in 0..3 {
        let err = cache.invoke(&[letters()]).unwrap_err();
        assert!(matches!(
            err.as_resolution(),
            Some(ResolutionError::ArityMismatch { .. })
        ));
    }
    let stats = cache.stats();
    assert_eq!(stats.misses, 3);
    assert_eq!(stats.resolutions, 0);
    assert_eq!(cache.state(), CacheState::Unlinked);
}

#[test]
fn test_invocation_error_keeps_link() {
    let cache = cache_for("head", 0);
    assert!(cache.invoke(&[ints(&[])]).is_err());
    assert_eq!(
        cache.state(),
        CacheState::Linked(RuntimeType::Array(ElementType::I64))
    );
    assert_eq!(cache.invoke(&[ints(&[5])]).unwrap(), Value::I64(5));
    assert_eq!(cache.stats().resolutions, 1);
}

// ==================== Megamorphic Policy ====================

#[test]
fn test_unbounded_policy_keeps_relinking() {
    let cache = cache_for("isEmpty", 0);
    for i in 0..20 {
        let receiver = if i % 2 == 0 { ints(&[]) } else { letters() };
        cache.invoke(&[receiver]).unwrap();
    }
    assert_eq!(cache.stats().relinks, 19);
    assert_eq!(
        cache.state(),
        CacheState::Linked(RuntimeType::Array(ElementType::Str))
    );
}

#[test]
fn test_threshold_from_config() {
    let config =
        DispatchConfig::from_toml_str("[inline_cache]\nmegamorphic_threshold = 2\n").unwrap();
    let cache = InlineCache::from_config(Arc::new(CallSite::generic("size", 0)), &config);
    let floats = Value::array(TypedArray::F64(vec![1.0]));

    cache.invoke(&[ints(&[1])]).unwrap();
    cache.invoke(&[letters()]).unwrap();
    cache.invoke(&[floats.clone()]).unwrap();
    assert_eq!(
        cache.state(),
        CacheState::Linked(RuntimeType::Array(ElementType::F64))
    );

    cache.invoke(&[ints(&[1])]).unwrap();
    assert_eq!(cache.state(), CacheState::Megamorphic);

    let before = cache.stats();
    assert_eq!(cache.invoke(&[floats]).unwrap(), Value::I64(1));
    let after = cache.stats();
    assert_eq!(after.resolutions, before.resolutions + 1);
    assert_eq!(after.hits, before.hits);
    assert_eq!(cache.state(), CacheState::Megamorphic);
}

#[test]
fn test_concurrent_megamorphic_transition() {
    let policy = RelinkPolicy {
        megamorphic_threshold: Some(0),
    };
    for _ in 0..50 {
        let cache = cache_for("isEmpty", 0).with_policy(policy);
        std::thread::scope(|scope| {
            for t in 0..4 {
                let cache = &cache;
                scope.spawn(move || {
                    for i in 0..20 {
                        let receiver = if (t + i) % 2 == 0 { ints(&[]) } else { letters() };
                        cache.invoke(&[receiver]).unwrap();
                    }
                });
            }
        });

        if cache.state() == CacheState::Megamorphic {
            assert!(cache.cached_target().is_none());
            let hits = cache.stats().hits;
            cache.invoke(&[letters()]).unwrap();
            assert_eq!(cache.stats().hits, hits);
        }
    }
}

// ==================== Object Finders ====================

#[derive(Debug)]
struct StringFinders;

struct StringLengthFinder<'a> {
    request: FindRequest<'a>,
}

fn char_count(args: &[Value]) -> RuntimeResult<Value> {
    let s = args[0]
        .as_str()
        .ok_or_else(|| RuntimeError::type_error("expected String"))?;
    Ok(Value::I64(s.chars().count() as i64))
}

impl MethodFinder for StringLengthFinder<'_> {
    fn find(&self) -> ResolutionResult<ResolutionTarget> {
        let name = self.request.site.name();
        if name != "length" {
            return Err(ResolutionError::unsupported(name, "strings"));
        }
        RawOperation::new(
            "String.length",
            Signature::new(vec![Kind::Str], Kind::I64),
            char_count,
        )
        .adapt(self.request.site.signature(), self.request.receiver_type.clone())
        .map_err(|cause| ResolutionError::failure(name, cause))
    }
}

impl FinderFactory for StringFinders {
    fn create<'a>(&self, request: FindRequest<'a>) -> Box<dyn MethodFinder + 'a> {
        Box::new(StringLengthFinder { request })
    }
}

#[test]
fn test_object_finder_factory() {
    let cache = cache_for("length", 0).with_object_finders(Arc::new(StringFinders));
    assert_eq!(cache.invoke(&[Value::from("héllo")]).unwrap(), Value::I64(5));
    assert_eq!(cache.state(), CacheState::Linked(RuntimeType::Str));

    // arrays still go to the array finder
    assert_eq!(cache.invoke(&[ints(&[1, 2])]).unwrap(), Value::I64(2));
    assert_eq!(cache.stats().resolutions, 2);

    let err = cache_for("upper", 0)
        .with_object_finders(Arc::new(StringFinders))
        .invoke(&[Value::from("x")])
        .unwrap_err();
    insta::assert_snapshot!(err, @"upper is not supported on strings");
}

// ==================== Concurrency ====================

#[test]
fn test_concurrent_invocations() {
    let cache = cache_for("head", 0);
    let per_thread = 200;

    std::thread::scope(|scope| {
        for t in 0..8 {
            let cache = &cache;
            scope.spawn(move || {
                for i in 0..per_thread {
                    if (t + i) % 2 == 0 {
                        let value = Value::I64(t as i64);
                        assert_eq!(cache.invoke(&[ints(&[t as i64])]).unwrap(), value);
                    } else {
                        let value = Value::from("s");
                        assert_eq!(cache.invoke(&[strings(&["s"])]).unwrap(), value);
                    }
                }
            });
        }
    });

    let stats = cache.stats();
    assert_eq!(stats.hits + stats.misses, 8 * per_thread as u64);
    assert_eq!(stats.resolutions, stats.misses);
    assert!(matches!(cache.state(), CacheState::Linked(_)));
}
