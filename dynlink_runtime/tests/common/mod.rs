//! Shared helpers for integration tests
// Consumed selectively by each integration test target.
#![allow(dead_code)]

use std::sync::Arc;

use dynlink_runtime::error::ResolutionResult;
use dynlink_runtime::finder::{ArrayFinderFactory, FindRequest, FinderFactory};
use dynlink_runtime::prelude::*;

/// Resolve `name` through a fully dynamic call site for `args` (receiver first)
pub fn resolve(name: &str, args: &[Value]) -> ResolutionResult<ResolutionTarget> {
    let site = CallSite::generic(name, args.len().saturating_sub(1));
    resolve_at(&site, args)
}

/// Resolve through an explicit call site
pub fn resolve_at(site: &CallSite, args: &[Value]) -> ResolutionResult<ResolutionTarget> {
    let receiver_type = args[0].runtime_type();
    let request = FindRequest {
        site,
        receiver_type: &receiver_type,
        args,
    };
    let found = ArrayFinderFactory.create(request).find();
    found
}

/// Fresh inline cache for a dynamic call site
pub fn cache_for(name: &str, arity: usize) -> InlineCache {
    InlineCache::new(Arc::new(CallSite::generic(name, arity)))
}

pub fn ints(values: &[i64]) -> Value {
    Value::array(TypedArray::I64(values.to_vec()))
}

pub fn strings(values: &[&str]) -> Value {
    Value::array(TypedArray::Str(
        values.iter().map(|s| s.to_string()).collect(),
    ))
}

pub fn letters() -> Value {
    strings(&["a", "b", "c"])
}
