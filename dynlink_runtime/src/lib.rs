//! Dynamic call-site linking for array receivers
//!
//! This crate resolves dynamically-named operations invoked on array values
//! at runtime. It includes:
//!
//! - `Value` enum and typed array storage
//! - The array operation registry and its finder
//! - Signature adaptation of bound primitives
//! - A per-call-site inline cache with a type guard
//! - `ResolutionError` / `RuntimeError` for error handling

pub mod array;
pub mod cache;
pub mod call_site;
pub mod collections;
pub mod config;
pub mod convert;
pub mod error;
pub mod finder;
mod helpers;
pub mod lookup;
pub mod registry;
pub mod signature;
pub mod target;
pub mod value;

/// Prelude module for convenient imports
///
/// # Example
/// ```
/// use dynlink_runtime::prelude::*;
/// use std::sync::Arc;
///
/// let cache = InlineCache::new(Arc::new(CallSite::generic("size", 0)));
/// let arr = Value::array(TypedArray::I64(vec![1, 2, 3]));
/// assert_eq!(cache.invoke(&[arr]).unwrap(), Value::I64(3));
/// ```
pub mod prelude {
    pub use super::array::{ElementType, TypedArray};
    pub use super::cache::{CacheState, CacheStats, InlineCache, RelinkPolicy};
    pub use super::call_site::CallSite;
    pub use super::config::DispatchConfig;
    pub use super::error::{LinkError, ResolutionError, RuntimeError};
    pub use super::finder::{ArrayFinderFactory, FinderFactory, MethodFinder};
    pub use super::signature::{Kind, Signature};
    pub use super::target::ResolutionTarget;
    pub use super::value::{RuntimeType, Value};
}

pub use prelude::*;
