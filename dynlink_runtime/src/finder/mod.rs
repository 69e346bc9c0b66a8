//! Finder protocol
//!
//! A finder resolves one operation name against one receiver-shape category.
//! Finders are built fresh for every resolution event and never cache; the
//! inline cache owns all caching.

mod array;

pub use array::ArrayMethodFinder;

use std::fmt;

use crate::call_site::CallSite;
use crate::error::ResolutionResult;
use crate::target::ResolutionTarget;
use crate::value::{RuntimeType, Value};

/// Strategy resolving an operation into an adapted target
pub trait MethodFinder {
    fn find(&self) -> ResolutionResult<ResolutionTarget>;
}

/// Everything known about one cache miss
#[derive(Debug, Clone, Copy)]
pub struct FindRequest<'a> {
    pub site: &'a CallSite,
    pub receiver_type: &'a RuntimeType,
    /// Full argument list, receiver first
    pub args: &'a [Value],
}

/// Builds the finder for one receiver shape
pub trait FinderFactory: Send + Sync + fmt::Debug {
    fn create<'a>(&self, request: FindRequest<'a>) -> Box<dyn MethodFinder + 'a>;
}

/// Factory for [`ArrayMethodFinder`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrayFinderFactory;

impl FinderFactory for ArrayFinderFactory {
    fn create<'a>(&self, request: FindRequest<'a>) -> Box<dyn MethodFinder + 'a> {
        Box::new(ArrayMethodFinder::new(
            request.site.signature(),
            request.receiver_type,
            request.args,
            request.site.name(),
            request.site.lookup(),
        ))
    }
}
