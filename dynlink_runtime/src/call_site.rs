//! Call sites as emitted by the compiler

use crate::lookup::Lookup;
use crate::signature::Signature;

/// Operation name, expected calling signature and access context of one
/// call site. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    name: String,
    signature: Signature,
    lookup: Lookup,
}

impl CallSite {
    pub fn new<S: Into<String>>(name: S, signature: Signature) -> Self {
        CallSite {
            name: name.into(),
            signature,
            lookup: Lookup::default(),
        }
    }

    /// Fully dynamic call site taking `arity` arguments after the receiver
    pub fn generic<S: Into<String>>(name: S, arity: usize) -> Self {
        CallSite::new(name, Signature::generic(arity + 1))
    }

    /// Replace the access context
    pub fn with_lookup(mut self, lookup: Lookup) -> Self {
        self.lookup = lookup;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn lookup(&self) -> &Lookup {
        &self.lookup
    }

    /// Declared arity, receiver excluded
    pub fn arity(&self) -> usize {
        self.signature.param_count().saturating_sub(1)
    }
}
