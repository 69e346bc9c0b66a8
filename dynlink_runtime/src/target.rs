//! Bound operations
//!
//! A [`RawOperation`] is a primitive bound to one receiver element type but
//! still carrying its own signature. Adapting it to a call site yields a
//! [`ResolutionTarget`], the immutable value an inline cache stores.

use std::fmt;
use std::sync::Arc;

use crate::error::{LinkError, RuntimeResult};
use crate::signature::{Adapter, Kind, Signature};
use crate::value::{RuntimeType, Value};

/// Executable body of an operation; receives arguments in its own kinds
pub type OperationFn = Arc<dyn Fn(&[Value]) -> RuntimeResult<Value> + Send + Sync>;

/// Primitive operation with its native signature
#[derive(Clone)]
pub struct RawOperation {
    name: String,
    signature: Signature,
    body: OperationFn,
}

impl RawOperation {
    pub fn new<S, F>(name: S, signature: Signature, body: F) -> Self
    where
        S: Into<String>,
        F: Fn(&[Value]) -> RuntimeResult<Value> + Send + Sync + 'static,
    {
        RawOperation {
            name: name.into(),
            signature,
            body: Arc::new(body),
        }
    }

    /// Operation returning `value` and taking no arguments
    pub fn constant<S: Into<String>>(name: S, kind: Kind, value: Value) -> Self {
        RawOperation::new(name, Signature::new(Vec::new(), kind), move |_| {
            Ok(value.clone())
        })
    }

    /// Accept and ignore extra parameters of `kinds` at position `pos`
    pub fn drop_arguments(self, pos: usize, kinds: &[Kind]) -> Self {
        let count = kinds.len();
        let signature = self.signature.insert_params(pos, kinds);
        let body = self.body;
        RawOperation {
            name: self.name,
            signature,
            body: Arc::new(move |args: &[Value]| {
                let mut kept = Vec::with_capacity(args.len().saturating_sub(count));
                kept.extend_from_slice(&args[..pos.min(args.len())]);
                if pos + count < args.len() {
                    kept.extend_from_slice(&args[pos + count..]);
                }
                body(&kept)
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Call the primitive directly with arguments in its own kinds
    pub fn invoke(&self, args: &[Value]) -> RuntimeResult<Value> {
        (self.body)(args)
    }

    /// Adapt to a call site's signature and bind to a receiver type
    pub fn adapt(
        self,
        site: &Signature,
        receiver_type: RuntimeType,
    ) -> Result<ResolutionTarget, LinkError> {
        let adapter = Adapter::build(&self.signature, site)?;
        Ok(ResolutionTarget(Arc::new(TargetInner {
            name: self.name,
            receiver_type,
            signature: site.clone(),
            adapter,
            body: self.body,
        })))
    }
}

impl fmt::Debug for RawOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawOperation")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

struct TargetInner {
    name: String,
    receiver_type: RuntimeType,
    signature: Signature,
    adapter: Adapter,
    body: OperationFn,
}

/// Signature-adapted, invocable binding produced by a finder
///
/// Immutable; clones share the same binding and are safe to hand across
/// threads.
#[derive(Clone)]
pub struct ResolutionTarget(Arc<TargetInner>);

impl ResolutionTarget {
    /// Invoke with arguments shaped like the call site's signature
    pub fn invoke(&self, args: &[Value]) -> RuntimeResult<Value> {
        let inner = &*self.0;
        let adapted = inner.adapter.adapt_args(args)?;
        let result = (inner.body)(&adapted)?;
        inner.adapter.adapt_return(result)
    }

    /// Name of the bound operation
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Receiver type this target was specialized to
    pub fn receiver_type(&self) -> &RuntimeType {
        &self.0.receiver_type
    }

    /// Call-site signature this target was adapted to
    pub fn signature(&self) -> &Signature {
        &self.0.signature
    }

    pub fn adapter(&self) -> &Adapter {
        &self.0.adapter
    }

    pub fn ptr_eq(&self, other: &ResolutionTarget) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ResolutionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolutionTarget")
            .field("name", &self.0.name)
            .field("receiver_type", &self.0.receiver_type)
            .field("signature", &self.0.signature)
            .finish_non_exhaustive()
    }
}
