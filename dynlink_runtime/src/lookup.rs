//! Access-rights context and the primitive table
//!
//! Finders never call helper routines directly: they ask a [`Lookup`] for a
//! primitive by owner, name and exact signature, so a caller's access context
//! decides what a call site may bind.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;

use crate::error::{LinkError, RuntimeResult};
use crate::helpers;
use crate::signature::{Kind, Signature};
use crate::target::RawOperation;
use crate::value::Value;

/// Name under which constructors are registered
pub const CONSTRUCTOR: &str = "<init>";

/// Group of primitives sharing one access decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveOwner {
    /// Reflective queries (element count)
    Reflect,
    /// Whole-array rendering, list views and equality
    Arrays,
    /// Iterator construction
    ArrayIterator,
    /// head / tail / isEmpty
    ArrayHelper,
}

impl PrimitiveOwner {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveOwner::Reflect => "Reflect",
            PrimitiveOwner::Arrays => "Arrays",
            PrimitiveOwner::ArrayIterator => "ArrayIterator",
            PrimitiveOwner::ArrayHelper => "ArrayHelper",
        }
    }
}

impl fmt::Display for PrimitiveOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct Primitive {
    signature: Signature,
    body: fn(&[Value]) -> RuntimeResult<Value>,
}

type PrimitiveTable = HashMap<PrimitiveOwner, HashMap<&'static str, Primitive>>;

static PRIMITIVES: Lazy<PrimitiveTable> = Lazy::new(|| {
    let unary = |ret: Kind| Signature::new(vec![Kind::Array], ret);
    let mut table = PrimitiveTable::new();
    let mut register = |owner: PrimitiveOwner,
                        name: &'static str,
                        signature: Signature,
                        body: fn(&[Value]) -> RuntimeResult<Value>| {
        table
            .entry(owner)
            .or_default()
            .insert(name, Primitive { signature, body });
    };

    register(PrimitiveOwner::Reflect, "getLength", unary(Kind::I64), helpers::length);
    register(PrimitiveOwner::Arrays, "toString", unary(Kind::Str), helpers::render);
    register(PrimitiveOwner::Arrays, "asList", unary(Kind::List), helpers::as_list);
    register(
        PrimitiveOwner::Arrays,
        "equals",
        Signature::new(vec![Kind::Array, Kind::Array], Kind::Bool),
        helpers::equals,
    );
    register(
        PrimitiveOwner::ArrayIterator,
        CONSTRUCTOR,
        unary(Kind::Iterator),
        helpers::iterator,
    );
    register(PrimitiveOwner::ArrayHelper, "head", unary(Kind::Any), helpers::head);
    register(PrimitiveOwner::ArrayHelper, "tail", unary(Kind::Array), helpers::tail);
    register(PrimitiveOwner::ArrayHelper, "isEmpty", unary(Kind::Bool), helpers::is_empty);
    table
});

/// Access-rights context of the code owning a call site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
    caller: String,
    denied: Vec<PrimitiveOwner>,
}

impl Lookup {
    /// Context with full access for `caller`
    pub fn new<S: Into<String>>(caller: S) -> Self {
        Lookup {
            caller: caller.into(),
            denied: Vec::new(),
        }
    }

    /// Revoke access to every primitive of `owner`
    pub fn deny(mut self, owner: PrimitiveOwner) -> Self {
        if !self.denied.contains(&owner) {
            self.denied.push(owner);
        }
        self
    }

    pub fn caller(&self) -> &str {
        &self.caller
    }

    pub fn can_access(&self, owner: PrimitiveOwner) -> bool {
        !self.denied.contains(&owner)
    }

    /// Bind the primitive `owner.name` with exactly `signature`
    pub fn find_static(
        &self,
        owner: PrimitiveOwner,
        name: &str,
        signature: &Signature,
    ) -> Result<RawOperation, LinkError> {
        let primitive = PRIMITIVES
            .get(&owner)
            .and_then(|by_name| by_name.get(name))
            .filter(|p| p.signature == *signature)
            .ok_or_else(|| LinkError::MissingPrimitive {
                owner: owner.to_string(),
                name: name.to_string(),
                signature: signature.to_string(),
            })?;

        if !self.can_access(owner) {
            return Err(LinkError::AccessDenied {
                caller: self.caller.clone(),
                owner: owner.to_string(),
            });
        }

        let body = primitive.body;
        Ok(RawOperation::new(
            format!("{}.{}", owner, name),
            primitive.signature.clone(),
            body,
        ))
    }

    /// Bind the constructor of `owner` with exactly `signature`
    pub fn find_constructor(
        &self,
        owner: PrimitiveOwner,
        signature: &Signature,
    ) -> Result<RawOperation, LinkError> {
        self.find_static(owner, CONSTRUCTOR, signature)
    }
}

impl Default for Lookup {
    fn default() -> Self {
        Lookup::new("<runtime>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::TypedArray;

    #[test]
    fn test_find_static_binds_primitive() {
        let op = Lookup::default()
            .find_static(
                PrimitiveOwner::Reflect,
                "getLength",
                &Signature::new(vec![Kind::Array], Kind::I64),
            )
            .unwrap();
        assert_eq!(op.name(), "Reflect.getLength");
        let arr = Value::array(TypedArray::Bool(vec![true, true]));
        assert_eq!(op.invoke(&[arr]).unwrap(), Value::I64(2));
    }

    #[test]
    fn test_missing_primitive() {
        let err = Lookup::default()
            .find_static(
                PrimitiveOwner::ArrayHelper,
                "head",
                &Signature::new(vec![Kind::Array], Kind::Str),
            )
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "no primitive ArrayHelper.head(Array)String"
        );
    }

    #[test]
    fn test_access_denied() {
        let lookup = Lookup::new("sandbox").deny(PrimitiveOwner::ArrayIterator);
        assert!(!lookup.can_access(PrimitiveOwner::ArrayIterator));
        let err = lookup
            .find_constructor(
                PrimitiveOwner::ArrayIterator,
                &Signature::new(vec![Kind::Array], Kind::Iterator),
            )
            .unwrap_err();
        assert!(matches!(err, LinkError::AccessDenied { .. }));
    }
}
