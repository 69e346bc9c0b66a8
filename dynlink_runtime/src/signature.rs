//! Calling signatures and signature adaptation
//!
//! A call site declares the `Signature` it will be invoked with; each
//! primitive declares its own. Resolution bridges the two by building an
//! [`Adapter`] once, holding one [`Coercion`] per parameter plus one for the
//! return value. Invocation only applies the prepared coercions.

use std::fmt;

use crate::array::ElementType;
use crate::convert::{cast, widen};
use crate::error::{LinkError, RuntimeError, RuntimeResult};
use crate::value::Value;

/// Parameter or return kind in a calling signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Untyped reference; accepts every value
    Any,
    I64,
    I32,
    F64,
    F32,
    Bool,
    Char,
    Str,
    /// No value (return position only)
    Void,
    Array,
    List,
    Iterator,
    Type,
}

impl Kind {
    /// Most specific kind describing a runtime value
    pub fn of(value: &Value) -> Kind {
        match value {
            Value::I64(_) => Kind::I64,
            Value::I32(_) => Kind::I32,
            Value::F64(_) => Kind::F64,
            Value::F32(_) => Kind::F32,
            Value::Bool(_) => Kind::Bool,
            Value::Char(_) => Kind::Char,
            Value::Str(_) => Kind::Str,
            Value::Array(_) => Kind::Array,
            Value::List(_) => Kind::List,
            Value::Iterator(_) => Kind::Iterator,
            Value::Type(_) => Kind::Type,
            Value::Nothing => Kind::Any,
        }
    }

    /// Kind of the elements stored in an array of `element_type`
    pub fn for_element(element_type: ElementType) -> Kind {
        match element_type {
            ElementType::I64 => Kind::I64,
            ElementType::I32 => Kind::I32,
            ElementType::F64 => Kind::F64,
            ElementType::F32 => Kind::F32,
            ElementType::Bool => Kind::Bool,
            ElementType::Char => Kind::Char,
            ElementType::Str => Kind::Str,
            ElementType::Any => Kind::Any,
        }
    }

    /// Lossless primitive widening
    pub fn widens_to(self, to: Kind) -> bool {
        matches!(
            (self, to),
            (Kind::I32, Kind::I64)
                | (Kind::I32, Kind::F64)
                | (Kind::I64, Kind::F64)
                | (Kind::F32, Kind::F64)
                | (Kind::Char, Kind::I32)
                | (Kind::Char, Kind::I64)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Any => "Any",
            Kind::I64 => "Int64",
            Kind::I32 => "Int32",
            Kind::F64 => "Float64",
            Kind::F32 => "Float32",
            Kind::Bool => "Bool",
            Kind::Char => "Char",
            Kind::Str => "String",
            Kind::Void => "Void",
            Kind::Array => "Array",
            Kind::List => "ListView",
            Kind::Iterator => "ArrayIterator",
            Kind::Type => "Type",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered parameter kinds (receiver first) and a return kind
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    params: Vec<Kind>,
    ret: Kind,
}

impl Signature {
    pub fn new(params: Vec<Kind>, ret: Kind) -> Self {
        Signature { params, ret }
    }

    /// All-`Any` signature, as emitted for fully dynamic call sites
    pub fn generic(param_count: usize) -> Self {
        Signature {
            params: vec![Kind::Any; param_count],
            ret: Kind::Any,
        }
    }

    pub fn params(&self) -> &[Kind] {
        &self.params
    }

    pub fn ret(&self) -> Kind {
        self.ret
    }

    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Insert parameters at `pos`, as when a primitive ignores extra arguments
    pub fn insert_params(&self, pos: usize, kinds: &[Kind]) -> Self {
        let mut params = self.params.clone();
        params.splice(pos..pos, kinds.iter().copied());
        Signature {
            params,
            ret: self.ret,
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<&str> = self.params.iter().map(Kind::as_str).collect();
        write!(f, "({}){}", params.join(", "), self.ret)
    }
}

/// Conversion applied to one value crossing the call-site boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    Identity,
    /// Lossless primitive widening to the given kind
    Widen(Kind),
    /// Checked downcast from `Any`, verified per invocation
    Cast(Kind),
    /// Return value dropped for a `Void` call site
    Discard,
    /// `Void` primitive observed through an `Any` call site
    VoidToNothing,
}

impl Coercion {
    /// Coercion taking a value of kind `from` to kind `to`, if one exists
    pub fn between(from: Kind, to: Kind) -> Option<Coercion> {
        if from == to {
            return Some(Coercion::Identity);
        }
        match (from, to) {
            (_, Kind::Void) => Some(Coercion::Discard),
            (Kind::Void, Kind::Any) => Some(Coercion::VoidToNothing),
            (Kind::Void, _) => None,
            (_, Kind::Any) => Some(Coercion::Identity),
            (Kind::Any, to) => Some(Coercion::Cast(to)),
            (from, to) if from.widens_to(to) => Some(Coercion::Widen(to)),
            _ => None,
        }
    }

    pub fn apply(&self, value: Value) -> RuntimeResult<Value> {
        match self {
            Coercion::Identity => Ok(value),
            Coercion::Widen(to) => widen(value, *to),
            Coercion::Cast(to) => cast(value, *to),
            Coercion::Discard | Coercion::VoidToNothing => Ok(Value::Nothing),
        }
    }
}

/// Prepared conversions between a primitive and a call-site signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adapter {
    params: Vec<Coercion>,
    ret: Coercion,
}

impl Adapter {
    /// Build the adapter letting `target` be called through `site`.
    pub fn build(target: &Signature, site: &Signature) -> Result<Adapter, LinkError> {
        let incompatible = || LinkError::IncompatibleSignature {
            from: target.to_string(),
            to: site.to_string(),
        };

        if target.param_count() != site.param_count() {
            return Err(incompatible());
        }

        let mut params = Vec::with_capacity(site.param_count());
        for (&from, &to) in site.params().iter().zip(target.params()) {
            if from == Kind::Void || to == Kind::Void {
                return Err(incompatible());
            }
            params.push(Coercion::between(from, to).ok_or_else(incompatible)?);
        }
        let ret = Coercion::between(target.ret(), site.ret()).ok_or_else(incompatible)?;

        Ok(Adapter { params, ret })
    }

    /// Convert call-site arguments into the primitive's parameter kinds
    pub fn adapt_args(&self, args: &[Value]) -> RuntimeResult<Vec<Value>> {
        if args.len() != self.params.len() {
            return Err(RuntimeError::argument_error(format!(
                "expected {} arguments, got {}",
                self.params.len(),
                args.len()
            )));
        }
        self.params
            .iter()
            .zip(args)
            .map(|(coercion, arg)| coercion.apply(arg.clone()))
            .collect()
    }

    /// Convert the primitive's result into the call site's return kind
    pub fn adapt_return(&self, value: Value) -> RuntimeResult<Value> {
        self.ret.apply(value)
    }

    /// Whether every conversion is the identity
    pub fn is_identity(&self) -> bool {
        self.ret == Coercion::Identity && self.params.iter().all(|c| *c == Coercion::Identity)
    }
}
