//! Dynamic Value type
//!
//! This module provides the `Value` enum flowing through call sites, the
//! `RuntimeType` a type guard compares, and the `ReceiverShape` tag used to
//! pick a finder.

use std::fmt;

use crate::array::{ArrayRef, ElementType, TypedArray};
use crate::collections::{ArrayIterator, ListView};

/// Dynamic value passed to and returned from call sites
#[derive(Debug, Clone)]
pub enum Value {
    // ========== Primitive Types ==========
    /// 64-bit signed integer
    I64(i64),
    /// 32-bit signed integer
    I32(i32),
    /// 64-bit floating point
    F64(f64),
    /// 32-bit floating point
    F32(f32),
    /// Boolean
    Bool(bool),
    /// Character
    Char(char),
    /// Nothing (unit type, like void)
    Nothing,

    // ========== Heap-Allocated Types ==========
    /// String
    Str(String),
    /// Array receiver with shared typed storage
    Array(ArrayRef),
    /// Fixed-size view over array storage
    List(ListView),
    /// Single-pass iterator over array storage
    Iterator(ArrayIterator),
    /// Runtime type constant
    Type(RuntimeType),
}

/// Concrete runtime type of a value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RuntimeType {
    I64,
    I32,
    F64,
    F32,
    Bool,
    Char,
    Nothing,
    Str,
    Array(ElementType),
    List,
    Iterator,
    Type,
}

/// Receiver shape category; each has its own finder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReceiverShape {
    Array,
    Object,
}

impl ReceiverShape {
    /// Plural noun used in resolution error messages
    pub fn noun(&self) -> &'static str {
        match self {
            ReceiverShape::Array => "arrays",
            ReceiverShape::Object => "objects",
        }
    }
}

impl RuntimeType {
    /// Shape category of this type
    pub fn shape(&self) -> ReceiverShape {
        match self {
            RuntimeType::Array(_) => ReceiverShape::Array,
            _ => ReceiverShape::Object,
        }
    }

    /// Element type, for array types
    pub fn element_type(&self) -> Option<ElementType> {
        match self {
            RuntimeType::Array(elem) => Some(*elem),
            _ => None,
        }
    }
}

impl fmt::Display for RuntimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeType::I64 => write!(f, "Int64"),
            RuntimeType::I32 => write!(f, "Int32"),
            RuntimeType::F64 => write!(f, "Float64"),
            RuntimeType::F32 => write!(f, "Float32"),
            RuntimeType::Bool => write!(f, "Bool"),
            RuntimeType::Char => write!(f, "Char"),
            RuntimeType::Nothing => write!(f, "Nothing"),
            RuntimeType::Str => write!(f, "String"),
            RuntimeType::Array(elem) => write!(f, "Array{{{}}}", elem),
            RuntimeType::List => write!(f, "ListView"),
            RuntimeType::Iterator => write!(f, "ArrayIterator"),
            RuntimeType::Type => write!(f, "Type"),
        }
    }
}

impl Value {
    /// Build an array receiver from typed storage
    pub fn array(array: TypedArray) -> Self {
        Value::Array(ArrayRef::new(array))
    }

    /// Concrete runtime type of this value
    pub fn runtime_type(&self) -> RuntimeType {
        match self {
            Value::I64(_) => RuntimeType::I64,
            Value::I32(_) => RuntimeType::I32,
            Value::F64(_) => RuntimeType::F64,
            Value::F32(_) => RuntimeType::F32,
            Value::Bool(_) => RuntimeType::Bool,
            Value::Char(_) => RuntimeType::Char,
            Value::Nothing => RuntimeType::Nothing,
            Value::Str(_) => RuntimeType::Str,
            Value::Array(arr) => RuntimeType::Array(arr.element_type()),
            Value::List(_) => RuntimeType::List,
            Value::Iterator(_) => RuntimeType::Iterator,
            Value::Type(_) => RuntimeType::Type,
        }
    }

    /// Get the type name of this value
    pub fn type_name(&self) -> String {
        self.runtime_type().to_string()
    }

    /// Check if this value is nothing
    pub fn is_nothing(&self) -> bool {
        matches!(self, Value::Nothing)
    }

    /// Try to extract as string reference
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Storage behind an array or list view
    pub fn storage(&self) -> Option<&ArrayRef> {
        match self {
            Value::Array(arr) => Some(arr),
            Value::List(list) => Some(list.storage()),
            _ => None,
        }
    }

    /// Elements of an array or list view, copied out
    pub fn elements(&self) -> Option<Vec<Value>> {
        match self {
            Value::Array(arr) => Some(arr.snapshot()),
            Value::List(list) => Some(list.to_vec()),
            _ => None,
        }
    }

    /// Human-readable rendering used by `toString`.
    ///
    /// Unlike `Display`, strings and chars are not quoted. An array that
    /// contains itself renders the back-reference as `[...]`.
    pub fn render(&self) -> String {
        let mut out = String::new();
        // writing into a String cannot fail
        let _ = self.write_to(&mut out, false, &mut Vec::new());
        out
    }

    /// Write this value, tracking the arrays currently open in `open`
    fn write_to(
        &self,
        out: &mut dyn fmt::Write,
        quoted: bool,
        open: &mut Vec<usize>,
    ) -> fmt::Result {
        if let Some(storage) = self.storage() {
            let id = storage.id();
            if open.contains(&id) {
                return out.write_str("[...]");
            }
            open.push(id);
            out.write_char('[')?;
            for (i, elem) in storage.snapshot().iter().enumerate() {
                if i > 0 {
                    out.write_str(", ")?;
                }
                elem.write_to(out, quoted, open)?;
            }
            open.pop();
            return out.write_char(']');
        }

        match self {
            Value::I64(v) => write!(out, "{}", v),
            Value::I32(v) => write!(out, "{}", v),
            Value::F64(v) => {
                if v.fract() == 0.0 && v.abs() < 1e15 {
                    write!(out, "{}.0", v)
                } else {
                    write!(out, "{}", v)
                }
            }
            Value::F32(v) => write!(out, "{}f0", v),
            Value::Bool(v) => write!(out, "{}", v),
            Value::Char(v) if quoted => write!(out, "'{}'", v),
            Value::Char(v) => out.write_char(*v),
            Value::Nothing => out.write_str("nothing"),
            Value::Str(s) if quoted => write!(out, "\"{}\"", s),
            Value::Str(s) => out.write_str(s),
            Value::Iterator(_) => out.write_str("ArrayIterator(...)"),
            Value::Type(t) => write!(out, "{}", t),
            Value::Array(_) | Value::List(_) => Ok(()),
        }
    }
}

/// Deep content equality of two array storages
///
/// A pair of storages met again while it is still being compared counts as
/// equal, so self-containing arrays terminate.
pub(crate) fn arrays_equal(lhs: &ArrayRef, rhs: &ArrayRef) -> bool {
    storages_equal(lhs, rhs, &mut Vec::new())
}

fn storages_equal(lhs: &ArrayRef, rhs: &ArrayRef, pairs: &mut Vec<(usize, usize)>) -> bool {
    if lhs.ptr_eq(rhs) {
        return true;
    }
    let pair = (lhs.id(), rhs.id());
    if pairs.contains(&pair) {
        return true;
    }
    pairs.push(pair);

    let (a, b) = (lhs.snapshot(), rhs.snapshot());
    a.len() == b.len() && a.iter().zip(&b).all(|(x, y)| values_equal(x, y, pairs))
}

fn values_equal(lhs: &Value, rhs: &Value, pairs: &mut Vec<(usize, usize)>) -> bool {
    match (lhs.storage(), rhs.storage()) {
        (Some(a), Some(b)) => storages_equal(a, b, pairs),
        (None, None) => scalars_equal(lhs, rhs),
        _ => false,
    }
}

fn scalars_equal(lhs: &Value, rhs: &Value) -> bool {
    match (lhs, rhs) {
        (Value::I64(a), Value::I64(b)) => a == b,
        (Value::I32(a), Value::I32(b)) => a == b,
        (Value::F64(a), Value::F64(b)) => a == b,
        (Value::F32(a), Value::F32(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Char(a), Value::Char(b)) => a == b,
        (Value::Nothing, Value::Nothing) => true,
        (Value::Str(a), Value::Str(b)) => a == b,
        (Value::Type(a), Value::Type(b)) => a == b,
        // Iterators carry cursor state and compare by identity
        (Value::Iterator(a), Value::Iterator(b)) => a.ptr_eq(b),
        _ => false,
    }
}

// ========== From implementations ==========

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::I64(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::I32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Value::Char(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<TypedArray> for Value {
    fn from(v: TypedArray) -> Self {
        Value::array(v)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Nothing
    }
}

// ========== Display implementation ==========

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_to(f, true, &mut Vec::new())
    }
}

// ========== PartialEq implementation ==========

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        values_equal(self, other, &mut Vec::new())
    }
}
