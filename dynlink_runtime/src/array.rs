//! Array storage and primitive element access
//!
//! Arrays are homogeneous typed storage shared behind an `Arc`, so list views
//! and iterators produced by call sites observe writes made through `set`.
//! The element-access primitives here are what finders bind `get`, `set` and
//! `size` against; each is selected per element type.

// SAFETY: i64→usize casts happen after `checked_index` rejects negatives;
// usize→i64 casts are array lengths, far below i64::MAX.
#![allow(clippy::cast_sign_loss, clippy::cast_possible_wrap)]

use std::fmt;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{RuntimeError, RuntimeResult};
use crate::value::Value;

/// Element type of an array receiver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    I64,
    I32,
    F64,
    F32,
    Bool,
    Char,
    Str,
    /// Dynamically typed elements
    Any,
}

impl ElementType {
    /// Get the element type name
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::I64 => "Int64",
            ElementType::I32 => "Int32",
            ElementType::F64 => "Float64",
            ElementType::F32 => "Float32",
            ElementType::Bool => "Bool",
            ElementType::Char => "Char",
            ElementType::Str => "String",
            ElementType::Any => "Any",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed array enum for efficient storage
///
/// Stores homogeneous arrays without boxing overhead.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedArray {
    /// Array of 64-bit integers
    I64(Vec<i64>),
    /// Array of 32-bit integers
    I32(Vec<i32>),
    /// Array of 64-bit floats
    F64(Vec<f64>),
    /// Array of 32-bit floats
    F32(Vec<f32>),
    /// Array of booleans
    Bool(Vec<bool>),
    /// Array of characters
    Char(Vec<char>),
    /// Array of strings
    Str(Vec<String>),
    /// Array of dynamic values (fallback)
    Any(Vec<Value>),
}

impl TypedArray {
    /// Create an empty array with the given element type
    pub fn empty(element_type: ElementType) -> Self {
        match element_type {
            ElementType::I64 => TypedArray::I64(Vec::new()),
            ElementType::I32 => TypedArray::I32(Vec::new()),
            ElementType::F64 => TypedArray::F64(Vec::new()),
            ElementType::F32 => TypedArray::F32(Vec::new()),
            ElementType::Bool => TypedArray::Bool(Vec::new()),
            ElementType::Char => TypedArray::Char(Vec::new()),
            ElementType::Str => TypedArray::Str(Vec::new()),
            ElementType::Any => TypedArray::Any(Vec::new()),
        }
    }

    /// Build an array of the given element type from dynamic values.
    ///
    /// Every value must already have the element type's exact variant.
    pub fn from_values(element_type: ElementType, values: Vec<Value>) -> RuntimeResult<Self> {
        let mut array = TypedArray::empty(element_type);
        for value in values {
            array.push(value)?;
        }
        Ok(array)
    }

    /// Get the length of the array
    pub fn len(&self) -> usize {
        match self {
            TypedArray::I64(v) => v.len(),
            TypedArray::I32(v) => v.len(),
            TypedArray::F64(v) => v.len(),
            TypedArray::F32(v) => v.len(),
            TypedArray::Bool(v) => v.len(),
            TypedArray::Char(v) => v.len(),
            TypedArray::Str(v) => v.len(),
            TypedArray::Any(v) => v.len(),
        }
    }

    /// Check if the array is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the element type
    pub fn element_type(&self) -> ElementType {
        match self {
            TypedArray::I64(_) => ElementType::I64,
            TypedArray::I32(_) => ElementType::I32,
            TypedArray::F64(_) => ElementType::F64,
            TypedArray::F32(_) => ElementType::F32,
            TypedArray::Bool(_) => ElementType::Bool,
            TypedArray::Char(_) => ElementType::Char,
            TypedArray::Str(_) => ElementType::Str,
            TypedArray::Any(_) => ElementType::Any,
        }
    }

    /// Convert to Value array (the generic element-array view)
    pub fn to_value_vec(&self) -> Vec<Value> {
        match self {
            TypedArray::I64(v) => v.iter().map(|&x| Value::I64(x)).collect(),
            TypedArray::I32(v) => v.iter().map(|&x| Value::I32(x)).collect(),
            TypedArray::F64(v) => v.iter().map(|&x| Value::F64(x)).collect(),
            TypedArray::F32(v) => v.iter().map(|&x| Value::F32(x)).collect(),
            TypedArray::Bool(v) => v.iter().map(|&x| Value::Bool(x)).collect(),
            TypedArray::Char(v) => v.iter().map(|&x| Value::Char(x)).collect(),
            TypedArray::Str(v) => v.iter().map(|x| Value::Str(x.clone())).collect(),
            TypedArray::Any(v) => v.clone(),
        }
    }

    /// Element at a zero-based position, `None` past the end
    pub fn get(&self, index: usize) -> Option<Value> {
        match self {
            TypedArray::I64(v) => v.get(index).map(|&x| Value::I64(x)),
            TypedArray::I32(v) => v.get(index).map(|&x| Value::I32(x)),
            TypedArray::F64(v) => v.get(index).map(|&x| Value::F64(x)),
            TypedArray::F32(v) => v.get(index).map(|&x| Value::F32(x)),
            TypedArray::Bool(v) => v.get(index).map(|&x| Value::Bool(x)),
            TypedArray::Char(v) => v.get(index).map(|&x| Value::Char(x)),
            TypedArray::Str(v) => v.get(index).map(|x| Value::Str(x.clone())),
            TypedArray::Any(v) => v.get(index).cloned(),
        }
    }

    fn push(&mut self, value: Value) -> RuntimeResult<()> {
        match (self, value) {
            (TypedArray::I64(v), Value::I64(x)) => v.push(x),
            (TypedArray::I32(v), Value::I32(x)) => v.push(x),
            (TypedArray::F64(v), Value::F64(x)) => v.push(x),
            (TypedArray::F32(v), Value::F32(x)) => v.push(x),
            (TypedArray::Bool(v), Value::Bool(x)) => v.push(x),
            (TypedArray::Char(v), Value::Char(x)) => v.push(x),
            (TypedArray::Str(v), Value::Str(x)) => v.push(x),
            (TypedArray::Any(v), x) => v.push(x),
            (array, value) => return Err(store_error(array.element_type(), &value)),
        }
        Ok(())
    }
}

fn store_error(element_type: ElementType, value: &Value) -> RuntimeError {
    RuntimeError::type_error(format!(
        "cannot store {} in Array{{{}}}",
        value.type_name(),
        element_type
    ))
}

/// Shared handle to array storage
///
/// Cloning the handle aliases the same storage.
#[derive(Clone)]
pub struct ArrayRef(Arc<RwLock<TypedArray>>);

impl ArrayRef {
    pub fn new(array: TypedArray) -> Self {
        ArrayRef(Arc::new(RwLock::new(array)))
    }

    pub fn element_type(&self) -> ElementType {
        self.0.read().element_type()
    }

    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn read(&self) -> RwLockReadGuard<'_, TypedArray> {
        self.0.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, TypedArray> {
        self.0.write()
    }

    /// Copy the elements out as dynamic values, releasing the lock
    pub fn snapshot(&self) -> Vec<Value> {
        self.0.read().to_value_vec()
    }

    /// Whether both handles alias the same storage
    pub fn ptr_eq(&self, other: &ArrayRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Address of the storage; equal for handles that alias each other
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }
}

impl fmt::Debug for ArrayRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // elements are left out, an `Array{Any}` may contain itself
        let array = self.0.read();
        f.debug_struct("ArrayRef")
            .field("element_type", &array.element_type())
            .field("len", &array.len())
            .finish()
    }
}

impl From<TypedArray> for ArrayRef {
    fn from(array: TypedArray) -> Self {
        ArrayRef::new(array)
    }
}

// ========== Element access primitives ==========

/// Indexed read primitive for one element type
pub type ElementGetter = fn(&TypedArray, i64) -> RuntimeResult<Value>;

/// Indexed write primitive for one element type
pub type ElementSetter = fn(&mut TypedArray, i64, Value) -> RuntimeResult<()>;

/// Check a zero-based index against an array length
pub fn checked_index(index: i64, length: usize) -> RuntimeResult<usize> {
    if index < 0 || index >= length as i64 {
        return Err(RuntimeError::bounds_error(index, length));
    }
    Ok(index as usize)
}

macro_rules! element_access {
    ($getter:ident, $setter:ident, $variant:ident, $elem:expr) => {
        fn $getter(array: &TypedArray, index: i64) -> RuntimeResult<Value> {
            match array {
                TypedArray::$variant(v) => {
                    let idx = checked_index(index, v.len())?;
                    Ok(Value::$variant(v[idx].clone()))
                }
                other => Err(element_type_error($elem, other)),
            }
        }

        fn $setter(array: &mut TypedArray, index: i64, value: Value) -> RuntimeResult<()> {
            match (array, value) {
                (TypedArray::$variant(v), Value::$variant(x)) => {
                    let idx = checked_index(index, v.len())?;
                    v[idx] = x;
                    Ok(())
                }
                (TypedArray::$variant(_), value) => Err(store_error($elem, &value)),
                (other, _) => Err(element_type_error($elem, other)),
            }
        }
    };
}

element_access!(get_i64, set_i64, I64, ElementType::I64);
element_access!(get_i32, set_i32, I32, ElementType::I32);
element_access!(get_f64, set_f64, F64, ElementType::F64);
element_access!(get_f32, set_f32, F32, ElementType::F32);
element_access!(get_bool, set_bool, Bool, ElementType::Bool);
element_access!(get_char, set_char, Char, ElementType::Char);
element_access!(get_str, set_str, Str, ElementType::Str);

fn get_any(array: &TypedArray, index: i64) -> RuntimeResult<Value> {
    match array {
        TypedArray::Any(v) => {
            let idx = checked_index(index, v.len())?;
            Ok(v[idx].clone())
        }
        other => Err(element_type_error(ElementType::Any, other)),
    }
}

fn set_any(array: &mut TypedArray, index: i64, value: Value) -> RuntimeResult<()> {
    match array {
        TypedArray::Any(v) => {
            let idx = checked_index(index, v.len())?;
            v[idx] = value;
            Ok(())
        }
        other => Err(element_type_error(ElementType::Any, other)),
    }
}

fn element_type_error(expected: ElementType, array: &TypedArray) -> RuntimeError {
    RuntimeError::type_error(format!(
        "element access for Array{{{}}} applied to Array{{{}}}",
        expected,
        array.element_type()
    ))
}

/// Indexed read primitive specialized to an element type
pub fn element_getter(element_type: ElementType) -> ElementGetter {
    match element_type {
        ElementType::I64 => get_i64,
        ElementType::I32 => get_i32,
        ElementType::F64 => get_f64,
        ElementType::F32 => get_f32,
        ElementType::Bool => get_bool,
        ElementType::Char => get_char,
        ElementType::Str => get_str,
        ElementType::Any => get_any,
    }
}

/// Indexed write primitive specialized to an element type
pub fn element_setter(element_type: ElementType) -> ElementSetter {
    match element_type {
        ElementType::I64 => set_i64,
        ElementType::I32 => set_i32,
        ElementType::F64 => set_f64,
        ElementType::F32 => set_f32,
        ElementType::Bool => set_bool,
        ElementType::Char => set_char,
        ElementType::Str => set_str,
        ElementType::Any => set_any,
    }
}

/// Element-count primitive
pub fn array_length(array: &TypedArray) -> usize {
    array.len()
}
