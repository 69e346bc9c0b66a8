//! Helper routines over the generic element-array view
//!
//! These are the bodies of the primitives registered in [`crate::lookup`].
//! Arguments arrive already adapted, so array parameters hold
//! `Value::Array`; anything else is reported as a type error.

use crate::array::{array_length, ArrayRef, TypedArray};
use crate::collections::{ArrayIterator, ListView};
use crate::error::{RuntimeError, RuntimeResult};
use crate::value::{arrays_equal, Value};

pub(crate) fn array_arg(args: &[Value], pos: usize) -> RuntimeResult<&ArrayRef> {
    match args.get(pos) {
        Some(Value::Array(arr)) => Ok(arr),
        Some(other) => Err(RuntimeError::type_error(format!(
            "expected Array, got {}",
            other.type_name()
        ))),
        None => Err(RuntimeError::argument_error(format!(
            "missing argument {}",
            pos
        ))),
    }
}

/// Element count
pub fn length(args: &[Value]) -> RuntimeResult<Value> {
    let len = array_length(&array_arg(args, 0)?.read());
    Ok(Value::I64(i64::try_from(len).map_err(|_| {
        RuntimeError::overflow_error(format!("{} does not fit in Int64", len))
    })?))
}

/// `[a, b, c]` rendering
pub fn render(args: &[Value]) -> RuntimeResult<Value> {
    let arr = array_arg(args, 0)?;
    Ok(Value::Str(Value::Array(arr.clone()).render()))
}

/// Fixed-size view sharing the receiver's storage
pub fn as_list(args: &[Value]) -> RuntimeResult<Value> {
    Ok(Value::List(ListView::new(array_arg(args, 0)?.clone())))
}

/// Deep element-wise equality of two arrays
pub fn equals(args: &[Value]) -> RuntimeResult<Value> {
    let lhs = array_arg(args, 0)?;
    let rhs = array_arg(args, 1)?;
    Ok(Value::Bool(arrays_equal(lhs, rhs)))
}

/// Lazy single-pass iterator over the receiver
pub fn iterator(args: &[Value]) -> RuntimeResult<Value> {
    Ok(Value::Iterator(ArrayIterator::new(array_arg(args, 0)?.clone())))
}

/// First element; fails on an empty array
pub fn head(args: &[Value]) -> RuntimeResult<Value> {
    let arr = array_arg(args, 0)?;
    arr.snapshot()
        .into_iter()
        .next()
        .ok_or_else(|| RuntimeError::argument_error("head of an empty array"))
}

/// New array holding all but the first element
///
/// The tail of an empty array is an empty array of the same element type.
pub fn tail(args: &[Value]) -> RuntimeResult<Value> {
    let arr = array_arg(args, 0)?;
    let elem = arr.element_type();
    let rest: Vec<Value> = arr.snapshot().into_iter().skip(1).collect();
    Ok(Value::array(TypedArray::from_values(elem, rest)?))
}

pub fn is_empty(args: &[Value]) -> RuntimeResult<Value> {
    Ok(Value::Bool(array_arg(args, 0)?.is_empty()))
}
