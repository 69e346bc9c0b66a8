//! Value conversions applied by signature adapters
//!
//! Only lossless conversions live here; anything else is rejected when the
//! adapter is built.

use crate::error::{RuntimeError, RuntimeResult};
use crate::signature::Kind;
use crate::value::Value;

/// Widen a primitive value to `to`
pub fn widen(value: Value, to: Kind) -> RuntimeResult<Value> {
    match (value, to) {
        (Value::I32(v), Kind::I64) => Ok(Value::I64(i64::from(v))),
        (Value::I32(v), Kind::F64) => Ok(Value::F64(f64::from(v))),
        (Value::I64(v), Kind::F64) => Ok(Value::F64(v as f64)),
        (Value::F32(v), Kind::F64) => Ok(Value::F64(f64::from(v))),
        (Value::Char(c), Kind::I32) => Ok(Value::I32(u32::from(c) as i32)),
        (Value::Char(c), Kind::I64) => Ok(Value::I64(i64::from(u32::from(c)))),
        (value, to) if Kind::of(&value) == to => Ok(value),
        (value, to) => Err(RuntimeError::type_error(format!(
            "cannot convert {} to {}",
            value.type_name(),
            to
        ))),
    }
}

/// Checked cast of an untyped value to `to`
///
/// Accepts values already of kind `to` and values that widen to it.
pub fn cast(value: Value, to: Kind) -> RuntimeResult<Value> {
    let from = Kind::of(&value);
    if from == to || to == Kind::Any {
        Ok(value)
    } else if from.widens_to(to) {
        widen(value, to)
    } else {
        Err(RuntimeError::type_error(format!(
            "cannot cast {} to {}",
            value.type_name(),
            to
        )))
    }
}

/// Convert an index argument to i64
pub fn to_index(value: &Value) -> RuntimeResult<i64> {
    match value {
        Value::I64(v) => Ok(*v),
        Value::I32(v) => Ok(i64::from(*v)),
        _ => Err(RuntimeError::type_error(format!(
            "index must be an integer, got {}",
            value.type_name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widen() {
        assert_eq!(widen(Value::I32(42), Kind::I64).unwrap(), Value::I64(42));
        assert_eq!(widen(Value::F32(1.5), Kind::F64).unwrap(), Value::F64(1.5));
        assert_eq!(widen(Value::Char('A'), Kind::I64).unwrap(), Value::I64(65));
        assert!(widen(Value::F64(1.5), Kind::I64).is_err());
    }

    #[test]
    fn test_cast() {
        assert_eq!(cast(Value::from("x"), Kind::Str).unwrap(), Value::from("x"));
        assert_eq!(cast(Value::I32(3), Kind::I64).unwrap(), Value::I64(3));
        assert!(matches!(
            cast(Value::from("x"), Kind::I64),
            Err(RuntimeError::TypeError(_))
        ));
        assert!(cast(Value::Nothing, Kind::Bool).is_err());
    }

    #[test]
    fn test_to_index() {
        assert_eq!(to_index(&Value::I32(2)).unwrap(), 2);
        assert!(to_index(&Value::F64(2.0)).is_err());
    }
}
