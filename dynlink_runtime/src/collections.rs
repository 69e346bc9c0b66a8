//! Views produced by array call sites
//!
//! Both types alias the receiver's storage instead of copying it.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::array::{element_getter, element_setter, ArrayRef};
use crate::error::RuntimeResult;
use crate::value::Value;

/// Fixed-size list view backed by array storage (`asList`)
///
/// Writes go straight through to the array; the length never changes.
#[derive(Debug, Clone)]
pub struct ListView {
    storage: ArrayRef,
}

impl ListView {
    pub fn new(storage: ArrayRef) -> Self {
        ListView { storage }
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: i64) -> RuntimeResult<Value> {
        let array = self.storage.read();
        element_getter(array.element_type())(&array, index)
    }

    /// Replace the element at `index`, returning the previous one
    pub fn set(&self, index: i64, value: Value) -> RuntimeResult<Value> {
        let mut array = self.storage.write();
        let elem = array.element_type();
        let previous = element_getter(elem)(&array, index)?;
        element_setter(elem)(&mut array, index, value)?;
        Ok(previous)
    }

    pub fn to_vec(&self) -> Vec<Value> {
        self.storage.snapshot()
    }

    /// Storage this view aliases
    pub fn storage(&self) -> &ArrayRef {
        &self.storage
    }
}

struct Cursor {
    storage: ArrayRef,
    position: usize,
}

/// Forward-only, single-pass iterator over array storage (`iterator`)
///
/// Elements are read lazily, one per step. Clones share the cursor.
#[derive(Clone)]
pub struct ArrayIterator {
    cursor: Arc<Mutex<Cursor>>,
}

impl ArrayIterator {
    pub fn new(storage: ArrayRef) -> Self {
        ArrayIterator {
            cursor: Arc::new(Mutex::new(Cursor {
                storage,
                position: 0,
            })),
        }
    }

    pub fn has_next(&self) -> bool {
        let cursor = self.cursor.lock();
        cursor.position < cursor.storage.len()
    }

    /// Advance, returning `None` once the array is exhausted
    pub fn next_value(&self) -> Option<Value> {
        let mut cursor = self.cursor.lock();
        let value = cursor.storage.read().get(cursor.position)?;
        cursor.position += 1;
        Some(value)
    }

    pub fn ptr_eq(&self, other: &ArrayIterator) -> bool {
        Arc::ptr_eq(&self.cursor, &other.cursor)
    }
}

impl Iterator for ArrayIterator {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        self.next_value()
    }
}

impl fmt::Debug for ArrayIterator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cursor = self.cursor.lock();
        f.debug_struct("ArrayIterator")
            .field("position", &cursor.position)
            .field("length", &cursor.storage.len())
            .finish()
    }
}
