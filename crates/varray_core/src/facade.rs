//! Typed array facade
//!
//! Get/set/length access over arrays of any element kind. Reads never
//! convert. Writes and typed reads widen along the lattice in
//! [`crate::kind`] and fail with [`ArrayError::InvalidConversion`] otherwise.
//!
//! Two surfaces share one implementation:
//! - methods on [`ArrayHandle`] for callers that already hold a handle;
//! - free functions over opaque `Option<&dyn Any>` references, which run the
//!   validity guard first and take signed indices.

use crate::error::ArrayError;
use crate::guard::{require_array, require_array_mut};
use crate::handle::ArrayHandle;
use crate::kind::ScalarKind;
use crate::value::{ObjRef, Value};
use std::any::Any;
use tracing::trace;

impl ArrayHandle {
    /// Element at `index` as stored, tagged with the array's own kind.
    pub fn get(&self, index: usize) -> Result<Value, ArrayError> {
        self.read(index)
            .ok_or_else(|| ArrayError::out_of_range(index, self.len()))
    }

    /// Element at `index`, widened to `want`.
    pub fn get_as(&self, index: usize, want: ScalarKind) -> Result<Value, ArrayError> {
        let value = self.get(index)?;
        let from = value.kind();
        let widened = value.widen(want)?;
        if from != want {
            trace!(%from, to = %want, index, "widening read");
        }
        Ok(widened)
    }

    /// Store `value` at `index`, widening it to the array's kind if needed.
    pub fn set(&mut self, index: usize, value: Value) -> Result<(), ArrayError> {
        let length = self.len();
        if index >= length {
            return Err(ArrayError::out_of_range(index, length));
        }

        let from = value.kind();
        let to = self.component_kind();
        let stored = value.widen(to)?;
        if from != to {
            trace!(%from, %to, index, "widening store");
        }

        if let Value::Obj(Some(obj)) = &stored {
            self.check_nested(obj)?;
        }
        self.write(index, stored)
    }

    /// Arrays of nested arrays only accept arrays of the next rank down.
    fn check_nested(&self, obj: &ObjRef) -> Result<(), ArrayError> {
        let Some(expected) = self.component_type().nested_component() else {
            return Ok(());
        };
        let found = obj.as_array().map(|nested| nested.component_type());
        if found == Some(expected) {
            Ok(())
        } else {
            tracing::debug!(%expected, "rejected nested array store");
            Err(ArrayError::ElementTypeMismatch { expected, found })
        }
    }

    /// True iff `0 <= index < len()`.
    pub fn is_index_valid(&self, index: isize) -> bool {
        usize::try_from(index).is_ok_and(|index| index < self.len())
    }

    /// The index as `usize` if it is in bounds.
    pub fn require_valid_index(&self, index: isize) -> Result<usize, ArrayError> {
        match usize::try_from(index) {
            Ok(checked) if checked < self.len() => Ok(checked),
            _ => Err(ArrayError::IndexOutOfRange {
                index,
                length: self.len(),
            }),
        }
    }

    /// Exchange two elements. Both indices are checked before anything moves.
    pub fn swap(&mut self, first: usize, second: usize) -> Result<(), ArrayError> {
        let length = self.len();
        for index in [first, second] {
            if index >= length {
                return Err(ArrayError::out_of_range(index, length));
            }
        }
        self.swap_slots(first, second);
        Ok(())
    }
}

/// Number of elements.
pub fn length(array: Option<&dyn Any>) -> Result<usize, ArrayError> {
    Ok(require_array(array)?.len())
}

/// Slot kind of the array. Total on anything the guard accepts.
pub fn component_kind(array: Option<&dyn Any>) -> Result<ScalarKind, ArrayError> {
    Ok(require_array(array)?.component_kind())
}

pub fn get(array: Option<&dyn Any>, index: isize) -> Result<Value, ArrayError> {
    let handle = require_array(array)?;
    handle.get(handle.require_valid_index(index)?)
}

pub fn get_as(array: Option<&dyn Any>, index: isize, want: ScalarKind) -> Result<Value, ArrayError> {
    let handle = require_array(array)?;
    handle.get_as(handle.require_valid_index(index)?, want)
}

pub fn set(array: Option<&mut dyn Any>, index: isize, value: Value) -> Result<(), ArrayError> {
    let handle = require_array_mut(array)?;
    let index = handle.require_valid_index(index)?;
    handle.set(index, value)
}

pub fn is_index_valid(array: Option<&dyn Any>, index: isize) -> Result<bool, ArrayError> {
    Ok(require_array(array)?.is_index_valid(index))
}

pub fn require_valid_index(array: Option<&dyn Any>, index: isize) -> Result<usize, ArrayError> {
    require_array(array)?.require_valid_index(index)
}

pub fn swap(array: Option<&mut dyn Any>, first: isize, second: isize) -> Result<(), ArrayError> {
    let handle = require_array_mut(array)?;
    let first = handle.require_valid_index(first)?;
    let second = handle.require_valid_index(second)?;
    handle.swap(first, second)
}

/// Generates kind-pinned getters and setters, both as handle methods and as
/// guarded free functions.
macro_rules! typed_accessors {
    ($($kind:ident: $ty:ty => $get:ident, $set:ident;)+) => {
        impl ArrayHandle {
            $(
                #[doc = concat!("Element at `index` widened to `", stringify!($kind), "`.")]
                pub fn $get(&self, index: usize) -> Result<$ty, ArrayError> {
                    match self.get_as(index, ScalarKind::$kind)? {
                        Value::$kind(v) => Ok(v),
                        other => Err(ArrayError::InvalidConversion {
                            from: other.kind(),
                            to: ScalarKind::$kind,
                        }),
                    }
                }

                #[doc = concat!("Store a `", stringify!($kind), "` value, widening it to the array's kind.")]
                pub fn $set(&mut self, index: usize, value: $ty) -> Result<(), ArrayError> {
                    self.set(index, Value::$kind(value))
                }
            )+
        }

        $(
            pub fn $get(array: Option<&dyn Any>, index: isize) -> Result<$ty, ArrayError> {
                let handle = require_array(array)?;
                handle.$get(handle.require_valid_index(index)?)
            }

            pub fn $set(array: Option<&mut dyn Any>, index: isize, value: $ty) -> Result<(), ArrayError> {
                let handle = require_array_mut(array)?;
                let index = handle.require_valid_index(index)?;
                handle.$set(index, value)
            }
        )+
    };
}

typed_accessors! {
    Bool: bool => get_bool, set_bool;
    I8: i8 => get_i8, set_i8;
    I16: i16 => get_i16, set_i16;
    Char: u16 => get_char, set_char;
    I32: i32 => get_i32, set_i32;
    I64: i64 => get_i64, set_i64;
    F32: f32 => get_f32, set_f32;
    F64: f64 => get_f64, set_f64;
    Obj: Option<ObjRef> => get_obj, set_obj;
}
