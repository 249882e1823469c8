// handle.rs - Fixed-length typed array storage
//
// Each handle owns exactly one homogeneous buffer. Length and component
// type are fixed at allocation; only element contents change afterwards.

use crate::error::ArrayError;
use crate::kind::ScalarKind;
use crate::value::{ObjRef, Value};
use std::fmt;

/// What a handle's slots hold.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ComponentType {
    /// Slots of a single scalar kind (`Obj` means any object reference).
    Scalar(ScalarKind),
    /// Slots holding nested arrays of `rank` dimensions over `leaf`.
    Array { leaf: ScalarKind, rank: u8 },
}

impl ComponentType {
    /// Kind of the slots themselves. Nested arrays are object references.
    pub fn kind(self) -> ScalarKind {
        match self {
            ComponentType::Scalar(kind) => kind,
            ComponentType::Array { .. } => ScalarKind::Obj,
        }
    }

    /// Component type a nested array must have to be stored in these slots.
    pub fn nested_component(self) -> Option<ComponentType> {
        match self {
            ComponentType::Scalar(_) => None,
            ComponentType::Array { leaf, rank: 0 | 1 } => Some(ComponentType::Scalar(leaf)),
            ComponentType::Array { leaf, rank } => Some(ComponentType::Array {
                leaf,
                rank: rank - 1,
            }),
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ComponentType::Scalar(kind) => write!(f, "{kind}"),
            ComponentType::Array { leaf, rank } => {
                write!(f, "{leaf}")?;
                for _ in 0..rank {
                    f.write_str("[]")?;
                }
                Ok(())
            }
        }
    }
}

/// Typed backing buffer, one variant per kind.
#[derive(Debug)]
pub(crate) enum Storage {
    Bool(Box<[bool]>),
    I8(Box<[i8]>),
    I16(Box<[i16]>),
    Char(Box<[u16]>),
    I32(Box<[i32]>),
    I64(Box<[i64]>),
    F32(Box<[f32]>),
    F64(Box<[f64]>),
    Obj(Box<[Option<ObjRef>]>),
}

/// Run `$body` with `$slice` bound to the buffer, whatever its kind.
macro_rules! with_slice {
    ($storage:expr, $slice:ident => $body:expr) => {
        match $storage {
            Storage::Bool($slice) => $body,
            Storage::I8($slice) => $body,
            Storage::I16($slice) => $body,
            Storage::Char($slice) => $body,
            Storage::I32($slice) => $body,
            Storage::I64($slice) => $body,
            Storage::F32($slice) => $body,
            Storage::F64($slice) => $body,
            Storage::Obj($slice) => $body,
        }
    };
}

/// Empty vector with room for exactly `length` elements, or
/// [`ArrayError::AllocationFailed`] if the buffer cannot be reserved.
pub(crate) fn try_with_capacity<T>(length: usize) -> Result<Vec<T>, ArrayError> {
    let mut buffer = Vec::new();
    buffer.try_reserve_exact(length).map_err(|err| {
        tracing::debug!(length, %err, "allocation failed");
        ArrayError::AllocationFailed { length }
    })?;
    Ok(buffer)
}

fn try_filled<T: Clone>(zero: T, length: usize) -> Result<Box<[T]>, ArrayError> {
    let mut buffer = try_with_capacity(length)?;
    buffer.resize(length, zero);
    Ok(buffer.into_boxed_slice())
}

impl Storage {
    fn try_zeroed(kind: ScalarKind, length: usize) -> Result<Self, ArrayError> {
        let storage = match kind {
            ScalarKind::Bool => Storage::Bool(try_filled(false, length)?),
            ScalarKind::I8 => Storage::I8(try_filled(0, length)?),
            ScalarKind::I16 => Storage::I16(try_filled(0, length)?),
            ScalarKind::Char => Storage::Char(try_filled(0, length)?),
            ScalarKind::I32 => Storage::I32(try_filled(0, length)?),
            ScalarKind::I64 => Storage::I64(try_filled(0, length)?),
            ScalarKind::F32 => Storage::F32(try_filled(0.0, length)?),
            ScalarKind::F64 => Storage::F64(try_filled(0.0, length)?),
            ScalarKind::Obj => Storage::Obj(try_filled(None, length)?),
        };
        Ok(storage)
    }

    fn zeroed(kind: ScalarKind, length: usize) -> Self {
        match kind {
            ScalarKind::Bool => Storage::Bool(vec![false; length].into_boxed_slice()),
            ScalarKind::I8 => Storage::I8(vec![0; length].into_boxed_slice()),
            ScalarKind::I16 => Storage::I16(vec![0; length].into_boxed_slice()),
            ScalarKind::Char => Storage::Char(vec![0; length].into_boxed_slice()),
            ScalarKind::I32 => Storage::I32(vec![0; length].into_boxed_slice()),
            ScalarKind::I64 => Storage::I64(vec![0; length].into_boxed_slice()),
            ScalarKind::F32 => Storage::F32(vec![0.0; length].into_boxed_slice()),
            ScalarKind::F64 => Storage::F64(vec![0.0; length].into_boxed_slice()),
            ScalarKind::Obj => Storage::Obj(vec![None; length].into_boxed_slice()),
        }
    }

    fn kind(&self) -> ScalarKind {
        match self {
            Storage::Bool(_) => ScalarKind::Bool,
            Storage::I8(_) => ScalarKind::I8,
            Storage::I16(_) => ScalarKind::I16,
            Storage::Char(_) => ScalarKind::Char,
            Storage::I32(_) => ScalarKind::I32,
            Storage::I64(_) => ScalarKind::I64,
            Storage::F32(_) => ScalarKind::F32,
            Storage::F64(_) => ScalarKind::F64,
            Storage::Obj(_) => ScalarKind::Obj,
        }
    }

    fn len(&self) -> usize {
        with_slice!(self, slice => slice.len())
    }
}

/// Opaque reference to a homogeneous, fixed-length, mutable sequence.
///
/// Handles are created by the factory functions in [`crate::factory`] and
/// owned by a single scope. Share one across threads only behind a lock,
/// as [`crate::NestedArray`] does.
#[derive(Debug)]
pub struct ArrayHandle {
    component: ComponentType,
    storage: Storage,
}

impl ArrayHandle {
    /// Zeroed handle for a caller-supplied length.
    pub(crate) fn try_zeroed(component: ComponentType, length: usize) -> Result<Self, ArrayError> {
        Ok(Self {
            component,
            storage: Storage::try_zeroed(component.kind(), length)?,
        })
    }

    /// Zeroed handle for a length some live buffer already holds.
    pub(crate) fn zeroed(component: ComponentType, length: usize) -> Self {
        Self {
            component,
            storage: Storage::zeroed(component.kind(), length),
        }
    }

    pub(crate) fn from_storage(component: ComponentType, storage: Storage) -> Self {
        debug_assert_eq!(component.kind(), storage.kind(), "storage kind mismatch");
        Self { component, storage }
    }

    #[inline]
    pub fn component_type(&self) -> ComponentType {
        self.component
    }

    #[inline]
    pub fn component_kind(&self) -> ScalarKind {
        self.component.kind()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub(crate) fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Native element at `index`, without conversion.
    pub(crate) fn read(&self, index: usize) -> Option<Value> {
        let value = match &self.storage {
            Storage::Bool(s) => Value::Bool(*s.get(index)?),
            Storage::I8(s) => Value::I8(*s.get(index)?),
            Storage::I16(s) => Value::I16(*s.get(index)?),
            Storage::Char(s) => Value::Char(*s.get(index)?),
            Storage::I32(s) => Value::I32(*s.get(index)?),
            Storage::I64(s) => Value::I64(*s.get(index)?),
            Storage::F32(s) => Value::F32(*s.get(index)?),
            Storage::F64(s) => Value::F64(*s.get(index)?),
            Storage::Obj(s) => Value::Obj(s.get(index)?.clone()),
        };
        Some(value)
    }

    /// Store a value whose kind already matches the slot kind.
    pub(crate) fn write(&mut self, index: usize, value: Value) -> Result<(), ArrayError> {
        let length = self.len();
        if index >= length {
            return Err(ArrayError::out_of_range(index, length));
        }
        match (&mut self.storage, value) {
            (Storage::Bool(s), Value::Bool(v)) => s[index] = v,
            (Storage::I8(s), Value::I8(v)) => s[index] = v,
            (Storage::I16(s), Value::I16(v)) => s[index] = v,
            (Storage::Char(s), Value::Char(v)) => s[index] = v,
            (Storage::I32(s), Value::I32(v)) => s[index] = v,
            (Storage::I64(s), Value::I64(v)) => s[index] = v,
            (Storage::F32(s), Value::F32(v)) => s[index] = v,
            (Storage::F64(s), Value::F64(v)) => s[index] = v,
            (Storage::Obj(s), Value::Obj(v)) => s[index] = v,
            (storage, value) => {
                return Err(ArrayError::InvalidConversion {
                    from: value.kind(),
                    to: storage.kind(),
                })
            }
        }
        Ok(())
    }

    /// Exchange two in-bounds elements.
    pub(crate) fn swap_slots(&mut self, first: usize, second: usize) {
        with_slice!(&mut self.storage, slice => slice.swap(first, second))
    }
}
