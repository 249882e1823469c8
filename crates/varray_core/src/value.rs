//! Tagged scalar values and object references
//!
//! A `Value` carries its kind alongside the payload, so conversion legality
//! is decided from the tag alone. Widening goes through the lattice in
//! [`crate::kind`] and nowhere else.

use crate::error::ArrayError;
use crate::handle::{ArrayHandle, ComponentType};
use crate::kind::{can_widen, ScalarKind};
use std::any::Any;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A single array element tagged with its kind.
#[derive(Debug, Clone)]
pub enum Value {
    Bool(bool),
    I8(i8),
    I16(i16),
    Char(u16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Obj(Option<ObjRef>),
}

impl Value {
    pub fn kind(&self) -> ScalarKind {
        match self {
            Value::Bool(_) => ScalarKind::Bool,
            Value::I8(_) => ScalarKind::I8,
            Value::I16(_) => ScalarKind::I16,
            Value::Char(_) => ScalarKind::Char,
            Value::I32(_) => ScalarKind::I32,
            Value::I64(_) => ScalarKind::I64,
            Value::F32(_) => ScalarKind::F32,
            Value::F64(_) => ScalarKind::F64,
            Value::Obj(_) => ScalarKind::Obj,
        }
    }

    /// The value a freshly allocated slot of `kind` holds.
    pub fn zero(kind: ScalarKind) -> Self {
        match kind {
            ScalarKind::Bool => Value::Bool(false),
            ScalarKind::I8 => Value::I8(0),
            ScalarKind::I16 => Value::I16(0),
            ScalarKind::Char => Value::Char(0),
            ScalarKind::I32 => Value::I32(0),
            ScalarKind::I64 => Value::I64(0),
            ScalarKind::F32 => Value::F32(0.0),
            ScalarKind::F64 => Value::F64(0.0),
            ScalarKind::Obj => Value::Obj(None),
        }
    }

    /// Raw payload bits, zero-extended. `None` for object references.
    pub fn to_bits(&self) -> Option<u64> {
        let bits = match *self {
            Value::Bool(v) => u64::from(v),
            Value::I8(v) => u64::from(v as u8),
            Value::I16(v) => u64::from(v as u16),
            Value::Char(v) => u64::from(v),
            Value::I32(v) => u64::from(v as u32),
            Value::I64(v) => v as u64,
            Value::F32(v) => u64::from(v.to_bits()),
            Value::F64(v) => v.to_bits(),
            Value::Obj(_) => return None,
        };
        Some(bits)
    }

    /// Rebuild a value from `(kind, bits)`. Bits above the kind's width are
    /// ignored. `None` for [`ScalarKind::Obj`].
    pub fn from_bits(kind: ScalarKind, bits: u64) -> Option<Self> {
        let value = match kind {
            ScalarKind::Bool => Value::Bool(bits & 1 != 0),
            ScalarKind::I8 => Value::I8(bits as u8 as i8),
            ScalarKind::I16 => Value::I16(bits as u16 as i16),
            ScalarKind::Char => Value::Char(bits as u16),
            ScalarKind::I32 => Value::I32(bits as u32 as i32),
            ScalarKind::I64 => Value::I64(bits as i64),
            ScalarKind::F32 => Value::F32(f32::from_bits(bits as u32)),
            ScalarKind::F64 => Value::F64(f64::from_bits(bits)),
            ScalarKind::Obj => return None,
        };
        Some(value)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Obj(None))
    }

    /// Convert to `to` if the lattice allows it.
    ///
    /// Integer widening sign-extends; integer to floating widening uses the
    /// nearest representable value.
    pub fn widen(self, to: ScalarKind) -> Result<Value, ArrayError> {
        let from = self.kind();
        if from == to {
            return Ok(self);
        }
        if !can_widen(from, to) {
            tracing::debug!(%from, %to, "rejected conversion");
            return Err(ArrayError::InvalidConversion { from, to });
        }

        let widened = match (self, to) {
            (Value::I8(v), ScalarKind::I16) => Some(Value::I16(v.into())),
            (Value::I8(v), ScalarKind::I32) => Some(Value::I32(v.into())),
            (Value::I8(v), ScalarKind::I64) => Some(Value::I64(v.into())),
            (Value::I8(v), ScalarKind::F32) => Some(Value::F32(v.into())),
            (Value::I8(v), ScalarKind::F64) => Some(Value::F64(v.into())),

            (Value::I16(v), ScalarKind::I32) => Some(Value::I32(v.into())),
            (Value::I16(v), ScalarKind::I64) => Some(Value::I64(v.into())),
            (Value::I16(v), ScalarKind::F32) => Some(Value::F32(v.into())),
            (Value::I16(v), ScalarKind::F64) => Some(Value::F64(v.into())),

            (Value::Char(v), ScalarKind::I32) => Some(Value::I32(v.into())),
            (Value::Char(v), ScalarKind::I64) => Some(Value::I64(v.into())),
            (Value::Char(v), ScalarKind::F32) => Some(Value::F32(v.into())),
            (Value::Char(v), ScalarKind::F64) => Some(Value::F64(v.into())),

            (Value::I32(v), ScalarKind::I64) => Some(Value::I64(v.into())),
            (Value::I32(v), ScalarKind::F32) => Some(Value::F32(v as f32)),
            (Value::I32(v), ScalarKind::F64) => Some(Value::F64(v.into())),

            (Value::I64(v), ScalarKind::F32) => Some(Value::F32(v as f32)),
            (Value::I64(v), ScalarKind::F64) => Some(Value::F64(v as f64)),

            (Value::F32(v), ScalarKind::F64) => Some(Value::F64(v.into())),
            _ => None,
        };
        widened.ok_or(ArrayError::InvalidConversion { from, to })
    }
}

/// Floats compare by bit pattern so a read returns exactly what was stored,
/// NaN payloads included. Objects compare by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Obj(a), Value::Obj(b)) => a == b,
            (a, b) => a.kind() == b.kind() && a.to_bits() == b.to_bits(),
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$ty> for Value {
                #[inline]
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )+
    };
}

value_from! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    u16 => Char,
    i32 => I32,
    i64 => I64,
    f32 => F32,
    f64 => F64,
    Option<ObjRef> => Obj,
}

impl From<ObjRef> for Value {
    fn from(obj: ObjRef) -> Self {
        Value::Obj(Some(obj))
    }
}

/// Shared, type-erased object reference held by object arrays.
///
/// Cloning shares the referent. Equality is identity.
#[derive(Clone)]
pub struct ObjRef(Arc<dyn Any + Send + Sync>);

impl ObjRef {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Wrap an array so it can be stored as an element of another array.
    pub fn from_array(array: ArrayHandle) -> Self {
        Self::new(NestedArray::new(array))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// The nested array behind this reference, if it is one.
    pub fn as_array(&self) -> Option<&NestedArray> {
        self.downcast_ref::<NestedArray>()
    }

    pub fn ptr_eq(&self, other: &ObjRef) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }
}

impl PartialEq for ObjRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for ObjRef {}

impl fmt::Debug for ObjRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_array() {
            Some(nested) => write!(f, "ObjRef(array of {})", nested.component_type()),
            None => write!(f, "ObjRef({:p})", Arc::as_ptr(&self.0)),
        }
    }
}

/// An array stored inside another array.
///
/// The lock is the explicit wrapper that makes shared mutation possible;
/// the component type is fixed when the array is wrapped.
pub struct NestedArray {
    component: ComponentType,
    cell: RwLock<ArrayHandle>,
}

impl NestedArray {
    fn new(array: ArrayHandle) -> Self {
        Self {
            component: array.component_type(),
            cell: RwLock::new(array),
        }
    }

    pub fn component_type(&self) -> ComponentType {
        self.component
    }

    /// Shared access. A poisoned lock is recovered: every array operation
    /// is a single element access, so a panic cannot leave it half-written.
    pub fn read(&self) -> RwLockReadGuard<'_, ArrayHandle> {
        self.cell.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, ArrayHandle> {
        self.cell.write().unwrap_or_else(PoisonError::into_inner)
    }
}
