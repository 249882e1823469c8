// boxing.rs - Conversion between primitive arrays and object arrays
//
// Element work runs on the rayon pool. Results are gathered before the new
// handle is built, so a failed conversion allocates no handle.

use crate::error::ArrayError;
use crate::handle::{ArrayHandle, ComponentType, Storage};
use crate::kind::ScalarKind;
use crate::value::ObjRef;
use rayon::prelude::*;
use std::any::Any;

/// Object array whose element `i` boxes the native value of `array[i]`.
///
/// Boxes hold the plain Rust type of the kind (`u16` for `Char`).
pub fn to_boxed(array: &ArrayHandle) -> Result<ArrayHandle, ArrayError> {
    fn boxed<T: Any + Copy + Send + Sync>(slice: &[T]) -> Vec<Option<ObjRef>> {
        slice.par_iter().map(|&v| Some(ObjRef::new(v))).collect()
    }

    let elements = match array.storage() {
        Storage::Bool(s) => boxed(s),
        Storage::I8(s) => boxed(s),
        Storage::I16(s) => boxed(s),
        Storage::Char(s) => boxed(s),
        Storage::I32(s) => boxed(s),
        Storage::I64(s) => boxed(s),
        Storage::F32(s) => boxed(s),
        Storage::F64(s) => boxed(s),
        Storage::Obj(_) => {
            return Err(ArrayError::InvalidConversion {
                from: ScalarKind::Obj,
                to: ScalarKind::Obj,
            })
        }
    };
    tracing::debug!(kind = %array.component_kind(), length = elements.len(), "boxed array");
    Ok(ArrayHandle::from_storage(
        ComponentType::Scalar(ScalarKind::Obj),
        Storage::Obj(elements.into_boxed_slice()),
    ))
}

/// Primitive array of `kind` unboxed from an object array.
///
/// Fails with [`ArrayError::NullElement`] on a null slot and with
/// [`ArrayError::InvalidConversion`] on a box of any other type. When several
/// slots are bad, the lowest index is reported.
pub fn to_primitive(array: &ArrayHandle, kind: ScalarKind) -> Result<ArrayHandle, ArrayError> {
    let Storage::Obj(objects) = array.storage() else {
        return Err(ArrayError::InvalidConversion {
            from: array.component_kind(),
            to: kind,
        });
    };

    fn unboxed<T: Any + Copy + Send + Sync>(
        objects: &[Option<ObjRef>],
        kind: ScalarKind,
    ) -> Result<Box<[T]>, ArrayError> {
        let results: Vec<Result<T, ArrayError>> = objects
            .par_iter()
            .enumerate()
            .map(|(index, slot)| {
                let obj = slot.as_ref().ok_or(ArrayError::NullElement { index })?;
                obj.downcast_ref::<T>()
                    .copied()
                    .ok_or(ArrayError::InvalidConversion {
                        from: ScalarKind::Obj,
                        to: kind,
                    })
            })
            .collect();
        results.into_iter().collect()
    }

    let storage = match kind {
        ScalarKind::Bool => Storage::Bool(unboxed(objects, kind)?),
        ScalarKind::I8 => Storage::I8(unboxed(objects, kind)?),
        ScalarKind::I16 => Storage::I16(unboxed(objects, kind)?),
        ScalarKind::Char => Storage::Char(unboxed(objects, kind)?),
        ScalarKind::I32 => Storage::I32(unboxed(objects, kind)?),
        ScalarKind::I64 => Storage::I64(unboxed(objects, kind)?),
        ScalarKind::F32 => Storage::F32(unboxed(objects, kind)?),
        ScalarKind::F64 => Storage::F64(unboxed(objects, kind)?),
        ScalarKind::Obj => {
            return Err(ArrayError::InvalidConversion {
                from: ScalarKind::Obj,
                to: ScalarKind::Obj,
            })
        }
    };
    tracing::debug!(%kind, length = objects.len(), "unboxed array");
    Ok(ArrayHandle::from_storage(ComponentType::Scalar(kind), storage))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::{from_values, new_array};
    use crate::kind::ScalarKind::*;
    use crate::value::Value;

    #[test]
    fn test_to_boxed_wraps_each_element() {
        let array = from_values(I32, [Value::I32(3), Value::I8(-1), Value::Char(9)]).unwrap();
        let boxed = to_boxed(&array).unwrap();
        assert_eq!(boxed.component_kind(), Obj);
        assert_eq!(boxed.len(), 3);
        let expected = [3, -1, 9];
        for (index, want) in expected.iter().enumerate() {
            let obj = boxed.get_obj(index).unwrap().unwrap();
            assert_eq!(obj.downcast_ref::<i32>(), Some(want));
        }
    }

    #[test]
    fn test_boxing_round_trip_keeps_order() {
        let mut chars = new_array(Char, 4).unwrap();
        for (index, unit) in [0x48_u16, 0x69, 0x21, 0xD83D].into_iter().enumerate() {
            chars.set_char(index, unit).unwrap();
        }
        let back = to_primitive(&to_boxed(&chars).unwrap(), Char).unwrap();
        assert_eq!(back.component_kind(), Char);
        for index in 0..4 {
            assert_eq!(back.get(index), chars.get(index));
        }
    }

    #[test]
    fn test_to_boxed_rejects_object_arrays() {
        let objects = new_array(Obj, 1).unwrap();
        assert_eq!(
            to_boxed(&objects).unwrap_err(),
            ArrayError::InvalidConversion { from: Obj, to: Obj }
        );
    }

    #[test]
    fn test_to_primitive_reports_null_slot() {
        let mut objects = new_array(Obj, 3).unwrap();
        objects.set_obj(0, Some(ObjRef::new(1.5_f64))).unwrap();
        objects.set_obj(2, Some(ObjRef::new(2.5_f64))).unwrap();
        assert_eq!(
            to_primitive(&objects, F64).unwrap_err(),
            ArrayError::NullElement { index: 1 }
        );
    }

    #[test]
    fn test_to_primitive_rejects_wrong_box() {
        let mut objects = new_array(Obj, 2).unwrap();
        objects.set_obj(0, Some(ObjRef::new(1_i64))).unwrap();
        objects.set_obj(1, Some(ObjRef::new(2_i32))).unwrap();
        assert_eq!(
            to_primitive(&objects, I64).unwrap_err(),
            ArrayError::InvalidConversion { from: Obj, to: I64 }
        );
        assert_eq!(
            to_primitive(&objects, Obj).unwrap_err(),
            ArrayError::InvalidConversion { from: Obj, to: Obj }
        );
    }

    #[test]
    fn test_to_primitive_requires_object_array() {
        let numbers = new_array(I32, 2).unwrap();
        assert_eq!(
            to_primitive(&numbers, I32).unwrap_err(),
            ArrayError::InvalidConversion { from: I32, to: I32 }
        );
    }
}
