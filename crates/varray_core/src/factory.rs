//! Array allocation
//!
//! Sizes arrive signed. Every size and shape check runs before the first
//! buffer is allocated, so a rejected request never allocates anything.
//! Buffers are reserved fallibly; a length that cannot be reserved fails
//! with [`ArrayError::AllocationFailed`] and drops whatever was built.

use crate::error::ArrayError;
use crate::handle::{try_with_capacity, ArrayHandle, ComponentType, Storage};
use crate::kind::ScalarKind;
use crate::value::{ObjRef, Value};
use tracing::debug;

/// Upper bound on the number of extents accepted by [`new_array_multi`].
pub const MAX_DIMENSIONS: usize = 255;

fn checked_length(length: isize) -> Result<usize, ArrayError> {
    usize::try_from(length).map_err(|_| ArrayError::NegativeSize { size: length })
}

/// Allocate a zeroed single-dimension array.
pub fn new_array(kind: ScalarKind, length: isize) -> Result<ArrayHandle, ArrayError> {
    let length = checked_length(length)?;
    debug!(%kind, length, "allocating array");
    ArrayHandle::try_zeroed(ComponentType::Scalar(kind), length)
}

/// Allocate a zeroed array of `extents.len()` dimensions.
///
/// The outer handle has length `extents[0]`; each element is a nested array
/// for the remaining extents. A single extent behaves like [`new_array`].
pub fn new_array_multi(kind: ScalarKind, extents: &[isize]) -> Result<ArrayHandle, ArrayError> {
    if extents.is_empty() || extents.len() > MAX_DIMENSIONS {
        return Err(ArrayError::InvalidShape {
            dimensions: extents.len(),
        });
    }
    let extents = extents
        .iter()
        .map(|&extent| checked_length(extent))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(%kind, ?extents, "allocating multi-dimensional array");
    let (&outer, rest) = extents
        .split_first()
        .ok_or(ArrayError::InvalidShape { dimensions: 0 })?;
    allocate(kind, outer, rest)
}

fn allocate(leaf: ScalarKind, length: usize, rest: &[usize]) -> Result<ArrayHandle, ArrayError> {
    let Some((&inner, deeper)) = rest.split_first() else {
        return ArrayHandle::try_zeroed(ComponentType::Scalar(leaf), length);
    };
    // `rest` has at most MAX_DIMENSIONS - 1 entries.
    let component = ComponentType::Array {
        leaf,
        rank: rest.len() as u8,
    };
    let mut elements: Vec<Option<ObjRef>> = try_with_capacity(length)?;
    for _ in 0..length {
        elements.push(Some(ObjRef::from_array(allocate(leaf, inner, deeper)?)));
    }
    Ok(ArrayHandle::from_storage(
        component,
        Storage::Obj(elements.into_boxed_slice()),
    ))
}

/// Zeroed array with the same component type and length as `array`.
pub fn clone_shape(array: &ArrayHandle) -> ArrayHandle {
    debug!(component = %array.component_type(), length = array.len(), "cloning array shape");
    ArrayHandle::zeroed(array.component_type(), array.len())
}

/// Zeroed array with the component type of `array` and a new length.
pub fn with_length(array: &ArrayHandle, length: isize) -> Result<ArrayHandle, ArrayError> {
    let length = checked_length(length)?;
    debug!(component = %array.component_type(), length, "allocating array like existing");
    ArrayHandle::try_zeroed(array.component_type(), length)
}

/// Build an array of `kind` from `values`, storing each through the
/// widening [`ArrayHandle::set`] path. Any rejected element fails the build.
pub fn from_values<I>(kind: ScalarKind, values: I) -> Result<ArrayHandle, ArrayError>
where
    I: IntoIterator<Item = Value>,
{
    let values: Vec<Value> = values.into_iter().collect();
    let mut array = ArrayHandle::zeroed(ComponentType::Scalar(kind), values.len());
    for (index, value) in values.into_iter().enumerate() {
        array.set(index, value)?;
    }
    Ok(array)
}

impl ArrayHandle {
    /// See [`clone_shape`].
    pub fn clone_shape(&self) -> ArrayHandle {
        clone_shape(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::ScalarKind::*;

    #[test]
    fn test_negative_length_is_rejected() {
        assert_eq!(
            new_array(I32, -1).unwrap_err(),
            ArrayError::NegativeSize { size: -1 }
        );
    }

    #[test]
    fn test_zero_length_is_allowed() {
        let array = new_array(I32, 0).unwrap();
        assert_eq!(array.len(), 0);
        assert!(array.is_empty());
        assert_eq!(array.component_kind(), I32);
    }

    #[test]
    fn test_new_array_is_zeroed() {
        for kind in ScalarKind::ALL {
            let array = new_array(kind, 4).unwrap();
            assert_eq!(array.len(), 4);
            for index in 0..4 {
                assert_eq!(array.get(index), Ok(Value::zero(kind)));
            }
        }
    }

    #[test]
    fn test_multi_rejects_bad_shapes() {
        assert_eq!(
            new_array_multi(I32, &[]).unwrap_err(),
            ArrayError::InvalidShape { dimensions: 0 }
        );
        let too_deep = vec![1; MAX_DIMENSIONS + 1];
        assert_eq!(
            new_array_multi(I32, &too_deep).unwrap_err(),
            ArrayError::InvalidShape { dimensions: 256 }
        );
        assert_eq!(
            new_array_multi(I32, &[3, -2, 4]).unwrap_err(),
            ArrayError::NegativeSize { size: -2 }
        );
        assert_eq!(
            new_array_multi(I32, &[3, 4, -1]).unwrap_err(),
            ArrayError::NegativeSize { size: -1 }
        );
    }

    #[test]
    fn test_unreservable_length_is_an_error() {
        let huge = isize::MAX;
        let failed = ArrayError::AllocationFailed {
            length: huge as usize,
        };
        assert_eq!(new_array(I64, huge).unwrap_err(), failed);
        assert_eq!(new_array_multi(I64, &[2, huge]).unwrap_err(), failed);
        assert_eq!(new_array_multi(I8, &[huge, 3]).unwrap_err(), failed);

        let source = new_array(F64, 1).unwrap();
        assert_eq!(with_length(&source, huge).unwrap_err(), failed);
    }

    #[test]
    fn test_multi_allocates_nested_arrays() {
        let grid = new_array_multi(I32, &[3, 4]).unwrap();
        assert_eq!(grid.len(), 3);
        assert_eq!(grid.component_kind(), Obj);
        for index in 0..3 {
            let row = grid.get_obj(index).unwrap().unwrap();
            let row = row.as_array().unwrap().read();
            assert_eq!(row.len(), 4);
            assert_eq!(row.component_kind(), I32);
            assert_eq!(row.get(3), Ok(Value::I32(0)));
        }

        let first = grid.get_obj(0).unwrap().unwrap();
        let second = grid.get_obj(1).unwrap().unwrap();
        assert!(!first.ptr_eq(&second));
    }

    #[test]
    fn test_multi_three_dimensions() {
        let cube = new_array_multi(Bool, &[2, 0, 5]).unwrap();
        assert_eq!(cube.component_type(), ComponentType::Array { leaf: Bool, rank: 2 });
        let plane = cube.get_obj(1).unwrap().unwrap();
        let plane = plane.as_array().unwrap();
        assert_eq!(plane.component_type(), ComponentType::Array { leaf: Bool, rank: 1 });
        assert!(plane.read().is_empty());
    }

    #[test]
    fn test_multi_single_extent_matches_new_array() {
        let flat = new_array_multi(F32, &[6]).unwrap();
        assert_eq!(flat.component_type(), ComponentType::Scalar(F32));
        assert_eq!(flat.len(), 6);
    }

    #[test]
    fn test_clone_shape_is_zeroed() {
        let mut source = new_array(I16, 3).unwrap();
        source.set_i16(0, 9).unwrap();
        source.set_i8(2, -1).unwrap();

        let copy = clone_shape(&source);
        assert_eq!(copy.len(), source.len());
        assert_eq!(copy.component_kind(), source.component_kind());
        for index in 0..3 {
            assert_eq!(copy.get(index), Ok(Value::I16(0)));
        }

        let grid = new_array_multi(I8, &[2, 2]).unwrap();
        let empty_grid = grid.clone_shape();
        assert_eq!(empty_grid.component_type(), grid.component_type());
        assert_eq!(empty_grid.get_obj(0), Ok(None));
    }

    #[test]
    fn test_with_length() {
        let source = new_array(Char, 2).unwrap();
        let longer = with_length(&source, 10).unwrap();
        assert_eq!(longer.len(), 10);
        assert_eq!(longer.component_kind(), Char);
        assert_eq!(
            with_length(&source, -1).unwrap_err(),
            ArrayError::NegativeSize { size: -1 }
        );
    }

    #[test]
    fn test_from_values_widens_each_element() {
        let array = from_values(F64, [Value::I8(1), Value::F32(2.5), Value::Char(3)]).unwrap();
        assert_eq!(array.len(), 3);
        assert_eq!(array.get_f64(0), Ok(1.0));
        assert_eq!(array.get_f64(1), Ok(2.5));
        assert_eq!(array.get_f64(2), Ok(3.0));

        assert_eq!(
            from_values(I32, [Value::I32(1), Value::I64(2)]).unwrap_err(),
            ArrayError::InvalidConversion { from: I64, to: I32 }
        );
    }
}
