use crate::handle::ComponentType;
use crate::kind::ScalarKind;
use thiserror::Error;

/// Errors raised by array access and allocation.
///
/// Every variant is a caller error: nothing is retried and no operation
/// leaves partial effects behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArrayError {
    #[error("array argument is null")]
    NullHandle,

    #[error("object is not an array")]
    NotAnArray,

    #[error("index {index} out of range for length {length}")]
    IndexOutOfRange { index: isize, length: usize },

    #[error("cannot convert {from} to {to}")]
    InvalidConversion { from: ScalarKind, to: ScalarKind },

    #[error("negative array size {size}")]
    NegativeSize { size: isize },

    #[error("array shape has {dimensions} dimensions, expected 1..=255")]
    InvalidShape { dimensions: usize },

    #[error("slot of type {expected} cannot hold {}", describe_found(.found))]
    ElementTypeMismatch {
        expected: ComponentType,
        found: Option<ComponentType>,
    },

    #[error("cannot allocate array of length {length}")]
    AllocationFailed { length: usize },

    #[error("element {index} is null")]
    NullElement { index: usize },
}

fn describe_found(found: &Option<ComponentType>) -> String {
    match found {
        Some(component) => format!("an array of {component}"),
        None => "a non-array object".to_string(),
    }
}

impl ArrayError {
    /// Out-of-range error for an unsigned index.
    pub(crate) fn out_of_range(index: usize, length: usize) -> Self {
        ArrayError::IndexOutOfRange {
            index: isize::try_from(index).unwrap_or(isize::MAX),
            length,
        }
    }
}
