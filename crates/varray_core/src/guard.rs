//! Input validation for opaque array references
//!
//! Every opaque entry point in [`crate::facade`] passes its candidate through
//! here before looking at kinds or indices.

use crate::error::ArrayError;
use crate::handle::ArrayHandle;
use std::any::Any;

/// Resolve a candidate reference to an array handle.
///
/// Fails with [`ArrayError::NullHandle`] for `None` and
/// [`ArrayError::NotAnArray`] for anything that is not an [`ArrayHandle`].
pub fn require_array(candidate: Option<&dyn Any>) -> Result<&ArrayHandle, ArrayError> {
    let candidate = candidate.ok_or(ArrayError::NullHandle)?;
    candidate.downcast_ref::<ArrayHandle>().ok_or_else(|| {
        tracing::debug!("rejected non-array candidate");
        ArrayError::NotAnArray
    })
}

/// Mutable counterpart of [`require_array`].
pub fn require_array_mut(candidate: Option<&mut dyn Any>) -> Result<&mut ArrayHandle, ArrayError> {
    let candidate = candidate.ok_or(ArrayError::NullHandle)?;
    candidate.downcast_mut::<ArrayHandle>().ok_or_else(|| {
        tracing::debug!("rejected non-array candidate");
        ArrayError::NotAnArray
    })
}
