//! Varray Core
//!
//! Uniform access to arrays of any scalar element kind:
//! - Scalar kinds and the widening lattice
//! - Fixed-length typed array handles
//! - Guarded get/set/length over opaque references
//! - Allocation of single and multi-dimensional arrays
//! - Boxing between primitive and object arrays

pub mod boxing;
pub mod error;
pub mod facade;
pub mod factory;
pub mod guard;
pub mod handle;
pub mod kind;
pub mod value;

pub use boxing::{to_boxed, to_primitive};
pub use error::ArrayError;
pub use factory::{clone_shape, from_values, new_array, new_array_multi, with_length, MAX_DIMENSIONS};
pub use guard::{require_array, require_array_mut};
pub use handle::{ArrayHandle, ComponentType};
pub use kind::{can_widen, lattice, Lattice, ScalarKind};
pub use value::{NestedArray, ObjRef, Value};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
