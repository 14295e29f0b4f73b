//! Umbrella crate for the tellur workspace.
//!
//! Everything lives in the member crates; this crate only stitches
//! their public surfaces together under one name.

pub extern crate tellur_array_types;
pub extern crate tellur_byte_tools;
pub extern crate tellur_fs_util;
pub extern crate tellur_matrix;
pub extern crate tellur_slice_math;

pub use tellur_array_types as array_types;
pub use tellur_byte_tools as byte_tools;
pub use tellur_fs_util as fs_util;
pub use tellur_matrix as matrix;
pub use tellur_slice_math as slice_math;

// The types almost every consumer wants by name.
pub use tellur_array_types::{Mat3, V3};
pub use tellur_matrix::{DenseMatrix, IdentityMatrix, LinearOperator, MultStrategy};
pub use tellur_matrix::{FailResult, Scalar};
