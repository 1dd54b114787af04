//! `mm-matrix` - Square integer matrices for matbench.
//!
//! This crate provides:
//! - A `Matrix` type over private or cross-process shared storage
//! - The `SharedRegion` segment that forked workers write results into
//! - The plain-text matrix file format
//! - A seeded `GenerationContext` for random operands

pub mod error;
pub mod generate;
pub mod matrix;
pub mod shared;
pub mod storage;
pub mod text;

// Re-export primary types at the crate root for convenience.
pub use error::{ErrorKind, MatrixError, Result};
pub use generate::GenerationContext;
pub use matrix::Matrix;
pub use shared::SharedRegion;
pub use storage::{MatrixStorage, StorageMode};
pub use text::{read_matrix, write_matrix, write_rows};
