//! `mm-exec` - Partitioning, kernels and executors for matbench.
//!
//! This crate provides:
//! - `partition`, the static row split shared by every parallel executor
//! - Two kernel variants with different access orders on operand B
//! - An `Executor` trait with sequential, thread, process and data-parallel
//!   implementations
//! - A `Timer` and the `measure` driver that times one executor run

pub mod bench;
pub mod data_parallel;
pub mod error;
pub mod executor;
pub mod kernel;
pub mod partition;
pub mod plan;
pub mod processes;
pub mod sequential;
pub mod threads;
pub mod timer;

// Re-export primary types at the crate root for convenience.
pub use bench::measure;
pub use data_parallel::DataParallelExecutor;
pub use error::{ExecError, Result};
pub use executor::{Executor, Substrate};
pub use kernel::{KernelFn, KernelVariant};
pub use partition::{partition, WorkAssignment};
pub use plan::ExecutionPlan;
pub use processes::ProcessPoolExecutor;
pub use sequential::SequentialExecutor;
pub use threads::ThreadPoolExecutor;
pub use timer::{Timer, TimingSample};
