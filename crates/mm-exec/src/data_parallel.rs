use std::panic::{self, AssertUnwindSafe};

use mm_matrix::Matrix;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use tracing::debug;

use crate::error::{ExecError, Result};
use crate::executor::{Executor, Substrate};
use crate::kernel::KernelFn;
use crate::partition::WorkAssignment;
use crate::plan::ExecutionPlan;

/// Runs the row loop as a data-parallel loop on a rayon thread team.
///
/// The team has exactly `plan.workers()` threads. The loop iterates over the
/// plan's assignments with their row slices already split off, so the
/// iteration space is the static block partition of the plan, and which team
/// thread picks up which block is left to the runtime. `install` returns only
/// after every iteration has finished, which is the loop's closing barrier.
/// A block whose kernel panics is reported as [`ExecError::WorkerWait`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DataParallelExecutor;

impl Executor for DataParallelExecutor {
    fn substrate(&self) -> Substrate {
        Substrate::DataParallel
    }

    fn run(&self, plan: &ExecutionPlan, a: &Matrix, b: &Matrix, result: &mut Matrix) -> Result<()> {
        plan.check_operands(a, b, result)?;
        let kernel = plan.kernel_fn();
        let n = plan.order();
        let workers = plan.workers();
        let (a, b) = (a.as_slice(), b.as_slice());

        let chunks = plan.split_rows(result.as_mut_slice());
        run_team(workers, chunks, kernel, a, b, n)?;

        debug!(workers, "data-parallel loop finished");
        Ok(())
    }
}

fn run_team(
    workers: usize,
    chunks: Vec<(&WorkAssignment, &mut [i32])>,
    kernel: KernelFn,
    a: &[i32],
    b: &[i32],
    n: usize,
) -> Result<()> {
    let team = ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("mm-team-{}", i))
        .build()
        .map_err(|source| ExecError::TeamBuild { workers, source })?;

    team.install(|| {
        chunks
            .into_par_iter()
            .with_max_len(1)
            .try_for_each(|(assignment, rows)| {
                let range = assignment.rows.clone();
                panic::catch_unwind(AssertUnwindSafe(|| kernel(a, b, rows, n, range)))
                    .map_err(|_| ExecError::WorkerWait {
                        worker: assignment.worker,
                        status: "loop iteration panicked".to_string(),
                    })
            })
    })
}
