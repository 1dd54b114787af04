use std::thread;

use mm_matrix::Matrix;
use tracing::debug;

use crate::error::{ExecError, Result};
use crate::executor::{Executor, Substrate};
use crate::plan::ExecutionPlan;

/// Spawns one OS thread per assignment and joins them all.
///
/// Each thread receives exclusive ownership of its slice of result rows, so
/// the result needs no lock: the borrow checker enforces the disjoint-write
/// partition. Operands are shared read-only.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadPoolExecutor;

impl Executor for ThreadPoolExecutor {
    fn substrate(&self) -> Substrate {
        Substrate::Threads
    }

    fn run(&self, plan: &ExecutionPlan, a: &Matrix, b: &Matrix, result: &mut Matrix) -> Result<()> {
        plan.check_operands(a, b, result)?;
        let kernel = plan.kernel_fn();
        let n = plan.order();
        let (a, b) = (a.as_slice(), b.as_slice());
        let chunks = plan.split_rows(result.as_mut_slice());

        thread::scope(|scope| -> Result<()> {
            let mut handles = Vec::with_capacity(chunks.len());
            for (assignment, rows) in chunks {
                let worker = assignment.worker;
                let range = assignment.rows.clone();
                debug!(worker, start = range.start, end = range.end, "spawning thread");
                let handle = thread::Builder::new()
                    .name(format!("mm-worker-{}", worker))
                    .spawn_scoped(scope, move || kernel(a, b, rows, n, range))
                    .map_err(|source| ExecError::WorkerSpawn { worker, source })?;
                handles.push((worker, handle));
            }

            for (worker, handle) in handles {
                handle.join().map_err(|_| ExecError::WorkerWait {
                    worker,
                    status: "thread panicked".to_string(),
                })?;
            }
            debug!(workers = plan.workers(), "joined all threads");
            Ok(())
        })
    }
}
