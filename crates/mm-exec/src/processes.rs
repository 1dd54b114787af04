use mm_matrix::{Matrix, StorageMode};

use crate::error::{ExecError, Result};
use crate::executor::{Executor, Substrate};
use crate::plan::ExecutionPlan;

/// Forks one OS process per assignment and waits for all of them.
///
/// All three matrices must be in [`StorageMode::Shared`]: a forked child gets
/// a copy-on-write image of the parent's private memory, so only writes into
/// the shared segment survive the child's exit. Each child computes its rows
/// and leaves through `_exit` without running destructors or touching any
/// other state. The parent waits for every child it spawned, even after a
/// failure, so the shared segments outlive all their users.
///
/// Any child that exits non-zero or is killed fails the whole run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessPoolExecutor;

impl ProcessPoolExecutor {
    fn check_shared(a: &Matrix, b: &Matrix, result: &Matrix) -> Result<()> {
        for (operand, m) in [("operand A", a), ("operand B", b), ("result", result)] {
            if m.mode() != StorageMode::Shared {
                return Err(ExecError::SharedStorageRequired { operand });
            }
        }
        Ok(())
    }
}

impl Executor for ProcessPoolExecutor {
    fn substrate(&self) -> Substrate {
        Substrate::Processes
    }

    #[cfg(unix)]
    fn run(&self, plan: &ExecutionPlan, a: &Matrix, b: &Matrix, result: &mut Matrix) -> Result<()> {
        plan.check_operands(a, b, result)?;
        Self::check_shared(a, b, result)?;
        fork::run_forked(plan, a.as_slice(), b.as_slice(), result.as_mut_slice())
    }

    #[cfg(not(unix))]
    fn run(&self, plan: &ExecutionPlan, a: &Matrix, b: &Matrix, result: &mut Matrix) -> Result<()> {
        plan.check_operands(a, b, result)?;
        Self::check_shared(a, b, result)?;
        Err(ExecError::Unsupported("process workers"))
    }
}

#[cfg(unix)]
mod fork {
    use std::io;
    use std::ops::Range;
    use std::panic::{self, AssertUnwindSafe};

    use tracing::{debug, warn};

    use crate::error::{ExecError, Result};
    use crate::kernel::KernelFn;
    use crate::plan::ExecutionPlan;

    /// Exit status of a child whose kernel panicked.
    const CHILD_PANIC_STATUS: libc::c_int = 101;

    pub(super) fn run_forked(plan: &ExecutionPlan, a: &[i32], b: &[i32], result: &mut [i32]) -> Result<()> {
        let kernel = plan.kernel_fn();
        let n = plan.order();

        let mut children = Vec::with_capacity(plan.workers());
        let mut spawn_error = None;

        for (assignment, rows) in plan.split_rows(result) {
            let worker = assignment.worker;
            // SAFETY: the child only runs the kernel, which neither allocates
            // nor locks, over memory it already holds, then calls `_exit`.
            match unsafe { libc::fork() } {
                -1 => {
                    spawn_error = Some(ExecError::WorkerSpawn {
                        worker,
                        source: io::Error::last_os_error(),
                    });
                    break;
                }
                0 => run_child(kernel, a, b, rows, n, assignment.rows.clone()),
                pid => {
                    debug!(worker, pid, start = assignment.row_start(), end = assignment.row_end(), "forked worker");
                    children.push((worker, pid));
                }
            }
        }

        // Reap everything that was started before reporting any failure.
        let mut first_error = spawn_error;
        for (worker, pid) in children {
            if let Err(e) = wait_child(worker, pid) {
                warn!(worker, pid, "worker failed: {e}");
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => {
                debug!(workers = plan.workers(), "all worker processes exited");
                Ok(())
            }
        }
    }

    fn run_child(kernel: KernelFn, a: &[i32], b: &[i32], rows: &mut [i32], n: usize, range: Range<usize>) -> ! {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| kernel(a, b, rows, n, range)));
        let status = if outcome.is_ok() { 0 } else { CHILD_PANIC_STATUS };
        // SAFETY: `_exit` skips atexit handlers and stdio flushing, both of
        // which belong to the parent.
        unsafe { libc::_exit(status) }
    }

    /// Block until `pid` terminates and translate its status.
    pub(super) fn wait_child(worker: usize, pid: libc::pid_t) -> Result<()> {
        let mut status: libc::c_int = 0;
        loop {
            // SAFETY: `status` is a valid out-pointer for the whole call.
            let rc = unsafe { libc::waitpid(pid, &mut status, 0) };
            if rc == pid {
                break;
            }
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            return Err(ExecError::WorkerWait {
                worker,
                status: format!("waitpid failed: {err}"),
            });
        }

        if libc::WIFEXITED(status) {
            match libc::WEXITSTATUS(status) {
                0 => Ok(()),
                code => Err(ExecError::WorkerWait {
                    worker,
                    status: format!("exited with status {code}"),
                }),
            }
        } else if libc::WIFSIGNALED(status) {
            Err(ExecError::WorkerWait {
                worker,
                status: format!("killed by signal {}", libc::WTERMSIG(status)),
            })
        } else {
            Err(ExecError::WorkerWait {
                worker,
                status: format!("unexpected wait status {status:#x}"),
            })
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::kernel::KernelVariant;
    use mm_matrix::{ErrorKind, GenerationContext};

    fn shared(rows: &[[i32; 3]]) -> Matrix {
        Matrix::from_rows(rows).unwrap().to_mode(StorageMode::Shared).unwrap()
    }

    #[test]
    fn test_child_writes_visible_to_parent() {
        let a = shared(&[[1, 2, 3], [4, 5, 6], [7, 8, 9]]);
        let b = Matrix::identity(3, StorageMode::Shared).unwrap();
        let mut c = Matrix::allocate(3, StorageMode::Shared).unwrap();
        let plan = ExecutionPlan::new(3, 3, KernelVariant::Standard).unwrap();
        ProcessPoolExecutor.run(&plan, &a, &b, &mut c).unwrap();
        assert_eq!(c, a);
    }

    #[test]
    fn test_surplus_workers() {
        let mut ctx = GenerationContext::from_seed(11);
        let a = ctx.generate(3, StorageMode::Shared).unwrap();
        let b = ctx.generate(3, StorageMode::Shared).unwrap();

        let mut expected = Matrix::allocate(3, StorageMode::Private).unwrap();
        crate::SequentialExecutor
            .run(&ExecutionPlan::single(3, KernelVariant::Standard), &a, &b, &mut expected)
            .unwrap();

        let mut c = Matrix::allocate(3, StorageMode::Shared).unwrap();
        let plan = ExecutionPlan::new(3, 6, KernelVariant::Standard).unwrap();
        ProcessPoolExecutor.run(&plan, &a, &b, &mut c).unwrap();
        assert_eq!(c, expected);
    }

    #[test]
    fn test_private_result_rejected() {
        let a = Matrix::identity(2, StorageMode::Shared).unwrap();
        let mut c = Matrix::allocate(2, StorageMode::Private).unwrap();
        let plan = ExecutionPlan::new(2, 2, KernelVariant::Standard).unwrap();
        let err = ProcessPoolExecutor.run(&plan, &a, &a, &mut c).unwrap_err();
        assert!(matches!(err, ExecError::SharedStorageRequired { operand: "result" }));
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_nonzero_exit_is_reported() {
        // SAFETY: the child exits immediately.
        let pid = unsafe { libc::fork() };
        if pid == 0 {
            unsafe { libc::_exit(3) };
        }
        let err = fork::wait_child(7, pid).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WorkerWaitFailure);
        match err {
            ExecError::WorkerWait { worker, status } => {
                assert_eq!(worker, 7);
                assert_eq!(status, "exited with status 3");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_killed_child_is_reported() {
        // SAFETY: the child kills itself immediately.
        let pid = unsafe { libc::fork() };
        if pid == 0 {
            unsafe {
                libc::kill(libc::getpid(), libc::SIGKILL);
                libc::_exit(0);
            }
        }
        let err = fork::wait_child(0, pid).unwrap_err();
        assert!(matches!(err, ExecError::WorkerWait { ref status, .. } if status.starts_with("killed by signal")));
    }
}
