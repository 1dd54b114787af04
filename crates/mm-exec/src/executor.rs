use std::fmt::{self, Debug};

use mm_matrix::{Matrix, StorageMode};

use crate::data_parallel::DataParallelExecutor;
use crate::error::Result;
use crate::plan::ExecutionPlan;
use crate::processes::ProcessPoolExecutor;
use crate::sequential::SequentialExecutor;
use crate::threads::ThreadPoolExecutor;

/// A scheduling substrate that drives a plan's kernel over its assignments.
///
/// `run` blocks until every worker has finished. The result must be zeroed
/// beforehand; kernels accumulate into it. When `run` returns `Ok`, every row
/// of `result` has been written by exactly one worker.
pub trait Executor: Send + Sync + Debug {
    /// The substrate this executor schedules on.
    fn substrate(&self) -> Substrate;

    /// Execute `plan` over operands `a`, `b` into `result`.
    fn run(&self, plan: &ExecutionPlan, a: &Matrix, b: &Matrix, result: &mut Matrix) -> Result<()>;
}

/// The four concurrency substrates the benchmark compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Substrate {
    /// The calling thread, no concurrency.
    Sequential,
    /// One OS thread per assignment in the current address space.
    Threads,
    /// One forked OS process per assignment over shared memory.
    Processes,
    /// A runtime-managed thread team running a data-parallel loop.
    DataParallel,
}

impl Substrate {
    pub const ALL: [Substrate; 4] = [
        Substrate::Sequential,
        Substrate::Threads,
        Substrate::Processes,
        Substrate::DataParallel,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Substrate::Sequential => "sequential",
            Substrate::Threads => "threads",
            Substrate::Processes => "processes",
            Substrate::DataParallel => "data-parallel",
        }
    }

    /// What one worker is called in reports.
    pub fn worker_noun(self) -> &'static str {
        match self {
            Substrate::Processes => "process(es)",
            _ => "thread(s)",
        }
    }

    /// Storage mode the operands and result must be allocated in.
    pub fn storage_mode(self) -> StorageMode {
        match self {
            Substrate::Processes => StorageMode::Shared,
            _ => StorageMode::Private,
        }
    }

    /// Create the executor for this substrate.
    pub fn executor(self) -> Box<dyn Executor> {
        match self {
            Substrate::Sequential => Box::new(SequentialExecutor),
            Substrate::Threads => Box::new(ThreadPoolExecutor),
            Substrate::Processes => Box::new(ProcessPoolExecutor),
            Substrate::DataParallel => Box::new(DataParallelExecutor),
        }
    }
}

impl fmt::Display for Substrate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_executor_reports_its_substrate() {
        for substrate in Substrate::ALL {
            assert_eq!(substrate.executor().substrate(), substrate);
        }
    }

    #[test]
    fn test_storage_modes() {
        assert_eq!(Substrate::Processes.storage_mode(), StorageMode::Shared);
        assert_eq!(Substrate::Threads.storage_mode(), StorageMode::Private);
        assert_eq!(Substrate::Processes.worker_noun(), "process(es)");
        assert_eq!(Substrate::DataParallel.to_string(), "data-parallel");
    }
}
