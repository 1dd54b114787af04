use std::num::NonZeroUsize;
use std::path::PathBuf;

use anyhow::{bail, Result};
use mm_exec::{KernelVariant, Substrate};
use tracing::warn;

use crate::cli::CommonArgs;

/// Matrix order used when none is given.
pub const DEFAULT_ORDER: usize = 2000;

/// Result file used when `--result` is not given.
pub const DEFAULT_RESULT_PATH: &str = "result.out";

/// Where the two operand matrices come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperandSource {
    Files { a: PathBuf, b: PathBuf },
    Random { seed: Option<u64> },
}

/// How many workers the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerRequest {
    /// An explicit count from `--threads`.
    Exact(usize),
    /// One (or two, if doubled) per available CPU.
    PerCpu { doubled: bool },
}

/// A fully resolved benchmark run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub substrate: Substrate,
    pub order: usize,
    pub operands: OperandSource,
    pub result_path: PathBuf,
    pub kernel: KernelVariant,
    pub workers: usize,
}

impl RunConfig {
    /// Resolve parsed arguments for `substrate`.
    ///
    /// The sequential substrate always runs one worker and ignores `workers`.
    pub fn resolve(substrate: Substrate, common: &CommonArgs, workers: WorkerRequest) -> Result<Self> {
        let operands = match common.files.as_deref() {
            Some([a, b]) => OperandSource::Files {
                a: a.clone(),
                b: b.clone(),
            },
            Some(other) => bail!("--files takes exactly two paths, got {}", other.len()),
            None => OperandSource::Random { seed: common.seed },
        };

        let kernel = if common.transpose {
            KernelVariant::TransposeAccess
        } else {
            KernelVariant::Standard
        };

        let workers = match substrate {
            Substrate::Sequential => 1,
            _ => resolve_workers(workers, hardware_parallelism())?,
        };

        Ok(RunConfig {
            substrate,
            order: common.order,
            operands,
            result_path: common.result.clone(),
            kernel,
            workers,
        })
    }
}

/// Turn a worker request into a count, given the number of available CPUs.
pub fn resolve_workers(request: WorkerRequest, cpus: usize) -> Result<usize> {
    match request {
        WorkerRequest::Exact(0) => bail!("worker count must be at least 1"),
        WorkerRequest::Exact(n) => Ok(n),
        WorkerRequest::PerCpu { doubled } => Ok(if doubled { cpus * 2 } else { cpus }),
    }
}

/// Number of CPUs available to this process, or 1 if it cannot be queried.
pub fn hardware_parallelism() -> usize {
    match std::thread::available_parallelism() {
        Ok(n) => n.get(),
        Err(e) => {
            warn!("cannot query available parallelism, using 1: {e}");
            NonZeroUsize::MIN.get()
        }
    }
}
