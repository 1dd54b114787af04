use mm_matrix::{ErrorKind, MatrixError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecError {
    #[error(transparent)]
    Matrix(#[from] MatrixError),
    #[error("worker count must be at least 1")]
    InvalidWorkerCount,
    #[error("{operand} has order {got}, plan expects {expected}")]
    OrderMismatch {
        operand: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("{operand} must live in shared storage for process workers")]
    SharedStorageRequired { operand: &'static str },
    #[error("failed to spawn worker {worker}")]
    WorkerSpawn {
        worker: usize,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to start a team of {workers} threads")]
    TeamBuild {
        workers: usize,
        #[source]
        source: rayon::ThreadPoolBuildError,
    },
    #[error("worker {worker} terminated abnormally: {status}")]
    WorkerWait { worker: usize, status: String },
    #[error("{0} is not supported on this platform")]
    Unsupported(&'static str),
}

impl ExecError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExecError::Matrix(e) => e.kind(),
            ExecError::InvalidWorkerCount
            | ExecError::OrderMismatch { .. }
            | ExecError::SharedStorageRequired { .. }
            | ExecError::Unsupported(_) => ErrorKind::InvalidInput,
            ExecError::WorkerSpawn { .. } | ExecError::TeamBuild { .. } => {
                ErrorKind::WorkerSpawnFailure
            }
            ExecError::WorkerWait { .. } => ErrorKind::WorkerWaitFailure,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExecError>;
