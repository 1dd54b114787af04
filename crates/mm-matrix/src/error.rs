use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Coarse classification of every failure the benchmark can hit.
///
/// All kinds are fatal: the run either produces one complete result file or
/// nothing at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    AllocationFailure,
    FileOpenFailure,
    FileFormatFailure,
    WorkerSpawnFailure,
    WorkerWaitFailure,
    /// The caller handed over inconsistent operands or parameters.
    InvalidInput,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::AllocationFailure => "AllocationFailure",
            ErrorKind::FileOpenFailure => "FileOpenFailure",
            ErrorKind::FileFormatFailure => "FileFormatFailure",
            ErrorKind::WorkerSpawnFailure => "WorkerSpawnFailure",
            ErrorKind::WorkerWaitFailure => "WorkerWaitFailure",
            ErrorKind::InvalidInput => "InvalidInput",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum MatrixError {
    #[error("failed to allocate {bytes} bytes of matrix storage")]
    Allocation { bytes: usize },
    #[error("matrix of order {order} does not fit in the address space")]
    TooLarge { order: usize },
    #[error("failed to create shared region of {bytes} bytes")]
    SharedRegion {
        bytes: usize,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot open {}", path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}: expected {expected} integers, found {found}", path.display())]
    FileFormat {
        path: PathBuf,
        expected: usize,
        found: usize,
    },
    #[error("{}: token {index} is not an integer: {token:?}", path.display())]
    InvalidToken {
        path: PathBuf,
        index: usize,
        token: String,
    },
    #[error("failed writing {}", path.display())]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("data length {got} does not match order {order} (expected {expected})")]
    DataLength {
        order: usize,
        expected: usize,
        got: usize,
    },
}

impl MatrixError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MatrixError::Allocation { .. }
            | MatrixError::TooLarge { .. }
            | MatrixError::SharedRegion { .. } => ErrorKind::AllocationFailure,
            MatrixError::FileOpen { .. } | MatrixError::FileWrite { .. } => {
                ErrorKind::FileOpenFailure
            }
            MatrixError::FileFormat { .. } | MatrixError::InvalidToken { .. } => {
                ErrorKind::FileFormatFailure
            }
            MatrixError::DataLength { .. } => ErrorKind::InvalidInput,
        }
    }
}

pub type Result<T> = std::result::Result<T, MatrixError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::io;

    #[test]
    fn test_io_cause_is_not_repeated_in_message() {
        let err = MatrixError::FileWrite {
            path: PathBuf::from("c.out"),
            source: io::Error::new(io::ErrorKind::Other, "disk full"),
        };
        assert_eq!(err.to_string(), "failed writing c.out");
        assert_eq!(err.source().map(|s| s.to_string()).as_deref(), Some("disk full"));
    }
}
