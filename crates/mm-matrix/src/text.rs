//! Plain-text matrix files.
//!
//! A file holds `n` lines of `n` whitespace-separated base-10 integers. There
//! is no header: the order must be known before parsing.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{MatrixError, Result};
use crate::matrix::Matrix;
use crate::storage::StorageMode;

/// Read an `order × order` matrix from `path` into storage of `mode`.
///
/// Tokens past the first `order * order` are ignored.
///
/// # Errors
/// - [`MatrixError::FileOpen`] if the file cannot be opened or read.
/// - [`MatrixError::InvalidToken`] if a token before the last required value
///   is not an `i32`.
/// - [`MatrixError::FileFormat`] if the file holds too few integers.
pub fn read_matrix(path: &Path, order: usize, mode: StorageMode) -> Result<Matrix> {
    let text = std::fs::read_to_string(path).map_err(|source| MatrixError::FileOpen {
        path: path.to_path_buf(),
        source,
    })?;

    let mut matrix = Matrix::allocate(order, mode)?;
    let cells = matrix.as_mut_slice();
    let expected = cells.len();

    let mut found = 0;
    for (index, (cell, token)) in cells.iter_mut().zip(text.split_ascii_whitespace()).enumerate() {
        *cell = token.parse().map_err(|_| MatrixError::InvalidToken {
            path: path.to_path_buf(),
            index,
            token: token.to_string(),
        })?;
        found += 1;
    }

    if found < expected {
        return Err(MatrixError::FileFormat {
            path: path.to_path_buf(),
            expected,
            found,
        });
    }

    info!(path = %path.display(), order, "read matrix");
    Ok(matrix)
}

/// Write `matrix` to `path`, one row per line, each value followed by a space.
///
/// The rows go to a temporary file next to `path`, which is renamed over
/// `path` only once every byte has been flushed. A failed write leaves no
/// file behind.
///
/// # Errors
/// - [`MatrixError::FileOpen`] if the temporary file cannot be created.
/// - [`MatrixError::FileWrite`] if writing, flushing or the final rename fails.
pub fn write_matrix(path: &Path, matrix: &Matrix) -> Result<()> {
    persist_with(path, |out| write_rows(out, matrix))?;
    debug!(path = %path.display(), order = matrix.order(), "wrote matrix");
    Ok(())
}

/// Format `matrix` into `out` in the text layout [`read_matrix`] accepts.
pub fn write_rows<W: Write>(out: &mut W, matrix: &Matrix) -> io::Result<()> {
    for row in matrix.rows() {
        for value in row {
            write!(out, "{} ", value)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Fill a temporary sibling of `path` with `fill`, then move it into place.
fn persist_with<F>(path: &Path, fill: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<&File>) -> io::Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let tmp = NamedTempFile::new_in(dir).map_err(|source| MatrixError::FileOpen {
        path: path.to_path_buf(),
        source,
    })?;
    let write_err = |source| MatrixError::FileWrite {
        path: path.to_path_buf(),
        source,
    };

    {
        let mut out = BufWriter::new(tmp.as_file());
        fill(&mut out).map_err(write_err)?;
        out.flush().map_err(write_err)?;
    }

    // Temporary files are created owner-only; give the result the usual mode.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o644))
            .map_err(write_err)?;
    }

    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.txt");
        let m = Matrix::from_rows(&[[1, -2, 3], [40, 50, 60], [i32::MIN, 0, i32::MAX]]).unwrap();

        write_matrix(&path, &m).unwrap();
        let back = read_matrix(&path, 3, StorageMode::Private).unwrap();
        assert_eq!(back, m);

        let shared = read_matrix(&path, 3, StorageMode::Shared).unwrap();
        assert_eq!(shared.mode(), StorageMode::Shared);
        assert_eq!(shared, m);
    }

    #[test]
    fn test_written_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.txt");
        let m = Matrix::from_rows(&[[1, 2], [3, 4]]).unwrap();
        write_matrix(&path, &m).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "1 2 \n3 4 \n");
    }

    #[test]
    fn test_any_whitespace_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.txt");
        std::fs::write(&path, "1\t2\n\n 3   4 5 6").unwrap();
        let m = read_matrix(&path, 2, StorageMode::Private).unwrap();
        assert_eq!(m.as_slice(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_too_few_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.txt");
        std::fs::write(&path, "1 2 3\n").unwrap();
        let err = read_matrix(&path, 2, StorageMode::Private).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileFormatFailure);
        assert!(matches!(err, MatrixError::FileFormat { expected: 4, found: 3, .. }));
    }

    #[test]
    fn test_bad_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.txt");
        std::fs::write(&path, "1 x 3 4\n").unwrap();
        let err = read_matrix(&path, 2, StorageMode::Private).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileFormatFailure);
        assert!(matches!(err, MatrixError::InvalidToken { index: 1, .. }));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_matrix(&dir.path().join("nope.txt"), 2, StorageMode::Private).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileOpenFailure);
    }

    /// Accepts `limit` bytes, then fails like a full disk.
    struct FullDisk {
        limit: usize,
    }

    impl Write for FullDisk {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.limit == 0 {
                return Err(io::Error::new(io::ErrorKind::Other, "no space left"));
            }
            let n = buf.len().min(self.limit);
            self.limit -= n;
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_rows_reports_sink_failure() {
        let m = Matrix::from_rows(&[[1, 2], [3, 4]]).unwrap();
        let mut sink = FullDisk { limit: 5 };
        assert!(write_rows(&mut sink, &m).is_err());
    }

    #[test]
    fn test_failed_write_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.out");

        let err = persist_with(&path, |out| {
            out.write_all(b"1 2 \n")?;
            out.flush()?;
            Err(io::Error::new(io::ErrorKind::Other, "no space left"))
        })
        .unwrap_err();

        assert!(matches!(err, MatrixError::FileWrite { .. }));
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_failed_write_keeps_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.out");
        std::fs::write(&path, "old").unwrap();

        let result = persist_with(&path, |_| Err(io::Error::new(io::ErrorKind::Other, "full")));
        assert!(result.is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "old");
    }

    #[test]
    fn test_write_into_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("c.out");
        let m = Matrix::from_rows(&[[1]]).unwrap();
        let err = write_matrix(&path, &m).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileOpenFailure);
        assert!(!path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_written_file_is_world_readable() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.txt");
        write_matrix(&path, &Matrix::from_rows(&[[7]]).unwrap()).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[test]
    fn test_empty_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        std::fs::write(&path, "").unwrap();
        let m = read_matrix(&path, 0, StorageMode::Private).unwrap();
        assert_eq!(m.order(), 0);
    }
}
