use std::fmt;
use std::mem::size_of;

use crate::error::{MatrixError, Result};
use crate::shared::SharedRegion;

/// Where a matrix keeps its elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageMode {
    /// Process-private heap memory. Visible to every thread of the
    /// allocating process, invisible to other processes.
    Private,
    /// A shared segment inherited by processes forked after allocation.
    Shared,
}

impl fmt::Display for StorageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageMode::Private => f.write_str("private"),
            StorageMode::Shared => f.write_str("shared"),
        }
    }
}

/// Backing memory for a matrix's contiguous row-major payload.
#[derive(Debug)]
pub enum MatrixStorage {
    Private(Vec<i32>),
    Shared(SharedRegion),
}

impl MatrixStorage {
    /// Allocate `len` zeroed elements in the requested mode.
    ///
    /// # Errors
    /// Returns [`MatrixError::Allocation`] if the heap reservation fails, or
    /// [`MatrixError::SharedRegion`] if the shared segment cannot be created.
    pub fn zeroed(mode: StorageMode, len: usize) -> Result<Self> {
        match mode {
            StorageMode::Private => {
                let mut data = Vec::new();
                data.try_reserve_exact(len)
                    .map_err(|_| MatrixError::Allocation {
                        bytes: len.saturating_mul(size_of::<i32>()),
                    })?;
                data.resize(len, 0);
                Ok(MatrixStorage::Private(data))
            }
            StorageMode::Shared => Ok(MatrixStorage::Shared(SharedRegion::zeroed(len)?)),
        }
    }

    /// Wrap an existing vector as private storage.
    pub fn from_vec(data: Vec<i32>) -> Self {
        MatrixStorage::Private(data)
    }

    /// Number of elements in this storage.
    pub fn len(&self) -> usize {
        match self {
            MatrixStorage::Private(v) => v.len(),
            MatrixStorage::Shared(r) => r.len(),
        }
    }

    /// Returns true if the storage contains no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn mode(&self) -> StorageMode {
        match self {
            MatrixStorage::Private(_) => StorageMode::Private,
            MatrixStorage::Shared(_) => StorageMode::Shared,
        }
    }

    pub fn as_slice(&self) -> &[i32] {
        match self {
            MatrixStorage::Private(v) => v.as_slice(),
            MatrixStorage::Shared(r) => r.as_slice(),
        }
    }

    pub fn as_mut_slice(&mut self) -> &mut [i32] {
        match self {
            MatrixStorage::Private(v) => v.as_mut_slice(),
            MatrixStorage::Shared(r) => r.as_mut_slice(),
        }
    }
}
