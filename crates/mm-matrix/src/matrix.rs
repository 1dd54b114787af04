use std::mem::size_of;

use tracing::debug;

use crate::error::{MatrixError, Result};
use crate::storage::{MatrixStorage, StorageMode};

/// An `order × order` grid of `i32`, stored row-major in one contiguous
/// block.
///
/// Row `i` starts at element `i * stride()`. No row-pointer table is kept, so
/// a matrix in shared storage is addressed identically in every process that
/// maps it.
#[derive(Debug)]
pub struct Matrix {
    order: usize,
    storage: MatrixStorage,
}

/// Number of elements of a square matrix, or an error if it overflows.
fn element_count(order: usize) -> Result<usize> {
    order
        .checked_mul(order)
        .filter(|len| len.checked_mul(size_of::<i32>()).is_some())
        .ok_or(MatrixError::TooLarge { order })
}

impl Matrix {
    /// Allocate a zero-filled matrix of the given order.
    ///
    /// # Errors
    /// Fails with an allocation error if the storage cannot be obtained; no
    /// partially allocated matrix is returned.
    pub fn allocate(order: usize, mode: StorageMode) -> Result<Self> {
        let len = element_count(order)?;
        let storage = MatrixStorage::zeroed(mode, len)?;
        debug!(order, %mode, "allocated matrix");
        Ok(Matrix { order, storage })
    }

    /// Build a private matrix from row-major data.
    pub fn from_vec(order: usize, data: Vec<i32>) -> Result<Self> {
        let expected = element_count(order)?;
        if data.len() != expected {
            return Err(MatrixError::DataLength {
                order,
                expected,
                got: data.len(),
            });
        }
        Ok(Matrix {
            order,
            storage: MatrixStorage::from_vec(data),
        })
    }

    /// Build a private matrix from a list of rows.
    ///
    /// Every row must be as long as the number of rows.
    pub fn from_rows<R: AsRef<[i32]>>(rows: &[R]) -> Result<Self> {
        let order = rows.len();
        let mut data = Vec::with_capacity(element_count(order)?);
        for row in rows {
            data.extend_from_slice(row.as_ref());
        }
        Self::from_vec(order, data)
    }

    /// The identity matrix of the given order.
    pub fn identity(order: usize, mode: StorageMode) -> Result<Self> {
        let mut m = Self::allocate(order, mode)?;
        for i in 0..order {
            m.set(i, i, 1);
        }
        Ok(m)
    }

    /// Copy this matrix into freshly allocated storage of `mode`.
    pub fn to_mode(&self, mode: StorageMode) -> Result<Matrix> {
        let mut copy = Self::allocate(self.order, mode)?;
        copy.as_mut_slice().copy_from_slice(self.as_slice());
        Ok(copy)
    }

    /// Returns a new matrix holding the transpose of this one.
    pub fn transposed(&self, mode: StorageMode) -> Result<Matrix> {
        let n = self.order;
        let mut t = Self::allocate(n, mode)?;
        let src = self.as_slice();
        let dst = t.as_mut_slice();
        for i in 0..n {
            for j in 0..n {
                dst[j * n + i] = src[i * n + j];
            }
        }
        Ok(t)
    }

    /// Number of rows (and columns).
    pub fn order(&self) -> usize {
        self.order
    }

    /// Distance in elements between the starts of consecutive rows.
    pub fn stride(&self) -> usize {
        self.order
    }

    pub fn mode(&self) -> StorageMode {
        self.storage.mode()
    }

    /// Size of the element payload in bytes.
    pub fn byte_len(&self) -> usize {
        self.storage.len() * size_of::<i32>()
    }

    pub fn as_slice(&self) -> &[i32] {
        self.storage.as_slice()
    }

    pub fn as_mut_slice(&mut self) -> &mut [i32] {
        self.storage.as_mut_slice()
    }

    /// Returns row `i`.
    ///
    /// # Panics
    /// Panics if `i >= order()`.
    pub fn row(&self, i: usize) -> &[i32] {
        assert!(i < self.order, "row {} out of range for order {}", i, self.order);
        let start = i * self.stride();
        &self.as_slice()[start..start + self.order]
    }

    /// Returns row `i` mutably.
    ///
    /// # Panics
    /// Panics if `i >= order()`.
    pub fn row_mut(&mut self, i: usize) -> &mut [i32] {
        assert!(i < self.order, "row {} out of range for order {}", i, self.order);
        let start = i * self.stride();
        let order = self.order;
        &mut self.as_mut_slice()[start..start + order]
    }

    /// Iterate over rows in order.
    pub fn rows(&self) -> impl Iterator<Item = &[i32]> {
        // chunks(0) panics; an empty matrix has an empty slice anyway.
        self.as_slice().chunks(self.order.max(1))
    }

    pub fn get(&self, i: usize, j: usize) -> i32 {
        self.row(i)[j]
    }

    pub fn set(&mut self, i: usize, j: usize, value: i32) {
        self.row_mut(i)[j] = value;
    }

    /// Reset every element to zero.
    pub fn zero_fill(&mut self) {
        self.as_mut_slice().fill(0);
    }

    /// Release the matrix and its backing memory.
    ///
    /// A shared matrix must only be released once no forked worker still
    /// references it.
    pub fn release(self) {
        debug!(order = self.order, mode = %self.mode(), "releasing matrix");
        drop(self);
    }
}

impl PartialEq for Matrix {
    /// Matrices compare by order and contents, regardless of storage mode.
    fn eq(&self, other: &Self) -> bool {
        self.order == other.order && self.as_slice() == other.as_slice()
    }
}

impl Eq for Matrix {}
