use std::fs::File;
use std::mem::size_of;

use memmap2::MmapMut;
use tracing::debug;

use crate::error::{MatrixError, Result};

/// A block of `i32` elements visible identically to the creating process and
/// every process forked from it afterwards.
///
/// The block is a `MAP_SHARED` mapping of an unlinked temporary file, so a
/// forked child writes into the same physical pages the parent reads. Only the
/// element payload lives here; row addressing is recomputed per process from
/// the base pointer and the row stride.
///
/// The mapping is released on drop. It must not be dropped while any forked
/// process that references it is still running.
#[derive(Debug)]
pub struct SharedRegion {
    mmap: MmapMut,
    len: usize,
    // Keeps the backing file open for the lifetime of the mapping.
    _file: File,
}

impl SharedRegion {
    /// Create a zero-filled shared region holding `len` elements.
    ///
    /// # Errors
    /// Returns [`MatrixError::SharedRegion`] if the backing file cannot be
    /// created, sized or mapped.
    pub fn zeroed(len: usize) -> Result<Self> {
        let bytes = len
            .checked_mul(size_of::<i32>())
            .ok_or(MatrixError::Allocation { bytes: usize::MAX })?;
        // Zero-length mappings are rejected by the OS; map one element instead.
        let map_bytes = bytes.max(size_of::<i32>());

        let region_err = |source| MatrixError::SharedRegion { bytes, source };

        let file = tempfile::tempfile().map_err(region_err)?;
        // A freshly extended file reads back as zeros.
        file.set_len(map_bytes as u64).map_err(region_err)?;

        // SAFETY: the file is private to this region (unlinked, never handed
        // out), so nothing else can truncate or remap it underneath us.
        let mmap = unsafe { MmapMut::map_mut(&file) }.map_err(region_err)?;

        debug!(bytes, "mapped shared matrix region");

        Ok(SharedRegion {
            mmap,
            len,
            _file: file,
        })
    }

    /// Number of elements in the region.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the region holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[i32] {
        // SAFETY: the mapping is page aligned, at least `len * 4` bytes long,
        // and every bit pattern is a valid i32.
        unsafe { std::slice::from_raw_parts(self.mmap.as_ptr().cast::<i32>(), self.len) }
    }

    pub fn as_mut_slice(&mut self) -> &mut [i32] {
        // SAFETY: as in `as_slice`; `&mut self` guarantees exclusive access
        // within this process.
        unsafe { std::slice::from_raw_parts_mut(self.mmap.as_mut_ptr().cast::<i32>(), self.len) }
    }
}
