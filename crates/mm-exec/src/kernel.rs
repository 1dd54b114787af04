//! Row-range multiplication kernels.
//!
//! Both kernels accumulate `out[i][j] += Σ_k A[i][k] * B[k][j]` for every row
//! `i` of an assigned range, with wrapping (modular) `i32` arithmetic. `out`
//! holds only the assigned rows: row `rows.start` is `out[0..n]`. The result
//! must be zeroed beforehand.
//!
//! Kernels never allocate or lock, and write nothing outside `out`.

use std::fmt;
use std::ops::Range;

/// Signature shared by every kernel.
///
/// - `a`, `b`: full `n × n` row-major operands
/// - `out`: the result rows `rows`, `rows.len() * n` elements
pub type KernelFn = fn(a: &[i32], b: &[i32], out: &mut [i32], n: usize, rows: Range<usize>);

/// Memory-access order used by the inner accumulation loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KernelVariant {
    /// Reads `B[k][j]`, striding down a column of B.
    #[default]
    Standard,
    /// Reads `B[j][k]`, walking a row of B. Computes `A·B` only when the
    /// operand passed as B already holds the transpose of the logical B.
    TransposeAccess,
}

impl KernelVariant {
    /// The kernel function for this variant, resolved once per plan.
    pub fn kernel(self) -> KernelFn {
        match self {
            KernelVariant::Standard => multiply_rows_standard,
            KernelVariant::TransposeAccess => multiply_rows_transposed,
        }
    }

    /// Human-readable name used in reports.
    pub fn name(self) -> &'static str {
        match self {
            KernelVariant::Standard => "standard",
            KernelVariant::TransposeAccess => "transpose",
        }
    }
}

impl fmt::Display for KernelVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `out[i][j] += Σ_k a[i][k] * b[k][j]`.
pub fn multiply_rows_standard(a: &[i32], b: &[i32], out: &mut [i32], n: usize, rows: Range<usize>) {
    debug_assert_eq!(out.len(), rows.len() * n);
    for (out_row, i) in out.chunks_exact_mut(n.max(1)).zip(rows) {
        let a_row = &a[i * n..(i + 1) * n];
        for (j, cell) in out_row.iter_mut().enumerate() {
            let mut acc = *cell;
            for (k, &a_ik) in a_row.iter().enumerate() {
                acc = acc.wrapping_add(a_ik.wrapping_mul(b[k * n + j]));
            }
            *cell = acc;
        }
    }
}

/// `out[i][j] += Σ_k a[i][k] * bt[j][k]`, with `bt` the transposed operand.
pub fn multiply_rows_transposed(a: &[i32], bt: &[i32], out: &mut [i32], n: usize, rows: Range<usize>) {
    debug_assert_eq!(out.len(), rows.len() * n);
    for (out_row, i) in out.chunks_exact_mut(n.max(1)).zip(rows) {
        let a_row = &a[i * n..(i + 1) * n];
        for (j, cell) in out_row.iter_mut().enumerate() {
            let bt_row = &bt[j * n..(j + 1) * n];
            let dot = a_row
                .iter()
                .zip(bt_row)
                .fold(0i32, |acc, (&x, &y)| acc.wrapping_add(x.wrapping_mul(y)));
            *cell = cell.wrapping_add(dot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: [i32; 9] = [1, 2, 3, 4, 5, 6, 7, 8, 9];
    const IDENTITY: [i32; 9] = [1, 0, 0, 0, 1, 0, 0, 0, 1];

    fn transpose(m: &[i32], n: usize) -> Vec<i32> {
        let mut t = vec![0; n * n];
        for i in 0..n {
            for j in 0..n {
                t[j * n + i] = m[i * n + j];
            }
        }
        t
    }

    #[test]
    fn test_identity_standard() {
        let mut out = vec![0; 9];
        multiply_rows_standard(&A, &IDENTITY, &mut out, 3, 0..3);
        assert_eq!(out, A);
    }

    #[test]
    fn test_identity_transposed() {
        let mut out = vec![0; 9];
        multiply_rows_transposed(&A, &IDENTITY, &mut out, 3, 0..3);
        assert_eq!(out, A);
    }

    #[test]
    fn test_basic_product() {
        // [1,2;3,4] @ [5,6;7,8] = [19,22;43,50]
        let mut out = vec![0; 4];
        multiply_rows_standard(&[1, 2, 3, 4], &[5, 6, 7, 8], &mut out, 2, 0..2);
        assert_eq!(out, vec![19, 22, 43, 50]);
    }

    #[test]
    fn test_partial_rows_only_touch_their_slice() {
        let b = [9, 8, 7, 6, 5, 4, 3, 2, 1];
        let mut full = vec![0; 9];
        multiply_rows_standard(&A, &b, &mut full, 3, 0..3);

        let mut middle = vec![0; 3];
        multiply_rows_standard(&A, &b, &mut middle, 3, 1..2);
        assert_eq!(middle, &full[3..6]);
    }

    #[test]
    fn test_accumulates_into_result() {
        let mut out = vec![1; 9];
        multiply_rows_standard(&A, &IDENTITY, &mut out, 3, 0..3);
        assert_eq!(out, A.iter().map(|v| v + 1).collect::<Vec<_>>());
    }

    #[test]
    fn test_variants_agree_on_transposed_operand() {
        let n = 5;
        let a: Vec<i32> = (0..n * n).map(|v| (v as i32 * 7) % 11 - 5).collect();
        let b: Vec<i32> = (0..n * n).map(|v| (v as i32 * 3) % 13 - 6).collect();
        let bt = transpose(&b, n);

        let mut standard = vec![0; n * n];
        let mut transposed = vec![0; n * n];
        KernelVariant::Standard.kernel()(&a, &b, &mut standard, n, 0..n);
        KernelVariant::TransposeAccess.kernel()(&a, &bt, &mut transposed, n, 0..n);
        assert_eq!(standard, transposed);
    }

    #[test]
    fn test_wrapping_overflow() {
        let a = [i32::MAX, i32::MAX, 0, 0];
        let b = [2, 0, 0, 0];
        let mut out = vec![0; 2];
        multiply_rows_standard(&a, &b, &mut out, 2, 0..1);
        assert_eq!(out[0], i32::MAX.wrapping_mul(2));
    }

    #[test]
    fn test_empty_range_is_noop() {
        let mut out: Vec<i32> = Vec::new();
        multiply_rows_standard(&A, &IDENTITY, &mut out, 3, 3..3);
        multiply_rows_transposed(&A, &IDENTITY, &mut out, 3, 3..3);
        assert!(out.is_empty());
    }

    #[test]
    fn test_variant_names() {
        assert_eq!(KernelVariant::default(), KernelVariant::Standard);
        assert_eq!(KernelVariant::Standard.to_string(), "standard");
        assert_eq!(KernelVariant::TransposeAccess.to_string(), "transpose");
    }
}
