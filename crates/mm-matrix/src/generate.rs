use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::Result;
use crate::matrix::Matrix;
use crate::storage::StorageMode;

/// Random source for operand matrices.
///
/// Owns its RNG so generation is reproducible from a seed and never touches
/// global state.
pub struct GenerationContext {
    rng: StdRng,
}

impl GenerationContext {
    /// Largest value written by [`GenerationContext::fill`]; values are drawn
    /// uniformly from `0..=MAX_VALUE`.
    pub const MAX_VALUE: i32 = 9;

    /// Create a context with a fixed seed for reproducibility.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create a context seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Overwrite every element of `matrix` with a random value.
    pub fn fill(&mut self, matrix: &mut Matrix) {
        for cell in matrix.as_mut_slice() {
            *cell = self.rng.gen_range(0..=Self::MAX_VALUE);
        }
    }

    /// Allocate and fill a new matrix.
    pub fn generate(&mut self, order: usize, mode: StorageMode) -> Result<Matrix> {
        let mut m = Matrix::allocate(order, mode)?;
        self.fill(&mut m);
        Ok(m)
    }
}
