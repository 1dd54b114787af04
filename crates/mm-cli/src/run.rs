use std::path::Path;

use anyhow::Result;
use mm_exec::{measure, ExecutionPlan, KernelVariant, Substrate};
use mm_matrix::{read_matrix, write_matrix, GenerationContext, Matrix, StorageMode};
use tracing::{debug, info};

use crate::config::{OperandSource, RunConfig};

/// Load or generate both operands in storage of `mode`.
fn load_operands(config: &RunConfig, mode: StorageMode) -> Result<(Matrix, Matrix)> {
    let n = config.order;
    match &config.operands {
        OperandSource::Files { a, b } => Ok((read_matrix(a, n, mode)?, read_matrix(b, n, mode)?)),
        OperandSource::Random { seed } => {
            let mut ctx = match seed {
                Some(seed) => GenerationContext::from_seed(*seed),
                None => GenerationContext::from_entropy(),
            };
            Ok((ctx.generate(n, mode)?, ctx.generate(n, mode)?))
        }
    }
}

/// Run one benchmark and write its result file.
///
/// Nothing is written unless the multiplication completed.
pub fn run_benchmark(config: &RunConfig) -> Result<()> {
    let n = config.order;
    let mode = config.substrate.storage_mode();

    println!("Matrix size: {} x {}", n, n);
    if config.substrate != Substrate::Sequential {
        println!("Using {} {}", config.workers, config.substrate.worker_noun());
    }

    let (a, b) = load_operands(config, mode)?;

    // The transpose-access kernel reads B[j][k]; hand it the transpose so it
    // still computes A·B. Done before timing starts.
    let b = match config.kernel {
        KernelVariant::Standard => b,
        KernelVariant::TransposeAccess => {
            let t = b.transposed(mode)?;
            b.release();
            debug!("transposed operand B");
            t
        }
    };

    let mut result = Matrix::allocate(n, mode)?;
    let plan = ExecutionPlan::new(n, config.workers, config.kernel)?;
    let executor = config.substrate.executor();

    let sample = measure(executor.as_ref(), &plan, &a, &b, &mut result)?;

    println!("Using {} multiplication method", config.kernel);
    println!("Multiplication computation time: {} seconds", sample);

    write_matrix(&config.result_path, &result)?;
    info!(path = %config.result_path.display(), "wrote result matrix");

    a.release();
    b.release();
    result.release();
    Ok(())
}

/// Write a random `order × order` matrix to `output`.
pub fn generate(order: usize, output: &Path, seed: Option<u64>) -> Result<()> {
    let mut ctx = match seed {
        Some(seed) => GenerationContext::from_seed(seed),
        None => GenerationContext::from_entropy(),
    };
    let m = ctx.generate(order, StorageMode::Private)?;
    write_matrix(output, &m)?;
    info!(path = %output.display(), order, "generated matrix");
    Ok(())
}
