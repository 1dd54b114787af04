use mm_matrix::Matrix;
use tracing::info;

use crate::error::Result;
use crate::executor::Executor;
use crate::plan::ExecutionPlan;
use crate::timer::TimingSample;

/// Multiply `a` by `b` into `result` with `executor`, timing only the run.
///
/// The result is validated and zero-filled before the clock starts.
pub fn measure(
    executor: &dyn Executor,
    plan: &ExecutionPlan,
    a: &Matrix,
    b: &Matrix,
    result: &mut Matrix,
) -> Result<TimingSample> {
    plan.check_operands(a, b, result)?;
    result.zero_fill();

    let (outcome, sample) = TimingSample::measure(|| executor.run(plan, a, b, result));
    outcome?;

    info!(
        substrate = %executor.substrate(),
        workers = plan.workers(),
        kernel = %plan.kernel(),
        seconds = sample.seconds(),
        "multiplication finished"
    );
    Ok(sample)
}
