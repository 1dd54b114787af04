use mm_matrix::Matrix;

use crate::error::Result;
use crate::executor::{Executor, Substrate};
use crate::plan::ExecutionPlan;

/// Runs every assignment on the calling thread, in worker order.
///
/// With a single-worker plan this is one kernel call over `[0, n)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialExecutor;

impl Executor for SequentialExecutor {
    fn substrate(&self) -> Substrate {
        Substrate::Sequential
    }

    fn run(&self, plan: &ExecutionPlan, a: &Matrix, b: &Matrix, result: &mut Matrix) -> Result<()> {
        plan.check_operands(a, b, result)?;
        let kernel = plan.kernel_fn();
        let n = plan.order();
        for (assignment, rows) in plan.split_rows(result.as_mut_slice()) {
            kernel(a.as_slice(), b.as_slice(), rows, n, assignment.rows.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::KernelVariant;
    use mm_matrix::StorageMode;

    #[test]
    fn test_identity() {
        let a = Matrix::from_rows(&[[1, 2, 3], [4, 5, 6], [7, 8, 9]]).unwrap();
        let b = Matrix::identity(3, StorageMode::Private).unwrap();
        let mut c = Matrix::allocate(3, StorageMode::Private).unwrap();
        let plan = ExecutionPlan::single(3, KernelVariant::Standard);
        SequentialExecutor.run(&plan, &a, &b, &mut c).unwrap();
        assert_eq!(c, a);
    }

    #[test]
    fn test_multi_assignment_plan() {
        let a = Matrix::from_rows(&[[1, 2], [3, 4]]).unwrap();
        let b = Matrix::from_rows(&[[5, 6], [7, 8]]).unwrap();
        let mut c = Matrix::allocate(2, StorageMode::Private).unwrap();
        let plan = ExecutionPlan::new(2, 5, KernelVariant::Standard).unwrap();
        SequentialExecutor.run(&plan, &a, &b, &mut c).unwrap();
        assert_eq!(c.as_slice(), &[19, 22, 43, 50]);
    }

    #[test]
    fn test_order_mismatch() {
        let a = Matrix::allocate(2, StorageMode::Private).unwrap();
        let mut c = Matrix::allocate(2, StorageMode::Private).unwrap();
        let plan = ExecutionPlan::single(3, KernelVariant::Standard);
        assert!(SequentialExecutor.run(&plan, &a, &a, &mut c).is_err());
    }
}
