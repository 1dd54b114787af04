use mm_matrix::Matrix;
use tracing::debug;

use crate::error::{ExecError, Result};
use crate::kernel::{KernelFn, KernelVariant};
use crate::partition::{partition, WorkAssignment};

/// Everything an executor needs to multiply two matrices of one order: the
/// worker count, the row assignment of each worker, and the kernel.
///
/// The assignments, in worker order, partition `[0, order)` exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPlan {
    order: usize,
    kernel: KernelVariant,
    assignments: Vec<WorkAssignment>,
}

impl ExecutionPlan {
    /// Build a plan splitting `order` rows across `workers` workers.
    ///
    /// # Errors
    /// Returns [`ExecError::InvalidWorkerCount`] if `workers == 0`.
    pub fn new(order: usize, workers: usize, kernel: KernelVariant) -> Result<Self> {
        if workers == 0 {
            return Err(ExecError::InvalidWorkerCount);
        }
        let assignments = partition(order, workers);
        debug!(order, workers, %kernel, "built execution plan");
        Ok(ExecutionPlan {
            order,
            kernel,
            assignments,
        })
    }

    /// A single-worker plan covering every row.
    pub fn single(order: usize, kernel: KernelVariant) -> Self {
        ExecutionPlan {
            order,
            kernel,
            assignments: partition(order, 1),
        }
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn workers(&self) -> usize {
        self.assignments.len()
    }

    pub fn kernel(&self) -> KernelVariant {
        self.kernel
    }

    pub fn kernel_fn(&self) -> KernelFn {
        self.kernel.kernel()
    }

    pub fn assignments(&self) -> &[WorkAssignment] {
        &self.assignments
    }

    /// Check that all three matrices have the plan's order.
    pub fn check_operands(&self, a: &Matrix, b: &Matrix, result: &Matrix) -> Result<()> {
        for (operand, m) in [("operand A", a), ("operand B", b), ("result", result)] {
            if m.order() != self.order {
                return Err(ExecError::OrderMismatch {
                    operand,
                    expected: self.order,
                    got: m.order(),
                });
            }
        }
        Ok(())
    }

    /// Split the result payload into one mutable slice per assignment, in
    /// worker order.
    ///
    /// The slices are disjoint, so each worker can own its rows outright.
    /// Empty assignments get empty slices.
    pub fn split_rows<'r>(&self, result: &'r mut [i32]) -> Vec<(&WorkAssignment, &'r mut [i32])> {
        let n = self.order;
        let mut rest = result;
        self.assignments
            .iter()
            .map(|assignment| {
                let (rows, tail) = std::mem::take(&mut rest).split_at_mut(assignment.len() * n);
                rest = tail;
                (assignment, rows)
            })
            .collect()
    }
}
