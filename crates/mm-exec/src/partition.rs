use std::ops::Range;

/// A half-open range of result rows owned by one worker.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkAssignment {
    pub worker: usize,
    pub rows: Range<usize>,
}

impl WorkAssignment {
    pub fn row_start(&self) -> usize {
        self.rows.start
    }

    pub fn row_end(&self) -> usize {
        self.rows.end
    }

    /// Number of rows in the assignment.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true for the empty ranges handed to surplus workers.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Split rows `[0, n)` across `w` workers.
///
/// With `base = n / w` and `remainder = n % w`, worker `i` receives
/// `base + 1` rows if `i < remainder` and `base` rows otherwise. Ranges are
/// contiguous, in increasing row order, and jointly cover `[0, n)`. When
/// `w > n` the trailing workers get empty ranges at `n..n`.
///
/// Returns an empty list for `w == 0`.
pub fn partition(n: usize, w: usize) -> Vec<WorkAssignment> {
    if w == 0 {
        return Vec::new();
    }
    let base = n / w;
    let remainder = n % w;

    let mut next = 0;
    (0..w)
        .map(|worker| {
            let len = base + usize::from(worker < remainder);
            let rows = next..next + len;
            next = rows.end;
            WorkAssignment { worker, rows }
        })
        .collect()
}
