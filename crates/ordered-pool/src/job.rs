use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::error::{JobPanic, Stage};

pub(crate) type ComputeFn<R> = Box<dyn FnOnce() -> R + Send + 'static>;
pub(crate) type FinalizeFn<R> = Box<dyn FnOnce(Result<R, JobPanic>) + Send + 'static>;

/// One unit of submitted work.
///
/// Owned by the submission queue until dequeued, then by exactly one worker
/// until its finalize step has run.
pub(crate) struct Job<R> {
    pub(crate) sequence: u64,
    compute: ComputeFn<R>,
    finalize: FinalizeFn<R>,
}

/// A job whose compute step has finished and is waiting for its ticket.
pub(crate) struct Computed<R> {
    pub(crate) sequence: u64,
    outcome: Result<R, JobPanic>,
    finalize: FinalizeFn<R>,
}

impl<R> Job<R> {
    pub(crate) fn new(sequence: u64, compute: ComputeFn<R>, finalize: FinalizeFn<R>) -> Self {
        Self {
            sequence,
            compute,
            finalize,
        }
    }

    /// Runs the compute step. Must be called with no pool lock held.
    pub(crate) fn compute(self) -> Computed<R> {
        let Self {
            sequence,
            compute,
            finalize,
        } = self;
        let outcome = catch_unwind(AssertUnwindSafe(compute))
            .map_err(|payload| JobPanic::from_payload(sequence, Stage::Compute, payload.as_ref()));
        Computed {
            sequence,
            outcome,
            finalize,
        }
    }
}

impl<R> Computed<R> {
    pub(crate) fn compute_panicked(&self) -> Option<&JobPanic> {
        self.outcome.as_ref().err()
    }

    /// Runs the finalize step. Callers hold the ticket for `self.sequence`.
    pub(crate) fn finalize(self) -> Result<(), JobPanic> {
        let Self {
            sequence,
            outcome,
            finalize,
        } = self;
        catch_unwind(AssertUnwindSafe(move || finalize(outcome)))
            .map_err(|payload| JobPanic::from_payload(sequence, Stage::Finalize, payload.as_ref()))
    }
}
