//! Error types for the ordered pool.
//!
//! ## Error Cases
//! - `PoolShutdown`: A job was submitted after shutdown was requested.
//! - `Spawn`: A worker thread could not be created during construction.
//!
//! Queue contention is never an error. A full queue blocks the submitter until
//! a worker makes room.

use core::fmt;
use std::any::Any;

/// A result type whose error defaults to [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants that `ordered-pool` can emit.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The pool is draining or terminated and no longer accepts work.
    ///
    /// A submitter that was blocked on a full queue when shutdown began also
    /// receives this error; its job was never accepted.
    #[error("pool is shutting down; submission rejected")]
    PoolShutdown,

    /// A worker thread failed to start. Any workers spawned before it have
    /// already been shut down and joined.
    #[error("failed to spawn worker {index}: {source}")]
    Spawn {
        index: usize,
        #[source]
        source: std::io::Error,
    },
}

/// The step of a job that panicked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    Compute,
    Finalize,
}

impl fmt::Display for Stage {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Compute => fmt.write_str("compute"),
            Self::Finalize => fmt.write_str("finalize"),
        }
    }
}

/// A panic caught inside a job.
///
/// Workers never unwind past a job boundary. The panic is captured, counted in
/// [`PoolStats`], and (for compute panics submitted through
/// [`OrderedThreadPool::submit_with_outcome`]) handed to the finalize step.
///
/// [`PoolStats`]: crate::PoolStats
/// [`OrderedThreadPool::submit_with_outcome`]: crate::OrderedThreadPool::submit_with_outcome
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
#[error("job {sequence} panicked during {stage}: {message}")]
pub struct JobPanic {
    /// Submission sequence of the job.
    pub sequence: u64,
    /// Which step panicked.
    pub stage: Stage,
    /// The panic payload, when it was a string.
    pub message: String,
}

impl JobPanic {
    pub(crate) fn from_payload(sequence: u64, stage: Stage, payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_owned()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            String::from("<non-string panic payload>")
        };
        Self {
            sequence,
            stage,
            message,
        }
    }
}
