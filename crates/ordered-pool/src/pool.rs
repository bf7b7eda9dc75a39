use core::fmt;
use std::{
    sync::Arc,
    thread::{self, JoinHandle},
};

use parking_lot::Mutex;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    config::PoolConfig,
    error::{Error, JobPanic, Result},
    job::{ComputeFn, FinalizeFn, Job},
    state::PoolState,
    stats::PoolStats,
    worker::{Shared, is_running_job_of, run_job, worker_loop},
};

/// A fixed-size thread pool that finalizes results in submission order.
///
/// Parallelizes loops of the form
///
/// ```text
/// while ... {
///     use_result(costly_fn());
/// }
/// ```
///
/// by submitting `(costly_fn, use_result)` pairs:
///
/// - Every `costly_fn` may run in parallel, in any order.
/// - Every `use_result` runs in the order the pairs were submitted, one at a
///   time.
/// - Worker threads are spawned once and reused.
/// - When the queue is full, `submit` blocks until a worker frees a slot.
/// - [`shutdown`] (or dropping the pool) blocks until all accepted work has
///   finished.
///
/// # Example
/// ```
/// use ordered_pool::OrderedThreadPool;
/// use std::sync::{Arc, Mutex};
///
/// let pool = OrderedThreadPool::new(4, 8).unwrap();
/// let out = Arc::new(Mutex::new(Vec::new()));
///
/// for i in 0..32_u64 {
///     let out = Arc::clone(&out);
///     pool.submit(move || i * i, move |sq| out.lock().unwrap().push(sq))
///         .unwrap();
/// }
/// pool.shutdown();
///
/// let expected: Vec<u64> = (0..32).map(|i| i * i).collect();
/// assert_eq!(*out.lock().unwrap(), expected);
/// ```
///
/// ## Limitations
/// - The finalize step runs while holding the ticket gate. Keep it short, and
///   never submit to the same pool from inside a job.
/// - A compute step that never returns blocks every later finalize step and
///   blocks [`shutdown`] forever. There is no timeout or cancellation.
///
/// [`shutdown`]: OrderedThreadPool::shutdown
pub struct OrderedThreadPool<R> {
    shared: Arc<Shared<R>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    num_workers: usize,
}

impl<R> OrderedThreadPool<R>
where
    R: 'static,
{
    /// Creates a pool and spawns its workers.
    ///
    /// # Parameters
    /// - `num_workers`: Number of threads to spawn. `0` spawns none and runs
    ///   every job on the calling thread.
    /// - `queue_capacity`: Number of pending jobs allowed before `submit`
    ///   blocks. `0` disables throttling.
    ///
    /// # Errors
    /// - [`Error::Spawn`] if a worker thread could not be created.
    pub fn new(num_workers: usize, queue_capacity: usize) -> Result<Self> {
        Self::with_config(PoolConfig::new(num_workers, queue_capacity))
    }

    /// Creates a pool from a [`PoolConfig`] and spawns its workers.
    ///
    /// All workers are running before this returns. If any worker fails to
    /// spawn, the ones already started are shut down and joined first.
    ///
    /// # Errors
    /// - [`Error::Spawn`] if a worker thread could not be created.
    #[cfg_attr(feature = "tracing", instrument(level = "debug"))]
    pub fn with_config(config: PoolConfig) -> Result<Self> {
        let shared = Arc::new(Shared::new(config.queue_capacity));
        let mut workers = Vec::with_capacity(config.num_workers);

        for index in 0..config.num_workers {
            let mut builder = thread::Builder::new().name(format!("{}-{index}", config.thread_name));
            if let Some(stack_size) = config.stack_size {
                builder = builder.stack_size(stack_size);
            }

            let worker_shared = Arc::clone(&shared);
            match builder.spawn(move || worker_loop(index, worker_shared)) {
                Ok(handle) => workers.push(handle),
                Err(source) => {
                    #[cfg(feature = "tracing")]
                    tracing::error!("Failed to spawn worker {index}: {source}");
                    shared.queue.close();
                    for handle in workers {
                        let _ = handle.join();
                    }
                    shared.queue.mark_terminated();
                    return Err(Error::Spawn { index, source });
                }
            }
        }

        Ok(Self {
            shared,
            workers: Mutex::new(workers),
            num_workers: config.num_workers,
        })
    }

    /// Submits a job.
    ///
    /// `compute` may run on any worker, concurrently with other jobs.
    /// `finalize` receives its result and runs after the finalize step of
    /// every previously submitted job. Returns once the job is accepted, not
    /// once it has run, except with zero workers where both steps run before
    /// returning.
    ///
    /// If `compute` panics, `finalize` is skipped; the panic is counted in
    /// [`PoolStats::compute_panics`] and later jobs proceed normally. Use
    /// [`submit_with_outcome`] to observe the failure in the finalize step.
    ///
    /// Blocks while the queue is full.
    ///
    /// # Errors
    /// - [`Error::PoolShutdown`] if [`shutdown`] has been requested.
    ///
    /// [`submit_with_outcome`]: OrderedThreadPool::submit_with_outcome
    /// [`shutdown`]: OrderedThreadPool::shutdown
    pub fn submit<C, F>(&self, compute: C, finalize: F) -> Result<()>
    where
        C: FnOnce() -> R + Send + 'static,
        F: FnOnce(R) + Send + 'static,
    {
        self.submit_with_outcome(compute, move |outcome| {
            if let Ok(value) = outcome {
                finalize(value);
            }
        })
    }

    /// Submits a job whose finalize step also sees compute failures.
    ///
    /// Behaves like [`submit`], but `finalize` always runs, in order, and
    /// receives `Err(JobPanic)` when `compute` panicked.
    ///
    /// # Errors
    /// - [`Error::PoolShutdown`] if [`shutdown`] has been requested.
    ///
    /// [`submit`]: OrderedThreadPool::submit
    /// [`shutdown`]: OrderedThreadPool::shutdown
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip_all))]
    pub fn submit_with_outcome<C, F>(&self, compute: C, finalize: F) -> Result<()>
    where
        C: FnOnce() -> R + Send + 'static,
        F: FnOnce(core::result::Result<R, JobPanic>) + Send + 'static,
    {
        let compute: ComputeFn<R> = Box::new(compute);
        let finalize: FinalizeFn<R> = Box::new(finalize);

        if self.num_workers == 0 {
            // Sequences still apply so concurrent callers finalize in order.
            let sequence = self.shared.queue.reserve()?;
            run_job(0, &self.shared, Job::new(sequence, compute, finalize));
            return Ok(());
        }

        self.shared.queue.push(compute, finalize)?;
        Ok(())
    }
}

impl<R> OrderedThreadPool<R> {
    /// Stops accepting work, drains every accepted job, and joins all workers.
    ///
    /// Jobs already queued or running are completed, including their finalize
    /// steps, before this returns. Submissions made after this is called fail
    /// with [`Error::PoolShutdown`].
    ///
    /// Calling it again is harmless: concurrent callers wait for the first one
    /// to finish joining, and every call returns the final statistics.
    ///
    /// When called from inside a compute or finalize step of this pool
    /// (including by dropping the last handle there), it only stops accepting
    /// work and returns at once. Accepted jobs still run to completion, and the
    /// workers exit on their own.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self)))]
    pub fn shutdown(&self) -> PoolStats {
        if is_running_job_of(&self.shared) {
            // This thread may hold a ticket that other workers are waiting
            // on. Stop intake only; the workers exit once the queue drains.
            self.shared.queue.close();
            #[cfg(feature = "tracing")]
            tracing::debug!("Shutdown requested from inside a job; not waiting for workers");
            return self.stats();
        }

        let mut workers = self.workers.lock();

        if self.shared.queue.close() {
            #[cfg(feature = "tracing")]
            tracing::info!(
                "Draining pool ({} queued, {} workers)",
                self.shared.queue.len(),
                workers.len()
            );
        }

        for (_index, handle) in workers.drain(..).enumerate() {
            if handle.join().is_err() {
                #[cfg(feature = "tracing")]
                tracing::error!("Worker {_index} exited abnormally");
            }
        }
        drop(workers);

        // Zero-worker pools finalize on callers' threads; wait for them too.
        self.shared.sequencer.wait_until(self.shared.queue.issued());

        if self.shared.queue.state() != PoolState::Terminated {
            self.shared.queue.mark_terminated();
            #[cfg(feature = "tracing")]
            tracing::info!("Worker pool shutdown complete");
        }

        self.stats()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PoolState {
        self.shared.queue.state()
    }

    /// Snapshot of the pool's counters.
    pub fn stats(&self) -> PoolStats {
        let (submitted, queued) = self.shared.queue.depth();
        self.shared.counters.snapshot(submitted, queued)
    }

    /// Number of worker threads spawned at construction.
    pub const fn num_workers(&self) -> usize {
        self.num_workers
    }

    /// Maximum number of queued jobs; `0` means unbounded.
    pub fn queue_capacity(&self) -> usize {
        self.shared.queue.capacity()
    }
}

impl<R> Drop for OrderedThreadPool<R> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl<R> fmt::Debug for OrderedThreadPool<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderedThreadPool")
            .field("num_workers", &self.num_workers)
            .field("queue_capacity", &self.queue_capacity())
            .field("state", &self.state())
            .field("stats", &self.stats())
            .finish()
    }
}
