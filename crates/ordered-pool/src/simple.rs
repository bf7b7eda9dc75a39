use crate::{
    config::PoolConfig, error::Result, pool::OrderedThreadPool, state::PoolState,
    stats::PoolStats,
};

/// A plain thread pool built on [`OrderedThreadPool`].
///
/// Jobs have no finalize step, so no ordering is observable to callers. The
/// queue, backpressure and drain-on-shutdown behavior are the same as the
/// ordered pool's.
///
/// # Example
/// ```
/// use ordered_pool::ThreadPool;
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// let pool = ThreadPool::new(4).unwrap();
/// let hits = Arc::new(AtomicUsize::new(0));
/// for _ in 0..16 {
///     let hits = Arc::clone(&hits);
///     pool.submit(move || {
///         hits.fetch_add(1, Ordering::Relaxed);
///     })
///     .unwrap();
/// }
/// pool.shutdown();
/// assert_eq!(hits.load(Ordering::Relaxed), 16);
/// ```
#[derive(Debug)]
pub struct ThreadPool {
    inner: OrderedThreadPool<()>,
}

impl ThreadPool {
    /// Queue capacity used by [`ThreadPool::new`].
    pub const DEFAULT_QUEUE_CAPACITY: usize = 1;

    /// Creates a pool with `num_workers` threads and a queue of
    /// [`Self::DEFAULT_QUEUE_CAPACITY`].
    ///
    /// # Errors
    /// - [`Error::Spawn`] if a worker thread could not be created.
    ///
    /// [`Error::Spawn`]: crate::Error::Spawn
    pub fn new(num_workers: usize) -> Result<Self> {
        Self::with_capacity(num_workers, Self::DEFAULT_QUEUE_CAPACITY)
    }

    /// Creates a pool with an explicit queue capacity (`0` is unbounded).
    ///
    /// # Errors
    /// - [`Error::Spawn`] if a worker thread could not be created.
    ///
    /// [`Error::Spawn`]: crate::Error::Spawn
    pub fn with_capacity(num_workers: usize, queue_capacity: usize) -> Result<Self> {
        Self::with_config(PoolConfig::new(num_workers, queue_capacity))
    }

    /// Creates a pool from a [`PoolConfig`] and spawns its workers.
    ///
    /// # Errors
    /// - [`Error::Spawn`] if a worker thread could not be created.
    ///
    /// [`Error::Spawn`]: crate::Error::Spawn
    pub fn with_config(config: PoolConfig) -> Result<Self> {
        Ok(Self {
            inner: OrderedThreadPool::with_config(config)?,
        })
    }

    /// Submits a job. Blocks while the queue is full.
    ///
    /// The closure is moved into the pool and runs later on a worker, so it
    /// must own (or share through `Arc`) everything it touches.
    ///
    /// # Errors
    /// - [`Error::PoolShutdown`] if [`ThreadPool::shutdown`] has been
    ///   requested.
    ///
    /// [`Error::PoolShutdown`]: crate::Error::PoolShutdown
    pub fn submit<F>(&self, job: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.inner.submit(job, |()| {})
    }

    /// Drains all accepted jobs and joins the workers.
    pub fn shutdown(&self) -> PoolStats {
        self.inner.shutdown()
    }

    /// Snapshot of the pool's counters.
    pub fn stats(&self) -> PoolStats {
        self.inner.stats()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PoolState {
        self.inner.state()
    }

    /// Number of worker threads spawned at construction.
    pub const fn num_workers(&self) -> usize {
        self.inner.num_workers()
    }
}
