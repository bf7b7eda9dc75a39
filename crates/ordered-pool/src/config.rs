/// Construction parameters for an [`OrderedThreadPool`].
///
/// All fields have builder-style setters so a config can be assembled inline:
///
/// ```
/// use ordered_pool::PoolConfig;
///
/// let config = PoolConfig::default()
///     .with_workers(4)
///     .with_queue_capacity(16)
///     .with_thread_name("decoder");
/// assert_eq!(config.num_workers, 4);
/// ```
///
/// [`OrderedThreadPool`]: crate::OrderedThreadPool
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PoolConfig {
    /// Number of persistent worker threads.
    ///
    /// `0` disables threading: every job runs on the submitting thread before
    /// `submit` returns.
    pub num_workers: usize,

    /// Maximum number of jobs waiting to be picked up by a worker.
    ///
    /// When the queue is full, `submit` blocks until a worker dequeues a job.
    /// Together with the workers this bounds accepted-but-unfinished work to
    /// `num_workers + queue_capacity`. `0` disables throttling.
    pub queue_capacity: usize,

    /// Prefix for worker thread names; workers are named `<prefix>-<index>`.
    pub thread_name: String,

    /// Stack size for worker threads, in bytes. `None` uses the platform
    /// default.
    pub stack_size: Option<usize>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            num_workers: num_cpus::get(),
            queue_capacity: 0,
            thread_name: String::from("ordered-pool"),
            stack_size: None,
        }
    }
}

impl PoolConfig {
    /// A config with the given worker count and queue capacity and defaults
    /// for everything else.
    pub fn new(num_workers: usize, queue_capacity: usize) -> Self {
        Self {
            num_workers,
            queue_capacity,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = num_workers;
        self
    }

    #[must_use]
    pub fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }

    #[must_use]
    pub fn with_thread_name(mut self, thread_name: impl Into<String>) -> Self {
        self.thread_name = thread_name.into();
        self
    }

    #[must_use]
    pub fn with_stack_size(mut self, stack_size: usize) -> Self {
        self.stack_size = Some(stack_size);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_available_cores() {
        let config = PoolConfig::default();
        assert!(config.num_workers >= 1);
        assert_eq!(config.queue_capacity, 0);
        assert_eq!(config.thread_name, "ordered-pool");
        assert_eq!(config.stack_size, None);
    }

    #[test]
    fn builder_overrides() {
        let config = PoolConfig::new(3, 7)
            .with_thread_name("emit")
            .with_stack_size(1 << 20);
        assert_eq!(config.num_workers, 3);
        assert_eq!(config.queue_capacity, 7);
        assert_eq!(config.thread_name, "emit");
        assert_eq!(config.stack_size, Some(1 << 20));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: PoolConfig =
            serde_json::from_str(r#"{ "num_workers": 2, "queue_capacity": 5 }"#).unwrap();
        assert_eq!(config.num_workers, 2);
        assert_eq!(config.queue_capacity, 5);
        assert_eq!(config.thread_name, "ordered-pool");

        let json = serde_json::to_string(&config).unwrap();
        let back: PoolConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
