/// Lifecycle of an [`OrderedThreadPool`].
///
/// ```text
/// Running --shutdown()--> Draining --all workers joined--> Terminated
/// ```
///
/// - [`PoolState::Running`] accepts submissions.
/// - [`PoolState::Draining`] rejects new submissions while workers finish
///   every job that was already accepted.
/// - [`PoolState::Terminated`] means every worker has exited and been joined.
///
/// [`OrderedThreadPool`]: crate::OrderedThreadPool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PoolState {
    Running,
    Draining,
    Terminated,
}

impl PoolState {
    /// Returns `true` if the pool accepts new submissions.
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }
}
