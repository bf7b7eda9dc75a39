use core::{cell::Cell, ptr};
use std::sync::Arc;

use crate::{job::Job, queue::SubmissionQueue, sequencer::TicketSequencer, stats::Counters};

/// State shared by the pool handle and every worker thread.
///
/// The queue and the ticket gate are independent lock domains; no code path
/// holds both at once.
pub(crate) struct Shared<R> {
    pub(crate) queue: SubmissionQueue<R>,
    pub(crate) sequencer: TicketSequencer,
    pub(crate) counters: Counters,
}

impl<R> Shared<R> {
    pub(crate) fn new(queue_capacity: usize) -> Self {
        Self {
            queue: SubmissionQueue::new(queue_capacity),
            sequencer: TicketSequencer::new(),
            counters: Counters::default(),
        }
    }
}

thread_local! {
    /// Address of the pool whose job this thread is running, or null.
    static RUNNING_POOL: Cell<*const ()> = const { Cell::new(ptr::null()) };
}

/// Marks the current thread as running a job of one pool; restores the
/// previous mark on drop so nested zero-worker pools unwind correctly.
struct RunningGuard {
    previous: *const (),
}

impl RunningGuard {
    fn enter<R>(shared: &Shared<R>) -> Self {
        let previous = RUNNING_POOL.replace(ptr::from_ref(shared).cast::<()>());
        Self { previous }
    }
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        RUNNING_POOL.set(self.previous);
    }
}

/// Whether the current thread is inside a compute or finalize step of the
/// pool that owns `shared`.
///
/// Such a thread may hold that pool's ticket, so it must not wait on the
/// gate or join the pool's workers.
pub(crate) fn is_running_job_of<R>(shared: &Shared<R>) -> bool {
    RUNNING_POOL.get() == ptr::from_ref(shared).cast::<()>()
}

/// Body of a persistent worker thread.
///
/// Pulls jobs until the pool is draining and the queue is empty. Each job's
/// compute step runs in parallel with other workers; its finalize step waits
/// for its ticket.
pub(crate) fn worker_loop<R>(worker_id: usize, shared: Arc<Shared<R>>) {
    #[cfg(feature = "tracing")]
    tracing::trace!("Worker {worker_id} started");

    while let Some(job) = shared.queue.pop() {
        run_job(worker_id, &shared, job);
    }

    #[cfg(feature = "tracing")]
    tracing::trace!("Worker {worker_id} stopped");
}

/// Runs one job to completion: compute with no lock held, then finalize under
/// the ticket gate.
///
/// Panics from either step are caught and counted. The job's ticket is taken
/// and released even when compute panicked, so later jobs are never stalled by
/// a failed one.
pub(crate) fn run_job<R>(_worker_id: usize, shared: &Shared<R>, job: Job<R>) {
    let _running = RunningGuard::enter(shared);
    let computed = job.compute();
    if let Some(_panic) = computed.compute_panicked() {
        shared.counters.record_compute_panic();
        #[cfg(feature = "tracing")]
        tracing::error!("Worker {_worker_id}: {_panic}");
    }

    let ticket = shared.sequencer.admit(computed.sequence);
    debug_assert_eq!(ticket.sequence(), computed.sequence);
    let finalized = computed.finalize();
    shared.counters.record_completed();
    drop(ticket);

    if let Err(_panic) = finalized {
        shared.counters.record_finalize_panic();
        #[cfg(feature = "tracing")]
        tracing::error!("Worker {_worker_id}: {_panic}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn running_mark_is_scoped_to_the_job_and_its_pool() {
        let shared = Arc::new(Shared::<()>::new(0));
        let other = Arc::new(Shared::<()>::new(0));
        let seen = Arc::new(Mutex::new(None));

        let sequence = shared.queue.reserve().unwrap();
        let (own, foreign, seen_in) = (Arc::clone(&shared), Arc::clone(&other), Arc::clone(&seen));
        let job = Job::new(
            sequence,
            Box::new(|| ()),
            Box::new(move |_| {
                *seen_in.lock().unwrap() =
                    Some((is_running_job_of(&own), is_running_job_of(&foreign)));
            }),
        );
        assert!(!is_running_job_of(&shared));
        run_job(0, &shared, job);

        assert_eq!(*seen.lock().unwrap(), Some((true, false)));
        assert!(!is_running_job_of(&shared));
    }
}
