//! Bounded FIFO of jobs that have not started yet.
//!
//! The queue lock guards the jobs, the sequence counter and the lifecycle
//! flag. It is never held while a compute or finalize step runs, and never
//! while the ticket gate is held.

use std::collections::VecDeque;

use parking_lot::{Condvar, Mutex};

use crate::{
    error::{Error, Result},
    job::{ComputeFn, FinalizeFn, Job},
    state::PoolState,
};

pub(crate) struct SubmissionQueue<R> {
    inner: Mutex<Inner<R>>,
    job_added: Condvar,
    job_removed: Condvar,
    /// Zero means unbounded.
    capacity: usize,
}

struct Inner<R> {
    jobs: VecDeque<Job<R>>,
    next_sequence: u64,
    state: PoolState,
}

impl<R> SubmissionQueue<R> {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                jobs: VecDeque::with_capacity(capacity),
                next_sequence: 0,
                state: PoolState::Running,
            }),
            job_added: Condvar::new(),
            job_removed: Condvar::new(),
            capacity,
        }
    }

    pub(crate) const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Appends a job, blocking while the queue is full.
    ///
    /// Returns the sequence number assigned to the job.
    ///
    /// # Errors
    /// - [`Error::PoolShutdown`] if the pool stopped running before the job
    ///   could be accepted.
    pub(crate) fn push(&self, compute: ComputeFn<R>, finalize: FinalizeFn<R>) -> Result<u64> {
        let mut inner = self.inner.lock();
        let capacity = self.capacity;
        self.job_removed.wait_while(&mut inner, |inner| {
            inner.state.is_running() && capacity > 0 && inner.jobs.len() >= capacity
        });
        let sequence = inner.take_sequence()?;
        inner.jobs.push_back(Job::new(sequence, compute, finalize));
        drop(inner);

        self.job_added.notify_one();
        Ok(sequence)
    }

    /// Assigns a sequence number without queueing anything.
    ///
    /// Used when the pool has no workers and jobs run on the caller's thread.
    pub(crate) fn reserve(&self) -> Result<u64> {
        self.inner.lock().take_sequence()
    }

    /// Blocks until a job is available.
    ///
    /// Returns `None` once the pool is draining and nothing is left to run.
    pub(crate) fn pop(&self) -> Option<Job<R>> {
        let mut inner = self.inner.lock();
        self.job_added.wait_while(&mut inner, |inner| {
            inner.state.is_running() && inner.jobs.is_empty()
        });
        let job = inner.jobs.pop_front()?;
        drop(inner);

        self.job_removed.notify_one();
        Some(job)
    }

    /// Moves the pool from running to draining and wakes every waiter.
    ///
    /// Returns `true` if this call performed the transition.
    pub(crate) fn close(&self) -> bool {
        let mut inner = self.inner.lock();
        let transitioned = inner.state.is_running();
        if transitioned {
            inner.state = PoolState::Draining;
        }
        drop(inner);

        self.job_added.notify_all();
        self.job_removed.notify_all();
        transitioned
    }

    pub(crate) fn mark_terminated(&self) {
        self.inner.lock().state = PoolState::Terminated;
    }

    pub(crate) fn state(&self) -> PoolState {
        self.inner.lock().state
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.lock().jobs.len()
    }

    /// Number of sequence numbers handed out so far, which is the number of
    /// jobs ever accepted.
    pub(crate) fn issued(&self) -> u64 {
        self.inner.lock().next_sequence
    }

    /// Accepted and still-queued job counts, read under one lock.
    pub(crate) fn depth(&self) -> (u64, usize) {
        let inner = self.inner.lock();
        (inner.next_sequence, inner.jobs.len())
    }
}

impl<R> Inner<R> {
    fn take_sequence(&mut self) -> Result<u64> {
        if !self.state.is_running() {
            return Err(Error::PoolShutdown);
        }
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        Ok(sequence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;
    use std::time::Duration;

    fn noop_job(queue: &SubmissionQueue<u64>, value: u64) -> Result<u64> {
        queue.push(Box::new(move || value), Box::new(|_| {}))
    }

    #[test]
    fn sequences_follow_enqueue_order() {
        let queue = SubmissionQueue::new(0);
        for expected in 0..10 {
            assert_eq!(noop_job(&queue, expected).unwrap(), expected);
        }
        for expected in 0..10 {
            let job = queue.pop().unwrap();
            assert_eq!(job.sequence, expected);
        }
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn pop_returns_none_after_close_when_empty() {
        let queue = SubmissionQueue::<u64>::new(0);
        assert!(queue.close());
        assert!(!queue.close());
        assert!(queue.pop().is_none());
        assert_eq!(queue.state(), PoolState::Draining);
    }

    #[test]
    fn close_drains_remaining_jobs() {
        let queue = SubmissionQueue::new(0);
        noop_job(&queue, 0).unwrap();
        noop_job(&queue, 1).unwrap();
        queue.close();

        assert_eq!(queue.pop().map(|j| j.sequence), Some(0));
        assert_eq!(queue.pop().map(|j| j.sequence), Some(1));
        assert!(queue.pop().is_none());
    }

    #[test]
    fn push_and_reserve_rejected_after_close() {
        let queue = SubmissionQueue::new(0);
        queue.close();
        assert!(matches!(noop_job(&queue, 0), Err(Error::PoolShutdown)));
        assert!(matches!(queue.reserve(), Err(Error::PoolShutdown)));
        assert_eq!(queue.depth(), (0, 0));
    }

    #[test]
    fn push_blocks_at_capacity_until_pop() {
        let queue = Arc::new(SubmissionQueue::new(2));
        noop_job(&queue, 0).unwrap();
        noop_job(&queue, 1).unwrap();

        let accepted = Arc::new(AtomicBool::new(false));
        let handle = {
            let queue = Arc::clone(&queue);
            let accepted = Arc::clone(&accepted);
            thread::spawn(move || {
                let sequence = noop_job(&queue, 2).unwrap();
                accepted.store(true, Ordering::SeqCst);
                sequence
            })
        };

        thread::sleep(Duration::from_millis(50));
        assert!(!accepted.load(Ordering::SeqCst));
        assert_eq!(queue.len(), 2);

        assert_eq!(queue.pop().map(|j| j.sequence), Some(0));
        assert_eq!(handle.join().unwrap(), 2);
        assert!(accepted.load(Ordering::SeqCst));
        assert_eq!(queue.depth(), (3, 2));
    }

    #[test]
    fn blocked_push_is_rejected_by_close() {
        let queue = Arc::new(SubmissionQueue::new(1));
        noop_job(&queue, 0).unwrap();

        let handle = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || noop_job(&queue, 1))
        };

        thread::sleep(Duration::from_millis(50));
        queue.close();
        assert!(matches!(handle.join().unwrap(), Err(Error::PoolShutdown)));
        assert_eq!(queue.len(), 1);
    }
}
