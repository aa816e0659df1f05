use std::future::pending;
use std::time::Duration;

use tokio::time::{sleep_until, Instant};

/// Delayed jobs owned by a single event loop. Jobs never run on their own: the loop waits for
/// [`JobQueue::next_deadline`] and pops whatever is due.
#[derive(Debug)]
pub struct JobQueue<J> {
    jobs: Vec<(Instant, J)>,
}

impl<J> Default for JobQueue<J> {
    fn default() -> Self {
        Self { jobs: Vec::new() }
    }
}

impl<J> JobQueue<J> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule_at(&mut self, at: Instant, job: J) {
        self.jobs.push((at, job));
    }

    pub fn schedule_in(&mut self, delay: Duration, job: J) {
        self.schedule_at(Instant::now() + delay, job);
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.jobs.iter().map(|(at, _)| *at).min()
    }

    /// Removes the earliest job due at `now`. Jobs due at the same instant come out in the order
    /// they were scheduled.
    pub fn pop_due(&mut self, now: Instant) -> Option<J> {
        let index = self
            .jobs
            .iter()
            .enumerate()
            .filter(|(_, (at, _))| *at <= now)
            .min_by_key(|(i, (at, _))| (*at, *i))
            .map(|(i, _)| i)?;
        Some(self.jobs.remove(index).1)
    }

    pub fn clear(&mut self) {
        self.jobs.clear();
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

/// Sleeps until `deadline`, or forever without one.
pub async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => pending().await,
    }
}
