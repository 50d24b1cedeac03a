//! FIFO reconstruction of individual waiting times from aggregate series.
//!
//! The solver only reports how many passengers joined and left the queue in
//! each interval. Replaying those counts through a single first-in-first-out
//! queue of arrival timestamps recovers each served passenger's waiting
//! time exactly under the first-come-first-served discipline the queue
//! recurrence implies.

use std::collections::VecDeque;

/// Single ordered queue of arrival timestamps.
#[derive(Debug, Default)]
pub struct FifoQueue {
    queue: VecDeque<usize>,
    waiting_times: Vec<usize>,
}

impl FifoQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one interval: `join` arrivals stamped `now`, then `leave`
    /// services popped from the front.
    pub fn process_time_step(&mut self, join: usize, leave: usize, now: usize) {
        for _ in 0..join {
            self.queue.push_back(now);
        }
        for _ in 0..leave {
            if let Some(entry) = self.queue.pop_front() {
                self.waiting_times.push(now - entry);
            }
        }
    }

    /// Longest recorded wait, in intervals; `None` if nobody was ever served.
    pub fn max_waiting_time(&self) -> Option<usize> {
        self.waiting_times.iter().copied().max()
    }
}

/// Outcome of a reconstruction run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitingTimeKpi {
    /// Maximum individual waiting time, in intervals
    pub max_waiting_intervals: Option<usize>,
    /// True when a negative join count had to be clamped to zero, meaning
    /// the inputs were not mutually consistent and arrivals were
    /// under-reported for at least one interval
    pub join_discrepancy: bool,
}

/// Recovers the worst individual waiting time from the aggregate served
/// counts `q[t]` and end-of-interval queue lengths `i_end[t]`. The gross
/// inflow at `t` is the net queue growth plus everyone who left:
/// `(I[t] - I[t-1]) + q[t]`.
pub fn longest_queue_time(q: &[i64], i_end: &[i64]) -> WaitingTimeKpi {
    let mut fifo = FifoQueue::new();
    let mut discrepancy = false;

    for t in 1..q.len().min(i_end.len()) {
        let join = i_end[t] - i_end[t - 1] + q[t];
        let join = if join < 0 {
            discrepancy = true;
            0
        } else {
            join as usize
        };
        fifo.process_time_step(join, q[t].max(0) as usize, t);
    }

    WaitingTimeKpi {
        max_waiting_intervals: fifo.max_waiting_time(),
        join_discrepancy: discrepancy,
    }
}
