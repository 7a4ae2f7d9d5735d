//! Delayed tasks on a virtual clock
//!
//! Time only moves when the owner calls [`Scheduler::advance`], so timer
//! behaviour is deterministic under test.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

struct Entry<T> {
    due: Duration,
    id: u64,
    task: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.id == other.id
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: earliest due (then earliest scheduled) on top of the max-heap
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.id.cmp(&self.id))
    }
}

pub struct Scheduler<T> {
    now: Duration,
    next_id: u64,
    queue: BinaryHeap<Entry<T>>,
    cancelled: HashSet<u64>,
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            queue: BinaryHeap::new(),
            cancelled: HashSet::new(),
        }
    }

    /// Virtual time elapsed since creation
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Run `task` once `delay` has elapsed
    pub fn schedule(&mut self, delay: Duration, task: T) -> TaskId {
        let id = self.next_id;
        self.next_id += 1;
        self.queue.push(Entry {
            due: self.now + delay,
            id,
            task,
        });
        TaskId(id)
    }

    /// Returns false if the task already ran or was cancelled
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let pending = self
            .queue
            .iter()
            .any(|e| e.id == id.0 && !self.cancelled.contains(&e.id));
        if pending {
            self.cancelled.insert(id.0);
        }
        pending
    }

    /// Move the clock forward and return the tasks that came due, in order
    pub fn advance(&mut self, by: Duration) -> Vec<T> {
        let deadline = self.now + by;
        let mut due = Vec::new();
        while let Some(task) = self.pop_due(deadline) {
            due.push(task);
        }
        self.now = deadline;
        due
    }

    /// Pop the next task due at or before `deadline`.
    ///
    /// The clock moves to the task's due time, so anything the caller
    /// schedules while handling it is relative to when it fired.
    pub fn pop_due(&mut self, deadline: Duration) -> Option<T> {
        while self.queue.peek().is_some_and(|e| e.due <= deadline) {
            let entry = self.queue.pop()?;
            if self.cancelled.remove(&entry.id) {
                continue;
            }
            self.now = self.now.max(entry.due);
            return Some(entry.task);
        }
        None
    }

    /// Move the clock to `deadline` without running anything
    pub fn set_now(&mut self, deadline: Duration) {
        self.now = self.now.max(deadline);
    }

    /// Tasks still waiting to run
    pub fn pending(&self) -> usize {
        self.queue.len() - self.cancelled.len()
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}
