//! Deferred-task queue on a virtual millisecond clock.
//!
//! Every delayed transition in the game (countdown ticks, stage feedback, the
//! debrief hand-off) is scheduled here and identified by a [`TaskHandle`].
//! Cancelling a handle guarantees the task never fires, and due tasks always
//! fire in `(due time, schedule order)` order. The host moves time forward
//! explicitly, so a whole playthrough can be replayed without real timers.

use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeSet, BinaryHeap};

/// Identifies one scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskHandle(u64);

#[derive(Debug, Clone)]
struct Scheduled<T> {
    due_ms: u64,
    handle: TaskHandle,
    task: T,
}

impl<T> PartialEq for Scheduled<T> {
    fn eq(&self, other: &Self) -> bool {
        self.due_ms == other.due_ms && self.handle == other.handle
    }
}

impl<T> Eq for Scheduled<T> {}

impl<T> PartialOrd for Scheduled<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Scheduled<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.due_ms
            .cmp(&other.due_ms)
            .then_with(|| self.handle.cmp(&other.handle))
    }
}

#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    now_ms: u64,
    next_id: u64,
    queue: BinaryHeap<Reverse<Scheduled<T>>>,
    // Handles that are scheduled and not cancelled; the heap is pruned lazily.
    live: BTreeSet<TaskHandle>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            next_id: 0,
            queue: BinaryHeap::new(),
            live: BTreeSet::new(),
        }
    }

    #[must_use]
    pub const fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Queue `task` to fire `delay_ms` after the current virtual time.
    pub fn schedule_after(&mut self, delay_ms: u64, task: T) -> TaskHandle {
        let handle = TaskHandle(self.next_id);
        self.next_id += 1;
        self.queue.push(Reverse(Scheduled {
            due_ms: self.now_ms.saturating_add(delay_ms),
            handle,
            task,
        }));
        self.live.insert(handle);
        handle
    }

    /// Cancel a pending task. Returns `false` if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        self.live.remove(&handle)
    }

    #[must_use]
    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        self.live.contains(&handle)
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.live.len()
    }

    /// Pop the earliest live task due at or before `until_ms`, moving the
    /// clock to its due time.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<(TaskHandle, T)> {
        loop {
            let next = self.queue.peek()?;
            if next.0.due_ms > until_ms {
                return None;
            }
            let Reverse(entry) = self.queue.pop()?;
            if !self.live.remove(&entry.handle) {
                continue;
            }
            self.now_ms = self.now_ms.max(entry.due_ms);
            return Some((entry.handle, entry.task));
        }
    }

    /// Move the clock forward without firing anything; never moves it back.
    pub fn settle_at(&mut self, at_ms: u64) {
        self.now_ms = self.now_ms.max(at_ms);
    }

    /// Drop every pending task. The clock keeps its value.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.live.clear();
    }
}
