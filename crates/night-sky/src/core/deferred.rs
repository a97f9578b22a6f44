use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A task waiting for its due time.
#[derive(Debug)]
struct Pending<T> {
    due: f64,
    /// Insertion order; keeps equal due times FIFO.
    seq: u64,
    task: T,
}

impl<T> PartialEq for Pending<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for Pending<T> {}

impl<T> PartialOrd for Pending<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Pending<T> {
    // Reversed so the max-heap pops the earliest due time first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .total_cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Min-heap of delayed tasks keyed by session time (seconds).
///
/// Showers and timers append here; the frame step drains what is due
/// before touching the live lists, so nothing is appended mid-iteration.
#[derive(Debug)]
pub struct DeferredQueue<T> {
    heap: BinaryHeap<Pending<T>>,
    next_seq: u64,
}

impl<T> DeferredQueue<T> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Schedule `task` to run at session time `due`.
    pub fn schedule(&mut self, due: f64, task: T) {
        let due = if due.is_finite() { due } else { 0.0 };
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Pending { due, seq, task });
    }

    /// Remove and return every task due at or before `now`, earliest first.
    pub fn drain_due(&mut self, now: f64) -> Vec<T> {
        let mut due = Vec::new();
        while self.heap.peek().is_some_and(|p| p.due <= now) {
            if let Some(p) = self.heap.pop() {
                due.push(p.task);
            }
        }
        due
    }

    /// Drop every task matching `pred`.
    pub fn cancel_where(&mut self, mut pred: impl FnMut(&T) -> bool) {
        self.heap.retain(|p| !pred(&p.task));
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl<T> Default for DeferredQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
