//! Reorder Buffer: a circular buffer enforcing in-order commit over
//! out-of-order completion.

use crate::pipeline::rat::Rat;
use crate::sim_port::SimPort;
use crate::trace::Trace;

struct Entry {
    trace: Trace,
    completed: bool,
}

/// The reorder buffer. Allocates entries in program order at `tail`, marks
/// them completed as functional units finish, and commits strictly one
/// instruction per cycle from `head` — never more, even when several
/// trailing entries have also completed. An implementation that drained
/// every contiguous completed run per cycle would commit faster and is not
/// timing-equivalent to this one.
pub struct Rob {
    entries: Vec<Option<Entry>>,
    head: usize,
    tail: usize,
    count: usize,
    /// Completion signals from functional-unit writeback: a ROB index whose
    /// instruction just finished executing.
    pub completed: SimPort<usize>,
    /// Traces that have committed this cycle, in commit order.
    pub committed: SimPort<Trace>,
}

impl Rob {
    /// Creates an empty buffer with room for `capacity` in-flight instructions.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: (0..capacity).map(|_| None).collect(),
            head: 0,
            tail: 0,
            count: 0,
            completed: SimPort::new(),
            committed: SimPort::new(),
        }
    }

    /// Capacity of the buffer.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Number of allocated (not yet committed) entries.
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Whether the buffer has no free slot.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.count == self.entries.len()
    }

    /// Whether the buffer has no allocated entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Reads the trace at `rob_index`, if that slot is currently allocated.
    #[must_use]
    pub fn trace_at(&self, rob_index: usize) -> Option<&Trace> {
        self.entries[rob_index].as_ref().map(|e| &e.trace)
    }

    /// Allocates the next slot at `tail` for `trace`.
    ///
    /// # Panics
    ///
    /// Panics if the buffer is full — issue must check `is_full` first.
    pub fn allocate(&mut self, trace: Trace) -> usize {
        assert!(!self.is_full(), "ROB allocate on a full buffer");
        let index = self.tail;
        self.entries[index] = Some(Entry {
            trace,
            completed: false,
        });
        self.tail = (self.tail + 1) % self.entries.len();
        self.count += 1;
        index
    }

    /// Advances the buffer by one cycle: drains at most one completion
    /// signal, and commits the head if it is completed.
    pub fn tick(&mut self, rat: &mut Rat) {
        self.completed.advance();
        self.committed.advance();

        if let Some(rob_index) = self.completed.pop() {
            let entry = self.entries[rob_index]
                .as_mut()
                .expect("completion signal for an unallocated ROB slot");
            entry.completed = true;
        }

        if self.count == 0 {
            return;
        }

        let head_completed = self.entries[self.head]
            .as_ref()
            .is_some_and(|e| e.completed);
        if !head_completed {
            return;
        }

        let entry = self.entries[self.head].take().expect("head slot allocated");
        if entry.trace.wb && rat.get(entry.trace.rd) == Some(self.head) {
            rat.set(entry.trace.rd, None);
        }
        self.committed.send(entry.trace, 0);
        self.head = (self.head + 1) % self.entries.len();
        self.count -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults;
    use crate::trace::{FuOp, FuType};

    fn trace(uuid: u64, rd: usize) -> Trace {
        Trace::new(uuid, 0, rd, 0, 0, true, FuType::Alu, FuOp::Arith)
    }

    #[test]
    fn commits_only_the_completed_head() {
        let mut rob = Rob::new(4);
        let mut rat = Rat::new(defaults::NUM_REGS);
        let idx0 = rob.allocate(trace(0, 1));
        rat.set(1, Some(idx0));
        let idx1 = rob.allocate(trace(1, 2));
        rat.set(2, Some(idx1));

        // Only the younger entry completes first; the head must still block commit.
        rob.completed.send(idx1, 0);
        rob.tick(&mut rat);
        assert_eq!(rob.count(), 2);
        assert!(rob.committed.empty());

        rob.completed.send(idx0, 0);
        rob.tick(&mut rat);
        let committed = rob.committed.pop().expect("head commits once completed");
        assert_eq!(committed.uuid, 0);
        assert_eq!(rob.count(), 1);
    }

    #[test]
    fn waw_later_rename_survives_earlier_commit() {
        let mut rob = Rob::new(4);
        let mut rat = Rat::new(defaults::NUM_REGS);
        let idx_a = rob.allocate(trace(0, 5));
        rat.set(5, Some(idx_a));
        let idx_b = rob.allocate(trace(1, 5));
        rat.set(5, Some(idx_b));

        rob.completed.send(idx_a, 0);
        rob.tick(&mut rat);
        // A's commit must not clear RAT[5], since B has since shadowed it.
        assert_eq!(rat.get(5), Some(idx_b));
    }

    #[test]
    fn commits_at_most_one_per_cycle_even_with_both_ready() {
        let mut rob = Rob::new(4);
        let mut rat = Rat::new(defaults::NUM_REGS);
        let idx0 = rob.allocate(trace(0, 1));
        let idx1 = rob.allocate(trace(1, 2));
        rob.completed.send(idx0, 0);
        rob.completed.send(idx1, 0);
        rob.tick(&mut rat);
        // Only idx0's completion is drained this tick; idx1 marks complete
        // next tick once its own signal is processed.
        assert_eq!(rob.committed.pop().map(|t| t.uuid), Some(0));
        assert!(rob.committed.empty());
    }
}
