//! Fixed-latency execution resource shared by the in-order and scoreboard
//! pipelines.
//!
//! A `FunctionalUnit` owns an `Input` and `Output` `SimPort`. On `tick()`, if
//! `Input` is non-empty it dequeues one entry and re-enqueues it on `Output`
//! delayed by the unit's fixed latency. Throughput is 1 instruction/cycle;
//! multiple instructions can be in flight across the delay line at once. A
//! `FunctionalUnit` never stalls — the stage dispatching into it is
//! responsible for not oversubscribing it.

use crate::sim_port::SimPort;
use crate::trace::Trace;

/// The payload carried on a functional unit's ports: the trace plus the two
/// handles its producer needs back to wake the right structural slots on
/// writeback.
#[derive(Debug, Clone)]
pub struct FuEntry {
    /// The instruction executing on this unit.
    pub trace: Trace,
    /// ROB slot that will receive this instruction's completion signal.
    pub rob_index: usize,
    /// RS slot that produced this entry, so writeback can broadcast on the CDB.
    /// `None` for the in-order pipeline, which has no RS to wake.
    pub rs_index: Option<usize>,
}

/// A fixed-latency delay line modeling one functional unit (ALU, LSU, or CSR).
#[derive(Debug)]
pub struct FunctionalUnit {
    /// Entries dispatched into this unit, awaiting latency.
    pub input: SimPort<FuEntry>,
    /// Entries that have completed and are awaiting a writeback scan.
    pub output: SimPort<FuEntry>,
    latency: usize,
}

impl FunctionalUnit {
    /// Creates a unit with the given fixed latency, in cycles.
    #[must_use]
    pub fn new(latency: u64) -> Self {
        Self {
            input: SimPort::new(),
            output: SimPort::new(),
            latency: latency as usize,
        }
    }

    /// Advances the delay line by one tick and drains one input entry onto
    /// the output port, delayed by this unit's latency.
    pub fn tick(&mut self) {
        self.input.advance();
        self.output.advance();
        if let Some(entry) = self.input.pop() {
            self.output.send(entry, self.latency);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{FuOp, FuType};

    fn dummy_trace(uuid: u64) -> Trace {
        Trace::new(uuid, 0, 1, 0, 0, true, FuType::Alu, FuOp::Arith)
    }

    #[test]
    fn one_cycle_latency_unit_completes_next_tick() {
        let mut fu = FunctionalUnit::new(1);
        fu.input.send(
            FuEntry {
                trace: dummy_trace(0),
                rob_index: 0,
                rs_index: Some(0),
            },
            0,
        );
        fu.tick();
        assert!(fu.output.empty());
        fu.tick();
        assert!(!fu.output.empty());
    }

    #[test]
    fn unit_pipelines_back_to_back_dispatch() {
        let mut fu = FunctionalUnit::new(2);
        fu.input.send(
            FuEntry {
                trace: dummy_trace(0),
                rob_index: 0,
                rs_index: Some(0),
            },
            0,
        );
        fu.tick();
        fu.input.send(
            FuEntry {
                trace: dummy_trace(1),
                rob_index: 1,
                rs_index: Some(1),
            },
            0,
        );
        fu.tick();
        assert!(fu.output.empty());
        fu.tick();
        let first = fu.output.pop().expect("first entry ready");
        assert_eq!(first.trace.uuid, 0);
        fu.tick();
        let second = fu.output.pop().expect("second entry ready");
        assert_eq!(second.trace.uuid, 1);
    }
}
