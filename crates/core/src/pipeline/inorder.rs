//! Two-latch in-order pipeline: a simpler reference timing model sharing
//! the same functional units as the scoreboard pipeline. A single bitmap
//! enforces every hazard class by coarsely locking a destination register
//! from issue until writeback.

use crate::pipeline::{FuBank, Pipeline};
use crate::trace::Trace;
use crate::units::FuEntry;

/// In-order pipeline state: the register-in-use bitmap and the two latches
/// (issue, writeback) that separate its stages.
#[derive(Debug)]
pub struct InorderPipeline {
    in_use: Vec<bool>,
    issue_latch: Option<Trace>,
    writeback_latch: Option<Trace>,
}

impl InorderPipeline {
    /// Creates a pipeline with `num_regs` registers, all initially free.
    #[must_use]
    pub fn new(num_regs: usize) -> Self {
        Self {
            in_use: vec![false; num_regs],
            issue_latch: None,
            writeback_latch: None,
        }
    }

    fn is_locked(&self, reg: usize) -> bool {
        reg != 0 && self.in_use[reg]
    }
}

impl Pipeline for InorderPipeline {
    fn issue(&mut self, trace: Trace) -> Result<(), Trace> {
        if self.issue_latch.is_some() {
            return Err(trace);
        }
        if self.is_locked(trace.rs1) || self.is_locked(trace.rs2) || self.is_locked(trace.rd) {
            return Err(trace);
        }
        if trace.rd != 0 {
            self.in_use[trace.rd] = true;
        }
        self.issue_latch = Some(trace);
        Ok(())
    }

    fn execute(&mut self, fus: &mut FuBank) {
        if let Some(trace) = self.issue_latch.take() {
            let fu = &mut fus[trace.fu_type.index()];
            fu.input.send(
                FuEntry {
                    trace,
                    rob_index: 0,
                    rs_index: None,
                },
                0,
            );
        }
    }

    fn writeback(&mut self, fus: &mut FuBank) -> Option<Trace> {
        for fu in fus.iter_mut() {
            if let Some(entry) = fu.output.pop() {
                if entry.trace.rd != 0 {
                    self.in_use[entry.trace.rd] = false;
                }
                self.writeback_latch = Some(entry.trace.clone());
                return Some(entry.trace);
            }
        }
        None
    }

    fn commit(&mut self) -> Option<Trace> {
        self.writeback_latch.take()
    }

    fn dump(&self) {
        eprintln!("InorderPipeline: in_use={:?}", self.in_use);
        eprintln!(
            "  issue_latch={:?} writeback_latch={:?}",
            self.issue_latch.as_ref().map(|t| t.uuid),
            self.writeback_latch.as_ref().map(|t| t.uuid)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{FuOp, FuType};

    fn alu_trace(uuid: u64, rd: usize, rs1: usize, rs2: usize) -> Trace {
        Trace::new(uuid, 0, rd, rs1, rs2, rd != 0, FuType::Alu, FuOp::Arith)
    }

    #[test]
    fn second_writer_of_same_register_stalls_until_first_clears() {
        let mut pipeline = InorderPipeline::new(8);
        assert!(pipeline.issue(alu_trace(0, 1, 0, 0)).is_ok());
        assert!(pipeline.issue(alu_trace(1, 1, 0, 0)).is_err());
    }

    #[test]
    fn reader_of_in_use_register_stalls() {
        let mut pipeline = InorderPipeline::new(8);
        assert!(pipeline.issue(alu_trace(0, 1, 0, 0)).is_ok());
        assert!(pipeline.issue(alu_trace(1, 2, 1, 0)).is_err());
    }

    #[test]
    fn register_zero_never_locks_or_stalls() {
        let mut pipeline = InorderPipeline::new(8);
        assert!(pipeline.issue(Trace::new(0, 0, 0, 1, 2, false, FuType::Alu, FuOp::Arith)).is_ok());
        assert!(pipeline.issue(alu_trace(1, 3, 0, 0)).is_ok());
    }

    #[test]
    fn full_round_trip_through_issue_execute_writeback_commit() {
        use crate::units::FunctionalUnit;

        let mut pipeline = InorderPipeline::new(8);
        let mut fus: FuBank = [
            FunctionalUnit::new(1),
            FunctionalUnit::new(2),
            FunctionalUnit::new(1),
        ];

        assert!(pipeline.issue(alu_trace(0, 1, 0, 0)).is_ok());
        pipeline.execute(&mut fus);
        fus[0].tick();
        assert!(pipeline.writeback(&mut fus).is_none());
        fus[0].tick();
        let completed = pipeline.writeback(&mut fus).expect("ALU completed");
        assert_eq!(completed.uuid, 0);
        let committed = pipeline.commit().expect("writeback latch holds the trace");
        assert_eq!(committed.uuid, 0);
    }
}
