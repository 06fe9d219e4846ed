//! Out-of-order scoreboard pipeline: register renaming through a RAT,
//! dynamic scheduling through reservation stations, and in-order commit
//! through a ROB.

use crate::pipeline::rat::Rat;
use crate::pipeline::rob::Rob;
use crate::pipeline::rs::Rs;
use crate::pipeline::rst::Rst;
use crate::pipeline::{FuBank, Pipeline};
use crate::trace::Trace;
use crate::units::FuEntry;

/// The four structures a scoreboard pipeline owns outright, plus the shared
/// `Pipeline` stage methods tying them together.
#[derive(Debug)]
pub struct ScoreboardPipeline {
    rat: Rat,
    rs: Rs,
    rob: Rob,
    rst: Rst,
}

impl ScoreboardPipeline {
    /// Creates a pipeline with the given structural resource sizes.
    #[must_use]
    pub fn new(num_regs: usize, num_rss: usize, rob_size: usize) -> Self {
        Self {
            rat: Rat::new(num_regs),
            rs: Rs::new(num_rss),
            rob: Rob::new(rob_size),
            rst: Rst::new(rob_size),
        }
    }

    fn producer_rs_index(&self, reg: usize) -> Option<usize> {
        if reg == 0 {
            return None;
        }
        self.rat.get(reg).and_then(|rob_index| self.rst.get(rob_index))
    }
}

impl Pipeline for ScoreboardPipeline {
    fn issue(&mut self, trace: Trace) -> Result<(), Trace> {
        if self.rs.is_full() {
            return Err(trace);
        }

        let rs1_index = self.producer_rs_index(trace.rs1);
        let rs2_index = self.producer_rs_index(trace.rs2);

        let rob_index = self.rob.allocate(trace.clone());
        if trace.wb && trace.rd != 0 {
            self.rat.set(trace.rd, Some(rob_index));
        }
        let rs_index = self.rs.push(trace, rob_index, rs1_index, rs2_index);
        self.rst.set(rob_index, Some(rs_index));
        Ok(())
    }

    fn execute(&mut self, fus: &mut FuBank) {
        let mut ready = Vec::new();
        for (slot, entry) in self.rs.iter_mut() {
            if entry.valid && !entry.running && entry.rs1_index.is_none() && entry.rs2_index.is_none() {
                entry.running = true;
                ready.push(slot);
            }
        }

        for slot in ready {
            let entry = self.rs.get_mut(slot);
            let trace = entry.trace.take().expect("ready RS entry holds a trace");
            let rob_index = entry.rob_index;
            let fu = &mut fus[trace.fu_type.index()];
            fu.input.send(
                FuEntry {
                    trace,
                    rob_index,
                    rs_index: Some(slot),
                },
                0,
            );
        }
    }

    fn writeback(&mut self, fus: &mut FuBank) -> Option<Trace> {
        for fu in fus.iter_mut() {
            if let Some(entry) = fu.output.pop() {
                for (_, rs_entry) in self.rs.iter_mut() {
                    if rs_entry.rs1_index == entry.rs_index {
                        rs_entry.rs1_index = None;
                    }
                    if rs_entry.rs2_index == entry.rs_index {
                        rs_entry.rs2_index = None;
                    }
                }
                self.rst.set(entry.rob_index, None);
                self.rob.completed.send(entry.rob_index, 0);
                if let Some(slot) = entry.rs_index {
                    self.rs.remove(slot);
                }
                return Some(entry.trace);
            }
        }
        None
    }

    fn commit(&mut self) -> Option<Trace> {
        self.rob.tick(&mut self.rat);
        self.rob.committed.pop()
    }

    fn dump(&self) {
        eprintln!(
            "ScoreboardPipeline: rs.size={} rob.count={}",
            self.rs.size(),
            self.rob.count()
        );
    }
}
