//! Pipeline timing models: the in-order and out-of-order (scoreboard)
//! variants, sharing one polymorphism boundary so `Core` can drive either
//! without caring which is active.

/// In-order two-latch pipeline with a register-in-use hazard bitmap.
pub mod inorder;
/// Register Alias Table.
pub mod rat;
/// Reorder buffer.
pub mod rob;
/// Reservation-station pool.
pub mod rs;
/// Register Status Table.
pub mod rst;
/// Out-of-order scoreboard pipeline: RAT + RS + ROB + RST.
pub mod scoreboard;

pub use inorder::InorderPipeline;
pub use scoreboard::ScoreboardPipeline;

use crate::trace::{Trace, NUM_FU_TYPES};
use crate::units::FunctionalUnit;

/// The three functional units, indexed by `FuType::index()`.
pub type FuBank = [FunctionalUnit; NUM_FU_TYPES];

/// The stage contract shared by both pipeline variants. `Core` calls these
/// once per cycle in `commit, writeback, execute, issue` order.
pub trait Pipeline {
    /// Attempts to issue `trace`. On a structural stall, hands the same
    /// trace back in `Err` so the caller can hold it and retry next cycle
    /// without re-stepping the emulator.
    fn issue(&mut self, trace: Trace) -> Result<(), Trace>;

    /// Dispatches any entries now ready to run onto their functional units.
    fn execute(&mut self, fus: &mut FuBank);

    /// Drains at most one functional unit's output. Returns the trace that
    /// completed this cycle, if any.
    fn writeback(&mut self, fus: &mut FuBank) -> Option<Trace>;

    /// Returns the trace that committed this cycle, if any.
    fn commit(&mut self) -> Option<Trace>;

    /// Dumps internal state to stderr, for diagnosing a stalled run.
    fn dump(&self);
}

/// Selects which pipeline variant a `Core` runs, per `Config::ooo_enabled`.
#[derive(Debug)]
pub enum PipelineDispatch {
    /// The two-latch, in-use-bitmap in-order pipeline.
    Inorder(InorderPipeline),
    /// The RAT/RS/ROB/RST out-of-order scoreboard pipeline.
    Scoreboard(ScoreboardPipeline),
}

impl PipelineDispatch {
    /// Builds the variant selected by `config`.
    #[must_use]
    pub fn new(config: &crate::config::Config) -> Self {
        if config.ooo_enabled {
            Self::Scoreboard(ScoreboardPipeline::new(
                config.num_regs,
                config.num_rss,
                config.rob_size,
            ))
        } else {
            Self::Inorder(InorderPipeline::new(config.num_regs))
        }
    }
}

impl Pipeline for PipelineDispatch {
    fn issue(&mut self, trace: Trace) -> Result<(), Trace> {
        match self {
            Self::Inorder(p) => p.issue(trace),
            Self::Scoreboard(p) => p.issue(trace),
        }
    }

    fn execute(&mut self, fus: &mut FuBank) {
        match self {
            Self::Inorder(p) => p.execute(fus),
            Self::Scoreboard(p) => p.execute(fus),
        }
    }

    fn writeback(&mut self, fus: &mut FuBank) -> Option<Trace> {
        match self {
            Self::Inorder(p) => p.writeback(fus),
            Self::Scoreboard(p) => p.writeback(fus),
        }
    }

    fn commit(&mut self) -> Option<Trace> {
        match self {
            Self::Inorder(p) => p.commit(),
            Self::Scoreboard(p) => p.commit(),
        }
    }

    fn dump(&self) {
        match self {
            Self::Inorder(p) => p.dump(),
            Self::Scoreboard(p) => p.dump(),
        }
    }
}
