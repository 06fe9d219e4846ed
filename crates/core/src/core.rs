//! The tick orchestrator: ties the functional emulator, the active pipeline
//! variant, the shared functional-unit bank, and the GShare predictor
//! together into one simulated hart.

use crate::config::Config;
use crate::emulator::Emulator;
use crate::pipeline::{FuBank, Pipeline, PipelineDispatch};
use crate::stats::PerfStats;
use crate::trace::{FuOp, FuType, Trace};
use crate::units::{FunctionalUnit, GShare};

/// Cycles fetch stalls after a branch issues, when the predictor is
/// disabled or predicts not-taken. There is no misprediction-recovery
/// machinery here, so a predicted-taken branch's successor issues without
/// any bubble at all — if the prediction turns out wrong, nothing rolls
/// back; see `DESIGN.md` for why that's the correct reading of this core's
/// Non-goals.
const BRANCH_STALL_CYCLES: u32 = 2;

/// Drives one simulated hart. Owns every structure a cycle touches:
/// the functional emulator, the active `Pipeline` variant, the three
/// functional units, and the GShare predictor. `tick()` advances all of
/// them exactly once, in `commit, writeback, execute, issue` order, so that
/// values produced this cycle are never consumed in the same cycle.
#[derive(Debug)]
pub struct Core<E: Emulator> {
    emulator: E,
    pipeline: PipelineDispatch,
    fus: FuBank,
    gshare: GShare,
    gshare_enabled: bool,
    stats: PerfStats,
    /// An instruction the pipeline rejected last cycle, held here for retry
    /// without re-stepping the emulator, paired with the stall decision
    /// (computed once, at fetch) it should apply once accepted.
    stalled: Option<(Trace, bool)>,
    /// Cycles remaining before fetch may issue a new instruction.
    branch_stall: u32,
    fetched: u64,
}

impl<E: Emulator> Core<E> {
    /// Builds a core around `emulator`, sized and configured by `config`.
    #[must_use]
    pub fn new(emulator: E, config: &Config) -> Self {
        Self {
            emulator,
            pipeline: PipelineDispatch::new(config),
            fus: [
                FunctionalUnit::new(config.alu_latency),
                FunctionalUnit::new(config.lsu_latency),
                FunctionalUnit::new(config.csr_latency),
            ],
            gshare: GShare::new(),
            gshare_enabled: config.gshare_enabled,
            stats: PerfStats::new(),
            stalled: None,
            branch_stall: 0,
            fetched: 0,
        }
    }

    /// Accumulated performance counters.
    #[must_use]
    pub fn stats(&self) -> &PerfStats {
        &self.stats
    }

    /// Whether simulation should keep ticking: either nothing has been
    /// fetched yet, or some fetched instruction has not yet retired.
    #[must_use]
    pub fn running(&self) -> bool {
        self.fetched == 0 || self.stats.instructions_retired < self.fetched
    }

    /// The program's exit code, available once the emulator has executed
    /// `ECALL`/`EBREAK` and every in-flight instruction has drained out of
    /// the pipeline.
    #[must_use]
    pub fn exit_code(&self) -> Option<i32> {
        if self.running() {
            None
        } else {
            self.emulator.exit_code()
        }
    }

    /// Advances every owned structure by one simulated cycle.
    pub fn tick(&mut self) {
        self.stats.cycles += 1;
        self.do_commit();
        self.do_writeback();
        for fu in &mut self.fus {
            fu.tick();
        }
        self.pipeline.execute(&mut self.fus);
        self.do_issue();
    }

    /// Dumps pipeline and architectural register state to stderr, for
    /// diagnosing a run that never reaches `exit_code`.
    pub fn dump(&self) {
        self.pipeline.dump();
        self.emulator.dump_registers();
    }

    fn do_commit(&mut self) {
        let Some(trace) = self.pipeline.commit() else {
            return;
        };
        tracing::trace!(uuid = trace.uuid, pc = trace.pc, cycle = self.stats.cycles, "commit");
        self.stats.instructions_retired += 1;
        match (trace.fu_type, trace.fu_op) {
            (_, FuOp::Branch) => self.stats.inst_branch += 1,
            (FuType::Alu, _) => self.stats.inst_alu += 1,
            (FuType::Lsu, _) => self.stats.inst_lsu += 1,
            (FuType::Csr, _) => self.stats.inst_csr += 1,
        }
    }

    fn do_writeback(&mut self) {
        self.pipeline.writeback(&mut self.fus);
    }

    fn do_issue(&mut self) {
        if self.branch_stall > 0 {
            self.branch_stall -= 1;
            self.stats.stalls_branch += 1;
            return;
        }

        let (trace, stall_after) = match self.stalled.take() {
            Some(pair) => pair,
            None => {
                let Some(trace) = self.emulator.step() else {
                    return;
                };
                self.fetched += 1;
                let stall_after = self.classify_branch(&trace);
                (trace, stall_after)
            }
        };

        match self.pipeline.issue(trace) {
            Ok(()) => {
                if stall_after {
                    self.branch_stall = BRANCH_STALL_CYCLES;
                }
            }
            Err(trace) => {
                match &self.pipeline {
                    PipelineDispatch::Scoreboard(_) => self.stats.stalls_rs_full += 1,
                    PipelineDispatch::Inorder(_) => self.stats.stalls_inuse += 1,
                }
                self.stalled = Some((trace, stall_after));
            }
        }
    }

    /// Consults (and, for a branch, updates) the predictor for a
    /// freshly-fetched trace, returning whether fetch should stall 2 cycles
    /// once this trace is accepted by `issue`.
    ///
    /// Runs exactly once per branch, at fetch time — never on a retried
    /// stalled trace — because the functional emulator has already resolved
    /// the branch non-speculatively by the time its trace exists; there is
    /// nothing to wait on and nothing to squash, so "update on resolve" and
    /// "update on fetch" are the same moment here.
    fn classify_branch(&mut self, trace: &Trace) -> bool {
        if trace.fu_op != FuOp::Branch {
            return false;
        }
        if !self.gshare_enabled {
            return true;
        }
        let predicted = self.gshare.predict(trace.pc);
        if predicted == trace.taken {
            self.stats.branch_hits += 1;
        } else {
            self.stats.branch_misses += 1;
            tracing::debug!(pc = trace.pc, predicted, taken = trace.taken, "branch misprediction");
        }
        self.gshare.update(trace.pc, trace.taken);
        !predicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// A scripted emulator test double: replays a fixed sequence of traces
    /// instead of decoding a real program, so pipeline-level scenarios can
    /// be driven without assembling RISC-V encodings.
    struct ScriptedEmulator {
        script: VecDeque<Trace>,
        exit_code: Option<i32>,
    }

    impl ScriptedEmulator {
        fn new(script: Vec<Trace>) -> Self {
            Self {
                script: script.into(),
                exit_code: Some(0),
            }
        }
    }

    impl Emulator for ScriptedEmulator {
        fn step(&mut self) -> Option<Trace> {
            self.script.pop_front()
        }

        fn exit_code(&self) -> Option<i32> {
            self.exit_code
        }

        fn pc(&self) -> u32 {
            0
        }

        fn dump_registers(&self) {}
    }

    fn alu(uuid: u64, rd: usize, rs1: usize) -> Trace {
        Trace::new(uuid, uuid as u32 * 4, rd, rs1, 0, rd != 0, FuType::Alu, FuOp::Arith)
    }

    fn run_to_completion<E: Emulator>(core: &mut Core<E>) -> Vec<u64> {
        let mut order = Vec::new();
        // Scripted programs are tiny; a generous bound avoids an infinite
        // loop if a test's expectations are wrong rather than hanging.
        for _ in 0..10_000 {
            if !core.running() {
                break;
            }
            core.tick();
            // Re-derive commit order from stats is not possible (PerfStats
            // doesn't retain uuids), so tests needing order drive `tick`
            // manually instead of through this helper. This helper is only
            // used for cycle/instruction-count checks.
            let _ = &mut order;
        }
        order
    }

    #[test]
    fn s1_pure_raw_chain_commits_in_order_after_three_instructions() {
        // addi x1, x0, 5 / addi x2, x1, 7 / addi x3, x2, 1
        let script = vec![alu(0, 1, 0), alu(1, 2, 1), alu(2, 3, 2)];
        let mut config = Config::default();
        config.ooo_enabled = true;
        config.gshare_enabled = false;
        let mut core = Core::new(ScriptedEmulator::new(script), &config);

        run_to_completion(&mut core);

        assert_eq!(core.stats().instructions_retired, 3);
        assert!(core.stats().cycles >= 6, "cycles = {}", core.stats().cycles);
    }

    #[test]
    fn s3_taken_branch_without_predictor_stalls_fetch_two_cycles() {
        let mut config = Config::default();
        config.gshare_enabled = false;
        let branch = Trace::new(0, 0, 0, 1, 2, false, FuType::Alu, FuOp::Branch).with_taken(true);
        let script = vec![branch, alu(1, 3, 0)];
        let mut core = Core::new(ScriptedEmulator::new(script), &config);

        core.tick(); // issues the branch, sets the 2-cycle fetch stall
        assert_eq!(core.stats().stalls_branch, 0);
        core.tick(); // stall cycle 1: no new fetch
        assert_eq!(core.stats().stalls_branch, 1);
        core.tick(); // stall cycle 2: no new fetch
        assert_eq!(core.stats().stalls_branch, 2);
        // Only after both bubble cycles does the next instruction fetch.
        assert_eq!(core.fetched, 1);
        core.tick();
        assert_eq!(core.fetched, 2);
    }

    #[test]
    fn s4_rs_structural_stall_retains_trace_without_refetching() {
        let mut config = Config::default();
        config.num_rss = 2;
        config.lsu_latency = 4;
        let load = |uuid: u64| Trace::new(uuid, 0, (uuid + 1) as usize, 0, 0, true, FuType::Lsu, FuOp::Load);
        let script = vec![load(0), load(1), load(2)];
        let mut core = Core::new(ScriptedEmulator::new(script), &config);

        core.tick(); // issues load 0
        core.tick(); // issues load 1, RS now full
        let fetched_before = core.fetched;
        core.tick(); // load 2 fetched but rejected by a full RS; held for retry
        assert_eq!(core.fetched, fetched_before + 1);
        assert!(core.stats().stalls_rs_full >= 1);
    }

    #[test]
    fn s6_add_x0_never_locks_register_zero_in_the_inorder_pipeline() {
        let mut config = Config::default();
        config.ooo_enabled = false;
        // add x0, x1, x2 (wb=false, as the emulator sets for an x0 destination)
        let noop = Trace::new(0, 0, 0, 1, 2, false, FuType::Alu, FuOp::Arith);
        let reader = alu(1, 3, 0); // reads x0 as rs1
        let script = vec![noop, reader];
        let mut core = Core::new(ScriptedEmulator::new(script), &config);

        core.tick(); // issues the x0-writing instruction
        core.tick(); // the reader of x0 must not stall behind it
        assert_eq!(core.fetched, 2);
        assert_eq!(core.stats().stalls_inuse, 0);
    }
}
