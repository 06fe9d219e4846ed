//! Shared test fixtures for the integration suite: a scripted [`Emulator`]
//! double that replays a fixed sequence of traces instead of decoding a real
//! RV32I program, so pipeline-level scenarios can be driven without
//! assembling instruction encodings.

use std::collections::VecDeque;

use rv32ooc_core::emulator::Emulator;
use rv32ooc_core::trace::{FuOp, FuType, Trace};

pub struct ScriptedEmulator {
    script: VecDeque<Trace>,
    exit_code: Option<i32>,
}

impl ScriptedEmulator {
    #[must_use]
    pub fn new(script: Vec<Trace>) -> Self {
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

/// `addi rd, rs1, imm`-shaped ALU trace. `imm` is not modeled — the
/// scripted emulator never re-executes anything, it only hands the pipeline
/// a pre-computed record.
#[must_use]
pub fn alu(uuid: u64, rd: usize, rs1: usize) -> Trace {
    Trace::new(uuid, uuid as u32 * 4, rd, rs1, 0, rd != 0, FuType::Alu, FuOp::Arith)
}

#[must_use]
pub fn load(uuid: u64, rd: usize) -> Trace {
    Trace::new(uuid, uuid as u32 * 4, rd, 0, 0, true, FuType::Lsu, FuOp::Load)
}

#[must_use]
pub fn branch(uuid: u64, rs1: usize, rs2: usize, taken: bool) -> Trace {
    Trace::new(uuid, uuid as u32 * 4, 0, rs1, rs2, false, FuType::Alu, FuOp::Branch).with_taken(taken)
}
