//! The functional RV32I emulator: architectural state, memory, and the
//! fetch/decode/execute loop that produces the [`crate::trace::Trace`]
//! records the timing model schedules.

/// The CPU's architectural state and its functional execution loop.
pub mod cpu;

/// Flat addressable RAM with ELF/flat-binary loading.
pub mod ram;

pub use cpu::{Cpu, ExitReason};
pub use ram::Ram;

use crate::trace::Trace;

/// The surface `Core` depends on to drive the functional model. Generic
/// over this trait rather than tying `Core` to `Cpu` directly so tests can
/// drive the pipeline against a scripted instruction sequence.
pub trait Emulator {
    /// Advances architectural state by one instruction and returns its trace.
    /// Returns `None` once the program has exited.
    fn step(&mut self) -> Option<Trace>;

    /// The exit code set by `ECALL`/`EBREAK`, once the program has exited.
    fn exit_code(&self) -> Option<i32>;

    /// Current program counter, for diagnostics.
    fn pc(&self) -> u32;

    /// Dumps architectural register state, for diagnosing a stalled run.
    fn dump_registers(&self);
}

impl Emulator for Cpu {
    fn step(&mut self) -> Option<Trace> {
        Cpu::step(self)
    }

    fn exit_code(&self) -> Option<i32> {
        self.exit_reason().map(|ExitReason::Syscall(code)| code)
    }

    fn pc(&self) -> u32 {
        Cpu::pc(self)
    }

    fn dump_registers(&self) {
        Cpu::dump_registers(self);
    }
}
