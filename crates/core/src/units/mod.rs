//! Functional units: fixed-latency execution resources sitting behind the
//! pipeline's `execute`/`writeback` stages.

/// Integer ALU dispatch (arithmetic, logic, shifts).
pub mod alu;

/// The generic fixed-latency delay-line functional unit.
pub mod functional_unit;

/// GShare branch predictor.
pub mod gshare;

pub use alu::AluOp;
pub use functional_unit::{FuEntry, FunctionalUnit};
pub use gshare::GShare;
