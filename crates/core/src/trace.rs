//! The per-instruction execution record shuttled through every pipeline stage.

/// Functional unit kind an instruction is classified into.
///
/// Drives both FU dispatch (`execute`) and writeback scan priority
/// (ALU, LSU, CSR, in that fixed order).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuType {
    /// Integer arithmetic, comparisons, shifts, and branch resolution.
    Alu,
    /// Loads and stores.
    Lsu,
    /// CSR reads/writes and ECALL/EBREAK.
    Csr,
}

/// The total number of `FuType` variants; also `NUM_FUS` from the configuration surface.
pub const NUM_FU_TYPES: usize = 3;

impl FuType {
    /// Writeback scan priority: ALU, then LSU, then CSR.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            FuType::Alu => 0,
            FuType::Lsu => 1,
            FuType::Csr => 2,
        }
    }
}

/// Operation discriminant within a `FuType`, carried for informational/stats
/// purposes — the pipeline itself only dispatches on `FuType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuOp {
    /// Integer arithmetic (ADD, SUB, AND, SLT, ...).
    Arith,
    /// Conditional branch (BEQ, BNE, BLT, BGE, BLTU, BGEU). The only
    /// operation the branch predictor's stall logic applies to.
    Branch,
    /// Unconditional jump (JAL, JALR). Resolved immediately by the
    /// emulator, never predicted.
    Jump,
    /// ECALL/EBREAK.
    Syscall,
    /// Memory load.
    Load,
    /// Memory store.
    Store,
    /// FENCE/FENCE.I.
    Fence,
    /// CSRRW.
    Csrrw,
    /// CSRRS.
    Csrrs,
    /// CSRRC.
    Csrrc,
}

/// Address and transfer size of an LSU instruction's memory operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LsuSideData {
    /// Effective address of the access.
    pub addr: u32,
    /// Transfer size in bytes (1, 2, or 4).
    pub size: u8,
}

/// The unit exchanged between all pipeline stages.
///
/// Created by the emulator, moved through the pipeline by value, and
/// destroyed exactly once on commit. A `Trace` is never cloned while in
/// flight — at any time it resides in exactly one structural slot (the
/// issue latch, an RS entry, an FU's ports, or the ROB).
#[derive(Debug, Clone)]
pub struct Trace {
    /// Monotonic instruction identifier, assigned at fetch. Used to assert
    /// that commits happen in program order.
    pub uuid: u64,
    /// Architectural program counter of this instruction.
    pub pc: u32,
    /// Destination architectural register. 0 means "no register".
    pub rd: usize,
    /// First source architectural register. 0 means "no register".
    pub rs1: usize,
    /// Second source architectural register. 0 means "no register".
    pub rs2: usize,
    /// Whether this instruction writes the register file.
    pub wb: bool,
    /// Functional unit this instruction dispatches to.
    pub fu_type: FuType,
    /// Operation discriminant within `fu_type`.
    pub fu_op: FuOp,
    /// Memory operand, present only for LSU load/store instructions.
    pub lsu: Option<LsuSideData>,
    /// Resolved branch direction. Meaningful only when `fu_op == FuOp::Branch`;
    /// always `false` otherwise.
    pub taken: bool,
}

impl Trace {
    /// Builds a trace for a non-memory instruction.
    #[must_use]
    pub fn new(
        uuid: u64,
        pc: u32,
        rd: usize,
        rs1: usize,
        rs2: usize,
        wb: bool,
        fu_type: FuType,
        fu_op: FuOp,
    ) -> Self {
        Self {
            uuid,
            pc,
            rd,
            rs1,
            rs2,
            wb,
            fu_type,
            fu_op,
            lsu: None,
            taken: false,
        }
    }

    /// Attaches LSU side-data to a trace built with `new`.
    #[must_use]
    pub fn with_lsu(mut self, addr: u32, size: u8) -> Self {
        self.lsu = Some(LsuSideData { addr, size });
        self
    }

    /// Records a resolved branch direction on a trace built with `new`.
    #[must_use]
    pub fn with_taken(mut self, taken: bool) -> Self {
        self.taken = taken;
        self
    }
}
