//! Functional RV32I core: executes instructions architecturally in program
//! order and emits a [`Trace`] describing each one for the timing model.
//!
//! The functional and timing models are deliberately decoupled: `step`
//! performs the instruction's full architectural effect (register writes,
//! memory accesses, PC update) immediately, and hands back only the
//! bookkeeping the pipeline needs to schedule it — which functional unit it
//! occupies, which registers it touches, and (for loads/stores) the
//! address and size. The pipeline never recomputes a result; it only
//! delays and reorders the record of one already computed.

use crate::common::Gpr;
use crate::emulator::ram::Ram;
use crate::isa::decode;
use crate::isa::rv32i::{funct3, opcodes};
use crate::trace::{FuOp, FuType, Trace};

/// Reason a functional step halted the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// `ECALL` or `EBREAK` executed; exit code is read from `x3` (`gp`),
    /// per the riscv-tests convention (0 means all tests passed).
    Syscall(i32),
}

/// The functional RV32I emulator: architectural state plus a fetch/decode/execute loop.
#[derive(Debug)]
pub struct Cpu {
    gpr: Gpr,
    pc: u32,
    ram: Ram,
    csrs: [u32; 4096],
    next_uuid: u64,
    exit: Option<ExitReason>,
}

impl Cpu {
    /// Creates a CPU with a fresh register file, PC at `start_pc`, and the
    /// given RAM already loaded with a program image.
    #[must_use]
    pub fn new(ram: Ram, start_pc: u32) -> Self {
        Self {
            gpr: Gpr::new(),
            pc: start_pc,
            ram,
            csrs: [0; 4096],
            next_uuid: 0,
            exit: None,
        }
    }

    /// Current program counter.
    #[must_use]
    pub fn pc(&self) -> u32 {
        self.pc
    }

    /// Dumps the register file, for diagnosing a stalled run.
    pub fn dump_registers(&self) {
        self.gpr.dump();
    }

    /// Whether the program has executed an exit syscall.
    #[must_use]
    pub fn exit_reason(&self) -> Option<ExitReason> {
        self.exit
    }

    /// Fetches, decodes, and architecturally executes the instruction at the
    /// current PC, returning a [`Trace`] for the timing model to schedule.
    /// Returns `None` once the program has exited; the caller must not call
    /// `step` again after that.
    pub fn step(&mut self) -> Option<Trace> {
        if self.exit.is_some() {
            return None;
        }

        let pc = self.pc;
        let raw = self.ram.read32(pc);
        let decoded = decode(raw);
        let uuid = self.next_uuid;
        self.next_uuid += 1;

        let trace = match decoded.opcode {
            opcodes::OP_IMM | opcodes::OP_REG => self.exec_alu_reg_imm(&decoded, uuid, pc),
            opcodes::OP_LUI => {
                self.gpr.write(decoded.rd, decoded.imm as u32);
                self.pc = pc.wrapping_add(4);
                Trace::new(uuid, pc, decoded.rd, 0, 0, decoded.rd != 0, FuType::Alu, FuOp::Arith)
            }
            opcodes::OP_AUIPC => {
                self.gpr.write(decoded.rd, pc.wrapping_add(decoded.imm as u32));
                self.pc = pc.wrapping_add(4);
                Trace::new(uuid, pc, decoded.rd, 0, 0, decoded.rd != 0, FuType::Alu, FuOp::Arith)
            }
            opcodes::OP_JAL => {
                self.gpr.write(decoded.rd, pc.wrapping_add(4));
                self.pc = pc.wrapping_add(decoded.imm as u32);
                Trace::new(uuid, pc, decoded.rd, 0, 0, decoded.rd != 0, FuType::Alu, FuOp::Jump)
            }
            opcodes::OP_JALR => {
                let target = self.gpr.read(decoded.rs1).wrapping_add(decoded.imm as u32) & !1;
                self.gpr.write(decoded.rd, pc.wrapping_add(4));
                self.pc = target;
                Trace::new(
                    uuid,
                    pc,
                    decoded.rd,
                    decoded.rs1,
                    0,
                    decoded.rd != 0,
                    FuType::Alu,
                    FuOp::Jump,
                )
            }
            opcodes::OP_BRANCH => self.exec_branch(&decoded, uuid, pc),
            opcodes::OP_LOAD => self.exec_load(&decoded, uuid, pc),
            opcodes::OP_STORE => self.exec_store(&decoded, uuid, pc),
            opcodes::OP_MISC_MEM => {
                self.pc = pc.wrapping_add(4);
                Trace::new(uuid, pc, 0, 0, 0, false, FuType::Alu, FuOp::Fence)
            }
            opcodes::OP_SYSTEM => self.exec_system(&decoded, uuid, pc),
            _ => {
                self.pc = pc.wrapping_add(4);
                Trace::new(uuid, pc, 0, 0, 0, false, FuType::Alu, FuOp::Fence)
            }
        };

        Some(trace)
    }

    fn exec_alu_reg_imm(&mut self, d: &crate::isa::Decoded, uuid: u64, pc: u32) -> Trace {
        use crate::units::alu::{self, AluOp};

        let a = self.gpr.read(d.rs1);
        let is_reg = d.opcode == opcodes::OP_REG;
        let b = if is_reg { self.gpr.read(d.rs2) } else { d.imm as u32 };
        let alt = is_reg && d.funct7 == crate::isa::rv32i::funct7::SUB;

        let op = match d.funct3 {
            funct3::ADD_SUB if alt => AluOp::Sub,
            funct3::ADD_SUB => AluOp::Add,
            funct3::SLL => AluOp::Sll,
            funct3::SLT => AluOp::Slt,
            funct3::SLTU => AluOp::Sltu,
            funct3::XOR => AluOp::Xor,
            funct3::SRL_SRA if d.funct7 == crate::isa::rv32i::funct7::SRA => AluOp::Sra,
            funct3::SRL_SRA => AluOp::Srl,
            funct3::OR => AluOp::Or,
            funct3::AND => AluOp::And,
            _ => AluOp::Add,
        };

        let result = alu::execute(op, a, b);
        self.gpr.write(d.rd, result);
        self.pc = pc.wrapping_add(4);

        let rs2 = if is_reg { d.rs2 } else { 0 };
        Trace::new(uuid, pc, d.rd, d.rs1, rs2, d.rd != 0, FuType::Alu, FuOp::Arith)
    }

    fn exec_branch(&mut self, d: &crate::isa::Decoded, uuid: u64, pc: u32) -> Trace {
        use crate::units::alu::{self, AluOp};

        let a = self.gpr.read(d.rs1);
        let b = self.gpr.read(d.rs2);
        let op = match d.funct3 {
            funct3::BEQ => AluOp::Beq,
            funct3::BNE => AluOp::Bne,
            funct3::BLT => AluOp::Blt,
            funct3::BGE => AluOp::Bge,
            funct3::BLTU => AluOp::Bltu,
            funct3::BGEU => AluOp::Bgeu,
            _ => AluOp::Beq,
        };
        let taken = alu::execute(op, a, b) != 0;
        self.pc = if taken {
            pc.wrapping_add(d.imm as u32)
        } else {
            pc.wrapping_add(4)
        };
        Trace::new(uuid, pc, 0, d.rs1, d.rs2, false, FuType::Alu, FuOp::Branch).with_taken(taken)
    }

    fn exec_load(&mut self, d: &crate::isa::Decoded, uuid: u64, pc: u32) -> Trace {
        let addr = self.gpr.read(d.rs1).wrapping_add(d.imm as u32);
        let (value, size) = match d.funct3 {
            funct3::LB => (self.ram.read8(addr) as i8 as i32 as u32, 1),
            funct3::LH => (self.ram.read16(addr) as i16 as i32 as u32, 2),
            funct3::LW => (self.ram.read32(addr), 4),
            funct3::LBU => (u32::from(self.ram.read8(addr)), 1),
            funct3::LHU => (u32::from(self.ram.read16(addr)), 2),
            _ => (self.ram.read32(addr), 4),
        };
        self.gpr.write(d.rd, value);
        self.pc = pc.wrapping_add(4);
        Trace::new(uuid, pc, d.rd, d.rs1, 0, d.rd != 0, FuType::Lsu, FuOp::Load)
            .with_lsu(addr, size)
    }

    fn exec_store(&mut self, d: &crate::isa::Decoded, uuid: u64, pc: u32) -> Trace {
        let addr = self.gpr.read(d.rs1).wrapping_add(d.imm as u32);
        let value = self.gpr.read(d.rs2);
        let size = match d.funct3 {
            funct3::SB => {
                self.ram.write8(addr, value as u8);
                1
            }
            funct3::SH => {
                self.ram.write16(addr, value as u16);
                2
            }
            _ => {
                self.ram.write32(addr, value);
                4
            }
        };
        self.pc = pc.wrapping_add(4);
        Trace::new(uuid, pc, 0, d.rs1, d.rs2, false, FuType::Lsu, FuOp::Store)
            .with_lsu(addr, size)
    }

    fn exec_system(&mut self, d: &crate::isa::Decoded, uuid: u64, pc: u32) -> Trace {
        if d.funct3 == funct3::PRIV {
            // ECALL (imm == 0) and EBREAK (imm == 1) both halt the machine
            // here; there is no supervisor to trap into.
            self.exit = Some(ExitReason::Syscall(self.gpr.read(3) as i32));
            self.pc = pc.wrapping_add(4);
            return Trace::new(uuid, pc, 0, 0, 0, false, FuType::Csr, FuOp::Syscall);
        }

        let csr = (d.imm as u32 & 0xFFF) as usize;
        let old = self.csrs[csr];
        let rs1_val = self.gpr.read(d.rs1);
        let (new_val, op) = match d.funct3 {
            funct3::CSRRW => (rs1_val, FuOp::Csrrw),
            funct3::CSRRS => (old | rs1_val, FuOp::Csrrs),
            funct3::CSRRC => (old & !rs1_val, FuOp::Csrrc),
            _ => (old, FuOp::Csrrw),
        };
        self.csrs[csr] = new_val;
        self.gpr.write(d.rd, old);
        self.pc = pc.wrapping_add(4);
        Trace::new(uuid, pc, d.rd, d.rs1, 0, d.rd != 0, FuType::Csr, op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: u32 = 0x8000_0000;

    fn r_type(funct7: u32, rs2: u32, rs1: u32, funct3: u32, rd: u32, opcode: u32) -> u32 {
        (funct7 << 25) | (rs2 << 20) | (rs1 << 15) | (funct3 << 12) | (rd << 7) | opcode
    }

    fn i_type(imm: i32, rs1: u32, funct3: u32, rd: u32, opcode: u32) -> u32 {
        (((imm as u32) & 0xFFF) << 20) | (rs1 << 15) | (funct3 << 12) | (rd << 7) | opcode
    }

    fn s_type(imm: i32, rs2: u32, rs1: u32, funct3: u32, opcode: u32) -> u32 {
        let imm = imm as u32;
        let low = imm & 0x1f;
        let high = (imm >> 5) & 0x7f;
        (high << 25) | (rs2 << 20) | (rs1 << 15) | (funct3 << 12) | (low << 7) | opcode
    }

    fn b_type(imm: i32, rs2: u32, rs1: u32, funct3: u32, opcode: u32) -> u32 {
        let imm = imm as u32;
        let bit12 = (imm >> 12) & 1;
        let bit11 = (imm >> 11) & 1;
        let bits10_5 = (imm >> 5) & 0x3f;
        let bits4_1 = (imm >> 1) & 0xf;
        (bit12 << 31)
            | (bits10_5 << 25)
            | (rs2 << 20)
            | (rs1 << 15)
            | (funct3 << 12)
            | (bits4_1 << 8)
            | (bit11 << 7)
            | opcode
    }

    fn cpu_with_program(words: &[u32]) -> Cpu {
        let mut ram = Ram::new(4096, BASE);
        for (i, word) in words.iter().enumerate() {
            ram.write32(BASE + (i as u32) * 4, *word);
        }
        Cpu::new(ram, BASE)
    }

    #[test]
    fn addi_writes_destination_register() {
        // addi x1, x0, 5
        let mut cpu = cpu_with_program(&[i_type(5, 0, funct3::ADD_SUB, 1, opcodes::OP_IMM)]);
        let trace = cpu.step().expect("instruction steps");
        assert_eq!(trace.fu_type, FuType::Alu);
        assert_eq!(cpu.gpr.read(1), 5);
        assert_eq!(cpu.pc, BASE + 4);
    }

    #[test]
    fn sub_computes_register_difference() {
        let mut cpu = cpu_with_program(&[
            i_type(10, 0, funct3::ADD_SUB, 1, opcodes::OP_IMM), // addi x1, x0, 10
            i_type(3, 0, funct3::ADD_SUB, 2, opcodes::OP_IMM),  // addi x2, x0, 3
            r_type(
                crate::isa::rv32i::funct7::SUB,
                2,
                1,
                funct3::ADD_SUB,
                3,
                opcodes::OP_REG,
            ), // sub x3, x1, x2
        ]);
        cpu.step();
        cpu.step();
        cpu.step();
        assert_eq!(cpu.gpr.read(3), 7);
    }

    #[test]
    fn branch_taken_redirects_pc() {
        // beq x0, x0, 8
        let mut cpu = cpu_with_program(&[b_type(8, 0, 0, funct3::BEQ, opcodes::OP_BRANCH)]);
        let trace = cpu.step().expect("branch steps");
        assert_eq!(trace.fu_op, FuOp::Branch);
        assert_eq!(cpu.pc, BASE + 8);
    }

    #[test]
    fn branch_not_taken_falls_through() {
        // bne x0, x0, 8 (never taken since x0 == x0)
        let mut cpu = cpu_with_program(&[b_type(8, 0, 0, funct3::BNE, opcodes::OP_BRANCH)]);
        cpu.step();
        assert_eq!(cpu.pc, BASE + 4);
    }

    #[test]
    fn store_then_load_round_trips_through_memory() {
        let mut cpu = cpu_with_program(&[
            i_type(42, 0, funct3::ADD_SUB, 1, opcodes::OP_IMM), // addi x1, x0, 42
            s_type(0x10, 1, 0, funct3::SW, opcodes::OP_STORE),  // sw x1, 0x10(x0)
            i_type(0x10, 0, funct3::LW, 2, opcodes::OP_LOAD),   // lw x2, 0x10(x0)
        ]);
        cpu.step();
        let store_trace = cpu.step().expect("store steps");
        assert!(store_trace.lsu.is_some());
        cpu.step();
        assert_eq!(cpu.gpr.read(2), 42);
    }

    #[test]
    fn ecall_exits_with_gp_register_value() {
        let mut cpu = cpu_with_program(&[
            i_type(7, 0, funct3::ADD_SUB, 3, opcodes::OP_IMM), // addi x3, x0, 7
            i_type(0, 0, funct3::PRIV, 0, opcodes::OP_SYSTEM), // ecall
        ]);
        cpu.step();
        cpu.step();
        assert_eq!(cpu.exit_reason(), Some(ExitReason::Syscall(7)));
        assert!(cpu.step().is_none());
    }

    #[test]
    fn x0_destination_write_is_discarded() {
        // addi x0, x0, 5 — legal encoding, architecturally a no-op.
        let mut cpu = cpu_with_program(&[i_type(5, 0, funct3::ADD_SUB, 0, opcodes::OP_IMM)]);
        cpu.step();
        assert_eq!(cpu.gpr.read(0), 0);
    }

    #[test]
    fn x0_destination_trace_has_wb_false() {
        // add x0, x1, x2 — must not mark the trace as writing the register
        // file, so the pipeline never renames or locks register 0.
        let mut cpu = cpu_with_program(&[r_type(0, 2, 1, funct3::ADD_SUB, 0, opcodes::OP_REG)]);
        let trace = cpu.step().expect("instruction steps");
        assert!(!trace.wb);
    }
}
