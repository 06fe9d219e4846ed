//! Configuration for the pipeline simulator.
//!
//! This module defines the structures used to parameterize a `Core` run. It
//! provides:
//! 1. **Defaults:** baseline structural-resource constants (register file
//!    width, functional-unit latencies, RS/ROB capacity).
//! 2. **Config:** the root structure, `serde`-deserializable from JSON so the
//!    CLI can load a run's parameters from a file, with a `Default` matching
//!    the documented structural baseline below.

use serde::Deserialize;

/// Default configuration constants for the simulator.
pub mod defaults {
    /// Architectural integer register file width. Sets RAT and in-use bitmap widths.
    pub const NUM_REGS: usize = 32;

    /// Number of functional-unit types, indexed by `FuType`.
    pub const NUM_FUS: usize = 3;

    /// Reservation-station capacity.
    pub const NUM_RSS: usize = 16;

    /// Reorder-buffer depth.
    pub const ROB_SIZE: usize = 32;

    /// ALU functional-unit latency, in cycles.
    pub const ALU_LATENCY: u64 = 1;

    /// LSU functional-unit latency, in cycles.
    pub const LSU_LATENCY: u64 = 2;

    /// CSR functional-unit latency, in cycles.
    pub const CSR_LATENCY: u64 = 1;

    /// Total size of the simulator's flat RAM (128 MiB).
    pub const RAM_SIZE: usize = 128 * 1024 * 1024;

    /// Address of the memory-mapped console output byte register.
    pub const CONSOLE_MMIO_ADDR: u32 = 0x1000_0000;

    /// Default program entry point / RAM base.
    pub const START_PC: u32 = 0x8000_0000;
}

/// Root configuration for a simulator run.
///
/// Deserializable from JSON (the CLI's `--config <path>` flag); individual
/// fields can also be overridden by CLI flags before the `Core` is built.
///
/// # Examples
///
/// ```
/// use rv32ooc_core::config::Config;
///
/// let config = Config::default();
/// assert!(config.ooo_enabled);
/// assert_eq!(config.num_rss, 16);
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Architectural integer register file width.
    #[serde(default = "Config::default_num_regs")]
    pub num_regs: usize,

    /// Reservation-station capacity.
    #[serde(default = "Config::default_num_rss")]
    pub num_rss: usize,

    /// Reorder-buffer depth.
    #[serde(default = "Config::default_rob_size")]
    pub rob_size: usize,

    /// ALU functional-unit latency, in cycles.
    #[serde(default = "Config::default_alu_latency")]
    pub alu_latency: u64,

    /// LSU functional-unit latency, in cycles.
    #[serde(default = "Config::default_lsu_latency")]
    pub lsu_latency: u64,

    /// CSR functional-unit latency, in cycles.
    #[serde(default = "Config::default_csr_latency")]
    pub csr_latency: u64,

    /// Selects the Scoreboard (out-of-order) pipeline when true, the
    /// in-order pipeline when false.
    #[serde(default = "Config::default_ooo_enabled")]
    pub ooo_enabled: bool,

    /// Enables the GShare predictor. When false every branch stalls fetch
    /// for 2 cycles regardless of its actual direction.
    #[serde(default = "Config::default_gshare_enabled")]
    pub gshare_enabled: bool,

    /// Size of the simulator's flat RAM, in bytes.
    #[serde(default = "Config::default_ram_size")]
    pub ram_size: usize,

    /// Initial program counter. Defaults to the start of RAM.
    #[serde(default = "Config::default_start_pc")]
    pub start_pc: u32,
}

impl Config {
    fn default_num_regs() -> usize {
        defaults::NUM_REGS
    }

    fn default_num_rss() -> usize {
        defaults::NUM_RSS
    }

    fn default_rob_size() -> usize {
        defaults::ROB_SIZE
    }

    fn default_alu_latency() -> u64 {
        defaults::ALU_LATENCY
    }

    fn default_lsu_latency() -> u64 {
        defaults::LSU_LATENCY
    }

    fn default_csr_latency() -> u64 {
        defaults::CSR_LATENCY
    }

    fn default_ooo_enabled() -> bool {
        true
    }

    fn default_gshare_enabled() -> bool {
        true
    }

    fn default_ram_size() -> usize {
        defaults::RAM_SIZE
    }

    fn default_start_pc() -> u32 {
        defaults::START_PC
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            num_regs: defaults::NUM_REGS,
            num_rss: defaults::NUM_RSS,
            rob_size: defaults::ROB_SIZE,
            alu_latency: defaults::ALU_LATENCY,
            lsu_latency: defaults::LSU_LATENCY,
            csr_latency: defaults::CSR_LATENCY,
            ooo_enabled: true,
            gshare_enabled: true,
            ram_size: defaults::RAM_SIZE,
            start_pc: defaults::START_PC,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_documented_latencies() {
        let config = Config::default();
        assert_eq!(config.alu_latency, 1);
        assert_eq!(config.lsu_latency, 2);
        assert_eq!(config.csr_latency, 1);
    }

    #[test]
    fn deserializes_partial_json_with_defaults() {
        let config: Config = serde_json::from_str(r#"{"num_rss": 2, "gshare_enabled": false}"#)
            .expect("valid partial config");
        assert_eq!(config.num_rss, 2);
        assert!(!config.gshare_enabled);
        assert_eq!(config.rob_size, defaults::ROB_SIZE);
    }
}
