//! Simulation performance statistics.
//!
//! Tracks the counters a `Core` run needs to print its final `PERF:` line and
//! to let tests assert on structural-stall behavior (S3, S4). Grounded in the
//! teacher's statistics module but trimmed to the fields this pipeline
//! actually produces — no cache or floating-point categories, since neither
//! exists here.

/// Performance counters accumulated over a `Core` run.
#[derive(Debug, Clone, Default)]
pub struct PerfStats {
    /// Total cycles elapsed.
    pub cycles: u64,
    /// Number of instructions committed (retired).
    pub instructions_retired: u64,

    /// Count of ALU-classified instructions retired.
    pub inst_alu: u64,
    /// Count of LSU-classified instructions retired.
    pub inst_lsu: u64,
    /// Count of CSR-classified instructions retired.
    pub inst_csr: u64,
    /// Count of branch instructions retired.
    pub inst_branch: u64,

    /// Number of branch predictions that matched the resolved direction.
    pub branch_hits: u64,
    /// Number of branch predictions that did not match the resolved direction.
    pub branch_misses: u64,

    /// Cycles where issue stalled because the reservation station was full.
    pub stalls_rs_full: u64,
    /// Cycles where fetch stalled waiting on an unresolved/stalled branch.
    pub stalls_branch: u64,
    /// Cycles where the in-order pipeline stalled on the in-use bitmap.
    pub stalls_inuse: u64,
}

impl PerfStats {
    /// Creates a zeroed counter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Instructions retired per cycle, 0.0 if no cycles have elapsed.
    #[must_use]
    pub fn ipc(&self) -> f64 {
        if self.cycles == 0 {
            0.0
        } else {
            self.instructions_retired as f64 / self.cycles as f64
        }
    }

    /// Formats the standard one-line performance summary.
    #[must_use]
    pub fn perf_line(&self) -> String {
        format!(
            "PERF: instrs={}, cycles={}",
            self.instructions_retired, self.cycles
        )
    }

    /// Prints a multi-section breakdown to stdout.
    pub fn print(&self) {
        println!("{}", self.perf_line());
        println!("  ipc                    {:.4}", self.ipc());
        println!(
            "  mix.alu/lsu/csr/branch {}/{}/{}/{}",
            self.inst_alu, self.inst_lsu, self.inst_csr, self.inst_branch
        );
        let bp_total = self.branch_hits + self.branch_misses;
        let bp_acc = if bp_total == 0 {
            0.0
        } else {
            100.0 * self.branch_hits as f64 / bp_total as f64
        };
        println!("  branch.accuracy        {bp_acc:.2}%");
        println!(
            "  stalls.rs/branch/inuse {}/{}/{}",
            self.stalls_rs_full, self.stalls_branch, self.stalls_inuse
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ipc_is_zero_with_no_cycles() {
        assert_eq!(PerfStats::new().ipc(), 0.0);
    }

    #[test]
    fn ipc_divides_retired_by_cycles() {
        let stats = PerfStats {
            cycles: 4,
            instructions_retired: 2,
            ..PerfStats::new()
        };
        assert!((stats.ipc() - 0.5).abs() < f64::EPSILON);
    }
}
