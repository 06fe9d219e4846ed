//! Command-line front-end for the out-of-order pipeline simulator.
//!
//! Loads a program image into a [`Cpu`], builds a [`Core`] around it, ticks
//! the core to completion, and reports the final performance summary. This
//! binary is the only place in the workspace that installs a `tracing`
//! subscriber — the core library only ever emits through the `tracing`
//! macros, never configuring where those events go.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use rv32ooc_core::common::SimError;
use rv32ooc_core::config::Config;
use rv32ooc_core::emulator::Ram;
use rv32ooc_core::{Core, Cpu};
use tracing_subscriber::EnvFilter;

/// Runs a RISC-V program image through the out-of-order pipeline simulator.
#[derive(Parser, Debug)]
#[command(name = "sim", author, version, about = "Cycle-level RISC-V pipeline simulator")]
struct Cli {
    /// ELF or flat-binary RV32I program image to execute.
    program: PathBuf,

    /// JSON configuration file. Fields absent from it fall back to defaults.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print the full per-section performance breakdown instead of the
    /// one-line summary.
    #[arg(long)]
    verbose_stats: bool,

    /// Cycle budget. Simulation stops and dumps state if the program has not
    /// retired by then.
    #[arg(long, default_value_t = 10_000_000)]
    max_cycles: u64,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> Result<i32, SimError> {
    let config = load_config(cli.config.as_deref())?;

    let bytes = std::fs::read(&cli.program).map_err(|source| SimError::Io {
        path: cli.program.clone(),
        source,
    })?;
    let mut ram = Ram::new(config.ram_size, config.start_pc);
    ram.load(&cli.program, &bytes)?;

    let cpu = Cpu::new(ram, config.start_pc);
    let mut core = Core::new(cpu, &config);

    while core.running() && core.stats().cycles < cli.max_cycles {
        core.tick();
    }

    if core.running() {
        tracing::warn!(cycles = cli.max_cycles, "simulation did not retire within the cycle budget");
        core.dump();
    }

    if cli.verbose_stats {
        core.stats().print();
    } else {
        println!("{}", core.stats().perf_line());
    }

    Ok(core.exit_code().unwrap_or(1))
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config, SimError> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let text = std::fs::read_to_string(path).map_err(|source| SimError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| SimError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}
