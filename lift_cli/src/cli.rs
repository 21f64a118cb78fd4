//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "lift", version, about = "Lift controller CLI")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/lift_config.toml")]
    pub config: PathBuf,

    /// Log as JSON lines instead of pretty
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the control loop until Ctrl-C (or for --duration-ms)
    Run {
        /// Stop after this many milliseconds
        #[arg(long, value_name = "MS")]
        duration_ms: Option<u32>,
        /// Override runner.idle_us: sleep between iterations (0 spins)
        #[arg(long, value_name = "US")]
        idle_us: Option<u64>,
        /// Print loop timing stats on exit
        #[arg(long, action = ArgAction::SetTrue)]
        stats: bool,
        /// Simulation: hold the speed knob at this raw value instead of sweeping it
        #[arg(long, value_name = "RAW")]
        sim_adc: Option<u32>,
        /// Simulation: interrupt a light beam every N ms, cycling through floors
        #[arg(long, value_name = "MS")]
        sim_break_every_ms: Option<u32>,
        /// Simulation: press the first configured button every N ms
        #[arg(long, value_name = "MS")]
        sim_press_every_ms: Option<u32>,
    },
    /// Validate the config and construct every component without running
    SelfCheck,
}
