use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Ticketero Load Testing Tool
#[derive(Parser, Debug)]
#[command(name = "ticketero-load")]
#[command(about = "Load testing tool for the Ticketero ticket-issuing service")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub mode: Mode,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Mode {
    /// Run a load-test profile against a ticket service
    Run(RunArgs),

    /// Serve an in-process stub of the ticket service (runs until Ctrl+C)
    Serve(ServeArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Base URL of the ticket service
    #[arg(long, default_value = "http://localhost:8080", env = "BASE_URL")]
    pub base_url: String,

    /// Live metrics reporting interval in seconds (0 disables the dashboard)
    #[arg(long, default_value = "2")]
    pub report_interval: u64,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "10")]
    pub request_timeout: u64,

    /// Write a JSON run summary to this path
    #[arg(long)]
    pub summary_out: Option<PathBuf>,

    /// RNG seed for reproducible payload streams
    #[arg(long)]
    pub seed: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub profile: Profile,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Profile {
    /// Ramp to peak load through a warm step, hold, then ramp down
    Ramp(RampArgs),

    /// Sustained load over an extended period to detect degradation
    Soak(SoakArgs),

    /// Sudden burst of high load to observe backpressure and shedding
    Spike(SpikeArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RampArgs {
    /// Target virtual users for the warm step
    #[arg(long, default_value = "10")]
    pub warm_target: usize,

    /// Target virtual users at peak
    #[arg(long, default_value = "50")]
    pub peak_target: usize,

    /// Ramp-up duration in seconds (0 -> warm target)
    #[arg(long, default_value = "30")]
    pub ramp_up: u64,

    /// Hold duration in seconds (warm target -> peak target)
    #[arg(long, default_value = "60")]
    pub hold: u64,

    /// Ramp-down duration in seconds (peak target -> 0)
    #[arg(long, default_value = "30")]
    pub ramp_down: u64,

    /// Think time between iterations in seconds
    #[arg(long, default_value = "1.0")]
    pub think_time: f64,
}

#[derive(Args, Debug, Clone)]
pub struct SoakArgs {
    /// Target virtual users to sustain
    #[arg(long, default_value = "30")]
    pub target: usize,

    /// Ramp-up duration in seconds
    #[arg(long, default_value = "120")]
    pub ramp_up: u64,

    /// Hold duration in seconds
    #[arg(long, default_value = "1560")]
    pub hold: u64,

    /// Ramp-down duration in seconds
    #[arg(long, default_value = "120")]
    pub ramp_down: u64,

    /// Minimum think time between iterations in seconds
    #[arg(long, default_value = "1.0")]
    pub think_min: f64,

    /// Maximum think time between iterations in seconds
    #[arg(long, default_value = "4.0")]
    pub think_max: f64,

    /// Fraction of tickets sent to the PRIORITY queue (0.0-1.0)
    #[arg(long, default_value = "0.5")]
    pub priority_ratio: f64,

    /// Ceiling for the service-reported memory usage, in bytes
    #[arg(long, default_value = "1000000000")]
    pub memory_ceiling: u64,
}

#[derive(Args, Debug, Clone)]
pub struct SpikeArgs {
    /// Target virtual users during the spike
    #[arg(long, default_value = "100")]
    pub target: usize,

    /// Spike ramp-up duration in seconds
    #[arg(long, default_value = "10")]
    pub ramp_up: u64,

    /// Spike hold duration in seconds
    #[arg(long, default_value = "30")]
    pub hold: u64,

    /// Drop-off duration in seconds
    #[arg(long, default_value = "10")]
    pub ramp_down: u64,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Bind address for the stub service
    #[arg(long, default_value = "127.0.0.1:8080")]
    pub bind: String,

    /// Concurrent in-flight requests before the stub sheds with 429
    #[arg(long, default_value = "64")]
    pub capacity: usize,

    /// Simulated per-request processing time in milliseconds
    #[arg(long, default_value = "5")]
    pub processing_time_ms: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
