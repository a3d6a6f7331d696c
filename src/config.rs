//! Command-line configuration for the `train` binary, via `clap`'s derive API.

use clap::{Parser, ValueEnum};

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum GameKind {
    Rps,
    Kuhn,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum SamplerKindArg {
    Outcome,
    External,
}

#[derive(Parser, Debug)]
#[command(name = "train", about = "Runs MCCFR to approximate a Nash equilibrium")]
pub struct Config {
    /// Which game to train on.
    #[arg(long, value_enum, default_value = "rps")]
    pub game: GameKind,

    /// Outcome-sampling (default) or external-sampling episodes.
    #[arg(long, value_enum, default_value = "outcome")]
    pub sampler: SamplerKindArg,

    /// Number of worker threads; defaults to the available parallelism.
    #[arg(long)]
    pub workers: Option<usize>,

    /// Checkpoint file stem (e.g. `ckpt` produces `ckpt_state.npy`, `ckpt_p0.npy`, ...).
    #[arg(long, default_value = "checkpoint")]
    pub checkpoint: String,

    /// If set, run for this many wall-clock seconds instead of until interrupted.
    #[arg(long)]
    pub seconds: Option<u64>,

    /// Load regret/average-policy state from `<checkpoint>_*.npy` before training.
    #[arg(long)]
    pub resume: bool,
}

impl Config {
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(|| std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1))
    }
}
