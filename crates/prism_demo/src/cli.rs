use std::path::PathBuf;

use clap::Parser;

/// Drive the scene layer for a number of frames against a logging sink.
#[derive(Parser, Debug)]
#[command(name = "prism_demo", version)]
pub struct Cli {
    /// Scene config (JSON). Defaults are used when omitted.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of randomly placed spheres
    #[arg(long, default_value_t = 32)]
    pub spheres: usize,

    /// Frames to simulate
    #[arg(long, default_value_t = 120)]
    pub frames: u64,

    /// Seed for the scatter; random when omitted
    #[arg(long)]
    pub seed: Option<u64>,

    /// Simulated frame rate, sets dt
    #[arg(long, default_value_t = 60.0)]
    pub fps: f32,

    /// Move one sphere every N frames
    #[arg(long, default_value_t = 10)]
    pub nudge_every: u64,
}
