//! Command-line argument definitions for the Epicycle CLI.

use clap::Parser;

/// Command-line arguments for the Epicycle diagram tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input JSON system description
    #[arg(help = "Path to the input file")]
    pub input: String,

    /// Path to the output SVG file
    #[arg(short, long, default_value = "out.svg")]
    pub output: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Number of relaxation steps to run before exporting
    #[arg(long, default_value_t = 600)]
    pub steps: u32,

    /// Simulated seconds per step
    #[arg(long, default_value_t = 1.0 / 60.0)]
    pub dt: f32,

    /// Radius of the initial circular placement
    #[arg(long, default_value_t = 150.0)]
    pub seed_radius: f32,

    /// Margin around the diagram in the exported SVG
    #[arg(long, default_value_t = 50.0)]
    pub margin: f32,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
