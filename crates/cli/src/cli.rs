use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Creative performance analytics over exported ad metrics.
///
/// Every subcommand reads a JSON file (`-` for stdin) and prints JSON.
#[derive(Parser, Debug)]
#[command(name = "adpulse", version, about)]
pub struct CliArgs {
    /// Rules directory with threshold / benchmark YAML (overrides RULES_DIR).
    #[arg(long, global = true)]
    pub rules_dir: Option<PathBuf>,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fatigue index for one creative, or for each creative in an array.
    Fatigue {
        /// `{"creativeAgeDays": n, "dailyMetrics": [...]}` or an array of those.
        input: PathBuf,
    },

    /// Score and rank a population of creatives.
    Score {
        /// Array of `{"id", "metrics", "fatigue"?}`.
        input: PathBuf,

        /// Only print the N best creatives.
        #[arg(long)]
        top: Option<usize>,

        /// Only print the N worst creatives.
        #[arg(long, conflicts_with = "top")]
        bottom: Option<usize>,

        /// Include population statistics.
        #[arg(long)]
        summary: bool,
    },

    /// Rule-based anomaly detection with optional AI narrative.
    Anomalies {
        /// One `{"current", "previous", ...}` object, or an array of them
        /// (one per account) processed as a batch.
        input: PathBuf,

        /// Print a text report instead of JSON.
        #[arg(long)]
        report: bool,

        /// Never call the LLM, even when rules fire.
        #[arg(long)]
        no_ai: bool,
    },

    /// Moving-average deviation check for a single metric series.
    Trend {
        /// Array of `{"date", "value"}`.
        input: PathBuf,

        /// Metric name used in the output.
        #[arg(long, default_value = "value")]
        metric: String,
    },

    /// Show the effective configuration and loaded rule documents.
    Config,
}
