use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "glean-fides")]
#[command(about = "Classify Glean telemetry metrics into Fides data categories with an LLM")]
#[command(version)]
pub struct Cli {
    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Base directory (default: ~/.glean-fides)
    #[arg(long, global = true)]
    pub base_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Mode {
    Plain,
    FewShot,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Provider {
    Vertex,
    ClaudeCli,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage the Fides category snapshot
    Categories {
        #[command(subcommand)]
        action: CategoriesAction,
    },

    /// Inspect Glean metrics on Probe-Info
    Metrics {
        #[command(subcommand)]
        action: MetricsAction,
    },

    /// Classify every metric of an application and write a report
    Classify {
        /// Application name on Probe-Info (e.g., fenix)
        app: String,

        /// Prompt mode (default: classifier.mode)
        #[arg(short, long, value_enum)]
        mode: Option<Mode>,

        /// Text generation provider (default: classifier.provider)
        #[arg(long, value_enum)]
        provider: Option<Provider>,

        /// Fail on answers that are neither a known fides_key nor N/A
        #[arg(long)]
        strict: bool,

        /// Double embedded quotes in descriptions
        #[arg(long)]
        escape: bool,

        /// Report path (default: report.output)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Category snapshot to classify against (default: fides.snapshot)
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum CategoriesAction {
    /// Fetch categories from the Fides API and save a snapshot
    Fetch {
        /// Snapshot path (default: fides.snapshot)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Load a saved snapshot and print a summary
    Load {
        /// Snapshot path (default: fides.snapshot)
        file: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum MetricsAction {
    /// List applications known to Probe-Info
    Apps,

    /// Report data_sensitivity coverage per application
    Stats {
        /// Applications to inspect (default: all)
        apps: Vec<String>,

        /// Print the metrics that lack data_sensitivity
        #[arg(long)]
        show_missing: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g., classifier.model_id)
        key: String,
    },

    /// Set a config value
    Set {
        /// Config key (e.g., classifier.project)
        key: String,
        /// Value to set
        value: String,
    },

    /// List all config values
    List,

    /// Show config file path
    Path,

    /// Initialize config file with defaults
    Init,
}
