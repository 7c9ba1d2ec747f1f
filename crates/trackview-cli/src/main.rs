//! CLI for trackview: live terminal panel for motion tracker telemetry.

mod commands;
mod sim;
mod tui;

use clap::{Args, Parser, Subcommand};

use sim::SimOptions;

#[derive(Parser)]
#[command(name = "trackview")]
#[command(about = "trackview: live terminal panel for motion tracker telemetry")]
#[command(version = trackview_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Panel and simulation options shared by every command.
#[derive(Args)]
struct PanelArgs {
    /// Path to a panel config JSON file ({"update_delay_ms": 50, "debug": false})
    #[arg(long)]
    config: Option<String>,

    /// Minimum milliseconds between two refreshes (overrides the config file)
    #[arg(long)]
    update_delay_ms: Option<u64>,

    /// Show IMU and correction debug fields
    #[arg(long)]
    debug: bool,

    /// Number of simulated IMUs
    #[arg(long, default_value = "4")]
    imus: usize,

    /// How many of the simulated IMUs are reference-adjusted
    #[arg(long, default_value = "1")]
    adjusted: usize,
}

impl PanelArgs {
    fn sim(&self) -> SimOptions {
        SimOptions {
            imus: self.imus,
            adjusted: self.adjusted.min(self.imus),
        }
    }

    fn config(&self) -> trackview_core::PanelConfig {
        commands::panel_config_or_exit(self.config.as_deref(), self.update_delay_ms, self.debug)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Live tracker panel (TUI) over simulated trackers.
    /// Keys: ↑↓ select, d debug, p/m edit designation/mounting, s snapshot, q quit.
    Monitor {
        #[command(flatten)]
        panel: PanelArgs,
    },

    /// Simulate for a while and print the panel as JSON
    Snapshot {
        #[command(flatten)]
        panel: PanelArgs,

        /// Number of simulated samples before capturing
        #[arg(long, default_value = "20")]
        steps: u32,

        /// RNG seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,

        /// Write JSON to this file instead of stdout
        #[arg(long)]
        output: Option<String>,
    },
}

fn main() {
    // Off by default: log lines on stderr would tear the TUI.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("off")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Monitor { panel } => commands::monitor::run(panel.config(), panel.sim()),
        Commands::Snapshot {
            panel,
            steps,
            seed,
            output,
        } => commands::snapshot::run(
            panel.config(),
            commands::snapshot::SnapshotCommandConfig {
                sim: panel.sim(),
                steps,
                seed,
                output_path: output.as_deref(),
            },
        ),
    }
}
