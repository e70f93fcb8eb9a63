//! Development tasks for the sim-wasm workspace.
//!
//! # Commands
//!
//! - `cargo xtask check` - cargo gates, the unwrap scan, the wasm32 build and
//!   the export manifests under `target/exports`
//! - `cargo xtask ci` - the same gates, failing if any of them fails
//! - `cargo xtask manifest` - write a flavor's export manifest
//! - `cargo xtask exports` - check a module's export list against a manifest
//! - `cargo xtask golden` - print golden vectors for a model

mod check;
mod exports;
mod golden;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Development tasks for sim-wasm", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Export family.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FlavorArg {
    /// Plain `mjw_*` exports
    Mjw,
    /// Forge `mjwf_*` exports with ABI introspection
    Mjwf,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all quality checks across the workspace
    Check {
        /// Fail if any gate fails
        #[arg(long)]
        ci: bool,
    },

    /// Run the full CI suite
    Ci,

    /// Write the export manifest for a flavor
    Manifest {
        /// Export family
        #[arg(long, value_enum, default_value = "mjwf")]
        flavor: FlavorArg,

        /// Output file (stdout if omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Check a module's export names against a flavor's manifest
    Exports {
        /// Export family
        #[arg(long, value_enum, default_value = "mjwf")]
        flavor: FlavorArg,

        /// File with one export name per line
        #[arg(name = "LIST")]
        list: PathBuf,

        /// Write the JSON report here
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Step a model through the registry and print golden vectors as JSON
    Golden {
        /// Model file
        #[arg(name = "MODEL")]
        model: PathBuf,

        /// Number of steps to record
        #[arg(default_value_t = 200, value_parser = clap::value_parser!(u32).range(1..))]
        steps: u32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { ci } => check::run(ci),
        Commands::Ci => check::run(true),
        Commands::Manifest { flavor, out } => exports::write_manifest(flavor, out.as_deref()),
        Commands::Exports {
            flavor,
            list,
            report,
        } => exports::check(flavor, &list, report.as_deref()),
        Commands::Golden { model, steps } => golden::run(&model, steps),
    }
}
