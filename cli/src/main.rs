// SPDX-License-Identifier: PMPL-1.0-or-later
//! harvest CLI - metadata generator for community plugin repositories
//!
//! This CLI provides commands for:
//! - Generating metadata records for every listed plugin repository
//! - Checking that a repository publishes releases
//! - Inspecting the effective configuration

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod exit_codes;
mod output;

use commands::{check_releases, generate};
use config::Config;
use output::{OutputFormat, Outputter};

/// harvest - plugin metadata generator
///
/// Validates plugin repositories on GitHub and writes the metadata files
/// consumed by the plugin catalogue.
#[derive(Parser)]
#[command(
    name = "harvest",
    author = "hyperpolymath",
    version,
    about = "Plugin metadata generator",
    long_about = None,
    propagate_version = true,
    after_help = "Use 'harvest <command> --help' for more information about a command."
)]
struct Cli {
    /// Result format (plain or json)
    #[arg(long, global = true, default_value = "plain", env = "HARVEST_FORMAT")]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "HARVEST_CONFIG")]
    config: Option<std::path::PathBuf>,

    /// Disable colored output
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate metadata for every repository in the plugin list
    ///
    /// Writes data.json, repositories.json, summary.json and
    /// diff/after.json to the output directory.
    Generate(generate::GenerateArgs),

    /// Check that a repository has at least one release
    #[command(name = "check-releases")]
    CheckReleases(check_releases::CheckReleasesArgs),

    /// Show configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Show version and build information
    Version,

    /// Show exit code documentation
    #[command(name = "exit-codes")]
    ExitCodes,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration (token masked)
    Show,
}

fn init_logging(verbose: u8, quiet: bool) {
    let filter = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    // CI annotations must start the line, so no timestamp or level by default
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .without_time()
                .with_level(verbose >= 1)
                .with_target(verbose >= 2)
                .with_writer(std::io::stdout),
        )
        .with(env_filter)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose, cli.quiet);

    if cli.no_color {
        colored::control::set_override(false);
    }

    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            exit_codes::for_error(&e)
        }
    };

    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<i32> {
    // Load configuration
    let loaded = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };

    // Dispatch to command handlers
    match cli.command {
        Commands::Generate(args) => generate::execute(args, &config, cli.format).await,
        Commands::CheckReleases(args) => check_releases::execute(args, &config, cli.format).await,
        Commands::Config(ConfigCommands::Show) => {
            Outputter::new(cli.format).output_config(&config)?;
            Ok(exit_codes::SUCCESS)
        }
        Commands::Version => {
            print_version_info(cli.format)?;
            Ok(exit_codes::SUCCESS)
        }
        Commands::ExitCodes => {
            print_exit_codes(cli.format)?;
            Ok(exit_codes::SUCCESS)
        }
    }
}

fn print_version_info(format: OutputFormat) -> Result<()> {
    use serde::Serialize;

    #[derive(Serialize)]
    struct VersionInfo {
        name: &'static str,
        version: &'static str,
        git_commit: Option<&'static str>,
        build_date: Option<&'static str>,
        rust_version: &'static str,
        target: Option<&'static str>,
    }

    let info = VersionInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        git_commit: option_env!("GIT_COMMIT"),
        build_date: option_env!("BUILD_DATE"),
        rust_version: env!("CARGO_PKG_RUST_VERSION"),
        target: option_env!("TARGET"),
    };

    match format {
        OutputFormat::Json => Outputter::new(format).output(&info)?,
        OutputFormat::Plain => {
            println!("{} {}", info.name, info.version);
            if let Some(commit) = info.git_commit {
                println!("Git commit: {}", commit);
            }
            if let Some(date) = info.build_date {
                println!("Build date: {}", date);
            }
            println!("Rust version: {}", info.rust_version);
            if let Some(target) = info.target {
                println!("Target: {}", target);
            }
        }
    }

    Ok(())
}

fn print_exit_codes(format: OutputFormat) -> Result<()> {
    use serde::Serialize;

    #[derive(Serialize)]
    struct ExitCodeInfo {
        code: i32,
        name: &'static str,
        description: &'static str,
    }

    let codes: Vec<_> = exit_codes::ALL
        .iter()
        .map(|&(code, name)| ExitCodeInfo {
            code,
            name,
            description: exit_codes::describe(code),
        })
        .collect();

    match format {
        OutputFormat::Json => Outputter::new(format).output(&codes)?,
        OutputFormat::Plain => {
            println!("Exit Codes for harvest CLI");
            println!("==========================\n");
            for info in &codes {
                println!("  {:3}  {:<20}  {}", info.code, info.name, info.description);
            }
        }
    }

    Ok(())
}
