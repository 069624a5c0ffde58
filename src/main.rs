//! Metabolic Health Tracker
//!
//! Entry point for the `metabolic-tracker` binary. Each invocation is one
//! session over an in-memory health log seeded from the built-in sample or
//! an exported CSV.

mod cli;
mod config;
mod dashboard;
mod entry;
mod error;
mod healthlog;
mod logging;
mod session;
mod types;
mod version;

use std::io::{self, Write};

use clap::Parser;
use tracing::{debug, error};

use crate::cli::{Cli, Commands, ConfigSubcommand};
use crate::config::TrackerConfig;
use crate::entry::EntryForm;
use crate::error::Result;
use crate::healthlog::{codec, trend_series};
use crate::session::{Session, Shell};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        error!(error = %e.format_for_log(), "Command failed");
        eprint!("{}", e.format_for_terminal());
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<()> {
    // Commands that don't need a session
    match cli.command {
        Commands::Version => {
            version::print_version();
            return Ok(());
        }
        Commands::Config { ref subcommand } => {
            logging::init_simple(tracing::Level::WARN)?;
            return handle_config_command(subcommand, cli.config.as_deref());
        }
        _ => {}
    }

    let config = TrackerConfig::load(cli.config.as_deref())?;

    // The guards must be kept alive for the lifetime of the program
    let _log_guards = logging::init_logging(&config.logging, cli.verbose, cli.quiet)?;

    let build = version::BuildInfo::current();
    debug!(version = %build.full_version(), "Starting metabolic tracker");

    let mut session = Session::start(&config, cli.data.as_deref())?;
    let quiet = cli.quiet;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Dashboard { user, format } => {
            let view = session.view(user.as_deref());
            dashboard::write_dashboard(&mut out, &view, format)?;
        }
        Commands::Add { entry, output } => {
            let now = chrono::Local::now().naive_local();
            let form = EntryForm::from_args(&entry, &config.tracker.default_user, now)?;
            session.submit(form)?;
            if !quiet {
                writeln!(out, "Saved!")?;
            }

            if let Some(output) = output {
                let path = std::path::PathBuf::from(output);
                let rows = session.export_all(&path)?;
                if !quiet {
                    writeln!(out, "Exported {} rows to {}", rows, path.display())?;
                }
            }
        }
        Commands::Summary { user, format } => {
            let view = session.view(user.as_deref());
            dashboard::write_summary(&mut out, &view, format)?;
        }
        Commands::Trend {
            metric,
            user,
            format,
        } => {
            let rows = session.filtered(user.as_deref());
            let series = trend_series(rows.iter().copied(), metric);
            dashboard::write_trend(&mut out, &series, format)?;
        }
        Commands::Users => {
            for user in session.log().users() {
                writeln!(out, "{}", user)?;
            }
        }
        Commands::Export { user, output } => {
            if output.as_deref() == Some("-") {
                let rows = session.filtered(user.as_deref());
                codec::write_observations(&mut out, rows.iter().copied())?;
            } else {
                let path = output
                    .map(std::path::PathBuf::from)
                    .unwrap_or_else(|| config.export_path());
                let rows = session.export_to(user.as_deref(), &path)?;
                if !quiet {
                    writeln!(
                        out,
                        "Exported {} rows to {} ({})",
                        rows,
                        path.display(),
                        codec::EXPORT_MIME
                    )?;
                }
            }
        }
        Commands::Shell { user } => {
            if let Some(ref user) = user {
                session.select_user(user)?;
            }
            let stdin = io::stdin();
            Shell::new(&mut session, &config.export.file_name).run(stdin.lock(), &mut out)?;
        }
        Commands::Version | Commands::Config { .. } => {
            // Handled above
            unreachable!();
        }
    }

    out.flush()?;
    Ok(())
}

fn handle_config_command(subcommand: &ConfigSubcommand, config_path: Option<&str>) -> Result<()> {
    match subcommand {
        ConfigSubcommand::Show => {
            let cfg = TrackerConfig::load(config_path)?;
            println!("{}", toml::to_string_pretty(&cfg)?);
        }
        ConfigSubcommand::Init { path, force } => {
            let written = config::init_config(path.as_deref(), *force)?;
            println!("Configuration file created: {}", written.display());
        }
        ConfigSubcommand::Validate => {
            TrackerConfig::load(config_path)?;
            println!("Configuration is valid.");
        }
    }

    Ok(())
}
