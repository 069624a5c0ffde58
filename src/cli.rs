//! CLI argument parsing using clap v4
//!
//! Defines the command-line interface for the metabolic tracker.

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::types::{MetabolicState, Metric};

/// Metabolic Health Tracker - personal glucose, ketone and weight log
///
/// Each invocation is one session: the log starts from the embedded sample
/// (or an exported CSV passed with --data), entries are appended in memory,
/// and nothing is kept after exit unless exported.
#[derive(Parser, Debug)]
#[command(name = "metabolic-tracker")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, env = "METABOLIC_CONFIG", global = true)]
    pub config: Option<String>,

    /// Start the session from an exported CSV instead of the built-in sample
    #[arg(long, env = "METABOLIC_DATA", global = true)]
    pub data: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show headline metrics, trends and the raw table for one user
    Dashboard {
        /// User to display (defaults to the configured user, else the first known)
        #[arg(short, long)]
        user: Option<String>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Add an entry to the log
    Add {
        #[command(flatten)]
        entry: EntryArgs,

        /// Export the whole log to this CSV file after saving
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Show the latest weight, glucose, ketones and ratio
    Summary {
        #[arg(short, long)]
        user: Option<String>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Show one metric over time (weight, glucose, ketones, ratio)
    Trend {
        metric: Metric,

        #[arg(short, long)]
        user: Option<String>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// List users with recorded observations
    Users,

    /// Export a user's observations as CSV
    Export {
        #[arg(short, long)]
        user: Option<String>,

        /// Output file ("-" for stdout; defaults to the configured export file)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Start an interactive session
    Shell {
        /// User selected when the session starts
        #[arg(short, long)]
        user: Option<String>,
    },

    /// Display version and build information
    Version,

    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

/// Entry form fields shared by `add` and the shell's `add`
#[derive(Args, Debug, Clone, PartialEq)]
pub struct EntryArgs {
    /// Metabolic state: Fasted or Fed
    #[arg(short, long)]
    pub state: MetabolicState,

    /// User the entry belongs to (defaults to the configured user)
    #[arg(short, long)]
    pub user: Option<String>,

    /// Date as YYYY-MM-DD or MM/DD/YY (defaults to today)
    #[arg(short, long)]
    pub date: Option<String>,

    /// Time as HH:MM or h:mm AM/PM (defaults to now)
    #[arg(short, long)]
    pub time: Option<String>,

    /// Glucose in mg/dL (0 = not measured)
    #[arg(short, long, default_value_t = 90)]
    pub glucose: u32,

    /// Ketones in mmol/L (0 = not measured)
    #[arg(short, long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub ketones: f64,

    /// Weight in lbs (0 = not measured)
    #[arg(short, long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub weight: f64,

    /// Body fat percentage, free text (e.g. "15.6%")
    #[arg(long = "body-fat", default_value = "")]
    pub body_fat: String,

    /// Blood pressure or notes, free text
    #[arg(long = "bp", default_value = "")]
    pub blood_pressure: String,
}

/// Configuration subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigSubcommand {
    /// Display the current configuration
    Show,

    /// Initialize a new configuration file
    Init {
        /// Path where to create the config file
        #[arg(short, long)]
        path: Option<String>,

        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Validate the configuration
    Validate,
}
