//! Session state and the interactive shell
//!
//! A `Session` owns the health log for one process lifetime. It is created
//! once, handed by `&mut` to whichever front end drives it, and dropped
//! on exit. Nothing outlives it unless exported.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use tracing::{debug, info, warn};

use crate::cli::{EntryArgs, OutputFormat};
use crate::config::TrackerConfig;
use crate::dashboard::{self, DashboardView};
use crate::entry::EntryForm;
use crate::error::{Error, Result};
use crate::healthlog::{codec, trend_series, HealthLog};
use crate::types::{Metric, Observation};

const PROMPT: &str = "> ";

/// One user session over the health log
#[derive(Debug)]
pub struct Session {
    log: HealthLog,
    preferred_user: String,
    selected_user: Option<String>,
}

impl Session {
    /// Start a session from the configured data file, or the built-in sample
    pub fn start(config: &TrackerConfig, data_override: Option<&str>) -> Result<Self> {
        let data_file = data_override
            .map(|p| PathBuf::from(shellexpand::tilde(p).into_owned()))
            .or_else(|| config.data_file());

        let rows = match data_file {
            Some(ref path) => {
                info!(path = %path.display(), "Loading observations from file");
                codec::load_file(path)?
            }
            None => codec::seed_observations()?,
        };

        Ok(Self::new(HealthLog::initialize(rows), &config.tracker.default_user))
    }

    pub fn new(log: HealthLog, preferred_user: &str) -> Self {
        Self {
            log,
            preferred_user: preferred_user.to_string(),
            selected_user: None,
        }
    }

    pub fn log(&self) -> &HealthLog {
        &self.log
    }

    /// Explicit selection if any, else the preferred user when present,
    /// else the first known user
    pub fn current_user(&self) -> Option<&str> {
        match self.selected_user {
            Some(ref user) => Some(user.as_str()),
            None => self.log.default_user(&self.preferred_user),
        }
    }

    /// Select a user for subsequent views. Only users with rows can be selected.
    pub fn select_user(&mut self, user: &str) -> Result<()> {
        if !self.log.users().contains(&user) {
            return Err(Error::UnknownUser { user: user.to_string() });
        }
        debug!(user = %user, "User selected");
        self.selected_user = Some(user.to_string());
        Ok(())
    }

    /// Validate a form and append it to the log
    pub fn submit(&mut self, form: EntryForm) -> Result<&Observation> {
        let entry = form.submit()?;
        let observation = self.log.append(entry);
        info!(
            user = %observation.user,
            date = %observation.date,
            time = %observation.time,
            state = %observation.state,
            "Entry saved"
        );
        Ok(observation)
    }

    /// Dashboard for `user`, or for the current user when `None`
    pub fn view(&self, user: Option<&str>) -> DashboardView<'_> {
        let user = user.or_else(|| self.current_user());
        DashboardView::build(&self.log, user)
    }

    /// Rows for `user`, or for the current user when `None`
    pub fn filtered(&self, user: Option<&str>) -> Vec<&Observation> {
        match user.or_else(|| self.current_user()) {
            Some(u) => self.log.filter_by_user(u),
            None => Vec::new(),
        }
    }

    /// Export rows for `user` to `path`, returning how many were written
    pub fn export_to(&self, user: Option<&str>, path: &Path) -> Result<usize> {
        let rows = self.filtered(user);
        codec::export_file(path, rows.iter().copied())?;
        info!(
            path = %path.display(),
            rows = rows.len(),
            mime = codec::EXPORT_MIME,
            "Observations exported"
        );
        Ok(rows.len())
    }

    /// Export the whole log to `path`
    pub fn export_all(&self, path: &Path) -> Result<usize> {
        codec::export_file(path, &self.log)?;
        info!(path = %path.display(), rows = self.log.len(), "Log exported");
        Ok(self.log.len())
    }
}

// ─────────────────────────────────────────────────────────────────
// Interactive Shell
// ─────────────────────────────────────────────────────────────────

/// One line typed into the shell
#[derive(Parser, Debug)]
#[command(name = "shell", no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand, Debug)]
enum ShellCommand {
    /// Add an entry for the current user (or --user)
    Add(EntryArgs),
    /// List users with recorded observations
    Users,
    /// Switch the current user
    Select { user: String },
    /// Latest weight, glucose, ketones and ratio
    Summary,
    /// One metric over time
    Trend { metric: Metric },
    /// Raw rows for the current user
    Table,
    /// Headline metrics, trends and raw rows
    Dashboard,
    /// Export the current user's rows as CSV
    Export {
        #[arg(short, long)]
        output: Option<String>,
    },
    /// End the session
    #[command(alias = "exit")]
    Quit,
}

/// Drives a session from line-oriented input.
pub struct Shell<'a> {
    session: &'a mut Session,
    export_file: String,
    clock: Box<dyn Fn() -> NaiveDateTime + 'a>,
}

impl<'a> Shell<'a> {
    pub fn new(session: &'a mut Session, export_file: &str) -> Self {
        Self {
            session,
            export_file: export_file.to_string(),
            clock: Box::new(|| chrono::Local::now().naive_local()),
        }
    }

    /// Replace the clock used for default entry dates and times
    #[cfg(test)]
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> NaiveDateTime + 'a,
    {
        self.clock = Box::new(clock);
        self
    }

    /// Read commands until `quit` or end of input
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> Result<()> {
        writeln!(out, "{}", dashboard::TITLE)?;
        writeln!(out, "Type 'help' for commands, 'quit' to leave.")?;

        let mut lines = input.lines();
        loop {
            write!(out, "{}", PROMPT)?;
            out.flush()?;

            let Some(line) = lines.next() else {
                writeln!(out)?;
                break;
            };
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            match self.execute(&line, out) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!(error = %e.format_for_log(), "Command failed");
                    writeln!(out, "Error [{}]: {}", e.code(), e)?;
                }
            }
        }

        debug!(rows = self.session.log().len(), "Session ended");
        Ok(())
    }

    /// Run one command line. Returns `false` when the session should end.
    fn execute<W: Write>(&mut self, line: &str, out: &mut W) -> Result<bool> {
        let args = split_args(line)?;
        let parsed = match ShellLine::try_parse_from(&args) {
            Ok(parsed) => parsed,
            Err(e) => {
                use clap::error::ErrorKind;
                return match e.kind() {
                    ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                        write!(out, "{}", e.render())?;
                        Ok(true)
                    }
                    _ => Err(Error::InvalidCommand(first_line(&e.render().to_string()))),
                };
            }
        };

        match parsed.command {
            ShellCommand::Add(entry) => {
                let default_user = self
                    .session
                    .current_user()
                    .unwrap_or(self.session.preferred_user.as_str());
                let form = EntryForm::from_args(&entry, default_user, (self.clock)())?;
                self.session.submit(form)?;
                writeln!(out, "Saved!")?;
            }
            ShellCommand::Users => {
                let current = self.session.current_user();
                for user in self.session.log().users() {
                    let marker = if Some(user) == current { "*" } else { " " };
                    writeln!(out, "{} {}", marker, user)?;
                }
            }
            ShellCommand::Select { user } => {
                self.session.select_user(&user)?;
                writeln!(out, "Selected {}", user)?;
            }
            ShellCommand::Summary => {
                let view = self.session.view(None);
                dashboard::write_summary(out, &view, OutputFormat::Text)?;
            }
            ShellCommand::Trend { metric } => {
                let rows = self.session.filtered(None);
                let series = trend_series(rows.iter().copied(), metric);
                dashboard::write_trend(out, &series, OutputFormat::Text)?;
            }
            ShellCommand::Table => {
                let rows = self.session.filtered(None);
                if rows.is_empty() {
                    writeln!(out, "{}", dashboard::EMPTY_MESSAGE)?;
                } else {
                    dashboard::write_table(out, &rows)?;
                }
            }
            ShellCommand::Dashboard => {
                let view = self.session.view(None);
                dashboard::write_dashboard(out, &view, OutputFormat::Text)?;
            }
            ShellCommand::Export { output } => {
                let path = PathBuf::from(output.unwrap_or_else(|| self.export_file.clone()));
                let rows = self.session.export_to(None, &path)?;
                writeln!(out, "Exported {} rows to {}", rows, path.display())?;
            }
            ShellCommand::Quit => return Ok(false),
        }

        Ok(true)
    }
}

fn first_line(text: &str) -> String {
    text.lines().next().unwrap_or_default().trim_start_matches("error: ").to_string()
}

/// Split a command line into words. Single or double quotes group words;
/// there are no escapes.
pub fn split_args(line: &str) -> Result<Vec<String>> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    args.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        return Err(Error::InvalidCommand("unterminated quote".to_string()));
    }
    if in_word {
        args.push(current);
    }
    Ok(args)
}
