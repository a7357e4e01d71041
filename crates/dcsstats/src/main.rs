use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;

use dcsstats_logging::{init_tracing, LogFormat};
use dcsstats_sessions::{LateTerminalPolicy, PlayerRoster, SourceStore};

mod config;
mod output;
mod players;

use config::{parse_source, Overrides, Settings, StatsConfig};
use players::{handle_players, handle_sorties, Command};

#[derive(Parser, Debug)]
#[command(
    name = "dcsstats",
    about = "Player and sortie statistics from dedicated server event logs",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Config file (default: ./dcsstats.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory the output files are written to
    #[arg(short, long, global = true)]
    output_dir: Option<PathBuf>,

    /// Source directory as NAME=DIR (repeatable, replaces configured sources)
    #[arg(short, long = "source", value_parser = parse_source, global = true)]
    sources: Vec<dcsstats_sessions::Source>,

    /// Seconds after a sortie ends in which its end reason may still change
    #[arg(long, global = true)]
    grace_window: Option<i64>,

    /// What to do with terminal events after the grace window
    #[arg(long, value_enum, global = true)]
    late_terminal: Option<LateTerminalChoice>,

    /// Log level filter (RUST_LOG takes priority)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Log output format
    #[arg(long, value_enum, default_value = "compact", global = true)]
    log_format: LogFormatChoice,

    /// Also append logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LateTerminalChoice {
    Ignore,
    StartNewSortie,
}

impl From<LateTerminalChoice> for LateTerminalPolicy {
    fn from(choice: LateTerminalChoice) -> Self {
        match choice {
            LateTerminalChoice::Ignore => LateTerminalPolicy::Ignore,
            LateTerminalChoice::StartNewSortie => LateTerminalPolicy::StartNewSortie,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let guard = init_tracing(
        &cli.log_level,
        cli.log_format.into(),
        cli.log_file.as_deref(),
    );

    let exit_code = match run(cli) {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!("{:#}", e);
            1
        }
    };

    // Flush the file writer before exiting.
    drop(guard);
    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<()> {
    let settings = load_settings(&cli)?;

    match cli.command.unwrap_or(Command::Build { sorties: false }) {
        Command::Build { sorties } => {
            let roster = build(&settings, sorties)?;
            let output_dir = settings.require_output_dir()?;
            eprintln!(
                "{} {} players written to {}",
                "✓".bright_green(),
                roster.len(),
                output_dir.display()
            );
        }
        Command::Players { json } => handle_players(&load_roster(&settings)?, json)?,
        Command::Sorties { player_id, json } => {
            handle_sorties(&load_roster(&settings)?, &player_id, json)?
        }
    }

    Ok(())
}

fn load_roster(settings: &Settings) -> Result<PlayerRoster> {
    SourceStore::new(settings.sources.clone())
        .with_options(settings.options)
        .load()
}

/// Load every source, then write the output files.
///
/// Nothing is written unless every file of every source parsed.
fn build(settings: &Settings, sorties: bool) -> Result<PlayerRoster> {
    let output_dir = settings.require_output_dir()?;
    let roster = load_roster(settings)?;

    output::write_player_names(&roster, output_dir)?;
    output::write_total_play_time(&roster, output_dir)?;
    if sorties {
        output::write_sorties(&roster, output_dir)?;
    }

    Ok(roster)
}

fn load_settings(cli: &Cli) -> Result<Settings> {
    let config = match &cli.config {
        Some(path) => StatsConfig::load_from(path)?,
        None => {
            let working_dir =
                std::env::current_dir().context("Failed to get current directory")?;
            StatsConfig::load(&working_dir)?.unwrap_or_default()
        }
    };

    let overrides = Overrides {
        output_dir: cli.output_dir.clone(),
        sources: cli.sources.clone(),
        grace_window_secs: cli.grace_window,
        late_terminal: cli.late_terminal.map(Into::into),
    };

    Settings::resolve(config, overrides)
}
