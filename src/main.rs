// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{error, info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use player_ranking::app_config::{Config, LogLevel, ViewStyle};
use player_ranking::app_controller::Controller;
use player_ranking::view;

/// CLI Wrapper for ViewStyle to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliViewStyle {
    Table,
    Text,
    Json,
}

impl From<CliViewStyle> for ViewStyle {
    fn from(cli_view: CliViewStyle) -> Self {
        match cli_view {
            CliViewStyle::Table => ViewStyle::Table,
            CliViewStyle::Text => ViewStyle::Text,
            CliViewStyle::Json => ViewStyle::Json,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Import a CSV file of players as a new batch
    Import {
        /// CSV file with a header line followed by name,level,score rows
        #[arg(value_name = "CSV_PATH")]
        csv_path: PathBuf,

        /// Where rejected rows are logged (defaults to the configured log)
        #[arg(short, long)]
        error_log: Option<PathBuf>,
    },

    /// List import batches, most recent first
    Batches {
        /// Show source file and row counts of each batch
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show the ranking of a batch (the most recent one by default)
    Show {
        /// Batch id as printed by `batches`
        #[arg(value_name = "BATCH")]
        batch: Option<String>,

        /// Output view
        #[arg(short, long, value_enum)]
        view: Option<CliViewStyle>,
    },

    /// Delete every record of a batch
    Delete {
        /// Batch id as printed by `batches`
        #[arg(value_name = "BATCH")]
        batch: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Print store statistics
    Stats,

    /// Generate shell completions for ranking
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Player Ranking - batch-versioned player rankings from CSV files
#[derive(Parser, Debug)]
#[command(name = "ranking")]
#[command(version)]
#[command(about = "Import player CSV files and browse each import's ranking")]
#[command(long_about = "Imports CSV files of players (name, level, score) into a SQLite store. \
Each import becomes a batch identified by its timestamp; rankings are shown per batch, sorted by score.

EXAMPLES:
    ranking import jogadores.csv                 # Import, logging bad rows to erros.log
    ranking import jogadores.csv -e rejeitados.log
    ranking batches -v                           # List batches with source and counts
    ranking show                                 # Ranking of the most recent batch
    ranking show \"2024-05-01 14:03:22\" -v text
    ranking delete \"2024-05-01 14:03:22\"         # Asks for confirmation
    ranking completions bash > ranking.bash

CONFIGURATION:
    Configuration is stored in ranking.json by default. If the file doesn't
    exist, a default one will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "ranking.json", global = true)]
    config_path: PathBuf,

    /// Database file (overrides the configuration)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation, filtered by the global max level
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger);
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Tag and ANSI colour for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("ERROR", "1;31"),
            Level::Warn => ("WARN ", "1;33"),
            Level::Info => ("INFO ", "1;32"),
            Level::Debug => ("DEBUG", "1;36"),
            Level::Trace => ("TRACE", "1;35"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        // The max level is raised or lowered once the config is read
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (tag, colour) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {} {}\x1B[0m",
                colour, now, tag, record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() {
    if let Err(e) = run() {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Initialize the logger once with warn level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Warn)?;

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "ranking", &mut std::io::stdout());
        return Ok(());
    }

    let mut config = Config::load_or_create(&cli.config_path)?;

    if let Some(database) = cli.database {
        config.database_path = database;
    }
    if let Some(log_level) = cli.log_level {
        config.log_level = log_level.into();
    }
    log::set_max_level(config.log_level.to_level_filter());

    let controller = Controller::with_config(config)?;
    let mut stdout = std::io::stdout().lock();

    match cli.command {
        Commands::Import { csv_path, error_log } => {
            let summary = controller.import_file(&csv_path, error_log.as_deref())?;

            if summary.imported > 0 {
                writeln!(
                    stdout,
                    "Importação concluída! {} jogadores importados no histórico {}.",
                    summary.imported,
                    summary.batch_id.as_ref().map(|b| b.as_str()).unwrap_or_default()
                )?;
            } else {
                writeln!(stdout, "Nenhum jogador válido encontrado; nenhum histórico criado.")?;
            }
            writeln!(
                stdout,
                "{} linhas inválidas registradas em '{}'.",
                summary.rejected.len(),
                summary.error_log_path.display()
            )?;
        }
        Commands::Batches { verbose } => {
            if verbose {
                let details = controller.batch_details()?;
                if details.is_empty() {
                    writeln!(stdout, "Nenhum histórico disponível")?;
                }
                for detail in details {
                    writeln!(
                        stdout,
                        "{}  {:>5} importados  {:>5} rejeitados  {}",
                        detail.batch_id, detail.imported, detail.rejected, detail.source_path
                    )?;
                }
            } else {
                let batches = controller.batches()?;
                if batches.is_empty() {
                    writeln!(stdout, "Nenhum histórico disponível")?;
                }
                for batch in batches {
                    writeln!(stdout, "{}", batch)?;
                }
            }
        }
        Commands::Show { batch, view } => {
            let shown = controller.show(batch.as_deref(), view.map(Into::into), &mut stdout)?;
            if !shown {
                writeln!(stdout, "Nenhum histórico disponível")?;
            }
        }
        Commands::Delete { batch, yes } => {
            let batch = batch.trim();
            if batch.is_empty() {
                warn!("Select a valid batch to delete");
                return Err(anyhow!("No batch given"));
            }

            let confirmed = yes || {
                let stdin = std::io::stdin();
                view::confirm_deletion(batch, &mut stdin.lock(), &mut stdout)?
            };
            if !confirmed {
                info!("Deletion cancelled");
                writeln!(stdout, "Exclusão cancelada.")?;
                return Ok(());
            }

            let deleted = controller.delete(batch)?;
            if deleted > 0 {
                writeln!(stdout, "Histórico excluído com sucesso! ({} registros)", deleted)?;
            } else {
                writeln!(stdout, "Nenhum registro encontrado para o histórico {}.", batch)?;
            }
        }
        Commands::Stats => {
            writeln!(stdout, "{}", controller.stats()?)?;
        }
        Commands::Completions { .. } => unreachable!("handled before loading the configuration"),
    }

    Ok(())
}
