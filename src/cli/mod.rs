//! Command-line front end over the ledger, report and transfer services.

mod handlers;
pub mod output;
pub mod table;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use thiserror::Error;

use crate::config::{self, ConfigError, ConfigManager};
use crate::errors::LedgerError;
use crate::ledger::{Currency, FieldErrors, LedgerStore, Method};
use crate::notify::NotificationQueue;
use crate::report::strings::{BuiltinTranslations, Locale, StringTable, Translations};
use crate::utils::persistence::JsonFileStore;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Invalid(#[from] FieldErrors),
    #[error("no contribution matches `{0}`")]
    NotFound(String),
    #[error("`{0}` matches more than one contribution")]
    Ambiguous(String),
    #[error("nothing to update")]
    EmptyUpdate,
    #[error("failed to access {path}: {source}")]
    File {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to start the notification runtime: {0}")]
    Runtime(std::io::Error),
}

#[derive(Debug, Parser)]
#[command(
    name = "contribution_ledger_cli",
    about = "Records money contributions and produces CSV and HTML reports",
    version
)]
pub struct Cli {
    /// Data directory (defaults to $CONTRIBUTION_LEDGER_HOME or ~/.contribution_ledger)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Record a new contribution
    Add(ContributionArgs),
    /// List contributions, newest first
    List {
        /// Only show names containing this text
        #[arg(long)]
        search: Option<String>,
    },
    /// Edit an existing contribution
    Update {
        /// Full id or unique id prefix
        id: String,
        #[command(flatten)]
        fields: ContributionArgs,
    },
    /// Remove a contribution
    Delete {
        /// Full id or unique id prefix
        id: String,
    },
    /// Remove every contribution
    Clear,
    /// Show totals, breakdowns and the top contributors
    Summary,
    /// Write the ledger as CSV
    Export {
        /// Destination file, `-` for stdout
        #[arg(short, long, default_value = crate::csv::EXPORT_FILE_NAME)]
        output: PathBuf,
    },
    /// Append every row of a CSV file, or nothing if any row is malformed
    Import { path: PathBuf },
    /// Render the printable HTML report
    Report {
        #[arg(short, long, default_value = "contribution_report.html")]
        output: PathBuf,
    },
    /// Show, set or toggle the interface language
    Language {
        /// `en` or `km`; toggles when omitted
        locale: Option<Locale>,
    },
    /// Print build information
    Version,
}

#[derive(Debug, Clone, Default, Args)]
pub struct ContributionArgs {
    #[arg(long)]
    pub name: Option<String>,
    /// KHQR or Cash
    #[arg(long)]
    pub method: Option<Method>,
    /// USD or KHR
    #[arg(long)]
    pub currency: Option<Currency>,
    #[arg(long)]
    pub amount: Option<String>,
    #[arg(long)]
    pub remark: Option<String>,
}

/// Everything a command needs, opened once per invocation.
pub struct Session {
    pub config: ConfigManager,
    pub store: LedgerStore,
    pub notifications: NotificationQueue,
    pub locale: Locale,
    pub strings: StringTable,
}

impl Session {
    pub fn open(data_dir: PathBuf) -> Result<Self, CliError> {
        let config = ConfigManager::open(data_dir)?;
        let store = LedgerStore::open(Box::new(JsonFileStore::new(config.data_dir())?));
        let locale = config.locale();
        tracing::debug!(data_dir = %config.data_dir().display(), %locale, "session opened");
        Ok(Self {
            config,
            store,
            notifications: NotificationQueue::new(),
            locale,
            strings: BuiltinTranslations.table(locale),
        })
    }
}

pub fn run_cli() -> Result<(), CliError> {
    run(Cli::parse())
}

pub fn run(cli: Cli) -> Result<(), CliError> {
    // Notification timers need a runtime context; it only has to outlive the command.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(CliError::Runtime)?;
    let _context = runtime.enter();

    let data_dir = cli.data_dir.unwrap_or_else(config::app_data_dir);
    let mut session = Session::open(data_dir)?;
    let outcome = handlers::dispatch(&mut session, cli.command);

    for entry in session.notifications.entries() {
        output::notification(&entry);
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definitions_are_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn add_arguments_parse_typed_values() {
        let cli = Cli::try_parse_from([
            "contribution_ledger_cli",
            "add",
            "--name",
            "Dara",
            "--method",
            "khqr",
            "--currency",
            "USD",
            "--amount",
            "12.5",
        ])
        .unwrap();
        match cli.command {
            Command::Add(args) => {
                assert_eq!(args.method, Some(Method::Khqr));
                assert_eq!(args.currency, Some(Currency::Usd));
                assert_eq!(args.amount.as_deref(), Some("12.5"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn unknown_method_is_rejected_by_the_parser() {
        assert!(Cli::try_parse_from([
            "contribution_ledger_cli",
            "add",
            "--method",
            "card"
        ])
        .is_err());
    }
}
