//! Command-line interface.

use clap::{Args, Parser, Subcommand};
use filecat_config::Overrides;
use filecat_inventory::FileStatus;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "filecat", version, about, args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Configuration file (TOML, YAML or JSON).
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Option<Command>,
    /// Arguments for `scan` when no subcommand is given.
    #[command(flatten)]
    pub scan: ScanArgs,
}
impl Cli {
    /// The requested command; `scan` when none was given.
    pub fn command(self) -> Command {
        self.command.unwrap_or(Command::Scan(self.scan))
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Walk the root directory and bring the inventory up to date.
    Scan(ScanArgs),
    /// Print per-status counts from the inventory.
    Report(ReportArgs),
}
impl Command {
    pub fn overrides(&self) -> Overrides {
        match self {
            Self::Scan(args) => Overrides {
                root_path: args.root.clone(),
                database_path: args.database.clone(),
                log_path: None,
                debug: args.debug.then_some(true),
            },
            Self::Report(args) => Overrides { database_path: args.database.clone(), ..Overrides::default() },
        }
    }
}

#[derive(Debug, Default, Args)]
pub struct ScanArgs {
    /// Directory to catalog.
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,
    /// Inventory database file.
    #[arg(long, value_name = "FILE")]
    pub database: Option<PathBuf>,
    /// Log at debug level and mirror logs to stderr.
    #[arg(long)]
    pub debug: bool,
    /// Walk and hash without writing to the inventory.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Default, Args)]
pub struct ReportArgs {
    /// Inventory database file.
    #[arg(long, value_name = "FILE")]
    pub database: Option<PathBuf>,
    /// Also list every path with this status.
    #[arg(long, value_parser = parse_status)]
    pub status: Option<FileStatus>,
}

fn parse_status(s: &str) -> Result<FileStatus, String> {
    s.parse().map_err(|_| {
        let expected: Vec<&str> = FileStatus::ALL.iter().map(FileStatus::as_str).collect();
        format!("expected one of: {}", expected.join(", "))
    })
}
