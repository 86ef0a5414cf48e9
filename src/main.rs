//! `filecat`: keep a SQLite inventory of every file below a directory.

mod cli;
mod error;
mod logging;

use crate::cli::{Cli, Command};
use crate::error::{ErrorKind, Result};
use clap::Parser;
use exn::ResultExt;
use filecat_config::Config;
use filecat_inventory::{Database, FileStatus, Repository};
use filecat_library::Summary;
use filecat_storage::Blake3Hasher;
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = ?e, "Fatal error");
            eprintln!("filecat: {e:?}");
            ExitCode::FAILURE
        },
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_file = cli.config.clone();
    let command = cli.command();
    let config = Config::load(config_file.as_deref(), &command.overrides()).or_raise(|| ErrorKind::Config)?;
    logging::init(&config)?;
    tracing::debug!(?config, "Configuration loaded");

    match command {
        Command::Scan(args) => scan(&config, args.dry_run).await,
        Command::Report(args) => report(&config, args.status).await,
    }
}

async fn scan(config: &Config, dry_run: bool) -> Result<()> {
    // A bad root must not leave a fresh database behind.
    let root = filecat_library::validate_root(&config.root_path).await.or_raise(|| ErrorKind::Config)?;
    let db = Database::connect(&config.database_path).await.or_raise(|| ErrorKind::Database)?;
    let repo = Repository::new(db.pool().clone(), dry_run);
    let hasher = Blake3Hasher::new(config.chunk_size);
    let result = filecat_library::run(&root, &hasher, &repo).await.or_raise(|| ErrorKind::Catalog);
    db.close().await;
    print_summary(&result?, dry_run);
    Ok(())
}

fn print_summary(summary: &Summary, dry_run: bool) {
    if dry_run {
        println!("dry run: inventory not modified");
    }
    println!("discovered: {}", summary.discovered);
    println!("processed:  {}", summary.processed);
    println!("failed:     {}", summary.failed);
    println!("skipped:    {}", summary.skipped);
}

async fn report(config: &Config, status: Option<FileStatus>) -> Result<()> {
    let db = Database::connect(&config.database_path).await.or_raise(|| ErrorKind::Database)?;
    let result = print_report(&Repository::from(&db), status).await;
    db.close().await;
    result
}

async fn print_report(repo: &Repository, status: Option<FileStatus>) -> Result<()> {
    let counts = repo.count_by_status().await.or_raise(|| ErrorKind::Database)?;
    for status in FileStatus::ALL {
        println!("{:<11} {}", format!("{status}:"), counts.get(status));
    }
    println!("{:<11} {}", "total:", counts.total());
    if let Some(status) = status {
        for record in repo.list_by_status(status).await.or_raise(|| ErrorKind::Database)? {
            println!("{}", record.path);
        }
    }
    Ok(())
}
