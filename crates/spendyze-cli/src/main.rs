//! spendyze - a command-line client for the Spendyze finance tracker.
//!
//! Keeps a signed-in session on disk, loads the account's transactions
//! into a local cache on startup and runs one subcommand against it.

mod app;
mod args;

use std::io;
use std::path::Path;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::App;
use args::{Args, Command};

/// Log file prefix inside the cache directory
const LOG_FILE: &str = "spendyze.log";

/// Initialize the tracing subscriber for logging.
///
/// Use RUST_LOG to control the level (e.g. RUST_LOG=spendyze_core=debug).
/// When a log directory is available, events are also written to a daily
/// file there; the returned guard flushes it on drop.
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

fn log_dir() -> Option<std::path::PathBuf> {
    let dir = dirs::cache_dir()?.join("spendyze").join("logs");
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir)
}

async fn run(app: &mut App, command: Command) -> Result<()> {
    match command {
        Command::Login { email } => app.login(email).await,
        Command::Signup { name, email } => app.signup(name, email).await,
        Command::Logout => app.logout().await,
        Command::Dashboard => app.dashboard(),
        Command::List { kind } => app.list(kind),
        Command::Add(args) => app.add(args).await,
        Command::Edit(args) => app.edit(args).await,
        Command::Delete { id } => app.delete(&id).await,
        Command::Summary => app.summary().await,
        Command::Scan { path, add } => app.scan(&path, add).await,
        Command::Chat => app.chat().await,
        Command::Budget => app.budget().await,
    }
}

/// Commands that need the cached transactions before they run
fn needs_records(command: &Command) -> bool {
    matches!(
        command,
        Command::Dashboard
            | Command::List { .. }
            | Command::Add(_)
            | Command::Edit(_)
            | Command::Delete { .. }
            | Command::Scan { add: true, .. }
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let log_guard = init_tracing(log_dir().as_deref());
    info!("spendyze starting");

    let mut app = App::new(args.api_url)?;
    if needs_records(&args.command) {
        app.sync().await;
    }

    let result = run(&mut app, args.command).await;
    app.finish_background().await;
    let reported = app.flush_notices();

    if let Err(e) = result {
        // Cache failures were already printed as notices
        if !reported {
            eprintln!("Error: {:#}", e);
        }
        drop(log_guard);
        std::process::exit(1);
    }
    Ok(())
}
