use std::io;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use closetly_db::ClosetConfig;
use closetly_sqlite::{ClosetError, Migration, MigrationStatus, SeedReport, Session};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

mod auth;
mod console;
mod error;
mod menu;
mod table;

use console::Console;

const CONNECTION_FAILED: &str = "An error occurred, please contact the administrator.";

#[derive(Debug, Parser)]
#[command(name = "closetly")]
#[command(about = "Shared closet, store and outfit console")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sign in and use the closet menus (the default).
    Run(RunArgs),
    /// Database schema and fixture operations.
    Migrate(MigrateArgs),
}

#[derive(Debug, Default, Args)]
struct RunArgs {
    /// Database file path (overrides the config file).
    #[arg(long)]
    db: Option<PathBuf>,
    /// YAML config file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print connection details and debug logs.
    #[arg(long)]
    debug: bool,
}

#[derive(Debug, Args)]
struct MigrateArgs {
    #[command(subcommand)]
    operation: MigrateOperation,
}

#[derive(Debug, Subcommand)]
enum MigrateOperation {
    /// Create the closet tables.
    Up(DatabaseArgs),
    /// Drop the closet tables.
    Down(DatabaseArgs),
    /// Show whether the tables exist and how many rows they hold.
    Status(DatabaseArgs),
    /// Load a JSON or YAML fixture.
    Seed(SeedArgs),
    /// Drop tables, recreate, and load a fixture.
    Refresh(SeedArgs),
}

#[derive(Debug, Args)]
struct DatabaseArgs {
    /// Database file path.
    #[arg(long)]
    db: PathBuf,
}

#[derive(Debug, Args)]
struct SeedArgs {
    /// Database file path.
    #[arg(long)]
    db: PathBuf,
    /// Fixture file (.json, .yaml or .yml).
    #[arg(long)]
    source: PathBuf,
}

fn main() {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or_else(|| Command::Run(RunArgs::default()));

    let result = match command {
        Command::Run(args) => run_console(args),
        Command::Migrate(args) => {
            init_tracing(false);
            run_migrate(args)
        }
    };

    if let Err(err) = result {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

/// Logs go to stderr so prompts and tables on stdout stay clean.
fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run_console(args: RunArgs) -> Result<(), String> {
    let config = match &args.config {
        Some(path) => ClosetConfig::load(path)
            .map_err(|e| format!("error: failed to load config '{}': {e}", path.display()))?,
        None => ClosetConfig::default(),
    };
    let config = config.with_overrides(args.db, args.debug);
    init_tracing(config.debug);
    debug!(database = %config.database.display(), "opening closet database");

    let mut session = Session::open(&config.database)
        .map_err(|e| connection_failure(&e, config.debug))?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut console = Console::new(stdin.lock(), stdout.lock());
    let outcome = menu::run_session(&mut console, &mut session);
    drop(console);

    if let Err(e) = session.close() {
        error!(error = %e, "failed to close the database");
    }
    outcome.map_err(|e| format!("error: {e}"))
}

/// Message shown when the database cannot be opened. Details are only
/// shown in debug mode.
fn connection_failure(err: &ClosetError, debug: bool) -> String {
    debug!(error = %err, "connection failed");
    if !debug {
        return CONNECTION_FAILED.to_string();
    }
    match err {
        ClosetError::DatabaseNotFound(path) => {
            format!("Database does not exist: {}", path.display())
        }
        ClosetError::DatabaseError(e) => format!("Could not open the database: {e}"),
        other => other.to_string(),
    }
}

fn open_migration(db: &Path) -> Result<Migration, String> {
    let conn = rusqlite::Connection::open(db)
        .map_err(|e| format!("error: failed to open database '{}': {e}", db.display()))?;
    Migration::new(conn).map_err(|e| format!("error: failed to initialize migration: {e}"))
}

fn run_migrate(args: MigrateArgs) -> Result<(), String> {
    match args.operation {
        MigrateOperation::Up(a) => {
            open_migration(&a.db)?
                .up()
                .map_err(|e| format!("error: migration up failed: {e}"))?;
            println!("Migration up complete. Closet tables created in '{}'.", a.db.display());
        }
        MigrateOperation::Down(a) => {
            open_migration(&a.db)?
                .down()
                .map_err(|e| format!("error: migration down failed: {e}"))?;
            println!("Migration down complete. Closet tables dropped from '{}'.", a.db.display());
        }
        MigrateOperation::Status(a) => {
            let status = open_migration(&a.db)?
                .status()
                .map_err(|e| format!("error: failed to get migration status: {e}"))?;
            print_status(&status);
        }
        MigrateOperation::Seed(a) => {
            let report = open_migration(&a.db)?
                .seed_file(&a.source)
                .map_err(|e| format!("error: seed failed: {e}"))?;
            println!("Seed complete:");
            print_report(&report);
        }
        MigrateOperation::Refresh(a) => {
            let report = open_migration(&a.db)?
                .refresh(&a.source)
                .map_err(|e| format!("error: refresh failed: {e}"))?;
            println!("Refresh complete (tables dropped, recreated, and reseeded):");
            print_report(&report);
        }
    }
    Ok(())
}

fn print_status(status: &MigrationStatus) {
    println!("Migration Status:");
    println!("  Tables exist: {}", if status.tables_exist { "yes" } else { "no" });
    println!("  Users: {}", status.user_count);
    println!("  Clothing items: {}", status.clothing_count);
    println!("  Personal closet entries: {}", status.personal_count);
    println!("  Collaborative closet entries: {}", status.collab_count);
    println!("  Store listings: {}", status.store_count);
    println!("  Outfits: {}", status.outfit_count);
}

fn print_report(report: &SeedReport) {
    println!("  Users inserted: {}", report.users_inserted);
    println!("  Clothing items inserted: {}", report.clothes_inserted);
    println!("  Personal closet entries inserted: {}", report.personal_inserted);
    println!("  Collaborative closet entries inserted: {}", report.collab_inserted);
    println!("  Store listings inserted: {}", report.store_inserted);
    println!("  Outfits inserted: {}", report.outfits_inserted);
}
