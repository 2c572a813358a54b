use anyhow::Result;
use clap::{Parser, Subcommand};
use sqlshift::database::ensure_data_dir;
use sqlshift::{DatabaseConn, MigrationState, MigrationStatus, Runner, SqlshiftConfig};
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tracing::Level;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
    /// configuration file path, by default $HOME/.sqlshift/sqlshift.toml is used
    #[clap(short, long)]
    config: Option<String>,

    /// Path to the SQLite database file, overriding the configured location
    #[clap(long)]
    db: Option<String>,

    /// Print debug information
    #[clap(long)]
    debug: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending migrations in version order
    Up {
        /// Apply only the next pending migration
        #[clap(long)]
        one: bool,
    },

    /// Revert the latest applied migration
    Down {
        /// Revert until this version is the latest applied (0 reverts all)
        #[clap(long)]
        to: Option<u64>,
    },

    /// Show the state of every known migration
    Status {
        /// Output as JSON
        #[clap(long)]
        json: bool,
    },
}

#[derive(Tabled)]
struct StatusRow {
    version: u64,
    name: String,
    state: String,
    applied_at: String,
}

fn format_applied_at(applied_at: Option<i64>) -> String {
    match applied_at.and_then(|ts| chrono::DateTime::from_timestamp(ts, 0)) {
        Some(datetime) => datetime.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => "-".to_string(),
    }
}

fn print_status(statuses: &[MigrationStatus], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(statuses)?);
        return Ok(());
    }

    let rows: Vec<StatusRow> = statuses
        .iter()
        .map(|s| StatusRow {
            version: s.version,
            name: s.name.clone(),
            state: s.state.to_string(),
            applied_at: format_applied_at(s.applied_at),
        })
        .collect();
    println!("{}", Table::new(rows).with(Style::modern()));
    Ok(())
}

fn open_runner(cli: &Cli) -> Result<Runner> {
    let db_path = match &cli.db {
        Some(path) => path.clone(),
        None => {
            let config = SqlshiftConfig::new(&cli.config)?;
            ensure_data_dir(&config.data_dir)?;
            config.sqlite_path()
        }
    };

    let db = DatabaseConn::open_path(&db_path)?;
    let runner = Runner::new(db, sqlshift::migrations::builtin()?)?;
    Ok(runner)
}

fn run(cli: Cli) -> Result<()> {
    let runner = open_runner(&cli)?;

    match cli.command {
        Commands::Up { one } => {
            let applied = if one {
                vec![runner.apply_one()?]
            } else {
                runner.apply_pending()?
            };

            if applied.is_empty() {
                println!("nothing to apply, database is up to date");
            } else {
                for version in applied {
                    println!("applied {}", version);
                }
            }
        }
        Commands::Down { to } => {
            let reverted = match to {
                Some(target) => runner.revert_to(target)?,
                None => vec![runner.revert_one()?],
            };

            if reverted.is_empty() {
                println!("nothing to revert");
            } else {
                for version in reverted {
                    println!("reverted {}", version);
                }
            }
        }
        Commands::Status { json } => {
            let statuses = runner.status()?;

            if statuses.is_empty() {
                println!("no migrations registered");
            } else {
                print_status(&statuses, json)?;
            }

            let pending = statuses
                .iter()
                .filter(|s| s.state == MigrationState::Pending)
                .count();
            if !json && pending > 0 {
                println!("\n{} migration(s) pending", pending);
            }
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();

    if cli.debug {
        tracing_subscriber::fmt()
            // filter spans/events with level INFO or higher.
            .with_max_level(Level::INFO)
            .init();
    }

    if let Err(e) = run(cli) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
