use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use titanic_etl::load::{self, LoadOutcome};
use titanic_etl::{logging, metrics, Config, Pipeline, RunOptions, RunReport};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "titanic_etl")]
#[command(about = "Load cleaned Titanic passenger records from CSV into SQLite")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to a TOML config file (defaults to ./config.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run extract, transform and load
    Run {
        /// Input CSV file
        #[arg(long)]
        input: Option<PathBuf>,
        /// Destination SQLite database file
        #[arg(long)]
        database: Option<PathBuf>,
        /// Extract and transform only
        #[arg(long)]
        dry_run: bool,
        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create the destination table if it does not exist
    Migrate {
        /// Destination SQLite database file
        #[arg(long)]
        database: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    let _guard = logging::init_logging(cli.verbose);

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Run {
            input,
            database,
            dry_run,
            json,
        } => {
            if let Some(input) = input {
                config.input.path = input;
            }
            if let Some(database) = database {
                config.database.path = database;
            }

            let recorder = match &config.metrics.textfile {
                Some(_) => Some(metrics::install_recorder()?),
                None => None,
            };

            println!("--- Starting ETL: Titanic CSV to SQLite ---");
            let result = Pipeline::new(&config).run(RunOptions { dry_run });

            if let (Some(handle), Some(path)) = (&recorder, &config.metrics.textfile) {
                match metrics::write_textfile(handle, path) {
                    Ok(()) => info!("Wrote metrics snapshot to {}", path.display()),
                    Err(e) => error!("Failed to write metrics snapshot: {}", e),
                }
            }

            let report = match result {
                Ok(report) => report,
                Err(e) => return Err(anyhow::Error::new(e).context("ETL run failed")),
            };

            if json {
                println!("{}", report.to_json()?);
            } else {
                print_report(&report);
            }
            println!("--- ETL finished ---");
        }
        Commands::Migrate { database } => {
            if let Some(database) = database {
                config.database.path = database;
            }
            let conn = load::connect(&config.database.path)?;
            load::run_migrations(&conn).context("Failed to run migrations")?;
            println!(
                "✅ Table '{}' is ready in {}",
                load::DESTINATION_TABLE,
                config.database.path.display()
            );
        }
    }
    Ok(())
}

fn print_report(report: &RunReport) {
    println!("\n📊 Run results:");
    match report.rows_extracted {
        Some(rows) => println!("   Rows extracted: {rows}"),
        None => println!("   Input file not found: {}", report.input_path.display()),
    }
    if let Some(summary) = &report.transform {
        if let Some(mean) = summary.age_mean {
            println!("   Ages imputed: {} (mean {:.2})", summary.ages_imputed, mean);
        }
        if let Some(mode) = &summary.port_mode {
            println!("   Ports imputed: {} (mode '{}')", summary.ports_imputed, mode);
        }
    }
    match &report.load {
        LoadOutcome::Loaded { rows } => println!(
            "   Rows loaded: {} into '{}' ({})",
            rows,
            load::DESTINATION_TABLE,
            report.database_path.display()
        ),
        LoadOutcome::Skipped => println!("   No data to load. Database untouched."),
        LoadOutcome::DryRun => println!("   Dry run: database untouched."),
    }
}
