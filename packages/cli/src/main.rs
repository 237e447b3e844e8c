#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command line entry point for the crime EDA dashboard.
//!
//! `serve` runs the dashboard server, `report` writes the dashboard page to
//! a static HTML file, and `summary` prints the dashboard view model as
//! JSON. Without a subcommand the user picks one from an interactive menu.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use crime_eda_analytics::{build_dashboard, filter_options};
use crime_eda_analytics_models::{FilterOptions, FilterSelection};
use crime_eda_dataset::load_table;
use crime_eda_server::{ServerConfig, dashboard_page};
use crime_eda_server_models::DashboardQuery;
use dialoguer::{Input, Select};

#[derive(Parser)]
#[command(name = "crime_eda_cli", about = "Crime data EDA dashboard")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the dashboard server
    Serve {
        /// Dataset CSV (defaults to `DATASET_PATH`, then `train0.csv`)
        #[arg(long)]
        dataset: Option<PathBuf>,
        /// Address to bind (defaults to `BIND_ADDR`, then `127.0.0.1`)
        #[arg(long)]
        bind: Option<String>,
        /// Port to listen on (defaults to `PORT`, then 8080)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Write the dashboard page to a static HTML file
    Report {
        /// Destination HTML file
        #[arg(long, short)]
        output: PathBuf,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Print the dashboard view model as JSON
    Summary {
        #[command(flatten)]
        filters: FilterArgs,
    },
}

/// Dataset and filter flags shared by `report` and `summary`. A list flag
/// that is never given selects every value.
#[derive(Args, Debug, Default)]
struct FilterArgs {
    /// Dataset CSV (defaults to `DATASET_PATH`, then `train0.csv`)
    #[arg(long)]
    dataset: Option<PathBuf>,
    /// Crime category to include (repeatable)
    #[arg(long = "category")]
    categories: Vec<String>,
    /// Weapon description to include (repeatable)
    #[arg(long = "weapon")]
    weapons: Vec<String>,
    /// Victim sex code to include (repeatable)
    #[arg(long = "sex")]
    sexes: Vec<String>,
    /// First day of the date range (`YYYY-MM-DD`)
    #[arg(long)]
    from: Option<NaiveDate>,
    /// Last day of the date range (`YYYY-MM-DD`)
    #[arg(long)]
    to: Option<NaiveDate>,
}

impl FilterArgs {
    fn dataset_path(&self) -> PathBuf {
        self.dataset
            .clone()
            .unwrap_or_else(|| ServerConfig::from_env().dataset_path)
    }

    fn selection(&self, options: &FilterOptions) -> FilterSelection {
        let or_all = |picked: &[String], all: &[String]| {
            if picked.is_empty() {
                all.to_vec()
            } else {
                picked.to_vec()
            }
        };

        DashboardQuery {
            applied: true,
            categories: or_all(&self.categories, &options.categories),
            weapons: or_all(&self.weapons, &options.weapons),
            sexes: or_all(&self.sexes, &options.sexes),
            from: self.from,
            to: self.to,
        }
        .selection(options)
    }
}

/// Top-level actions offered by the interactive menu.
enum Tool {
    Server,
    Report,
    Summary,
}

impl Tool {
    const ALL: &[Self] = &[Self::Server, Self::Report, Self::Summary];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Server => "Start server",
            Self::Report => "Write static HTML report",
            Self::Summary => "Print JSON summary",
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve {
            dataset,
            bind,
            port,
        }) => {
            let defaults = ServerConfig::from_env();
            serve(ServerConfig {
                dataset_path: dataset.unwrap_or(defaults.dataset_path),
                bind_addr: bind.unwrap_or(defaults.bind_addr),
                port: port.unwrap_or(defaults.port),
            })?;
        }
        Some(Commands::Report { output, filters }) => write_report(&filters, &output)?,
        Some(Commands::Summary { filters }) => print_summary(&filters)?,
        None => interactive()?,
    }

    Ok(())
}

/// Runs the server on a fresh actix system, blocking until it stops.
fn serve(config: ServerConfig) -> std::io::Result<()> {
    actix_web::rt::System::new().block_on(crime_eda_server::run_server(config))
}

fn write_report(filters: &FilterArgs, output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let table = load_table(&filters.dataset_path())?;
    let selection = filters.selection(&filter_options(&table));
    let html = dashboard_page(&table, &selection)?;

    std::fs::write(output, html)?;
    log::info!("Report written to {}", output.display());
    Ok(())
}

fn print_summary(filters: &FilterArgs) -> Result<(), Box<dyn std::error::Error>> {
    let table = load_table(&filters.dataset_path())?;
    let selection = filters.selection(&filter_options(&table));
    let dashboard = build_dashboard(&table, &selection);

    println!("{}", serde_json::to_string_pretty(&dashboard)?);
    Ok(())
}

fn interactive() -> Result<(), Box<dyn std::error::Error>> {
    println!("Crime Data EDA Dashboard");
    println!();

    let labels: Vec<&str> = Tool::ALL.iter().map(Tool::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Tool::ALL[idx] {
        Tool::Server => {
            actix_web::rt::System::new().block_on(crime_eda_server::interactive::run())?;
        }
        Tool::Report => {
            let output: String = Input::new()
                .with_prompt("Output file")
                .default("crime_eda_report.html".to_string())
                .interact_text()?;
            write_report(&FilterArgs::default(), Path::new(&output))?;
        }
        Tool::Summary => print_summary(&FilterArgs::default())?,
    }

    Ok(())
}
