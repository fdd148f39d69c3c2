use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use ulid::Ulid;

use crewcal::clock::{SystemClock, business_today};
use crewcal::config::Config;
use crewcal::engine::{DaySheet, Engine, JobRequest};
use crewcal::model::*;
use crewcal::observability::reason_label;
use crewcal::store::MemoryStore;

#[derive(Parser)]
#[command(name = "crewcal", version, about = "Field-worker availability and job duration estimates")]
struct Cli {
    /// Snapshot file (overrides CREWCAL_DATA)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Who can take a job on a date
    Available {
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        start: Option<TimeOfDay>,
        /// Estimated from the services when omitted
        #[arg(long)]
        end: Option<TimeOfDay>,
        /// The job being edited
        #[arg(long)]
        exclude_job: Option<Ulid>,
        #[command(flatten)]
        scope: ScopeArgs,
    },
    /// Estimated end time for a job
    Estimate {
        #[arg(long)]
        start: TimeOfDay,
        #[command(flatten)]
        scope: ScopeArgs,
    },
    /// Each worker's jobs for a date (default: today)
    DaySheet {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Tomorrow's day sheets
    Reminders,
}

#[derive(Args)]
struct ScopeArgs {
    /// XRF scan
    #[arg(long)]
    scan: bool,
    #[arg(long)]
    swab: bool,
    #[arg(long)]
    asbestos: bool,
    #[arg(long, default_value_t = 0)]
    units: u32,
    #[arg(long, default_value_t = 0)]
    common_spaces: u32,
}

impl ScopeArgs {
    fn scope(&self) -> JobScope {
        JobScope {
            services: ServiceFlags {
                scan: self.scan,
                swab: self.swab,
                asbestos: self.asbestos,
            },
            unit_count: self.units,
            common_space_count: self.common_spaces,
        }
    }
}

#[derive(Serialize)]
struct AvailabilityView<'a> {
    window: Option<Window>,
    end_estimated: bool,
    available: &'a [Worker],
    unavailable: Vec<ReasonRow<'a>>,
}

#[derive(Serialize)]
struct ReasonRow<'a> {
    worker: &'a Worker,
    kind: &'static str,
    reason: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let data_path = cli.data.clone().unwrap_or_else(|| config.data_path.clone());

    let store = Arc::new(MemoryStore::load_json(&data_path, config.durations).await?);
    let engine = Engine::new(store);
    info!("loaded {}", data_path.display());

    match cli.command {
        Commands::Available {
            date,
            start,
            end,
            exclude_job,
            scope,
        } => {
            let request = JobRequest {
                date,
                start,
                end,
                scope: Some(scope.scope()),
                exclude_job,
            };
            let checked = engine.availability_for_job(&request).await?;
            let unavailable: Vec<ReasonRow> = checked
                .availability
                .unavailable
                .iter()
                .map(|u| ReasonRow {
                    worker: &u.worker,
                    kind: reason_label(&u.reason),
                    reason: u.reason.to_string(),
                })
                .collect();
            if cli.json {
                let view = AvailabilityView {
                    window: checked.window,
                    end_estimated: checked.end_estimated,
                    available: &checked.availability.available,
                    unavailable,
                };
                println!("{}", serde_json::to_string_pretty(&view)?);
                return Ok(());
            }
            match checked.window {
                Some(w) if checked.end_estimated => println!("{date} {}-{} (end estimated)", w.start, w.end),
                Some(w) => println!("{date} {}-{}", w.start, w.end),
                None => println!("{date} (no time window)"),
            }
            println!("available:");
            for w in &checked.availability.available {
                println!("  {}", w.name);
            }
            println!("unavailable:");
            for row in &unavailable {
                println!("  {}: {}", row.worker.name, row.reason);
            }
        }
        Commands::Estimate { start, scope } => {
            let end = engine.estimate_end_time(start, &scope.scope()).await?;
            if cli.json {
                println!("{}", serde_json::json!({ "start": start, "end": end }));
            } else {
                println!("{start}-{end}");
            }
        }
        Commands::DaySheet { date } => {
            let date = date.unwrap_or_else(|| business_today(&SystemClock, config.tz));
            let sheets = engine.day_sheet(date).await?;
            print_sheets(date, &sheets, cli.json)?;
        }
        Commands::Reminders => {
            let (date, sheets) = engine.reminders(&SystemClock, config.tz).await?;
            print_sheets(date, &sheets, cli.json)?;
        }
    }

    Ok(())
}

fn print_sheets(date: NaiveDate, sheets: &[DaySheet], json: bool) -> Result<(), serde_json::Error> {
    if json {
        println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "date": date, "sheets": sheets }))?);
        return Ok(());
    }
    println!("{date}");
    if sheets.is_empty() {
        println!("  no jobs");
    }
    for sheet in sheets {
        println!("  {}", sheet.worker.name);
        for job in &sheet.jobs {
            match job.window() {
                Some(w) => println!("    #{} {}–{}", job.job_number, w.start.to_12h(), w.end.to_12h()),
                None => println!("    #{} (time not set)", job.job_number),
            }
        }
    }
    Ok(())
}
