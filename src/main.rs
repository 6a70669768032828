use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

mod alerts;
mod loader;
mod models;
mod report;
mod stats;

use models::{AlertLists, CohortSummary, Population, StudentRecord};

#[derive(Parser)]
#[command(name = "score-dashboard")]
#[command(about = "Test score dashboard and alerting for student cohorts", long_about = None)]
struct Cli {
    /// Log at debug level (logs go to stderr)
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the cohort dashboard to stdout
    Dashboard {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Show one student's results
    Student {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long)]
        name: String,
    },
    /// Look up students interactively by name
    Lookup {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Write the dashboard to a file
    Report {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, default_value = "dashboard.md")]
        out: PathBuf,
        #[arg(long, value_enum, default_value = "markdown")]
        format: ReportFormat,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ReportFormat {
    Markdown,
    Json,
}

#[derive(serde::Serialize)]
struct DashboardPayload<'a> {
    summary: &'a CohortSummary,
    alerts: &'a AlertLists,
    students: &'a [StudentRecord],
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Dashboard { csv } => {
            let (population, summary, alerts) = run_pipeline(&csv)?;
            print!("{}", report::render_dashboard(&summary, &alerts, &population));
        }
        Commands::Student { csv, name } => {
            let population = load_enriched(&csv)?;
            match population.get(&name) {
                Some(student) => print!("{}", report::render_student(student)),
                None => println!("{}", report::no_data_message(&name)),
            }
        }
        Commands::Lookup { csv } => {
            let population = load_enriched(&csv)?;
            if population.is_empty() {
                println!("No students on file.");
                return Ok(());
            }
            println!("Students: {}", population.names().join(", "));
            run_lookup_loop(&population)?;
        }
        Commands::Report { csv, out, format } => {
            let (population, summary, alerts) = run_pipeline(&csv)?;
            let contents = match format {
                ReportFormat::Markdown => {
                    report::render_dashboard(&summary, &alerts, &population)
                }
                ReportFormat::Json => {
                    let payload = DashboardPayload {
                        summary: &summary,
                        alerts: &alerts,
                        students: &population.students,
                    };
                    let mut json = serde_json::to_string_pretty(&payload)?;
                    json.push('\n');
                    json
                }
            };
            std::fs::write(&out, contents)
                .with_context(|| format!("failed to write report to {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();
}

/// The full batch pipeline: load, enrich, summarize, alert. Rendering
/// is left to the caller.
fn run_pipeline(path: &Path) -> anyhow::Result<(Population, CohortSummary, AlertLists)> {
    let mut population = loader::load_population(path)?;
    let cohort_average = stats::enrich(&mut population);
    let summary = stats::summarize_cohort(&population, cohort_average);
    let alerts = alerts::generate_alerts(&population);
    Ok((population, summary, alerts))
}

/// Load plus enrichment only, for the lookup views.
fn load_enriched(path: &Path) -> anyhow::Result<Population> {
    let mut population = loader::load_population(path)?;
    stats::enrich(&mut population);
    Ok(population)
}

fn run_lookup_loop(population: &Population) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut input = String::new();
    loop {
        print!("Enter a student name (blank to quit): ");
        io::stdout().flush()?;
        input.clear();
        if stdin.read_line(&mut input)? == 0 {
            break;
        }
        let name = input.trim();
        if name.is_empty() {
            break;
        }
        match population.get(name) {
            Some(student) => print!("{}", report::render_student(student)),
            None => println!("{}", report::no_data_message(name)),
        }
    }
    Ok(())
}
