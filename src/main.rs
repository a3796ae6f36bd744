use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod chat;
mod context;
mod dataset;
mod db;
mod export;
mod heatmap;
mod intensity;
mod metrics;
mod models;
mod ranking;
mod report;

use models::{HospitalMetrics, HourlyDischargeRecord, PhysicianStats};
use ranking::{MetricKey, PerformanceFilter, TableQuery};

#[derive(Parser)]
#[command(name = "discharge-insights")]
#[command(about = "Physician discharge timing analytics", long_about = None)]
struct Cli {
    /// Read physicians from a CSV file (`physician,h0..h23`) instead of Postgres
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load the demonstration roster
    Seed,
    /// Import physicians from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Print hospital metrics and a ranked physician table
    Summary {
        #[arg(long, value_enum, default_value_t = MetricKey::MorningRate)]
        sort: MetricKey,
        #[arg(long, value_enum, default_value_t = PerformanceFilter::All)]
        filter: PerformanceFilter,
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value_t = 15)]
        limit: usize,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Generate a markdown report
    Report {
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Export per-physician statistics as CSV
    Export {
        #[arg(long, default_value = export::DEFAULT_EXPORT_NAME)]
        out: PathBuf,
    },
    /// Print a 24-hour intensity heatmap
    Heatmap {
        /// Emit cells with their colors as JSON
        #[arg(long)]
        json: bool,
    },
    /// Ask a question about the discharge data
    Ask {
        #[arg(long)]
        question: String,
    },
}

struct Snapshot {
    source: String,
    physicians: Vec<PhysicianStats>,
    metrics: HospitalMetrics,
}

impl Snapshot {
    fn from_records(source: String, records: &[HourlyDischargeRecord]) -> Self {
        let physicians = metrics::process_physicians(records);
        Self {
            source,
            metrics: metrics::calculate_overall_metrics(&physicians),
            physicians,
        }
    }
}

async fn load_snapshot(csv_path: Option<&PathBuf>) -> anyhow::Result<Snapshot> {
    match csv_path {
        Some(path) => {
            let records = dataset::load_csv(path)?;
            Ok(Snapshot::from_records(path.display().to_string(), &records))
        }
        None => {
            let pool = db::connect(5).await?;
            let records = db::fetch_records(&pool).await?;
            Ok(Snapshot::from_records("postgres".to_string(), &records))
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::InitDb => {
            let pool = db::connect(1).await?;
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            let pool = db::connect(1).await?;
            let inserted = db::seed(&pool).await?;
            println!("Seeded {inserted} physicians.");
        }
        Commands::Import { csv } => {
            let pool = db::connect(5).await?;
            let inserted = db::import_csv(&pool, &csv).await?;
            println!("Inserted {inserted} physicians from {}.", csv.display());
        }
        Commands::Summary {
            sort,
            filter,
            search,
            limit,
            json,
        } => {
            let snapshot = load_snapshot(cli.dataset.as_ref()).await?;
            let query = TableQuery {
                search,
                filter,
                sort: Some(sort),
            };
            let selected = ranking::select(&snapshot.physicians, &query);

            if json {
                let body = serde_json::json!({
                    "sort": {
                        "key": sort,
                        "label": sort.label(),
                        "domain": sort.domain(),
                    },
                    "metrics": snapshot.metrics,
                    "physicians": selected.iter().take(limit).collect::<Vec<_>>(),
                });
                println!("{}", serde_json::to_string_pretty(&body)?);
                return Ok(());
            }

            print_summary(&snapshot, &selected, sort, limit);
        }
        Commands::Report { out } => {
            let snapshot = load_snapshot(cli.dataset.as_ref()).await?;
            let report = report::build_report(
                &snapshot.source,
                chrono::Utc::now(),
                &snapshot.physicians,
                &snapshot.metrics,
            );
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Export { out } => {
            let snapshot = load_snapshot(cli.dataset.as_ref()).await?;
            let file = std::fs::File::create(&out)
                .with_context(|| format!("failed to create {}", out.display()))?;
            export::write_csv(&snapshot.physicians, file)?;
            info!(path = %out.display(), rows = snapshot.physicians.len(), "exported CSV");
            println!("Exported {} physicians to {}.", snapshot.physicians.len(), out.display());
        }
        Commands::Heatmap { json } => {
            let snapshot = load_snapshot(cli.dataset.as_ref()).await?;
            let rows = heatmap::build_heatmap(&snapshot.physicians);
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                print!("{}", heatmap::render_heatmap(&rows));
            }
        }
        Commands::Ask { question } => {
            let snapshot = load_snapshot(cli.dataset.as_ref()).await?;
            let digest = context::build_context(&snapshot.physicians, &snapshot.metrics);
            // No hosted generator is wired in; answers come from templates.
            let reply =
                chat::answer(None, &digest, &snapshot.metrics.hourly_totals, &question).await;
            info!(source = ?reply.source, "answered question");
            println!("{}", reply.text);
        }
    }

    Ok(())
}

fn print_summary(snapshot: &Snapshot, selected: &[&PhysicianStats], sort: MetricKey, limit: usize) {
    let hospital = &snapshot.metrics;
    println!(
        "{} physicians, {} discharges ({} source)",
        snapshot.physicians.len(),
        context::group_thousands(hospital.total_discharges),
        snapshot.source
    );
    println!(
        "Before noon {:.1}% | avg time {} | peak hour {}:00",
        hospital.percent_before_noon,
        metrics::format_hour(hospital.avg_discharge_time),
        hospital.peak_hour
    );

    if selected.is_empty() {
        println!("No physicians match this query.");
        return;
    }

    let mean_rate = metrics::mean_morning_rate(&snapshot.physicians);
    println!("Ranked by {}:", sort.label());
    for (rank, phy) in selected.iter().take(limit).enumerate() {
        println!(
            "{:>3}. {} - {:.1}% morning, {} discharges, avg {}, peak {}:00 [{}]",
            rank + 1,
            phy.name,
            phy.percent_before_noon,
            phy.total,
            metrics::format_hour(phy.average_discharge_time),
            phy.peak_hour,
            ranking::Indicator::relative_to(phy.percent_before_noon, mean_rate).label()
        );
    }
}
