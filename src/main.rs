use std::path::PathBuf;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

mod axes;
mod breakdown;
mod buckets;
mod chart;
mod config;
mod db;
mod models;
mod percentage;
mod report;
mod verdict;

use axes::MoodKind;
use buckets::{resolve_buckets, summary_window, DownloadRange, ReportGranularity};
use config::Config;
use models::{MoodReport, ReportSubject, UserRecord};

#[derive(Parser)]
#[command(name = "mood-analytics")]
#[command(about = "Mood check-in analytics and reports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Markdown,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data
    Seed,
    /// Import check-ins from a CSV file
    Import {
        #[arg(long, value_enum)]
        kind: MoodKind,
        #[arg(long)]
        csv: PathBuf,
    },
    /// Soft-delete a single check-in
    Delete {
        #[arg(long, value_enum)]
        kind: MoodKind,
        #[arg(long)]
        id: Uuid,
    },
    /// Paired percentage breakdown and verdict for one period
    Summary {
        #[arg(long)]
        email: String,
        #[arg(long, value_enum, default_value_t = MoodKind::Personal)]
        kind: MoodKind,
        #[arg(long, value_enum, default_value_t = ReportGranularity::Weekly)]
        granularity: ReportGranularity,
        /// Report date, defaults to today (UTC)
        #[arg(long)]
        anchor: Option<NaiveDate>,
        /// Explicit first day, overrides the granularity window
        #[arg(long, requires = "to")]
        from: Option<NaiveDate>,
        /// Explicit last day (inclusive)
        #[arg(long, requires = "from")]
        to: Option<NaiveDate>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Markdown)]
        format: OutputFormat,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Gap-free trend series over the configured lookback
    Trend {
        #[arg(long)]
        email: String,
        #[arg(long, value_enum, default_value_t = MoodKind::Personal)]
        kind: MoodKind,
        #[arg(long, value_enum, default_value_t = ReportGranularity::Weekly)]
        granularity: ReportGranularity,
        #[arg(long)]
        anchor: Option<NaiveDate>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Markdown)]
        format: OutputFormat,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Render the downloadable summary for the last 30 or 60 days
    Download {
        #[arg(long)]
        email: String,
        #[arg(long, value_enum, default_value_t = MoodKind::Personal)]
        kind: MoodKind,
        #[arg(long, value_enum, default_value_t = DownloadRange::Last30Days)]
        range: DownloadRange,
        #[arg(long)]
        anchor: Option<NaiveDate>,
        #[arg(long, default_value = "mood-summary.md")]
        out: PathBuf,
    },
}

fn init_tracing() {
    let filter = std::env::var("MOOD_ANALYTICS_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(&filter)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = Config::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .context("failed to connect to Postgres")?;

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            let inserted = db::seed(&pool).await?;
            println!("Seed data inserted ({inserted} new check-ins).");
        }
        Commands::Import { kind, csv } => {
            let inserted = db::import_csv(&pool, kind, &csv).await?;
            println!("Inserted {inserted} check-ins from {}.", csv.display());
        }
        Commands::Delete { kind, id } => {
            if db::soft_delete(&pool, kind, id).await? {
                println!("Check-in {id} deleted.");
            } else {
                println!("No active {} check-in with id {id}.", kind.label());
            }
        }
        Commands::Summary {
            email,
            kind,
            granularity,
            anchor,
            from,
            to,
            format,
            out,
        } => {
            let user = require_user(&pool, &email).await?;
            let window = summary_window(
                granularity,
                anchor_or_today(anchor),
                from.zip(to),
                &config.lookback,
            );
            info!(%email, ?granularity, start = %window.start, end = %window.end, "building summary");

            let average = db::fetch_average_mood(&pool, kind, user.id, window).await?;
            if average.sample_count == 0 {
                println!("No mood data found for this window.");
                return Ok(());
            }

            let report = report::build_summary(subject(&user), kind, granularity, window, average);
            emit(&report, format, out.as_deref())?;
        }
        Commands::Trend {
            email,
            kind,
            granularity,
            anchor,
            format,
            out,
        } => {
            let user = require_user(&pool, &email).await?;
            let plan = resolve_buckets(granularity, anchor_or_today(anchor), &config.lookback);
            info!(%email, ?granularity, buckets = plan.buckets.len(), "building trend");

            let average = db::fetch_average_mood(&pool, kind, user.id, plan.window).await?;
            if average.sample_count == 0 {
                println!("No mood data found for this window.");
                return Ok(());
            }
            let sparse =
                db::fetch_bucket_aggregates(&pool, kind, user.id, granularity, plan.window).await?;

            let report =
                report::build_trend(subject(&user), kind, granularity, &plan, average, &sparse);
            emit(&report, format, out.as_deref())?;
        }
        Commands::Download {
            email,
            kind,
            range,
            anchor,
            out,
        } => {
            let user = require_user(&pool, &email).await?;
            let window = range.window(anchor_or_today(anchor));
            let average = db::fetch_average_mood(&pool, kind, user.id, window).await?;
            if average.sample_count == 0 {
                println!("No mood data found for this window.");
                return Ok(());
            }

            let document =
                report::build_download(&config, &user.display_name, kind, window, &average);
            std::fs::write(&out, report::render_download(&document))
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Download written to {}.", out.display());
        }
    }

    Ok(())
}

async fn require_user(pool: &PgPool, email: &str) -> anyhow::Result<UserRecord> {
    db::find_user(pool, email)
        .await?
        .with_context(|| format!("no user with email {email}"))
}

fn anchor_or_today(anchor: Option<NaiveDate>) -> NaiveDate {
    anchor.unwrap_or_else(|| Utc::now().date_naive())
}

fn subject(user: &UserRecord) -> ReportSubject {
    ReportSubject {
        display_name: user.display_name.clone(),
        email: user.email.clone(),
    }
}

fn emit(
    report: &MoodReport,
    format: OutputFormat,
    out: Option<&std::path::Path>,
) -> anyhow::Result<()> {
    let rendered = match format {
        OutputFormat::Markdown => report::render_markdown(report),
        OutputFormat::Json => serde_json::to_string_pretty(report)?,
    };

    match out {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Report written to {}.", path.display());
        }
        None => println!("{rendered}"),
    }
    Ok(())
}
