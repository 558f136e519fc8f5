//! Workforce Attendance - attendance dashboard and report exports from the command line.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, bail};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use workforce_attendance as app;

use app::client::ApiClient;
use app::config::{AppConfig, ConfigLoadResult, LoggingConfig};
use app::dashboard::{Dashboard, ToastLevel};
use app::dates::{DateRange, parse_flexible_date};
use app::export::ExportFormat;
use app::report::{ReportOptions, ReportType};
use app::theme::Theme;

/// Attendance dashboard and report exports.
#[derive(Parser)]
#[command(name = "workforce-attendance", version)]
struct Cli {
    /// Use config.toml from current directory (dev mode)
    #[arg(long, global = true)]
    dev: bool,

    /// Path to config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show today's counters and the trend for a range
    Dashboard {
        #[command(flatten)]
        range: RangeArgs,
    },
    /// Export a report
    Report {
        #[arg(long = "type", value_enum, default_value_t = ReportKind::Basic)]
        report_type: ReportKind,

        #[command(flatten)]
        range: RangeArgs,

        /// Restrict the report to one user id
        #[arg(long)]
        user: Option<String>,

        #[arg(long, value_enum, default_value_t = FormatArg::Csv)]
        format: FormatArg,

        /// Output directory (defaults to export.output_dir)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(clap::Args)]
struct RangeArgs {
    /// First day (YYYY-MM-DD, YYYY/M/D, ...)
    #[arg(long)]
    from: Option<String>,

    /// Last day, inclusive (defaults to today)
    #[arg(long)]
    to: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ReportKind {
    Basic,
    Log,
    Monthly,
}

impl From<ReportKind> for ReportType {
    fn from(kind: ReportKind) -> Self {
        match kind {
            ReportKind::Basic => ReportType::Basic,
            ReportKind::Log => ReportType::Log,
            ReportKind::Monthly => ReportType::Monthly,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Csv,
    Xlsx,
}

impl From<FormatArg> for ExportFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Csv => ExportFormat::Csv,
            FormatArg::Xlsx => ExportFormat::Xlsx,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Determine config path based on mode
    let config_path = match (&cli.config, cli.dev) {
        (Some(path), _) => path.clone(),
        (None, true) => PathBuf::from("config.toml"),
        (None, false) => AppConfig::default_path(),
    };

    let config = match AppConfig::try_load(&config_path) {
        ConfigLoadResult::Loaded(config) => config,
        ConfigLoadResult::Missing => {
            AppConfig::default()
                .save(&config_path)
                .with_context(|| format!("Failed to write default config to {}", config_path.display()))?;
            bail!(
                "No config found. A default one was written to {}; set api.base_url and run again.",
                config_path.display()
            );
        }
        ConfigLoadResult::Invalid(e) => bail!("Config {} is invalid: {e}", config_path.display()),
    };

    let _log_guard = init_logging(&config.logging)?;
    tracing::info!("Workforce Attendance starting...");
    tracing::info!("Config path: {:?}", config_path);

    let today = Local::now().date_naive();
    match cli.command {
        Command::Dashboard { range } => {
            let range = resolve_range(&range, today, config.report.default_range_days)?;
            run_dashboard(&config, range, today).await
        }
        Command::Report {
            report_type,
            range,
            user,
            format,
            output,
        } => {
            let range = resolve_range(&range, today, config.report.default_range_days)?;
            let dir = output.unwrap_or_else(|| config.output_dir());
            run_report(&config, range, today, report_type.into(), user, format.into(), &dir).await
        }
    }
}

/// Install the stderr subscriber, plus a daily-rolling file layer when enabled.
fn init_logging(logging: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());
    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    let Some(dir) = logging.log_dir() else {
        registry.init();
        return Ok(None);
    };

    std::fs::create_dir_all(&dir).with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    let appender = tracing_appender::rolling::daily(&dir, "attendance.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    registry
        .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(writer))
        .init();
    Ok(Some(guard))
}

fn parse_date_arg(value: &str) -> anyhow::Result<NaiveDate> {
    parse_flexible_date(value).with_context(|| format!("Unrecognized date '{value}'"))
}

/// Range from `--from`/`--to`, defaulting to the configured number of days ending today.
fn resolve_range(args: &RangeArgs, today: NaiveDate, default_days: u32) -> anyhow::Result<DateRange> {
    let end = args.to.as_deref().map(parse_date_arg).transpose()?.unwrap_or(today);
    match args.from.as_deref() {
        Some(from) => Ok(DateRange::new(parse_date_arg(from)?, end)?),
        None => Ok(DateRange::last_days(end, default_days)),
    }
}

async fn open_dashboard(config: &AppConfig, range: DateRange, today: NaiveDate) -> anyhow::Result<Dashboard<ApiClient>> {
    let client = ApiClient::new(&config.api).context("Failed to create API client")?;
    match client.test_connection().await {
        Ok(true) => tracing::info!("Connected to {}", config.api.base_url),
        Ok(false) => tracing::warn!("API at {} answered with an error status", config.api.base_url),
        Err(e) => tracing::warn!("API at {} unreachable: {e}", config.api.base_url),
    }
    let options = ReportOptions::from_config(&config.report, &config.holidays);
    let theme = Theme::from_config(&config.theme)?;

    Ok(Dashboard::new(
        tokio::runtime::Handle::current(),
        Arc::new(client),
        options,
        theme,
        config.report.geocode_batch_size,
        range,
        today,
    ))
}

async fn run_dashboard(config: &AppConfig, range: DateRange, today: NaiveDate) -> anyhow::Result<()> {
    let mut dashboard = open_dashboard(config, range, today).await?;
    dashboard.request_range(range, today);
    dashboard.settle().await;

    let stats = dashboard.today_stats();
    if !dashboard.theme().company_name.is_empty() {
        println!("{}", dashboard.theme().company_name);
    }
    println!("Today ({today})");
    println!("  Employees: {}", stats.total_employees);
    println!("  Present:   {}", stats.present);
    println!("  Absent:    {}", stats.absent);
    println!("  On leave:  {}", stats.on_leave);
    println!();

    let trend = dashboard.trend();
    println!("{:<8} {:>8} {:>8} {:>8} {:>9}", "Day", "Present", "Absent", "Leave", "Avg hrs");
    for i in 0..trend.len() {
        println!(
            "{:<8} {:>8} {:>8} {:>8} {:>9.1}",
            trend.labels[i], trend.present[i], trend.absent[i], trend.on_leave[i], trend.avg_hours[i]
        );
    }
    Ok(())
}

async fn run_report(
    config: &AppConfig,
    range: DateRange,
    today: NaiveDate,
    report_type: ReportType,
    user: Option<String>,
    format: ExportFormat,
    dir: &Path,
) -> anyhow::Result<()> {
    let mut dashboard = open_dashboard(config, range, today).await?;
    dashboard.request_range(range, today);
    dashboard.settle().await;

    if let Some(id) = &user
        && !dashboard.data().users.iter().any(|u| &u.id == id)
    {
        tracing::warn!("User {id} not found, report will be empty");
    }
    dashboard.select_user(user);
    dashboard.select_report(report_type);
    // Log reports wait for address lookups
    dashboard.settle().await;

    let path = dashboard.export(format, dir);
    for toast in dashboard.toasts() {
        match toast.level {
            ToastLevel::Success => println!("{}", toast.message),
            ToastLevel::Error => eprintln!("{}", toast.message),
        }
    }
    if path.is_none() {
        bail!("{} export failed", report_type.name());
    }
    Ok(())
}
