use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::application::{
    DashboardConfig, DashboardReport, DashboardService, DEFAULT_CACHE_TTL_SECS,
    DEFAULT_FETCH_TIMEOUT_SECS,
};
use crate::domain::{format_cents, format_units, parse_month, EmptyPeriodPolicy, Period};
use crate::io::{
    export_cashflow_csv, export_categories_csv, export_report_json, export_summary_csv,
    export_transactions_csv, to_csv_export_url,
};

const NO_DATA_MESSAGE: &str = "No data found in source.";

/// Tallyboard - finance dashboard for a spreadsheet ledger
#[derive(Parser)]
#[command(name = "tallyboard")]
#[command(about = "Summaries, category breakdowns and cashflow for a spreadsheet ledger")]
#[command(version)]
pub struct Cli {
    /// Sheet source: a spreadsheet sharing link, a CSV URL or a CSV file path
    #[arg(short, long, env = "TALLYBOARD_SOURCE", global = true)]
    pub source: Option<String>,

    /// Seconds a fetched sheet is reused before fetching again
    #[arg(long, env = "TALLYBOARD_CACHE_TTL", default_value_t = DEFAULT_CACHE_TTL_SECS, global = true)]
    pub cache_ttl: u64,

    /// HTTP timeout in seconds
    #[arg(long, default_value_t = DEFAULT_FETCH_TIMEOUT_SECS, global = true)]
    pub timeout: u64,

    /// For months without transactions, count everything up to the end of
    /// the month instead of reporting only the initial investment
    #[arg(long, global = true)]
    pub carry_forward: bool,

    /// Log level: error, warn, info, debug, trace
    #[arg(long, env = "TALLYBOARD_LOG", default_value = "warn", global = true)]
    pub log_level: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the years and months present in the ledger
    Periods,

    /// Headline figures for a month
    Summary(ReportArgs),

    /// Income and expense breakdown by category
    Categories(ReportArgs),

    /// Cumulative cashflow within a month
    Cashflow(ReportArgs),

    /// The month's transactions
    Transactions(ReportArgs),

    /// Everything for a month in one view
    Dashboard(ReportArgs),

    /// Export a month to CSV (transactions) or JSON (full report)
    Export {
        #[command(flatten)]
        period: PeriodArgs,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,

        /// Format: csv, json
        #[arg(short, long, default_value = "csv")]
        format: String,
    },

    /// Print the CSV export link for a spreadsheet sharing link
    ResolveUrl {
        /// Spreadsheet link
        url: String,
    },
}

#[derive(Args, Clone)]
pub struct PeriodArgs {
    /// Year (defaults to the most recent year in the ledger)
    #[arg(short, long)]
    pub year: Option<i32>,

    /// Month name or number (defaults to the first month of the year)
    #[arg(short, long)]
    pub month: Option<String>,
}

#[derive(Args, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub period: PeriodArgs,

    /// Output format: table, json, csv
    #[arg(long, default_value = "table")]
    pub format: String,
}

impl Cli {
    fn config(&self) -> DashboardConfig {
        let policy = if self.carry_forward {
            EmptyPeriodPolicy::MonthEnd
        } else {
            EmptyPeriodPolicy::Zero
        };
        DashboardConfig::default()
            .with_cache_ttl(Duration::from_secs(self.cache_ttl))
            .with_fetch_timeout(Duration::from_secs(self.timeout))
            .with_empty_period_policy(policy)
    }

    fn service(&self) -> Result<DashboardService> {
        let source = self
            .source
            .as_deref()
            .context("No source given. Pass --source or set TALLYBOARD_SOURCE")?;
        DashboardService::connect(source, self.config())
            .with_context(|| format!("Invalid source '{}'", source))
    }

    pub async fn run(self) -> Result<()> {
        init_logging(&self.log_level, self.verbose);

        let stdout = std::io::stdout();
        let mut out = stdout.lock();

        match &self.command {
            Commands::ResolveUrl { url } => match to_csv_export_url(url) {
                Some(export) => writeln!(out, "{}", export)?,
                None => anyhow::bail!(
                    "Cannot derive a CSV export link from '{}'. Paste the sheet's sharing (edit) link.",
                    url
                ),
            },

            Commands::Periods => {
                let service = self.service()?;
                run_periods_command(&service, &mut out).await?;
            }

            Commands::Export {
                period,
                output,
                format,
            } => {
                let service = self.service()?;
                run_export_command(&service, period, output.as_deref(), format).await?;
            }

            Commands::Summary(args) => {
                let service = self.service()?;
                run_report_command(&service, ReportView::Summary, args, &mut out).await?;
            }
            Commands::Categories(args) => {
                let service = self.service()?;
                run_report_command(&service, ReportView::Categories, args, &mut out).await?;
            }
            Commands::Cashflow(args) => {
                let service = self.service()?;
                run_report_command(&service, ReportView::Cashflow, args, &mut out).await?;
            }
            Commands::Transactions(args) => {
                let service = self.service()?;
                run_report_command(&service, ReportView::Transactions, args, &mut out).await?;
            }
            Commands::Dashboard(args) => {
                let service = self.service()?;
                run_report_command(&service, ReportView::Dashboard, args, &mut out).await?;
            }
        }

        out.flush()?;
        Ok(())
    }
}

/// Which part of the period report a command renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReportView {
    Summary,
    Categories,
    Cashflow,
    Transactions,
    Dashboard,
}

/// Install the global tracing subscriber. Logs go to stderr so that JSON and
/// CSV output on stdout stays clean.
fn init_logging(log_level: &str, verbose: bool) {
    let level = if verbose { "debug" } else { log_level };
    let filter =
        EnvFilter::try_new(level.to_lowercase()).unwrap_or_else(|_| EnvFilter::new("warn"));

    let layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    // A second initialization (tests, embedding) is harmless
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init();
}

/// Resolve the requested period against the ledger, filling in defaults.
/// `Ok(None)` means the ledger is empty.
async fn resolve_period(service: &DashboardService, args: &PeriodArgs) -> Result<Option<Period>> {
    let Some(default) = service.default_period().await? else {
        return Ok(None);
    };

    let year = args.year.unwrap_or(default.year);
    let month = match &args.month {
        Some(name) => parse_month(name).with_context(|| {
            format!("Invalid month '{}'. Use a name (January) or number (1-12)", name)
        })?,
        None if year == default.year => default.month,
        None => {
            let ledger = service.ledger().await?;
            *ledger
                .available_months(year)
                .first()
                .with_context(|| format!("No transactions recorded in {}", year))?
        }
    };

    Ok(Some(Period::new(year, month)))
}

async fn load_report(
    service: &DashboardService,
    args: &PeriodArgs,
) -> Result<Option<DashboardReport>> {
    let Some(period) = resolve_period(service, args).await? else {
        return Ok(None);
    };
    Ok(Some(service.report(period).await?))
}

async fn run_periods_command(service: &DashboardService, out: &mut dyn Write) -> Result<()> {
    let periods = service.periods().await?;
    if periods.is_empty() {
        writeln!(out, "{}", NO_DATA_MESSAGE)?;
        return Ok(());
    }

    writeln!(out, "{:<6} MONTHS", "YEAR")?;
    writeln!(out, "{}", "-".repeat(44))?;
    for (year, months) in periods {
        let names: Vec<&str> = months.iter().map(|m| m.name()).collect();
        writeln!(out, "{:<6} {}", year, names.join(", "))?;
    }
    Ok(())
}

async fn run_report_command(
    service: &DashboardService,
    view: ReportView,
    args: &ReportArgs,
    out: &mut dyn Write,
) -> Result<()> {
    let Some(report) = load_report(service, &args.period).await? else {
        writeln!(out, "{}", NO_DATA_MESSAGE)?;
        return Ok(());
    };

    match view {
        ReportView::Summary => print_summary(out, &report, &args.format),
        ReportView::Categories => print_categories(out, &report, &args.format),
        ReportView::Cashflow => print_cashflow(out, &report, &args.format),
        ReportView::Transactions => print_transactions(out, &report, &args.format),
        ReportView::Dashboard => print_dashboard(out, &report, &args.format),
    }
}

async fn run_export_command(
    service: &DashboardService,
    period: &PeriodArgs,
    output: Option<&str>,
    format: &str,
) -> Result<()> {
    use std::fs::File;
    use std::io::stdout;

    let Some(report) = load_report(service, period).await? else {
        anyhow::bail!("No data found in source; nothing to export");
    };

    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    match format {
        "csv" => {
            let count = export_transactions_csv(&report.transactions, writer)?;
            if output.is_some() {
                eprintln!("Exported {} transactions for {}", count, report.period);
            }
        }
        "json" => {
            export_report_json(&report, writer)?;
            if output.is_some() {
                eprintln!("Exported report for {}", report.period);
            }
        }
        _ => {
            anyhow::bail!("Invalid export format '{}'. Valid formats: csv, json", format);
        }
    }

    Ok(())
}

fn money(cents: i64, currency: &str) -> String {
    if currency.is_empty() {
        format_units(cents)
    } else {
        format!("{} {}", format_units(cents), currency)
    }
}

fn print_summary(out: &mut dyn Write, report: &DashboardReport, format: &str) -> Result<()> {
    match format {
        "json" => {
            writeln!(out, "{}", serde_json::to_string_pretty(&report.summary)?)?;
        }
        "csv" => {
            export_summary_csv(report, out)?;
        }
        _ => {
            let c = &report.currency;
            let summary = &report.summary;
            writeln!(out, "Finance Overview for {}", report.period)?;
            writeln!(out)?;
            writeln!(out, "Initial Investment:  {:>18}", money(summary.initial_investment, c))?;
            writeln!(out, "Income (till now):   {:>18}", money(summary.income_to_date, c))?;
            writeln!(out, "Expense (till now):  {:>18}", money(summary.expense_to_date, c))?;
            writeln!(out, "{}", "-".repeat(40))?;
            writeln!(out, "Current Balance:     {:>18}", money(summary.current_balance, c))?;
            writeln!(out)?;
            writeln!(out, "Monthly Summary")?;
            writeln!(out, "  Income:   {:>18}", money(report.monthly.income, c))?;
            writeln!(out, "  Expense:  {:>18}", money(report.monthly.expense, c))?;
        }
    }
    Ok(())
}

fn print_categories(out: &mut dyn Write, report: &DashboardReport, format: &str) -> Result<()> {
    match format {
        "json" => {
            let value = serde_json::json!({
                "income": report.income_categories,
                "expense": report.expense_categories,
            });
            writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
        }
        "csv" => {
            export_categories_csv(&report.income_categories, &report.expense_categories, out)?;
        }
        _ => {
            writeln!(out, "Breakdown by Category: {}", report.period)?;
            for (title, categories, empty_message) in [
                (
                    "Expenses by Category",
                    &report.expense_categories,
                    "No expenses recorded for this month.",
                ),
                (
                    "Income by Category",
                    &report.income_categories,
                    "No income recorded for this month.",
                ),
            ] {
                writeln!(out)?;
                writeln!(out, "{}", title)?;
                if categories.is_empty() {
                    writeln!(out, "  {}", empty_message)?;
                    continue;
                }
                writeln!(
                    out,
                    "  {:<20} {:>16} {:>6} {:>8}",
                    "CATEGORY", "TOTAL", "COUNT", "SHARE"
                )?;
                writeln!(out, "  {}", "-".repeat(53))?;
                for cat in categories.iter() {
                    writeln!(
                        out,
                        "  {:<20} {:>16} {:>6} {:>7.1}%",
                        truncate(&cat.category, 20),
                        money(cat.total, &report.currency),
                        cat.count,
                        cat.percentage
                    )?;
                }
            }
        }
    }
    Ok(())
}

fn print_cashflow(out: &mut dyn Write, report: &DashboardReport, format: &str) -> Result<()> {
    match format {
        "json" => {
            writeln!(out, "{}", serde_json::to_string_pretty(&report.cashflow)?)?;
        }
        "csv" => {
            export_cashflow_csv(&report.cashflow, out)?;
        }
        _ => {
            writeln!(out, "Cumulative Cashflow: {}", report.period)?;
            writeln!(out)?;
            if report.cashflow.is_empty() {
                writeln!(out, "No transactions recorded for this month.")?;
                return Ok(());
            }
            writeln!(out, "{:<12} {:>18}", "DATE", "BALANCE")?;
            writeln!(out, "{}", "-".repeat(31))?;
            for point in &report.cashflow {
                writeln!(
                    out,
                    "{:<12} {:>18}",
                    point.date.format("%Y-%m-%d"),
                    money(point.balance, &report.currency)
                )?;
            }
        }
    }
    Ok(())
}

fn print_transactions(out: &mut dyn Write, report: &DashboardReport, format: &str) -> Result<()> {
    match format {
        "json" => {
            writeln!(out, "{}", serde_json::to_string_pretty(&report.transactions)?)?;
        }
        "csv" => {
            export_transactions_csv(&report.transactions, out)?;
        }
        _ => {
            writeln!(out, "Transactions: {}", report.period)?;
            writeln!(out)?;
            if report.transactions.is_empty() {
                writeln!(out, "No transactions recorded for this month.")?;
                return Ok(());
            }
            writeln!(
                out,
                "{:<12} {:<10} {:<16} {:<24} {:>14}",
                "DATE", "TYPE", "CATEGORY", "DESCRIPTION", "AMOUNT"
            )?;
            writeln!(out, "{}", "-".repeat(80))?;
            for row in &report.transactions {
                let amount = match row.amount {
                    Some(cents) => format_cents(cents),
                    None => row.raw_amount.clone(),
                };
                writeln!(
                    out,
                    "{:<12} {:<10} {:<16} {:<24} {:>14}",
                    row.date.format("%Y-%m-%d"),
                    truncate(&row.kind, 10),
                    truncate(&row.category, 16),
                    truncate(&row.description, 24),
                    amount
                )?;
            }
        }
    }
    Ok(())
}

fn print_dashboard(out: &mut dyn Write, report: &DashboardReport, format: &str) -> Result<()> {
    if format == "json" {
        writeln!(out, "{}", serde_json::to_string_pretty(report)?)?;
        return Ok(());
    }
    if format == "csv" {
        anyhow::bail!("The dashboard view has no CSV form. Use json, or a single view with csv");
    }

    print_summary(out, report, format)?;
    writeln!(out)?;
    print_cashflow(out, report, format)?;
    writeln!(out)?;
    print_categories(out, report, format)?;
    writeln!(out)?;
    print_transactions(out, report, format)
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
