//! Caixa CLI
//!
//! Plans installments, applies payments, and prints period reports over a
//! JSON ledger snapshot. Results go to stdout as JSON; logs go to stderr.

mod input;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use caixa_core::installment::{
    EntryDatePolicy, EntryRequest, InstallmentPlanRequest, InstallmentPlanner, RolloverPolicy,
    next_billing_date,
};
use caixa_core::ledger::{DerivedStatus, LedgerKind, LedgerStateMachine, Transition};
use caixa_core::reports::{
    BucketDate, DateRange, DrePolicy, GroupKey, PeriodAggregator, PeriodPreset,
};
use caixa_core::{InstallmentError, LedgerEntry, LedgerError, ReportError};
use caixa_shared::config::LoggingConfig;
use caixa_shared::types::LedgerEntryId;
use caixa_shared::{AppConfig, AppError, Clock, FixedClock, SystemClock};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::input::{LedgerFile, print_json, read_json};

#[derive(Parser)]
#[command(name = "caixa")]
#[command(version, about = "Installment planning and cash reports for payables and receivables", long_about = None)]
struct Cli {
    /// Evaluate as of this date instead of the system clock (YYYY-MM-DD)
    #[arg(long, global = true)]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an installment plan from a plan request
    Plan {
        /// Plan request JSON (`-` for stdin)
        input: PathBuf,

        /// Due date rollover between installments
        #[arg(long, value_enum, default_value_t = Rollover::Fixed)]
        rollover: Rollover,

        /// How installment entry dates move (defaults by ledger kind)
        #[arg(long, value_enum)]
        entry_dates: Option<EntryDates>,
    },

    /// Build a single entry from an entry request
    Entry {
        /// Entry request JSON (`-` for stdin)
        input: PathBuf,
    },

    /// Show entries with their derived status
    Status {
        /// Ledger snapshot JSON (`-` for stdin)
        input: PathBuf,

        /// Only show one ledger
        #[arg(short, long, value_enum)]
        kind: Option<Kind>,
    },

    /// Record a payment and print the updated snapshot
    Pay {
        /// Ledger snapshot JSON (`-` for stdin)
        input: PathBuf,

        /// Entry id
        #[arg(long)]
        id: LedgerEntryId,

        /// Amount paid
        #[arg(long)]
        amount: Decimal,

        /// Payment date (defaults to today once fully paid)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Treat the amount as the new total paid instead of adding to it
        #[arg(long)]
        absolute: bool,
    },

    /// Cancel an entry and print the updated snapshot
    Cancel {
        /// Ledger snapshot JSON (`-` for stdin)
        input: PathBuf,

        /// Entry id
        #[arg(long)]
        id: LedgerEntryId,
    },

    /// Next due date of a monthly billing cycle
    BillingDate {
        /// Day of month the cycle bills on (1-31)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=31))]
        day: u32,
    },

    /// Period reports over a ledger snapshot
    Report {
        /// Ledger snapshot JSON (`-` for stdin)
        #[arg(short, long)]
        input: PathBuf,

        #[command(flatten)]
        period: PeriodArgs,

        #[command(subcommand)]
        report: ReportCommand,
    },
}

#[derive(Subcommand)]
enum ReportCommand {
    /// Per-month totals for one ledger
    Monthly {
        /// Ledger
        #[arg(short, long, value_enum)]
        kind: Kind,

        /// Date that assigns an entry to a month
        #[arg(long, value_enum, default_value_t = BucketBy::Due)]
        by: BucketBy,
    },

    /// Totals grouped by category or counterparty
    Breakdown {
        /// Ledger
        #[arg(short, long, value_enum)]
        kind: Kind,

        /// Grouping key
        #[arg(long, value_enum, default_value_t = GroupBy::Category)]
        by: GroupBy,

        /// Ignore the period and include every entry
        #[arg(long)]
        all_time: bool,
    },

    /// Income statement (DRE) of paid entries
    Dre,

    /// Day-by-day cash forecast of pending entries
    Forecast {
        /// Days ahead (configured default when omitted)
        #[arg(long)]
        days: Option<u32>,
    },

    /// Totals, balance, pending and overdue amounts
    CashFlow {
        /// Ignore the period and include every entry
        #[arg(long)]
        all_time: bool,
    },

    /// Summary of one ledger
    Summary {
        /// Ledger
        #[arg(short, long, value_enum)]
        kind: Kind,
    },

    /// Category totals of both ledgers with a monthly flow
    Categories,
}

#[derive(Args, Debug, Clone, Default)]
struct PeriodArgs {
    /// Period preset: current_month, 3_months, 6_months, 12_months, year
    #[arg(long, conflicts_with_all = ["from", "to"])]
    period: Option<PeriodPreset>,

    /// First day of a custom period (YYYY-MM-DD)
    #[arg(long, requires = "to")]
    from: Option<NaiveDate>,

    /// Last day of a custom period (YYYY-MM-DD)
    #[arg(long, requires = "from")]
    to: Option<NaiveDate>,
}

impl PeriodArgs {
    fn resolve(&self, today: NaiveDate) -> anyhow::Result<DateRange> {
        match (self.from, self.to) {
            (Some(from), Some(to)) => Ok(DateRange::new(from, to)?),
            (None, None) => Ok(self
                .period
                .unwrap_or(PeriodPreset::CurrentMonth)
                .resolve(today)),
            _ => anyhow::bail!("--from and --to must be given together"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Kind {
    Payable,
    Receivable,
}

impl From<Kind> for LedgerKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Payable => Self::Payable,
            Kind::Receivable => Self::Receivable,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Rollover {
    /// Fixed number of days (the request's interval)
    Fixed,
    /// Same day each calendar month
    Calendar,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum EntryDates {
    /// Every installment keeps the plan's entry date
    Fixed,
    /// Entry dates advance with the due dates
    Follow,
}

impl From<EntryDates> for EntryDatePolicy {
    fn from(policy: EntryDates) -> Self {
        match policy {
            EntryDates::Fixed => Self::Fixed,
            EntryDates::Follow => Self::FollowDueDate,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum BucketBy {
    Due,
    Entry,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum GroupBy {
    Category,
    Counterparty,
}

#[derive(Serialize)]
struct AnnotatedEntry<'a> {
    #[serde(flatten)]
    entry: &'a LedgerEntry,
    derived: DerivedStatus,
}

fn main() -> ExitCode {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let app_error = into_app_error(err);
            error!(code = app_error.error_code(), "{app_error}");
            match serde_json::to_string(&app_error.body()) {
                Ok(body) => eprintln!("{body}"),
                Err(_) => eprintln!("{app_error}"),
            }
            ExitCode::FAILURE
        }
    }
}

/// Maps domain errors onto the application error; anything else (bad input
/// files, malformed JSON) is a validation error.
fn into_app_error(err: anyhow::Error) -> AppError {
    let err = match err.downcast::<AppError>() {
        Ok(e) => return e,
        Err(err) => err,
    };
    let err = match err.downcast::<InstallmentError>() {
        Ok(e) => return e.into(),
        Err(err) => err,
    };
    let err = match err.downcast::<LedgerError>() {
        Ok(e) => return e.into(),
        Err(err) => err,
    };
    match err.downcast::<ReportError>() {
        Ok(e) => e.into(),
        Err(err) => AppError::Validation(format!("{err:#}")),
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.logging);

    let clock: Box<dyn Clock> = match cli.today {
        Some(date) => Box::new(FixedClock(date)),
        None => Box::new(SystemClock),
    };
    let today = clock.today();
    debug!(%today, "Evaluating");

    match cli.command {
        Commands::Plan {
            input,
            rollover,
            entry_dates,
        } => cmd_plan(&config, &read_json(&input)?, rollover, entry_dates),
        Commands::Entry { input } => cmd_entry(read_json(&input)?, today),
        Commands::Status { input, kind } => cmd_status(&read_json(&input)?, kind, today),
        Commands::Pay {
            input,
            id,
            amount,
            date,
            absolute,
        } => {
            let mut file: LedgerFile = read_json(&input)?;
            update_entry(&mut file, id, |entry| {
                if absolute {
                    LedgerStateMachine::record_payment(entry, amount, date, today)
                } else {
                    LedgerStateMachine::add_payment(entry, amount, date, today)
                }
            })?;
            print_json(&file)
        }
        Commands::Cancel { input, id } => {
            let mut file: LedgerFile = read_json(&input)?;
            update_entry(&mut file, id, |entry| LedgerStateMachine::cancel(entry, today))?;
            print_json(&file)
        }
        Commands::BillingDate { day } => {
            let due = next_billing_date(today, day)
                .with_context(|| format!("No billing date for day {day}"))?;
            print_json(&due)
        }
        Commands::Report {
            input,
            period,
            report,
        } => cmd_report(&config, &read_json(&input)?, &period, report, today),
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| logging.filter.as_str().into());
    let json = logging.json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
    });
    let text = (!logging.json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(text)
        .init();
}

fn cmd_plan(
    config: &AppConfig,
    request: &InstallmentPlanRequest,
    rollover: Rollover,
    entry_dates: Option<EntryDates>,
) -> anyhow::Result<()> {
    let planner = InstallmentPlanner::from_config(&config.planner);
    let rollover = match rollover {
        Rollover::Fixed => planner.fixed_interval_policy(request),
        Rollover::Calendar => RolloverPolicy::CalendarMonth,
    };
    let entry_dates = entry_dates.map_or_else(
        || EntryDatePolicy::default_for(request.kind),
        EntryDatePolicy::from,
    );

    let plan = planner.plan(request, rollover, entry_dates)?;
    info!(
        installments = plan.total_installments,
        total = %plan.total_amount,
        installment = %plan.installment_amount,
        last = %plan.last_installment_amount,
        "Plan generated"
    );
    print_json(&plan)
}

fn cmd_entry(request: EntryRequest, today: NaiveDate) -> anyhow::Result<()> {
    let draft = InstallmentPlanner::single_entry(request, today)?;
    print_json(&draft)
}

fn cmd_status(file: &LedgerFile, kind: Option<Kind>, today: NaiveDate) -> anyhow::Result<()> {
    let kind = kind.map(LedgerKind::from);
    let annotated: Vec<AnnotatedEntry<'_>> = file
        .entries
        .iter()
        .filter(|entry| kind.is_none_or(|k| k == entry.kind))
        .map(|entry| AnnotatedEntry {
            entry,
            derived: LedgerStateMachine::annotate(entry, today),
        })
        .collect();
    print_json(&annotated)
}

fn update_entry<F>(file: &mut LedgerFile, id: LedgerEntryId, apply: F) -> anyhow::Result<()>
where
    F: FnOnce(&mut LedgerEntry) -> Result<Transition, caixa_core::LedgerError>,
{
    let entry = file
        .entries
        .iter_mut()
        .find(|entry| entry.id == id)
        .ok_or_else(|| AppError::NotFound(format!("Ledger entry {id}")))?;

    let transition = apply(entry)?;
    if transition.overpaid {
        warn!(entry_id = %id, total = %entry.total_amount, paid = %entry.paid_amount, "Entry overpaid");
    }
    if transition.cancelled_paid {
        warn!(entry_id = %id, "Paid entry cancelled");
    }
    info!(entry_id = %id, from = %transition.from, to = %transition.to, "Entry updated");
    Ok(())
}

fn cmd_report(
    config: &AppConfig,
    file: &LedgerFile,
    period: &PeriodArgs,
    report: ReportCommand,
    today: NaiveDate,
) -> anyhow::Result<()> {
    let range = period.resolve(today)?;
    debug!(period = %range, "Report period");
    let entries = &file.entries;

    match report {
        ReportCommand::Monthly { kind, by } => {
            let kind = LedgerKind::from(kind);
            let ledger: Vec<LedgerEntry> =
                entries.iter().filter(|e| e.kind == kind).cloned().collect();
            let bucket_date = match by {
                BucketBy::Due => BucketDate::DueDate,
                BucketBy::Entry => BucketDate::EntryDate,
            };
            print_json(&PeriodAggregator::monthly_buckets(
                &ledger,
                &range,
                today,
                bucket_date,
            ))
        }
        ReportCommand::Breakdown { kind, by, all_time } => {
            let kind = LedgerKind::from(kind);
            let ledger: Vec<LedgerEntry> =
                entries.iter().filter(|e| e.kind == kind).cloned().collect();
            let (key, names) = match by {
                GroupBy::Category => (GroupKey::Category, &file.categories),
                GroupBy::Counterparty => (GroupKey::Counterparty, &file.counterparties),
            };
            let range = (!all_time).then_some(&range);
            print_json(&PeriodAggregator::breakdown(&ledger, key, names, range))
        }
        ReportCommand::Dre => {
            let policy = DrePolicy::from_config(&config.reports);
            print_json(&PeriodAggregator::dre(
                entries,
                &range,
                &file.categories,
                &policy,
            ))
        }
        ReportCommand::Forecast { days } => {
            let window = days.unwrap_or(config.reports.forecast_days);
            print_json(&PeriodAggregator::forecast(entries, today, window)?)
        }
        ReportCommand::CashFlow { all_time } => {
            let range = (!all_time).then_some(&range);
            print_json(&PeriodAggregator::cash_flow_summary(entries, range, today))
        }
        ReportCommand::Summary { kind } => {
            let kind = LedgerKind::from(kind);
            let ledger: Vec<LedgerEntry> =
                entries.iter().filter(|e| e.kind == kind).cloned().collect();
            print_json(&PeriodAggregator::ledger_summary(&ledger, today))
        }
        ReportCommand::Categories => print_json(&PeriodAggregator::categories_summary(
            entries,
            &range,
            &file.categories,
        )),
    }
}
