//! Off-peak planner entry point: CLI wiring and config-driven planning.

use std::path::PathBuf;
use std::process;

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use offpeak_planner::appliance;
use offpeak_planner::config::PlannerConfig;
use offpeak_planner::error::PlannerError;
use offpeak_planner::io::export::{export_plan_csv, export_timeline_csv};
use offpeak_planner::notification::{
    InMemoryScheduler, NotificationScheduler, start_reminder, transition_reminder,
};
use offpeak_planner::schedule::clock::{Clock, FixedClock, SystemClock, Ticker};
use offpeak_planner::schedule::timeline::{status_timeline, transitions};
use offpeak_planner::schedule::{
    Calendar, OperationPlanner, Period, expand, select_optimum, status_at, upcoming,
};
use offpeak_planner::store::{ConfigStore, TomlFileStore};

/// Plan appliance runs around recurring off-peak electricity windows.
#[derive(Debug, Parser)]
#[command(name = "offpeak-planner", version)]
struct Cli {
    /// Load configuration from a TOML file
    #[arg(long, conflicts_with = "preset")]
    config: Option<PathBuf>,
    /// Use a built-in preset (baseline, split)
    #[arg(long)]
    preset: Option<String>,
    /// Evaluate at this RFC 3339 instant instead of the current time
    #[arg(long)]
    at: Option<String>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show the current peak/off-peak status (default)
    Status,
    /// List off-peak windows that have not ended yet
    Windows,
    /// Rank the delays of an appliance program and recommend one
    Plan {
        appliance: String,
        program: String,
        /// Export the candidate runs to CSV
        #[arg(long)]
        csv_out: Option<PathBuf>,
        /// Schedule a start reminder when waiting is recommended
        #[arg(long)]
        notify: bool,
    },
    /// Show the status at every step of the configured timeline
    Timeline {
        /// Export the timeline to CSV
        #[arg(long)]
        csv_out: Option<PathBuf>,
    },
    /// Write the selected configuration to a TOML file
    Init { path: PathBuf },
    /// Start the REST API server
    #[cfg(feature = "api")]
    Serve {
        #[arg(long, default_value_t = 3000)]
        port: u16,
    },
}

/// Resolved inputs shared by all commands.
struct Session {
    config: PlannerConfig,
    calendar: Calendar,
    periods: Vec<Period>,
    now: DateTime<Utc>,
}

fn load_config(cli: &Cli) -> anyhow::Result<PlannerConfig> {
    // --config takes priority, then --preset, then baseline default
    if let Some(path) = &cli.config {
        return Ok(TomlFileStore::new(path).load()?);
    }
    match &cli.preset {
        Some(name) => Ok(PlannerConfig::from_preset(name)?),
        None => Ok(PlannerConfig::baseline()),
    }
}

fn clock(cli: &Cli) -> anyhow::Result<Box<dyn Clock + Send + Sync>> {
    match &cli.at {
        Some(at) => {
            let instant = DateTime::parse_from_rfc3339(at)
                .with_context(|| format!("--at \"{at}\" is not an RFC 3339 instant"))?;
            Ok(Box::new(FixedClock(instant.with_timezone(&Utc))))
        }
        None => Ok(Box::new(SystemClock)),
    }
}

fn print_status(ctx: &Session) {
    let status = status_at(&ctx.periods, ctx.now, &ctx.calendar);
    println!("{}: {status}", ctx.now.with_timezone(&ctx.calendar.time_zone()));
    if let Some(reminder) = transition_reminder(&status) {
        println!("next change: {}", reminder.title.to_lowercase());
    }
}

fn print_windows(ctx: &Session) {
    let mut windows = upcoming(&expand(&ctx.periods, ctx.now, &ctx.calendar), ctx.now);
    windows.sort_by_key(|w| w.start());
    let tz = ctx.calendar.time_zone();
    for w in &windows {
        println!(
            "{} | {} -> {}",
            w.period(),
            w.start().with_timezone(&tz).format("%a %Y-%m-%d %H:%M"),
            w.end().with_timezone(&tz).format("%a %Y-%m-%d %H:%M"),
        );
    }
}

fn run_plan(
    ctx: &Session,
    appliance_name: &str,
    program_name: &str,
    csv_out: Option<&PathBuf>,
    notify: bool,
) -> anyhow::Result<()> {
    let appliance = appliance::find(&ctx.config.appliances, appliance_name)?;
    let program = appliance
        .program(program_name)
        .ok_or_else(|| PlannerError::UnknownProgram {
            appliance: appliance.name.clone(),
            program: program_name.to_string(),
        })?;

    let planner = OperationPlanner::new(&ctx.periods, &ctx.calendar, program.duration())?;
    let operations = planner.plan(&appliance.delays, ctx.now)?;

    for op in &operations {
        println!("{op}");
    }

    match select_optimum(&operations, ctx.now, &planner)? {
        Some(optimum) => {
            println!("\n{} / {}: {optimum}", appliance.name, program.name);
            if notify {
                let mut scheduler = InMemoryScheduler::new();
                if let Some(reminder) = start_reminder(appliance, program, &optimum) {
                    scheduler.schedule(reminder)?;
                }
                for pending in scheduler.pending() {
                    println!("reminder \"{}\": {}", pending.title, pending.body);
                }
            }
        }
        None => println!("\n{} has no delay options", appliance.name),
    }

    if let Some(path) = csv_out {
        export_plan_csv(&operations, path)
            .with_context(|| format!("failed to write CSV \"{}\"", path.display()))?;
        info!(path = %path.display(), "candidate plan written");
    }
    Ok(())
}

fn run_timeline(ctx: &Session, csv_out: Option<&PathBuf>) -> anyhow::Result<()> {
    let step = Duration::minutes(i64::from(ctx.config.planner.timeline_step_minutes));
    let ticker = Ticker::new(ctx.now, step, ctx.config.planner.timeline_steps);
    let entries = status_timeline(&ctx.periods, &ctx.calendar, ticker);

    let tz = ctx.calendar.time_zone();
    for entry in &entries {
        println!("{} | {}", entry.at.with_timezone(&tz).format("%a %H:%M"), entry.status);
    }
    println!("\n{} status changes", transitions(&entries).len());

    if let Some(path) = csv_out {
        export_timeline_csv(&entries, path)
            .with_context(|| format!("failed to write CSV \"{}\"", path.display()))?;
        info!(path = %path.display(), "timeline written");
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let mut cli = Cli::parse();
    let config = load_config(&cli)?;

    // Validate
    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let command = cli.command.take().unwrap_or(Command::Status);
    if let Command::Init { path } = &command {
        TomlFileStore::new(path).save(&config)?;
        return Ok(());
    }

    let calendar = config.calendar()?;
    let periods = config.periods(&mut config.id_generator())?;
    let clock = clock(&cli)?;
    let ctx = Session {
        now: clock.now(),
        config,
        calendar,
        periods,
    };

    match &command {
        Command::Status => print_status(&ctx),
        Command::Windows => print_windows(&ctx),
        Command::Plan {
            appliance,
            program,
            csv_out,
            notify,
        } => run_plan(&ctx, appliance, program, csv_out.as_ref(), *notify)?,
        Command::Timeline { csv_out } => run_timeline(&ctx, csv_out.as_ref())?,
        Command::Init { .. } => {}
        #[cfg(feature = "api")]
        Command::Serve { port } => {
            use std::net::SocketAddr;
            use std::sync::Arc;

            let state = offpeak_planner::api::AppState::from_config(ctx.config, Arc::from(clock))?;
            let addr = SocketAddr::from(([0, 0, 0, 0], *port));
            let rt = tokio::runtime::Runtime::new().context("failed to create tokio runtime")?;
            rt.block_on(offpeak_planner::api::serve(Arc::new(state), addr))?;
        }
    }
    Ok(())
}
