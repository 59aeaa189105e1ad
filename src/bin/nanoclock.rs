use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use log::{error, info, warn, LevelFilter};

use nanosched::{Context, Instant, ScheduleFile};

#[derive(Parser, Debug)]
#[command(version, about = "Host-driven nanosecond-precision schedule runner", long_about = None)]
struct Args {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace); default is warn.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Debug, Subcommand)]
enum Cmd {
    /// Load a schedule file and fire jobs as their instants come due.
    Run {
        /// Path to a YAML schedule file.
        config: PathBuf,
    },
    /// Check a schedule file for empty/duplicate names and unparsable schedules.
    Validate {
        /// Path to a YAML schedule file.
        config: PathBuf,
    },
    /// Print the next N instants a single schedule string matches.
    Next {
        /// A 7-field schedule string, quoted as one argument.
        schedule: String,
        /// How many upcoming instants to print.
        #[arg(short, long, default_value_t = 5)]
        count: usize,
    },
}

fn main() {
    let args = Args::parse();

    let level = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp_secs()
        .init();

    let result = match args.cmd {
        Cmd::Run { config } => cmd_run(&config),
        Cmd::Validate { config } => cmd_validate(&config),
        Cmd::Next { schedule, count } => cmd_next(&schedule, count),
    };

    if let Err(err) = result {
        error!("{}", err);
        std::process::exit(1);
    }
}

fn cmd_validate(path: &PathBuf) -> anyhow::Result<()> {
    let file = ScheduleFile::read(path)?;
    let issues = nanosched::validate_config(&file);

    let mut had_error = false;
    for issue in &issues {
        match issue {
            nanosched::ValidationIssue::Error(msg) => {
                had_error = true;
                error!("{}", msg);
            }
            nanosched::ValidationIssue::Warning(msg) => warn!("{}", msg),
        }
    }

    if issues.is_empty() {
        info!("config file is valid ({} job(s))", file.jobs.len());
    }

    if had_error {
        anyhow::bail!("config file has validation errors");
    }
    Ok(())
}

fn cmd_next(schedule: &str, count: usize) -> anyhow::Result<()> {
    let mut ctx = Context::new();
    ctx.add(schedule, |_, _| {})
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    let mut cursor = Instant::now();
    for _ in 0..count {
        match ctx.next_after(cursor) {
            Some(next) => {
                println!("{}.{:09}", next.secs, next.nanos);
                cursor = next;
            }
            None => {
                warn!("no further match within the search horizon");
                break;
            }
        }
    }
    Ok(())
}

fn cmd_run(path: &PathBuf) -> anyhow::Result<()> {
    let file = ScheduleFile::read(path)?;
    let issues = nanosched::validate_config(&file);
    if issues.iter().any(|i| i.is_error()) {
        for issue in &issues {
            error!("{}", issue);
        }
        anyhow::bail!("refusing to run: config file has validation errors");
    }

    let mut ctx = Context::new();
    for job in &file.jobs {
        let name = job.name.clone();
        ctx.add(&job.schedule, move |_, now| {
            info!("job '{}' fired at {}.{:09}", name, now.secs, now.nanos);
        })
        .map_err(|e| anyhow::anyhow!("job '{}': {}", job.name, e))?;
    }
    info!(
        "loaded {} job(s) from {}",
        file.jobs.len(),
        path.to_string_lossy()
    );

    let shutdown = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGINT, shutdown.clone())?;

    let mut last = Instant::now();
    while !shutdown.load(Ordering::Relaxed) {
        std::thread::sleep(Duration::from_millis(200));
        let now = Instant::now();
        let _ = ctx.execute_between(last, now);
        last = now;
    }

    info!("shutting down");
    Ok(())
}
