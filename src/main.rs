//! Ordinal Tracker - deterministic event ordering for concurrent suite runs
//!
//! Runs suite plans with nested suites on parallel tasks and prints the
//! reported events in a stable order.
//!
//! ## Usage
//!
//! ```bash
//! # Run the built-in demo plan
//! ordinal-tracker run
//!
//! # Run a plan with 8 concurrent tests and random delays, as CSV
//! ordinal-tracker run --plan suites.yaml -n 8 --jitter-ms 25 --format csv
//!
//! # Run three rounds with distinct run stamps
//! ordinal-tracker run --rounds 3 --run-stamp 100
//!
//! # Inspect ordinals
//! ordinal-tracker advance 0.4
//! ordinal-tracker fork 0.4
//! ordinal-tracker compare 0.4 0.4.0
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::cmp::Ordering;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

mod cli;

use cli::Args;
use ordinal_tracker::config::{self, AppConfig, EnvConfig};
use ordinal_tracker::executor::ParallelExecutor;
use ordinal_tracker::models::SuitePlan;
use ordinal_tracker::output::{write_log_to_file, EventFormatter, LiveReporter, OutputFormat};
use ordinal_tracker::reporter::{EventLog, TracingReporter};
use ordinal_tracker::utils::{init_logger, LogLevel};
use ordinal_tracker::Ordinal;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let env = EnvConfig::load();
    let (app_config, config_path) = config::resolve(args.config.as_deref(), &env)?;

    let level = if args.verbose {
        LogLevel::Debug
    } else {
        app_config.level()
    };
    init_logger(level);

    if let Some(path) = &config_path {
        debug!("Using config file {}", path.display());
    }

    match args.command {
        cli::Command::Run(run_args) => {
            run_plan(run_args, app_config, args.verbose).await?;
        }
        cli::Command::Advance(ordinal_args) => {
            advance_ordinal(&ordinal_args.ordinal)?;
        }
        cli::Command::Fork(ordinal_args) => {
            fork_ordinal(&ordinal_args.ordinal)?;
        }
        cli::Command::Compare(compare_args) => {
            compare_ordinals(&compare_args.a, &compare_args.b)?;
        }
        cli::Command::Config(config_args) => {
            manage_config(config_args, &app_config, config_path.as_deref())?;
        }
        cli::Command::Env => {
            config::print_env_help();
            println!();
            env.print_summary();
        }
    }

    Ok(())
}

async fn run_plan(args: cli::RunArgs, mut config: AppConfig, verbose: bool) -> Result<()> {
    if let Some(run_stamp) = args.run_stamp {
        config.run_stamp = run_stamp;
    }
    if let Some(concurrent) = args.concurrent {
        config.max_concurrent = concurrent;
    }
    if let Some(jitter_ms) = args.jitter_ms {
        config.jitter_ms = jitter_ms;
    }
    if let Some(format) = args.format {
        config.format = format;
    }
    if let Some(plan) = args.plan {
        config.plan = Some(plan);
    }
    config.validate()?;

    let plan = match &config.plan {
        Some(path) => SuitePlan::load(path)?,
        None => SuitePlan::demo(),
    };

    let format = config.output_format();
    let mut formatter = EventFormatter::new(format);
    if !std::io::stdout().is_terminal() {
        formatter = formatter.no_color();
    }

    let mut executor = ParallelExecutor::new(config.max_concurrent)
        .with_jitter_ms(config.jitter_ms)
        .with_run_stamp(config.run_stamp);
    if verbose {
        executor = executor.with_reporter(TracingReporter);
    }
    if args.live {
        let mut live = EventFormatter::new(format);
        if !std::io::stderr().is_terminal() {
            live = live.no_color();
        }
        executor = executor.with_reporter(LiveReporter::stderr(live));
    }

    let logs = if args.rounds > 1 {
        executor.run_rounds(&plan, args.rounds).await?
    } else {
        vec![executor.run(&plan).await?]
    };

    // Run stamps lead every ordinal, so merged rounds stay grouped by round
    let merged = EventLog::from_events(
        logs.iter()
            .flat_map(|log| log.events().iter().cloned())
            .collect(),
    );

    println!("{}", formatter.format_log(&merged));
    if format == OutputFormat::Table && logs.len() > 1 {
        for (round, log) in logs.iter().enumerate() {
            println!("Round {}: {}", round + 1, log.summary());
        }
    }

    if let Some(path) = &args.output {
        write_log_to_file(path, &merged, format)?;
        info!("Ordered log written to {}", path);
    }

    merged
        .verify()
        .context("Reported events failed ordering verification")?;

    Ok(())
}

fn parse_ordinal(text: &str) -> Result<Ordinal> {
    text.parse::<Ordinal>()
        .with_context(|| format!("Invalid ordinal: {text}"))
}

fn checked_advance(ordinal: &Ordinal) -> Result<Ordinal> {
    ordinal.checked_advance().with_context(|| {
        format!("{ordinal} cannot be advanced: last component is already {}", u64::MAX)
    })
}

fn advance_ordinal(text: &str) -> Result<()> {
    let ordinal = parse_ordinal(text)?;
    println!("{}", checked_advance(&ordinal)?);
    Ok(())
}

fn fork_ordinal(text: &str) -> Result<()> {
    let ordinal = parse_ordinal(text)?;
    let parent = checked_advance(&ordinal)?;
    let child = ordinal.branch();
    println!("child:  {child}");
    println!("parent: {parent}");
    Ok(())
}

fn compare_ordinals(a: &str, b: &str) -> Result<()> {
    let left = parse_ordinal(a)?;
    let right = parse_ordinal(b)?;

    let symbol = match left.cmp(&right) {
        Ordering::Less => "<",
        Ordering::Equal => "=",
        Ordering::Greater => ">",
    };
    println!("{left} {symbol} {right}");

    if left != right {
        if left.is_ancestor_of(&right) {
            println!("{left} is a prefix of {right}");
        } else if right.is_ancestor_of(&left) {
            println!("{right} is a prefix of {left}");
        }
    }
    Ok(())
}

fn manage_config(
    args: cli::ConfigArgs,
    app_config: &AppConfig,
    source: Option<&Path>,
) -> Result<()> {
    match args.action {
        cli::ConfigAction::Show { json } => {
            match source {
                Some(path) => println!("# Loaded from {}", path.display()),
                None => println!("# No config file found, using defaults"),
            }
            let output = if json {
                serde_json::to_string_pretty(app_config)?
            } else {
                serde_yaml::to_string(app_config)?
            };
            println!("{output}");
        }

        cli::ConfigAction::Init { path, force } => {
            let target = PathBuf::from(&path);
            if target.exists() && !force {
                anyhow::bail!(
                    "Configuration file already exists: {path}. Use --force to overwrite."
                );
            }

            AppConfig::example().save(&target)?;
            println!("✓ Configuration file created: {path}");
            println!("\nSearched locations, in order:");
            for location in config::config_locations() {
                println!("  {}", location.display());
            }
        }
    }

    Ok(())
}
