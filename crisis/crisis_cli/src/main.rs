use std::{
    fs,
    io::{self, Write},
    panic,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{Datelike, Local, Utc};
use clap::{Parser, Subcommand};
use crisis_harness::{
    paint, ColorCategory, DisplayOrder, Harness, HarnessTelemetry, HostDescriptor, HostType,
    Priority, FATAL_ERROR,
};
use serde::Serialize;
use serde_json::Value;
use shared_logging::LogLevel;

mod hosts;

#[derive(Parser, Debug)]
#[command(
    name = "crisis",
    version,
    about = "Runs the tagged methods of a host type and reports their outcome"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Lists host types and their tagged methods.
    List {
        /// Restricts the listing to one host type.
        host: Option<String>,
        /// Prints the listing as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Runs every tagged method of one host type.
    Run(RunArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Host type name.
    host: String,
    /// TOML file replacing the host's built-in descriptor.
    #[arg(long)]
    descriptor: Option<PathBuf>,
    /// Renders only this priority bucket.
    #[arg(long, value_parser = parse_priority)]
    only: Option<Priority>,
    /// Bucket order: ascending, descending, or a priority alias.
    #[arg(long, value_parser = parse_order)]
    order: Option<DisplayOrder>,
    /// Prints records and summary as JSON after the table.
    #[arg(long)]
    json: bool,
    /// Disables ANSI colours.
    #[arg(long)]
    no_color: bool,
    /// JSON-lines log file for run events.
    #[arg(long, conflicts_with = "log_dir")]
    log_file: Option<PathBuf>,
    /// Directory receiving a dated log file per run.
    #[arg(long)]
    log_dir: Option<PathBuf>,
    #[arg(long, default_value = "info")]
    log_level: LogLevel,
}

#[derive(Debug, Serialize)]
struct HostListing {
    name: String,
    runnable: bool,
    untagged: usize,
    methods: Vec<MethodListing>,
}

#[derive(Debug, Serialize)]
struct MethodListing {
    name: String,
    priority: Priority,
    enabled: bool,
    arity: usize,
    return_type: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::List { host, json } => handle_list(host.as_deref(), json),
        Commands::Run(args) => handle_run(args),
    }
}

fn handle_list(filter: Option<&str>, json: bool) -> Result<()> {
    let catalog = hosts::catalog()?;
    let selected: Vec<&HostType> = match filter {
        Some(name) => vec![catalog.resolve(name)?],
        None => catalog.hosts().collect(),
    };
    let listings: Vec<HostListing> = selected
        .into_iter()
        .map(|host| HostListing {
            name: host.name().to_string(),
            runnable: host.descriptor().is_some(),
            untagged: host
                .methods()
                .filter(|method| method.metadata().is_none())
                .count(),
            methods: host
                .tagged_methods()
                .map(|(method, metadata)| MethodListing {
                    name: method.name().to_string(),
                    priority: metadata.priority,
                    enabled: metadata.enabled,
                    arity: method.signature().arity,
                    return_type: method.signature().return_type.clone(),
                })
                .collect(),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&listings)?);
        return Ok(());
    }
    for host in &listings {
        let marker = if host.runnable { "" } else { " (no descriptor)" };
        println!("{}{marker}, {} untagged", host.name, host.untagged);
        for method in &host.methods {
            println!(
                "  {:<12} {:<8} arity {} -> {}{}",
                method.name,
                method.priority.label(),
                method.arity,
                method.return_type,
                if method.enabled { "" } else { " [disabled]" }
            );
        }
    }
    Ok(())
}

fn handle_run(args: RunArgs) -> Result<()> {
    let mut catalog = hosts::catalog()?;
    let mut host = catalog.take(&args.host)?;

    if let Some(path) = &args.descriptor {
        host.set_descriptor(Some(HostDescriptor::load(path)?));
    }
    if let Some(descriptor) = host.descriptor().cloned() {
        host.set_descriptor(Some(apply_overrides(descriptor, &args)));
    }

    let log_path = match (&args.log_file, &args.log_dir) {
        (Some(file), _) => Some(file.clone()),
        (None, Some(dir)) => Some(compute_log_path(dir)?),
        (None, None) => None,
    };
    let mut telemetry = HarnessTelemetry::builder("crisis").min_level(args.log_level);
    if let Some(path) = log_path {
        telemetry = telemetry.log_path(path);
    }
    let harness = Harness::with_telemetry(telemetry.build()?);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    // Panics inside methods are captured as error records; keep the default
    // hook from printing them between report lines.
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let result = harness.run(&host, &mut out);
    panic::set_hook(default_hook);

    match result {
        Ok(outcome) => {
            if args.json {
                writeln!(out, "{}", serde_json::to_string_pretty(&outcome)?)?;
            }
            Ok(())
        }
        Err(err) if err.is_configuration() => {
            writeln!(
                out,
                "{}",
                paint(ColorCategory::Failure, FATAL_ERROR, 0, !args.no_color)
            )?;
            out.flush()?;
            std::process::exit(0);
        }
        Err(err) => Err(err.into()),
    }
}

fn apply_overrides(mut descriptor: HostDescriptor, args: &RunArgs) -> HostDescriptor {
    if let Some(only) = args.only {
        descriptor = descriptor.with_only(only);
    }
    if let Some(order) = args.order {
        descriptor = descriptor.with_order(order);
    }
    if args.no_color {
        descriptor = descriptor.with_colorize(false);
    }
    descriptor
}

fn parse_priority(raw: &str) -> Result<Priority> {
    serde_json::from_value(Value::String(raw.to_ascii_lowercase()))
        .with_context(|| format!("unknown priority `{raw}` (none, low, medium, high)"))
}

fn parse_order(raw: &str) -> Result<DisplayOrder> {
    serde_json::from_value(Value::String(raw.to_ascii_lowercase())).with_context(|| {
        format!("unknown order `{raw}` (ascending, descending, low, medium, high)")
    })
}

fn compute_log_path(base: &Path) -> Result<PathBuf> {
    let now = Local::now();
    let dir = base
        .join(format!("{:04}", now.year()))
        .join(format!("{:02}", now.month()))
        .join(format!("{:02}", now.day()));
    fs::create_dir_all(&dir)?;
    Ok(dir.join(format!(
        "run-{}.log.jsonl",
        Utc::now().format("%Y%m%d-%H%M%S")
    )))
}
