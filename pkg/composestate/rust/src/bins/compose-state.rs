// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use anyhow::{Context, Result};
use clap::Parser;
use compose_state::config::{self, ModuleArgs};
use compose_state::{Error, ProcessRunner, ReconcileResult, Reconciler};
use log::{LevelFilter, debug, info};
use simple_logger::SimpleLogger;
use std::path::PathBuf;
use std::process::ExitCode;

const LOG_LEVEL_ENV: &str = "COMPOSE_STATE_LOG_LEVEL";

#[derive(Parser, Debug)]
#[command(name = "compose-state")]
#[command(
    about = "Reconcile a docker-compose project to started, stopped or absent",
    long_about = None
)]
struct Cli {
    /// Compose file, or the directory containing it
    #[arg(short, long)]
    path: Option<PathBuf>,

    /// Desired state: started, stopped or absent [default: started]
    #[arg(short, long)]
    state: Option<String>,

    /// Path to the compose binary [default: /usr/local/bin/docker-compose]
    #[arg(short, long)]
    binary: Option<String>,

    /// Force-recreate on start, force-remove on absent
    #[arg(short, long)]
    force: bool,

    /// Check preconditions only, change nothing
    #[arg(long)]
    check: bool,

    /// YAML or JSON file with module arguments; flags override its values
    #[arg(long)]
    args_file: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn module_args(&self) -> ModuleArgs {
        ModuleArgs {
            path: self.path.clone(),
            state: self.state.clone(),
            binary: self.binary.clone(),
            force: self.force.then_some(true),
            check_mode: self.check.then_some(true),
            framework_check_mode: None,
        }
    }
}

fn init_logging(flag: Option<&str>) -> Result<()> {
    let level = match flag.map(str::to_string).or_else(|| std::env::var(LOG_LEVEL_ENV).ok()) {
        Some(raw) => raw
            .parse::<LevelFilter>()
            .with_context(|| format!("invalid log level: {raw}"))?,
        None => LevelFilter::Warn,
    };
    SimpleLogger::new().with_level(level).init()?;
    debug!("log level set to {level}");
    Ok(())
}

/// Print the result as a single JSON line and map it to the exit status.
fn emit(result: &ReconcileResult) -> Result<ExitCode> {
    println!("{}", result.to_json().context("serializing result")?);
    Ok(if result.failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

async fn run(cli: Cli) -> Result<ExitCode> {
    init_logging(cli.log_level.as_deref())?;

    let file_args = match &cli.args_file {
        Some(path) => config::load_args_file(path)?,
        None => ModuleArgs::default(),
    };
    let request = match file_args.merge(cli.module_args()).into_request() {
        Ok(request) => request,
        Err(e @ Error::UnsupportedState(_)) => return emit(&ReconcileResult::failure(e.to_string())),
        Err(e) => return Err(e.into()),
    };

    info!(
        "compose-state {} reconciling {} to {}",
        env!("CARGO_PKG_VERSION"),
        request.path.display(),
        request.state
    );
    let result = Reconciler::new(ProcessRunner).reconcile(&request).await;
    emit(&result)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(2)
        }
    }
}
