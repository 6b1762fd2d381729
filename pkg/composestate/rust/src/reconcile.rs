// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Drives a compose project toward a desired lifecycle state.
//!
//! Failure is decided by exit codes only. Whether anything changed is inferred
//! from fixed phrases in the tool's human-readable output, and which stream is
//! inspected differs per state:
//!
//! | state   | command(s)                        | changed when                  | msg    |
//! |---------|-----------------------------------|-------------------------------|--------|
//! | stopped | `stop`                            | stdout contains `Stopping`    | stdout |
//! | absent  | `stop`, then `rm` / `rm -f`       | stop changed or `Removing`    | stdout |
//! | started | `up -d` / `up -d --force-recreate`| stderr lacks `up-to-date`     | stderr |

use crate::command::{CommandOutcome, CommandRunner, ComposeCommand};
use crate::config::Request;
use crate::errors::{Error, Result};
use crate::outcome::ReconcileResult;
use crate::state::DesiredState;
use log::{debug, error, info, warn};
use std::ffi::OsStr;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};

pub const ENDPOINT_ALREADY_JOINED: &str = "container has already joined the endpoint";
pub const MAX_ATTEMPTS: usize = 2;

const STOPPING: &str = "Stopping";
const REMOVING: &str = "Removing";
const UP_TO_DATE: &str = "up-to-date";

/// Only the endpoint-join race is worth another attempt.
pub fn should_retry(outcome: &CommandOutcome) -> bool {
    !outcome.success() && outcome.stderr.contains(ENDPOINT_ALREADY_JOINED)
}

/// Compose resolves its project file relative to the current directory, so a
/// file path runs from its parent directory.
pub fn working_dir(path: &Path) -> PathBuf {
    if path.is_dir() {
        return path.to_path_buf();
    }
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Locate the compose binary. Values with a path separator must name an
/// existing file; bare names are searched on `PATH`. The result is always
/// absolute since the command runs from the compose directory.
pub fn resolve_binary(binary: &str) -> Option<PathBuf> {
    if binary.is_empty() {
        return None;
    }
    if binary.contains(MAIN_SEPARATOR) {
        return existing_file(Path::new(binary));
    }
    let paths = std::env::var_os("PATH")?;
    search_path(binary, &paths)
}

fn search_path(binary: &str, paths: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(paths).find_map(|dir| existing_file(&dir.join(binary)))
}

fn existing_file(path: &Path) -> Option<PathBuf> {
    if !path.is_file() {
        return None;
    }
    std::path::absolute(path).ok()
}

struct Invocation {
    binary: String,
    cwd: PathBuf,
}

pub struct Reconciler<R> {
    runner: R,
}

impl<R: CommandRunner> Reconciler<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    #[cfg(test)]
    fn runner(&self) -> &R {
        &self.runner
    }

    /// Never fails: every error becomes a `failed` result.
    pub async fn reconcile(&self, request: &Request) -> ReconcileResult {
        if !request.path.exists() {
            return precondition_failure(Error::PathNotFound(request.path.clone()));
        }
        let Some(binary) = resolve_binary(&request.binary) else {
            return precondition_failure(Error::BinaryNotFound(request.binary.clone()));
        };

        let inv = Invocation {
            binary: binary.to_string_lossy().into_owned(),
            cwd: working_dir(&request.path),
        };

        if request.check_mode {
            info!(
                "[{}] check mode, not reconciling to {}",
                inv.cwd.display(),
                request.state
            );
            return ReconcileResult::ok(false, "ok");
        }

        let result = match request.state {
            DesiredState::Stopped => self.stopped(&inv).await,
            DesiredState::Absent => self.absent(&inv, request.force).await,
            DesiredState::Started => self.started(&inv, request.force).await,
        };

        match result {
            Ok(res) => {
                info!(
                    "[{}] state={} failed={} changed={}",
                    inv.cwd.display(),
                    request.state,
                    res.failed,
                    res.changed
                );
                res
            }
            Err(e) => {
                error!("[{}] {e}", inv.cwd.display());
                ReconcileResult::failure(e.to_string())
            }
        }
    }

    async fn stopped(&self, inv: &Invocation) -> Result<ReconcileResult> {
        let outcome = self.run(inv, ComposeCommand::Stop).await?;
        let changed = outcome.stdout.contains(STOPPING);
        Ok(ReconcileResult::from_outcome(
            &outcome,
            changed,
            &outcome.stdout,
        ))
    }

    async fn absent(&self, inv: &Invocation, force: bool) -> Result<ReconcileResult> {
        let stop = self.stopped(inv).await?;
        if stop.failed {
            warn!("[{}] stop failed, not removing", inv.cwd.display());
            return Ok(stop);
        }

        let command = if force {
            ComposeCommand::ForceRemove
        } else {
            ComposeCommand::Remove
        };
        // Containers may already be stopped, so a spawn error keeps the stop's change.
        let outcome = match self.run_with_retry(inv, command).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("[{}] {e}", inv.cwd.display());
                return Ok(ReconcileResult {
                    failed: true,
                    changed: stop.changed,
                    msg: e.to_string(),
                });
            }
        };
        let changed = stop.changed || outcome.stdout.contains(REMOVING);
        Ok(ReconcileResult::from_outcome(
            &outcome,
            changed,
            &outcome.stdout,
        ))
    }

    async fn started(&self, inv: &Invocation, force: bool) -> Result<ReconcileResult> {
        let command = if force {
            // Recreating running containers is unreliable in compose; stop them
            // first and ignore how that went.
            match self.stopped(inv).await {
                Ok(res) => debug!(
                    "[{}] pre-recreate stop: failed={} changed={}",
                    inv.cwd.display(),
                    res.failed,
                    res.changed
                ),
                Err(e) => debug!("[{}] pre-recreate stop: {e}", inv.cwd.display()),
            }
            ComposeCommand::ForceRecreate
        } else {
            ComposeCommand::Up
        };

        let outcome = self.run_with_retry(inv, command).await?;
        let changed = !outcome.stderr.contains(UP_TO_DATE);
        Ok(ReconcileResult::from_outcome(
            &outcome,
            changed,
            &outcome.stderr,
        ))
    }

    async fn run_with_retry(
        &self,
        inv: &Invocation,
        command: ComposeCommand,
    ) -> Result<CommandOutcome> {
        let mut attempt = 1;
        loop {
            let outcome = self.run(inv, command).await?;
            if attempt >= MAX_ATTEMPTS || !should_retry(&outcome) {
                return Ok(outcome);
            }
            warn!(
                "[{}] {command} hit endpoint join race, retrying (attempt {}/{MAX_ATTEMPTS})",
                inv.cwd.display(),
                attempt + 1
            );
            attempt += 1;
        }
    }

    async fn run(&self, inv: &Invocation, command: ComposeCommand) -> Result<CommandOutcome> {
        self.runner.run(&inv.binary, &inv.cwd, command).await
    }
}

fn precondition_failure(err: Error) -> ReconcileResult {
    warn!("{err}");
    ReconcileResult::failure(err.to_string())
}
