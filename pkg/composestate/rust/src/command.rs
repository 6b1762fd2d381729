// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use crate::errors::{Error, Result};
use log::{debug, info};
use std::fmt;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// The compose sub-commands issued while reconciling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeCommand {
    Stop,
    Remove,
    ForceRemove,
    Up,
    ForceRecreate,
}

impl ComposeCommand {
    pub fn args(self) -> &'static [&'static str] {
        match self {
            ComposeCommand::Stop => &["stop"],
            ComposeCommand::Remove => &["rm"],
            ComposeCommand::ForceRemove => &["rm", "-f"],
            ComposeCommand::Up => &["up", "-d"],
            ComposeCommand::ForceRecreate => &["up", "-d", "--force-recreate"],
        }
    }
}

impl fmt::Display for ComposeCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.args().join(" "))
    }
}

/// Exit code and captured output of one finished invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutcome {
    /// `-1` when the process was terminated by a signal.
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs one compose sub-command to completion.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    async fn run(
        &self,
        binary: &str,
        cwd: &Path,
        command: ComposeCommand,
    ) -> Result<CommandOutcome>;
}

/// Spawns the real compose binary. There is no timeout: a hung child hangs the caller.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    async fn run(
        &self,
        binary: &str,
        cwd: &Path,
        command: ComposeCommand,
    ) -> Result<CommandOutcome> {
        info!("[{}] running: {binary} {command}", cwd.display());

        let output = Command::new(binary)
            .args(command.args())
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| Error::Spawn {
                binary: binary.to_string(),
                source,
            })?;

        let outcome = CommandOutcome {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        debug!(
            "[{}] {binary} {command} exited with {}",
            cwd.display(),
            outcome.exit_code
        );
        Ok(outcome)
    }
}
