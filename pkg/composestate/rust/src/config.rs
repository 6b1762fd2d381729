// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use crate::errors::Error;
use crate::state::DesiredState;
use anyhow::{Context, Result};
use log::debug;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_BINARY: &str = "/usr/local/bin/docker-compose";

/// One reconciliation request. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub path: PathBuf,
    pub state: DesiredState,
    pub binary: String,
    pub force: bool,
    pub check_mode: bool,
}

impl Request {
    pub fn new(path: impl Into<PathBuf>, state: DesiredState) -> Self {
        Self {
            path: path.into(),
            state,
            binary: default_binary(),
            force: false,
            check_mode: false,
        }
    }
}

pub fn default_binary() -> String {
    std::env::var("COMPOSE_STATE_BINARY").unwrap_or_else(|_| DEFAULT_BINARY.to_string())
}

/// Arguments as handed over by the caller, either from an arguments file or
/// from the command line. Every field is optional until merged.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ModuleArgs {
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub binary: Option<String>,
    #[serde(default)]
    pub force: Option<bool>,
    #[serde(default)]
    pub check_mode: Option<bool>,
    /// Set by the automation framework; takes precedence over `check_mode`.
    #[serde(default, rename = "_ansible_check_mode")]
    pub framework_check_mode: Option<bool>,
}

impl ModuleArgs {
    /// Fields set in `other` win.
    pub fn merge(self, other: ModuleArgs) -> ModuleArgs {
        ModuleArgs {
            path: other.path.or(self.path),
            state: other.state.or(self.state),
            binary: other.binary.or(self.binary),
            force: other.force.or(self.force),
            check_mode: other.check_mode.or(self.check_mode),
            framework_check_mode: other.framework_check_mode.or(self.framework_check_mode),
        }
    }

    /// Apply defaults and validate. Fails on a missing path or an unknown state.
    pub fn into_request(self) -> std::result::Result<Request, Error> {
        let path = self.path.ok_or(Error::MissingPath)?;
        let state = match self.state {
            Some(s) => s.parse()?,
            None => DesiredState::default(),
        };
        Ok(Request {
            path,
            state,
            binary: self.binary.unwrap_or_else(default_binary),
            force: self.force.unwrap_or(false),
            check_mode: self
                .framework_check_mode
                .or(self.check_mode)
                .unwrap_or(false),
        })
    }
}

/// Parse a YAML (or JSON) arguments file. Unknown keys are ignored.
pub fn load_args_file(path: &Path) -> Result<ModuleArgs> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let args: ModuleArgs =
        serde_yaml::from_str(&contents).with_context(|| format!("parsing {}", path.display()))?;
    debug!("loaded arguments from {}: {args:?}", path.display());
    Ok(args)
}
