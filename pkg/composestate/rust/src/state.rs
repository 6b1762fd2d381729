// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use crate::errors::Error;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DesiredState {
    /// Containers are up; `up -d` is a no-op when nothing changed.
    #[default]
    Started,
    /// Containers exist but are not running.
    Stopped,
    /// Containers are stopped and removed.
    Absent,
}

impl FromStr for DesiredState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "started" => Ok(DesiredState::Started),
            "stopped" => Ok(DesiredState::Stopped),
            "absent" => Ok(DesiredState::Absent),
            other => Err(Error::UnsupportedState(other.to_string())),
        }
    }
}

impl fmt::Display for DesiredState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DesiredState::Started => write!(f, "started"),
            DesiredState::Stopped => write!(f, "stopped"),
            DesiredState::Absent => write!(f, "absent"),
        }
    }
}
