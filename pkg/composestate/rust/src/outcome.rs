// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use crate::command::CommandOutcome;
use serde::Serialize;

/// What the calling automation sees. When `failed` is set, `changed` is advisory:
/// part of the operation may already have happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileResult {
    pub failed: bool,
    pub changed: bool,
    pub msg: String,
}

impl ReconcileResult {
    pub fn ok(changed: bool, msg: impl Into<String>) -> Self {
        Self {
            failed: false,
            changed,
            msg: msg.into(),
        }
    }

    pub fn failure(msg: impl Into<String>) -> Self {
        Self {
            failed: true,
            changed: false,
            msg: msg.into(),
        }
    }

    /// Failure is decided by the exit code alone.
    pub fn from_outcome(outcome: &CommandOutcome, changed: bool, msg: &str) -> Self {
        Self {
            failed: !outcome.success(),
            changed,
            msg: msg.to_string(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
