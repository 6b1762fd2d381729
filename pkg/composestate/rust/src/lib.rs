// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

pub mod command;
pub mod config;
pub mod errors;
pub mod outcome;
pub mod reconcile;
pub mod state;

pub use command::{CommandOutcome, CommandRunner, ComposeCommand, ProcessRunner};
pub use config::{ModuleArgs, Request};
pub use errors::Error;
pub use outcome::ReconcileResult;
pub use reconcile::Reconciler;
pub use state::DesiredState;
