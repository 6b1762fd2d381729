// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("path does not exist: {}", .0.display())]
    PathNotFound(PathBuf),

    #[error("compose binary not found: {0}")]
    BinaryNotFound(String),

    #[error("unsupported state: {0}")]
    UnsupportedState(String),

    #[error("failed to run {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("missing required argument: path")]
    MissingPath,
}

pub type Result<T> = std::result::Result<T, Error>;
