// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Records `<cwd>|<args>` for every call, then replays the response stored under
/// `responses/<args with _ for spaces>[.<attempt>].{out,err,code}`.
const FAKE_COMPOSE: &str = r#"#!/bin/sh
dir="$(dirname "$0")"
echo "$(pwd -P)|$*" >> "$dir/calls.log"
key="$(echo "$*" | tr ' ' '_')"
n="$(grep -c "|$*\$" "$dir/calls.log")"
base="$dir/responses/$key.$n"
[ -f "$base.code" ] || [ -f "$base.out" ] || [ -f "$base.err" ] || base="$dir/responses/$key"
[ -f "$base.out" ] && cat "$base.out"
[ -f "$base.err" ] && cat "$base.err" >&2
[ -f "$base.code" ] && exit "$(cat "$base.code")"
exit 0
"#;

/// A stand-in compose executable living in its own temp directory.
pub struct FakeCompose {
    dir: tempfile::TempDir,
    pub binary: PathBuf,
}

impl FakeCompose {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("responses")).unwrap();
        let binary = dir.path().join("docker-compose");
        fs::write(&binary, FAKE_COMPOSE).unwrap();
        fs::set_permissions(&binary, fs::Permissions::from_mode(0o755)).unwrap();
        Self { dir, binary }
    }

    pub fn binary_str(&self) -> &str {
        self.binary.to_str().unwrap()
    }

    /// Script the response for `args` (e.g. `"rm -f"`). With `attempt`, only that
    /// attempt (1-based) of the command gets it; otherwise every attempt does.
    pub fn respond(&self, args: &str, attempt: Option<usize>, code: i32, stdout: &str, stderr: &str) {
        let key = args.replace(' ', "_");
        let base = match attempt {
            Some(n) => format!("{key}.{n}"),
            None => key,
        };
        let responses = self.dir.path().join("responses");
        fs::write(responses.join(format!("{base}.out")), stdout).unwrap();
        fs::write(responses.join(format!("{base}.err")), stderr).unwrap();
        fs::write(responses.join(format!("{base}.code")), code.to_string()).unwrap();
    }

    /// Every recorded `(cwd, args)` pair, in call order.
    pub fn calls(&self) -> Vec<(PathBuf, String)> {
        let log = self.dir.path().join("calls.log");
        let Ok(contents) = fs::read_to_string(log) else {
            return Vec::new();
        };
        contents
            .lines()
            .filter_map(|l| l.split_once('|'))
            .map(|(cwd, args)| (PathBuf::from(cwd), args.to_string()))
            .collect()
    }

    pub fn call_args(&self) -> Vec<String> {
        self.calls().into_iter().map(|(_, args)| args).collect()
    }
}

/// A project directory with a compose file in it.
pub fn project_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("docker-compose.yml"),
        "services:\n  web:\n    image: nginx\n",
    )
    .unwrap();
    dir
}

pub struct CliOutput {
    pub code: Option<i32>,
    pub result: Option<serde_json::Value>,
    pub stderr: String,
}

impl CliOutput {
    pub fn failed(&self) -> bool {
        self.field("failed").as_bool().unwrap()
    }

    pub fn changed(&self) -> bool {
        self.field("changed").as_bool().unwrap()
    }

    pub fn msg(&self) -> &str {
        self.field("msg").as_str().unwrap()
    }

    fn field(&self, name: &str) -> &serde_json::Value {
        let result = self
            .result
            .as_ref()
            .unwrap_or_else(|| panic!("no JSON result, stderr: {}", self.stderr));
        &result[name]
    }
}

/// Run the compose-state binary with `args` and `env` overrides.
pub fn run_cli_with_env(args: &[&str], env: &[(&str, &str)]) -> CliOutput {
    let bin = env!("CARGO_BIN_EXE_compose-state");
    let mut cmd = Command::new(bin);
    cmd.args(args).env_remove("COMPOSE_STATE_BINARY");
    for (k, v) in env {
        cmd.env(k, v);
    }
    let output = cmd.output().expect("failed to run compose-state");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    eprintln!("[compose-state:err] {stderr}");
    let result = stdout
        .lines()
        .next()
        .map(|line| serde_json::from_str(line).expect("stdout should be a JSON result"));

    CliOutput {
        code: output.status.code(),
        result,
        stderr,
    }
}

pub fn run_cli(args: &[&str]) -> CliOutput {
    run_cli_with_env(args, &[])
}

pub fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap()
}
