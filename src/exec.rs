//! Subprocess invocation with bounded timeouts

use crate::error::{ReconError, Result};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Timeout for tool version probes at construction time
pub const VERIFY_TIMEOUT_SECS: u64 = 5;

/// Captured output of a finished subprocess
#[derive(Debug)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code; `None` when the process was killed by a signal
    pub code: Option<i32>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs an external command, capturing output, aborting after
/// `timeout_secs`. A missing binary maps to `ToolMissing`; an expired
/// timeout maps to `Timeout`.
pub async fn run_command(program: &str, args: &[&str], timeout_secs: u64) -> Result<CommandOutput> {
    debug!("Running: {} {}", program, args.join(" "));

    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ReconError::ToolMissing(program.to_string())
            } else {
                ReconError::IoError(e)
            }
        })?;

    let output = tokio::time::timeout(
        Duration::from_secs(timeout_secs),
        child.wait_with_output(),
    )
    .await
    .map_err(|_| ReconError::Timeout {
        what: program.to_string(),
        seconds: timeout_secs,
    })??;

    Ok(CommandOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        code: output.status.code(),
    })
}

/// Probes a tool with a version flag; returns its version banner.
/// Fails with `ToolMissing` when the binary is absent or the probe
/// exits non-zero.
pub async fn verify_tool(program: &str, args: &[&str]) -> Result<String> {
    let output = run_command(program, args, VERIFY_TIMEOUT_SECS).await?;
    if output.success() {
        let banner = if output.stdout.trim().is_empty() {
            output.stderr.trim().to_string()
        } else {
            output.stdout.trim().to_string()
        };
        Ok(banner)
    } else {
        Err(ReconError::ToolMissing(program.to_string()))
    }
}
