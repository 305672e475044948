//! Thin wrapper over `bash -c` for the external tools every operation
//! shells out to (limactl, docker, kind, kubectl, brew).

use anyhow::{bail, Context, Result};
use tokio::process::Command;
use tracing::debug;

/// Run a shell command, inheriting stdio so the external tool's output
/// (including interactive prompts like sudo) reaches the user directly.
pub async fn run(script: &str) -> Result<()> {
    debug!(cmd = %script, "running");

    let status = Command::new("bash")
        .arg("-c")
        .arg(script)
        .status()
        .await
        .with_context(|| format!("spawning `{script}`"))?;

    if !status.success() {
        bail!("`{script}` exited with {status}");
    }

    Ok(())
}

/// Run a sequence of commands in a single shell so `cd` and friends
/// carry over between them.
pub async fn run_many(scripts: &[&str]) -> Result<()> {
    run(&scripts.join("; ")).await
}

/// Run a shell command and capture its stdout. On failure the error
/// carries the tool's stderr.
pub async fn run_capture(script: &str) -> Result<String> {
    debug!(cmd = %script, "running");

    let output = Command::new("bash")
        .arg("-c")
        .arg(script)
        .output()
        .await
        .with_context(|| format!("spawning `{script}`"))?;

    if !output.status.success() {
        bail!(
            "`{script}` failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Run a shell command without inheriting stdio, discarding its output.
pub async fn run_quiet(script: &str) -> Result<()> {
    run_capture(script).await.map(|_| ())
}
