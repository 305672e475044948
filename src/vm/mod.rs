//! VM lifecycle shim over limactl. Every verb is a pass-through
//! invocation; kindvm only keeps the record of what it created.

pub mod config;

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use crate::store::{Store, VmRecord};
use crate::{exec, paths};

pub use config::{Arch, LimaConfig, Mount, VmOverrides};

/// Create-or-start a VM.
///
/// A VM limactl already knows about is simply started. Otherwise a new
/// one is created: allocate an id and a docker port, render the lima
/// config, start it, and record it in the store once limactl succeeds.
pub async fn start(
    store: &mut Store,
    name: &str,
    overrides: Option<VmOverrides>,
    skip_if_running: bool,
) -> Result<()> {
    info!(vm = %name, "starting VM");

    let known = exists(name).await.context("checking if the VM exists")?;

    if running(name).await.context("checking if the VM is running")? {
        if skip_if_running {
            return Ok(());
        }
        bail!("VM \"{name}\" is already running");
    }

    let overrides = match overrides {
        Some(overrides) if !known => overrides,
        _ => {
            return exec::run(&format!("limactl start --tty=false {name}"))
                .await
                .context("starting VM");
        }
    };

    let record = VmRecord::new(
        store.next_vm_id(),
        name,
        paths::vm_config_path(name),
        store.next_docker_port(),
    );

    debug!(vm = %name, path = %record.config_path.display(), "rendering lima config");
    let rendered = LimaConfig::new(&record, &overrides).render()?;
    std::fs::write(&record.config_path, rendered)
        .with_context(|| format!("writing VM config {}", record.config_path.display()))?;

    exec::run(&format!(
        "limactl start --tty=false {}",
        record.config_path.display()
    ))
    .await
    .context("starting VM")?;

    store.insert_vm(record).context("saving VM record")
}

/// Stop a running VM
pub async fn stop(name: &str) -> Result<()> {
    if !running(name).await? {
        bail!("VM \"{name}\" is not in running state");
    }

    exec::run(&format!("limactl stop {name}"))
        .await
        .context("stopping VM")
}

/// Delete a VM: the lima instance, its rendered config and its record.
pub async fn delete(store: &mut Store, name: &str) -> Result<()> {
    if !exists(name).await? {
        bail!("VM \"{name}\" does not exist");
    }

    let record = store
        .vm(name)
        .with_context(|| format!("VM \"{name}\" not found in the store"))?
        .clone();

    exec::run(&format!("limactl delete {name}"))
        .await
        .context("deleting VM")?;

    std::fs::remove_file(&record.config_path)
        .with_context(|| format!("removing VM config {}", record.config_path.display()))?;

    store.remove_vm(name)
}

/// Restart a VM
pub async fn restart(store: &mut Store, name: &str) -> Result<()> {
    stop(name).await?;
    start(store, name, None, true).await
}

/// Status line(s) for a VM, or for every VM when `name` is empty
pub async fn status(name: &str) -> Result<String> {
    exec::run_capture(&format!(
        "limactl ls | awk '/NAME/ || /{name}/ {{print $0}}'"
    ))
    .await
    .context("getting VM status")
}

/// Open a shell in the VM, optionally running a command
pub async fn shell(name: &str, args: &[String]) -> Result<()> {
    if args.is_empty() {
        return exec::run(&format!("limactl shell {name}")).await;
    }

    exec::run(&format!("limactl shell {name} -- {}", args.join(" "))).await
}

/// Open the VM config in the user's editor
pub async fn edit(name: &str) -> Result<()> {
    exec::run(&format!("limactl edit {name}")).await
}

/// Names of all recorded VMs
pub fn list(store: &Store) -> Vec<String> {
    store.vms().iter().map(|vm| vm.name.clone()).collect()
}

/// Whether limactl knows about the VM at all
pub async fn exists(name: &str) -> Result<bool> {
    Ok(ls_status().await?.iter().any(|(vm, _)| vm == name))
}

/// Whether the VM is in any state other than Stopped
pub async fn running(name: &str) -> Result<bool> {
    Ok(ls_status()
        .await?
        .iter()
        .any(|(vm, status)| vm == name && status != "Stopped"))
}

async fn ls_status() -> Result<Vec<(String, String)>> {
    let out = exec::run_capture("limactl ls --format '{{.Name}}={{.Status}}'")
        .await
        .context("listing VMs")?;

    Ok(out
        .lines()
        .filter_map(|line| line.split_once('='))
        .map(|(name, status)| (name.to_string(), status.to_string()))
        .collect())
}

/// Run a command inside the VM, inheriting stdio
pub async fn shell_exec(name: &str, cmd: &str) -> Result<()> {
    exec::run(&format!("limactl shell {name} -- {cmd}")).await
}

/// Run a command inside the VM, capturing stdout
pub async fn shell_capture(name: &str, cmd: &str) -> Result<String> {
    exec::run_capture(&format!("limactl shell {name} -- {cmd}")).await
}

/// Run a command inside the VM, discarding output. Useful for
/// existence probes where only the exit status matters.
pub async fn shell_quiet(name: &str, cmd: &str) -> Result<()> {
    exec::run_quiet(&format!("limactl shell {name} -- {cmd}")).await
}

/// Whether FIPS mode is enabled in the guest kernel
pub async fn fips_check(name: &str) -> Result<bool> {
    fips_os_supported(name).await?;

    let out = shell_capture(name, "cat /proc/sys/crypto/fips_enabled")
        .await
        .context("checking FIPS status")?;

    Ok(out.trim() == "1")
}

/// FIPS management is only supported on debian guests
async fn fips_os_supported(name: &str) -> Result<()> {
    let out = shell_capture(name, "sh -c \"cat /etc/os-release | grep '^ID=' | cut -d= -f2\"")
        .await
        .context("getting VM OS")?;

    let os = out.trim();
    if os == "debian" {
        return Ok(());
    }

    bail!("FIPS is not supported on a {os} guest - try creating a new VM")
}
