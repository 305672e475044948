//! Shims over the docker CLI: contexts, containers and network
//! inspection. All pass-through invocations; the docker engine itself
//! runs inside the VM.

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::exec;

/// Create a new docker context
pub async fn create_context(name: &str, docker_host: &str) -> Result<()> {
    exec::run_quiet(&format!("docker context create {name} --docker {docker_host}"))
        .await
        .with_context(|| format!("creating docker context {name}"))
}

/// Delete a docker context
pub async fn delete_context(name: &str) -> Result<()> {
    exec::run_quiet(&format!("docker context delete {name}"))
        .await
        .with_context(|| format!("deleting docker context {name}"))
}

/// Set the given context as the default for this process and for the
/// docker CLI config.
pub async fn use_context(name: &str) -> Result<()> {
    std::env::set_var("DOCKER_CONTEXT", name);
    exec::run_quiet(&format!("docker context use {name}"))
        .await
        .with_context(|| format!("switching to docker context {name}"))
}

/// Whether the given context already exists
pub async fn context_exists(name: &str) -> Result<bool> {
    let out = exec::run_capture("docker context ls -q")
        .await
        .context("listing docker contexts")?;

    Ok(out.lines().any(|ctx| ctx.trim() == name))
}

/// Names of currently running containers
pub async fn list_running_container_names() -> Result<Vec<String>> {
    let out = exec::run_capture("docker container ls --format={{.Names}}")
        .await
        .context("listing running containers")?;

    Ok(out
        .lines()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect())
}

/// Run a container, optionally force-removing a stopped leftover with
/// the same name first.
pub async fn run_container(name: &str, rest: &str, remove_existing: bool) -> Result<()> {
    if remove_existing && !is_container_usable(name).await? {
        remove_container(name).await?;
    }

    exec::run(&format!("docker run --name {name} {rest}"))
        .await
        .with_context(|| format!("running container {name}"))
}

/// A container name is usable when no exited/dead/created/paused
/// container is squatting on it.
pub async fn is_container_usable(name: &str) -> Result<bool> {
    let out = exec::run_capture(&format!(
        "docker container ls -a -f 'status=exited' -f 'status=dead' -f 'status=created' -f 'status=paused' -f 'name={name}' --format={{{{.Names}}}}"
    ))
    .await
    .with_context(|| format!("looking up container {name}"))?;

    Ok(out.trim().is_empty())
}

pub async fn remove_container(name: &str) -> Result<()> {
    exec::run(&format!("docker container rm -f {name}"))
        .await
        .with_context(|| format!("removing container {name}"))
}

/// Connect a container to a docker network
pub async fn network_connect(network: &str, container: &str) -> Result<()> {
    exec::run(&format!("docker network connect {network} {container}"))
        .await
        .with_context(|| format!("connecting {container} to network {network}"))
}

#[derive(Debug, Deserialize)]
struct IpamConfig {
    #[serde(rename = "Subnet")]
    subnet: Option<String>,
}

/// IPv4 and IPv6 subnets of a docker network.
pub async fn network_subnets(network: &str) -> Result<(String, String)> {
    let subnets = inspect_subnets(network).await?;

    let ipv4 = subnets
        .iter()
        .find(|s| s.contains('.'))
        .with_context(|| format!("network {network} has no ipv4 subnet"))?;
    let ipv6 = subnets
        .iter()
        .find(|s| s.contains(':'))
        .with_context(|| format!("network {network} has no ipv6 subnet"))?;

    Ok((ipv4.clone(), ipv6.clone()))
}

/// IPv4 subnet of a docker network.
pub async fn network_ipv4_subnet(network: &str) -> Result<String> {
    let subnets = inspect_subnets(network).await?;

    subnets
        .into_iter()
        .find(|s| s.contains('.'))
        .with_context(|| format!("network {network} has no ipv4 subnet"))
}

async fn inspect_subnets(network: &str) -> Result<Vec<String>> {
    let out = exec::run_capture(&format!(
        "docker network inspect {network} -f '{{{{json .IPAM.Config}}}}'"
    ))
    .await
    .with_context(|| format!("inspecting docker network {network}"))?;

    let configs: Vec<IpamConfig> = serde_json::from_str(out.trim())
        .with_context(|| format!("parsing IPAM config of network {network}"))?;

    let subnets: Vec<String> = configs.into_iter().filter_map(|c| c.subnet).collect();
    if subnets.is_empty() {
        bail!("network {network} has no subnets configured");
    }

    Ok(subnets)
}
