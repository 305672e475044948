//! Host/VM networking: a forwarding rule inside the VM so packets from
//! the host interface reach the kind bridge, and a host route sending
//! the kind subnet to the VM's address. Setup is idempotent; cleanup
//! removes the host route.

pub mod iptables;
pub mod subnet;

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use crate::store::{Store, VmRecord};
use crate::{docker, exec, vm};
use iptables::IpTables;

/// Name of the docker network kind puts cluster nodes on.
pub const KIND_NETWORK: &str = "kind";

/// Host-side interface of the shared lima network.
const HOST_INTERFACE: &str = "lima0";

/// Host address on the shared lima network.
const HOST_ADDR: &str = "192.168.105.1";

/// Subnet of the kind docker bridge inside the VM.
const KIND_BRIDGE_SUBNET: &str = "172.18.0.0/16";

/// Set up packet routing between the host and the kind network inside
/// the VM. Safe to invoke repeatedly; the forwarding rule is only added
/// when missing. A failure partway through leaves a partial state that
/// `cleanup` resolves.
pub async fn setup(store: &Store, vm_name: &str) -> Result<()> {
    let record = store
        .vm(vm_name)
        .with_context(|| format!("VM \"{vm_name}\" not found"))?;

    setup_vm_forwarding(vm_name)
        .await
        .context("setting up packet forwarding inside the VM")?;

    setup_host_route(record)
        .await
        .context("setting up the host route to the VM")?;

    info!(vm = %vm_name, "networking set up");
    Ok(())
}

/// Remove the host route added by `setup`.
pub async fn cleanup(store: &Store, vm_name: &str) -> Result<()> {
    let record = store
        .vm(vm_name)
        .with_context(|| format!("VM \"{vm_name}\" not found"))?;

    let bridge_subnet = docker::network_ipv4_subnet(KIND_NETWORK)
        .await
        .context("inspecting the kind network")?;
    let prefix = subnet::ipv4_subnet_prefix(&bridge_subnet)?;

    exec::run(&format!(
        "sudo route -nv delete -net {prefix} {}",
        record.ipv4()
    ))
    .await
    .context("removing the host route to the VM")?;

    info!(vm = %vm_name, "networking cleaned up");
    Ok(())
}

/// Accept forwarded packets from the host interface to the kind bridge
/// interface inside the VM. Checked with `-C` first so repeated setup
/// never duplicates the rule.
async fn setup_vm_forwarding(vm_name: &str) -> Result<()> {
    let bridge = kind_bridge_interface(vm_name).await?;

    let spec = format!(
        "FORWARD -4 -p tcp -s {HOST_ADDR} -d {KIND_BRIDGE_SUBNET} -j ACCEPT -i {HOST_INTERFACE} -o {bridge}"
    );
    let ipt = IpTables::new().sudo().table("filter");

    if vm::shell_quiet(vm_name, &ipt.check(&spec)).await.is_ok() {
        debug!(vm = %vm_name, "forward rule already present");
        return Ok(());
    }

    vm::shell_exec(vm_name, &ipt.append(&spec))
        .await
        .context("adding forward rule from the host interface to the kind bridge")
}

/// Route the kind bridge subnet from the host through the VM.
async fn setup_host_route(record: &VmRecord) -> Result<()> {
    let bridge_subnet = docker::network_ipv4_subnet(KIND_NETWORK)
        .await
        .context("inspecting the kind network")?;
    let prefix = subnet::ipv4_subnet_prefix(&bridge_subnet)?;

    exec::run(&format!(
        "sudo route -nv add -net {prefix} {}",
        record.ipv4()
    ))
    .await
    .context("adding the host route to the VM")
}

/// Name of the kind docker bridge interface inside the VM.
async fn kind_bridge_interface(vm_name: &str) -> Result<String> {
    let out = vm::shell_capture(
        vm_name,
        "ip -o link show | awk -F': ' '{print $2}' | grep 'br-'",
    )
    .await
    .context("finding the kind bridge interface in the VM")?;

    match out.lines().map(str::trim).find(|line| !line.is_empty()) {
        Some(bridge) => Ok(bridge.to_string()),
        None => bail!("no kind bridge interface found in VM \"{vm_name}\""),
    }
}
