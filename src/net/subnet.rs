//! Address derivation. Everything here is a pure function of an
//! instance id so the arithmetic stays unit-testable without any
//! external tool.

use std::net::{Ipv4Addr, Ipv6Addr};

use anyhow::{bail, Context, Result};

/// Network base for VM addresses on the shared lima network. VM ids
/// map to hosts starting at .10.
const VM_NET_BASE: Ipv4Addr = Ipv4Addr::new(192, 168, 105, 0);
const VM_HOST_OFFSET: u32 = 10;

/// Host-reachable IPv4 address of the VM with the given id.
pub fn vm_ipv4(id: u32) -> Ipv4Addr {
    Ipv4Addr::from(u32::from(VM_NET_BASE) + VM_HOST_OFFSET + id)
}

/// IPv4-mapped IPv6 form of the VM address.
pub fn vm_ipv6(id: u32) -> Ipv6Addr {
    vm_ipv4(id).to_ipv6_mapped()
}

/// Service subnet for a cluster id: 10.<id>.0.0/16.
pub fn service_subnet(id: u32) -> String {
    format!("10.{id}.0.0/16")
}

/// Pod subnet for a cluster id: 10.<100+id>.0.0/16. Offset by 100 so
/// pod and service subnets never collide for ids below the cluster cap.
pub fn pod_subnet(id: u32) -> String {
    format!("10.{}.0.0/16", 100 + id)
}

/// Load-balancer IPv4 pool for a cluster id: a /24 inside the docker
/// bridge /16, offset by id. The bridge's own .0.0/24 is skipped.
pub fn lb_ipv4_pool(bridge_prefix: &str, id: u32) -> String {
    format!("{bridge_prefix}.{}.0/24", id + 1)
}

/// Load-balancer IPv6 pool for a cluster id, under the docker bridge /64.
pub fn lb_ipv6_pool(bridge_prefix: &str, id: u32) -> String {
    format!("{bridge_prefix}:{:x}::/120", id + 1)
}

/// Reduce a docker bridge IPv4 subnet (must be a /16) to its two-octet
/// prefix, e.g. "172.18.0.0/16" -> "172.18".
pub fn ipv4_subnet_prefix(cidr: &str) -> Result<String> {
    let (addr, mask) = split_cidr(cidr)?;
    if mask != 16 {
        bail!("ipv4 subnet of only size 16 is supported, got {cidr}");
    }

    let ip: Ipv4Addr = addr
        .parse()
        .with_context(|| format!("parsing ipv4 subnet {cidr}"))?;
    let octets = ip.octets();

    Ok(format!("{}.{}", octets[0], octets[1]))
}

/// Reduce a docker bridge IPv6 subnet (must be a /64) to its four-hextet
/// prefix, e.g. "fc00:f853:ccd:e793::/64" -> "fc00:f853:ccd:e793".
pub fn ipv6_subnet_prefix(cidr: &str) -> Result<String> {
    let (addr, mask) = split_cidr(cidr)?;
    if mask != 64 {
        bail!("ipv6 subnet of only size 64 is supported, got {cidr}");
    }

    let ip: Ipv6Addr = addr
        .parse()
        .with_context(|| format!("parsing ipv6 subnet {cidr}"))?;
    let seg = ip.segments();

    Ok(format!("{:x}:{:x}:{:x}:{:x}", seg[0], seg[1], seg[2], seg[3]))
}

fn split_cidr(cidr: &str) -> Result<(&str, u8)> {
    let (addr, mask) = cidr
        .trim()
        .split_once('/')
        .with_context(|| format!("invalid CIDR {cidr}"))?;
    let mask: u8 = mask
        .parse()
        .with_context(|| format!("invalid prefix length in {cidr}"))?;
    Ok((addr, mask))
}
