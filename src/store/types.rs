use std::net::{Ipv4Addr, Ipv6Addr};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::net::subnet;

/// A VM managed by kindvm. `docker_port` is the host port the guest
/// docker engine is forwarded to; `id` determines the VM's
/// host-reachable address on the shared lima network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VmRecord {
    pub id: u32,
    pub name: String,
    pub config_path: PathBuf,
    pub docker_port: u16,
    pub created_at: DateTime<Utc>,
}

impl VmRecord {
    pub fn new(id: u32, name: &str, config_path: PathBuf, docker_port: u16) -> Self {
        Self {
            id,
            name: name.to_string(),
            config_path,
            docker_port,
            created_at: Utc::now(),
        }
    }

    /// Host-reachable IPv4 address of this VM on the shared lima network
    pub fn ipv4(&self) -> Ipv4Addr {
        subnet::vm_ipv4(self.id)
    }

    /// IPv4-mapped IPv6 form of the same address
    pub fn ipv6(&self) -> Ipv6Addr {
        subnet::vm_ipv6(self.id)
    }
}

/// A kind cluster running inside a VM. `id` determines the cluster's
/// service/pod subnets and its load-balancer address pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterRecord {
    pub id: u32,
    pub name: String,
    pub config_path: PathBuf,
    pub vm: String,
    pub created_at: DateTime<Utc>,
}

impl ClusterRecord {
    pub fn new(id: u32, name: &str, config_path: PathBuf, vm: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            config_path,
            vm: vm.to_string(),
            created_at: Utc::now(),
        }
    }
}
