//! Typed lima VM configuration. The rendered YAML belongs to limactl;
//! this struct covers the fields kindvm manages and nothing else.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::paths;
use crate::store::VmRecord;

/// Overrides a user can apply when a VM is first created.
#[derive(Debug, Clone)]
pub struct VmOverrides {
    pub cpus: u32,
    pub memory: String,
    pub disk: String,
    pub arch: Option<Arch>,
    pub mounts: Vec<Mount>,
}

impl Default for VmOverrides {
    fn default() -> Self {
        Self {
            cpus: 4,
            memory: "16GiB".to_string(),
            disk: "100GiB".to_string(),
            arch: None,
            mounts: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    X86_64,
    Aarch64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mount {
    pub location: String,
    pub writable: bool,
}

impl Mount {
    /// Parse a `--mount` flag value: `<PATH>:rw` or `<PATH>:ro`.
    pub fn parse(raw: &str) -> Result<Self> {
        let Some((location, mode)) = raw.rsplit_once(':') else {
            bail!("failed to parse mount: {raw}");
        };

        let writable = match mode {
            "rw" => true,
            "ro" => false,
            other => bail!("invalid mount mode \"{other}\" in {raw}, expected rw or ro"),
        };

        Ok(Self {
            location: location.to_string(),
            writable,
        })
    }
}

/// Lima VM config, rendered to YAML for `limactl start`.
#[derive(Debug, Clone, Serialize)]
pub struct LimaConfig {
    pub cpus: u32,
    pub memory: String,
    pub disk: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arch: Option<Arch>,
    pub images: Vec<Image>,
    pub mounts: Vec<Mount>,
    pub networks: Vec<LimaNetwork>,
    #[serde(rename = "portForwards")]
    pub port_forwards: Vec<PortForward>,
    pub provision: Vec<Provision>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Image {
    pub location: String,
    pub arch: Arch,
}

/// Attachment to a lima-managed network; the shared network gives the
/// VM its 192.168.105.x host-reachable address.
#[derive(Debug, Clone, Serialize)]
pub struct LimaNetwork {
    pub lima: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortForward {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest_socket: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_socket: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_port: Option<u16>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Provision {
    pub mode: String,
    pub script: String,
}

impl LimaConfig {
    /// Build the config for a new VM from its record and the user's
    /// overrides.
    pub fn new(record: &VmRecord, overrides: &VmOverrides) -> Self {
        Self {
            cpus: overrides.cpus,
            memory: overrides.memory.clone(),
            disk: overrides.disk.clone(),
            arch: overrides.arch,
            images: vec![
                Image {
                    location: "https://cloud-images.ubuntu.com/releases/22.04/release/ubuntu-22.04-server-cloudimg-amd64.img".to_string(),
                    arch: Arch::X86_64,
                },
                Image {
                    location: "https://cloud-images.ubuntu.com/releases/22.04/release/ubuntu-22.04-server-cloudimg-arm64.img".to_string(),
                    arch: Arch::Aarch64,
                },
            ],
            mounts: overrides.mounts.clone(),
            networks: vec![LimaNetwork {
                lima: "shared".to_string(),
            }],
            port_forwards: vec![
                PortForward {
                    guest_socket: Some("/var/run/docker.sock".to_string()),
                    host_socket: Some(paths::docker_sock_path(&record.name).display().to_string()),
                    ..Default::default()
                },
                PortForward {
                    guest_port: Some(record.docker_port),
                    host_port: Some(record.docker_port),
                    ..Default::default()
                },
            ],
            provision: vec![Provision {
                mode: "system".to_string(),
                script: docker_provision_script(record.docker_port),
            }],
        }
    }

    pub fn render(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Install docker in the guest and expose the engine on the forwarded
/// tcp port in addition to the unix socket.
fn docker_provision_script(docker_port: u16) -> String {
    format!(
        r#"#!/bin/bash
set -eux -o pipefail
command -v docker >/dev/null 2>&1 && exit 0
export DEBIAN_FRONTEND=noninteractive
curl -fsSL https://get.docker.com | sh
mkdir -p /etc/systemd/system/docker.service.d
cat >/etc/systemd/system/docker.service.d/override.conf <<EOF
[Service]
ExecStart=
ExecStart=/usr/bin/dockerd -H unix:///var/run/docker.sock -H tcp://0.0.0.0:{docker_port}
EOF
systemctl daemon-reload
systemctl restart docker
"#
    )
}
