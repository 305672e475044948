//! Pull-through registry caches. One container per known upstream,
//! running inside the VM's docker engine so kind nodes can mirror
//! through them.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::{docker, paths};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registry {
    /// Container (and config file) name
    pub name: &'static str,
    /// Registry host as it appears in image references
    pub host: &'static str,
    /// Upstream to proxy
    pub upstream: &'static str,
    /// Port the cache listens on
    pub port: u16,
}

/// The fixed set of upstream registries kindvm mirrors.
pub const KNOWN: [Registry; 3] = [
    Registry {
        name: "dockerio-registry",
        host: "docker.io",
        upstream: "https://registry-1.docker.io",
        port: 5000,
    },
    Registry {
        name: "quayio-registry",
        host: "quay.io",
        upstream: "https://quay.io",
        port: 5010,
    },
    Registry {
        name: "gcrio-registry",
        host: "gcr.io",
        upstream: "https://gcr.io",
        port: 5020,
    },
];

#[derive(Serialize)]
struct RegistryConfig {
    version: &'static str,
    proxy: ProxyConfig,
    http: HttpConfig,
    storage: StorageConfig,
}

#[derive(Serialize)]
struct ProxyConfig {
    remoteurl: String,
}

#[derive(Serialize)]
struct HttpConfig {
    addr: String,
}

#[derive(Serialize)]
struct StorageConfig {
    filesystem: FilesystemStorage,
}

#[derive(Serialize)]
struct FilesystemStorage {
    rootdirectory: &'static str,
}

impl Registry {
    /// Directory the cache persists pulled layers into. Lives under
    /// /tmp/lima, which the VM shares with the host.
    pub fn cache_dir(&self) -> std::path::PathBuf {
        Path::new("/tmp/lima").join(self.name)
    }

    /// Start the cache container unless it is already running.
    pub async fn ensure(&self) -> Result<()> {
        if self.is_running().await? {
            return Ok(());
        }

        let cache_dir = self.cache_dir();
        std::fs::create_dir_all(&cache_dir)
            .with_context(|| format!("creating cache directory {}", cache_dir.display()))?;

        let config_path = self.write_config()?;

        info!(registry = %self.name, upstream = %self.upstream, "starting registry cache");
        docker::run_container(
            self.name,
            &format!(
                "-d --restart=always -v {}:/etc/docker/registry/config.yml -v {}:/var/lib/registry registry:2",
                config_path.display(),
                cache_dir.display()
            ),
            true,
        )
        .await
    }

    pub async fn is_running(&self) -> Result<bool> {
        let running = docker::list_running_container_names().await?;
        Ok(running.iter().any(|name| name == self.name))
    }

    /// containerd patch pointing a kind node's mirror for this
    /// registry at the cache container.
    pub fn containerd_patch(&self) -> String {
        format!(
            "[plugins.\"io.containerd.grpc.v1.cri\".registry.mirrors.\"{}\"]\n  endpoint = [\"http://{}:{}\"]",
            self.host, self.name, self.port
        )
    }

    /// Best-effort attach of the cache container to the kind network
    /// so node-local mirror lookups resolve by container name.
    pub async fn connect_to_kind_network(&self) -> Result<()> {
        docker::network_connect(crate::net::KIND_NETWORK, self.name).await
    }

    fn write_config(&self) -> Result<std::path::PathBuf> {
        let config = RegistryConfig {
            version: "0.1",
            proxy: ProxyConfig {
                remoteurl: self.upstream.to_string(),
            },
            http: HttpConfig {
                addr: format!("0.0.0.0:{}", self.port),
            },
            storage: StorageConfig {
                filesystem: FilesystemStorage {
                    rootdirectory: "/var/lib/registry",
                },
            },
        };

        let path = paths::registry_config_path(self.name);
        let rendered = serde_yaml::to_string(&config).context("encoding registry config")?;
        std::fs::write(&path, rendered)
            .with_context(|| format!("writing registry config {}", path.display()))?;

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_ports_are_distinct() {
        assert_eq!(KNOWN.len(), 3);
        assert_ne!(KNOWN[0].port, KNOWN[1].port);
        assert_ne!(KNOWN[1].port, KNOWN[2].port);
    }

    #[test]
    fn test_containerd_patch() {
        let patch = KNOWN[0].containerd_patch();
        assert!(patch.contains("registry.mirrors.\"docker.io\""));
        assert!(patch.contains("http://dockerio-registry:5000"));
    }
}
