//! Cluster lifecycle shim over the kind CLI.

pub mod config;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use crate::registry::{self, Registry};
use crate::store::{ClusterRecord, Store};
use crate::{exec, lb, paths};

pub use config::{ClusterConfig, UserClusterConfig};

/// Default name for VMs and clusters when the user doesn't pick one.
pub const DEFAULT_NAME: &str = "kindvm";

#[derive(Debug, Clone)]
pub struct CreateOptions {
    /// User-supplied kind config file
    pub config: Option<PathBuf>,
    /// Cluster name; a name inside the config file wins
    pub name: Option<String>,
    pub docker_registry: bool,
    pub quay_registry: bool,
    pub gcr_registry: bool,
}

impl Default for CreateOptions {
    fn default() -> Self {
        Self {
            config: None,
            name: None,
            docker_registry: true,
            quay_registry: true,
            gcr_registry: true,
        }
    }
}

impl CreateOptions {
    /// Registries whose mirrors end up in the cluster config.
    pub fn mirrors(&self) -> Vec<Registry> {
        registry::KNOWN
            .into_iter()
            .zip([self.docker_registry, self.quay_registry, self.gcr_registry])
            .filter_map(|(registry, enabled)| enabled.then_some(registry))
            .collect()
    }
}

/// Create a new kind cluster inside the given VM and record it.
/// Returns the resolved cluster name.
pub async fn create(store: &mut Store, vm_name: &str, opts: CreateOptions) -> Result<String> {
    let user = UserClusterConfig::load(opts.config.as_deref())?;

    let name = user
        .name
        .clone()
        .or_else(|| opts.name.clone())
        .unwrap_or_else(|| DEFAULT_NAME.to_string());

    if store.cluster_in_vm(&name, vm_name).is_some() {
        bail!("cluster \"{name}\" already exists");
    }

    let id = store.next_cluster_id()?;
    info!(cluster = %name, id, vm = %vm_name, "creating cluster");

    let merged = ClusterConfig::merge(user, &name, id, &opts.mirrors());
    let config_path = paths::cluster_config_path(&name);
    std::fs::write(&config_path, merged.render()?)
        .with_context(|| format!("writing cluster config {}", config_path.display()))?;

    exec::run(&format!(
        "kind create cluster --config {}",
        config_path.display()
    ))
    .await
    .context("creating kind cluster")?;

    store
        .insert_cluster(ClusterRecord::new(id, &name, config_path, vm_name))
        .context("saving cluster record")?;

    lb::install(store, &name)
        .await
        .context("installing the load balancer")?;

    Ok(name)
}

/// Delete a cluster: the kind cluster, its rendered config and its
/// record, best-effort in that order.
pub async fn delete(store: &mut Store, name: &str) -> Result<()> {
    let record = store
        .cluster(name)
        .with_context(|| format!("cluster \"{name}\" does not exist"))?
        .clone();

    exec::run(&format!("kind delete cluster --name={name}"))
        .await
        .context("deleting kind cluster")?;

    if let Err(e) = std::fs::remove_file(&record.config_path) {
        warn!(
            "failed to remove cluster config {}: {e}",
            record.config_path.display()
        );
    }

    store.remove_cluster(name)
}

/// Names of recorded clusters, optionally restricted to one VM.
pub fn list(store: &Store, vm_name: Option<&str>) -> Vec<String> {
    store
        .clusters()
        .iter()
        .filter(|c| vm_name.map_or(true, |vm| c.vm == vm))
        .map(|c| c.name.clone())
        .collect()
}

/// Load an OCI image from the VM's docker engine into a cluster.
pub async fn load_image(image: &str, cluster: &str) -> Result<()> {
    exec::run(&format!("kind load docker-image {image} --name {cluster}"))
        .await
        .with_context(|| format!("loading image into cluster \"{cluster}\""))
}
