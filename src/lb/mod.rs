//! MetalLB install and per-cluster configuration. The address pool is
//! derived from the cluster's instance id inside the docker bridge
//! subnets, so pools never overlap across clusters.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::net::{subnet, KIND_NETWORK};
use crate::store::Store;
use crate::{docker, exec, paths};

const MANIFEST_URL: &str =
    "https://raw.githubusercontent.com/metallb/metallb/v0.13.5/config/manifests/metallb-native.yaml";

const NAMESPACE: &str = "metallb-system";

/// Install MetalLB into the given cluster and configure its pools.
pub async fn install(store: &Store, cluster: &str) -> Result<()> {
    exec::run(&format!("kubectl apply -f {MANIFEST_URL}"))
        .await
        .context("installing metallb")?;

    configure(store, cluster)
        .await
        .context("configuring metallb")
}

/// Configure MetalLB for a cluster: derive the address pools from the
/// instance id, render the manifests, wait for the controller and
/// apply.
pub async fn configure(store: &Store, cluster: &str) -> Result<()> {
    let record = store
        .cluster(cluster)
        .with_context(|| format!("failed to find cluster with name \"{cluster}\""))?;

    let (ipv4_subnet, ipv6_subnet) = docker::network_subnets(KIND_NETWORK)
        .await
        .context("inspecting the kind network")?;
    let ipv4_prefix = subnet::ipv4_subnet_prefix(&ipv4_subnet)?;
    let ipv6_prefix = subnet::ipv6_subnet_prefix(&ipv6_subnet)?;

    let manifests = render_manifests(cluster, record.id, &ipv4_prefix, &ipv6_prefix)?;
    let path = paths::lb_config_path(cluster);
    std::fs::write(&path, manifests)
        .with_context(|| format!("writing metallb config {}", path.display()))?;

    exec::run(&format!(
        "kubectl wait --for=condition=available --timeout=600s deployment -n {NAMESPACE} controller"
    ))
    .await
    .context("waiting for the metallb controller to be available")?;

    exec::run(&format!("kubectl apply -f {}", path.display()))
        .await
        .context("applying the address pool config to kubernetes")?;

    info!(cluster = %cluster, "load balancer configured");
    Ok(())
}

#[derive(Serialize)]
struct Metadata {
    name: String,
    namespace: &'static str,
}

#[derive(Serialize)]
struct IpAddressPool {
    #[serde(rename = "apiVersion")]
    api_version: &'static str,
    kind: &'static str,
    metadata: Metadata,
    spec: PoolSpec,
}

#[derive(Serialize)]
struct PoolSpec {
    addresses: Vec<String>,
}

#[derive(Serialize)]
struct L2Advertisement {
    #[serde(rename = "apiVersion")]
    api_version: &'static str,
    kind: &'static str,
    metadata: Metadata,
    spec: L2Spec,
}

#[derive(Serialize)]
struct L2Spec {
    #[serde(rename = "ipAddressPools")]
    ip_address_pools: Vec<String>,
}

/// Render the IPAddressPool and L2Advertisement for a cluster as one
/// multi-document YAML file.
fn render_manifests(cluster: &str, id: u32, ipv4_prefix: &str, ipv6_prefix: &str) -> Result<String> {
    let pool_name = format!("{cluster}-pool");

    let pool = IpAddressPool {
        api_version: "metallb.io/v1beta1",
        kind: "IPAddressPool",
        metadata: Metadata {
            name: pool_name.clone(),
            namespace: NAMESPACE,
        },
        spec: PoolSpec {
            addresses: vec![
                subnet::lb_ipv4_pool(ipv4_prefix, id),
                subnet::lb_ipv6_pool(ipv6_prefix, id),
            ],
        },
    };

    let advertisement = L2Advertisement {
        api_version: "metallb.io/v1beta1",
        kind: "L2Advertisement",
        metadata: Metadata {
            name: format!("{cluster}-l2"),
            namespace: NAMESPACE,
        },
        spec: L2Spec {
            ip_address_pools: vec![pool_name],
        },
    };

    let mut out = serde_yaml::to_string(&pool).context("encoding address pool")?;
    out.push_str("---\n");
    out.push_str(&serde_yaml::to_string(&advertisement).context("encoding l2 advertisement")?);
    Ok(out)
}
