use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::CreateArgs;
use crate::cluster::CreateOptions;
use crate::store::Store;
use crate::{cluster, docker, kubeconfig, paths, registry};

pub async fn cmd_create(args: CreateArgs) -> Result<()> {
    let mut store = Store::open(paths::state_file())?;
    run_create(&mut store, &args).await
}

/// Shared by `create` and `init`: point docker at the VM, make sure
/// the registry caches run, create the cluster, switch the kubeconfig
/// context.
pub(crate) async fn run_create(store: &mut Store, args: &CreateArgs) -> Result<()> {
    let vm_name = &args.vm.vm_name;

    // One docker context per VM, backed by the forwarded socket
    if !docker::context_exists(vm_name).await? {
        docker::create_context(
            vm_name,
            &format!("host=unix://{}", paths::docker_sock_path(vm_name).display()),
        )
        .await?;
    }
    docker::use_context(vm_name).await?;

    // Start every registry cache, regardless of the mirror flags; the
    // flags only decide which mirrors end up in the cluster config
    for reg in registry::KNOWN {
        reg.ensure()
            .await
            .with_context(|| format!("setting up registry cache {}", reg.name))?;

        if let Err(e) = reg.connect_to_kind_network().await {
            warn!("failed to connect {} to the kind network: {e:#}", reg.name);
        }
    }

    let opts = CreateOptions {
        config: args.config.clone(),
        name: Some(args.cluster_name.clone()),
        docker_registry: !args.skip_registry_docker,
        quay_registry: !args.skip_registry_quay,
        gcr_registry: !args.skip_registry_gcr,
    };

    let name = cluster::create(store, vm_name, opts).await?;

    kubeconfig::set_current_context(&format!("kind-{name}"))
        .context("switching kubeconfig context")?;

    info!(cluster = %name, "cluster ready");
    Ok(())
}
