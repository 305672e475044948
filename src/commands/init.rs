use anyhow::{Context, Result};
use tracing::info;

use crate::cli::{CreateArgs, InitArgs};
use crate::store::Store;
use crate::{paths, vm};

/// First-time setup: prerequisites, VM, first cluster, networking.
pub async fn cmd_init(args: InitArgs) -> Result<()> {
    if !args.skip_preq_install {
        super::preq::run_install()
            .await
            .context("installing prerequisites")?;
    }

    let mut store = Store::open(paths::state_file())?;
    let vm_name = &args.vm.vm_name;

    let overrides = args.tune.to_overrides()?;
    vm::start(&mut store, vm_name, Some(overrides), true).await?;
    // Pick up the freshly provisioned docker engine and socket forward
    vm::restart(&mut store, vm_name).await?;

    super::create::run_create(
        &mut store,
        &CreateArgs {
            vm: args.vm.clone(),
            config: None,
            cluster_name: args.cluster_name.clone(),
            skip_registry_docker: false,
            skip_registry_quay: false,
            skip_registry_gcr: false,
        },
    )
    .await?;

    super::network::run_setup(&store, vm_name, false).await?;

    info!(vm = %vm_name, cluster = %args.cluster_name, "kindvm initialized");
    Ok(())
}
