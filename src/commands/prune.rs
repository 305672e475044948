use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::cli::PruneArgs;
use crate::store::Store;
use crate::{exec, paths, vm};

/// Tear down VMs and local state. Best-effort throughout: individual
/// failures are logged and the prune keeps going.
pub async fn cmd_prune(args: PruneArgs) -> Result<()> {
    let mut store = Store::open(paths::state_file())?;

    if !args.all {
        let name = &args.vm.vm_name;
        if let Err(e) = vm::stop(name).await {
            warn!("failed to stop VM {name}: {e:#}");
        }
        if let Err(e) = vm::delete(&mut store, name).await {
            error!("failed to delete VM {name}: {e:#}");
        }
        return Ok(());
    }

    for name in vm::list(&store) {
        if let Err(e) = vm::stop(&name).await {
            warn!("failed to stop VM {name}: {e:#}");
        }
        if let Err(e) = vm::delete(&mut store, &name).await {
            error!("failed to delete VM {name}: {e:#}");
        }
    }

    // Release the store lock before deleting the directory it lives in
    drop(store);

    let base = paths::base_dir();
    if let Err(e) = std::fs::remove_dir_all(&base) {
        error!("failed to clean up {}: {e}", base.display());
        info!("you can remove {} manually", base.display());
    }

    if args.clean_lima {
        exec::run("limactl prune")
            .await
            .context("clearing the lima cache")
            .unwrap_or_else(|e| error!("{e:#}"));
    }

    Ok(())
}
