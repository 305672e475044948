use anyhow::{Context, Result};

use crate::cli::VmNameArgs;
use crate::store::Store;
use crate::paths;

/// Print shell exports pointing the docker CLI at the VM's engine.
/// Meant for `eval "$(kindvm docker-env)"`.
pub async fn cmd_docker_env(args: VmNameArgs) -> Result<()> {
    let store = Store::open(paths::state_file())?;
    let vm = store
        .vm(&args.vm_name)
        .with_context(|| format!("VM \"{}\" not found", args.vm_name))?;

    println!(
        "export DOCKER_HOST=\"unix://{}\"",
        paths::docker_sock_path(&vm.name).display()
    );
    println!("export DOCKER_CONTEXT=\"{}\"", vm.name);

    Ok(())
}
