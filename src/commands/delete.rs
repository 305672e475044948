use anyhow::Result;

use crate::cli::DeleteArgs;
use crate::store::Store;
use crate::{cluster, docker, paths};

pub async fn cmd_delete(args: DeleteArgs) -> Result<()> {
    let mut store = Store::open(paths::state_file())?;

    docker::use_context(&args.vm.vm_name).await?;

    cluster::delete(&mut store, &args.cluster_name).await
}
