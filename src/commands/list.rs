use anyhow::Result;

use crate::cli::ListArgs;
use crate::store::Store;
use crate::{cluster, paths};

pub async fn cmd_list(args: ListArgs) -> Result<()> {
    let store = Store::open(paths::state_file())?;

    let vm_filter = if args.all {
        None
    } else {
        Some(args.vm.vm_name.as_str())
    };

    for name in cluster::list(&store, vm_filter) {
        println!("{name}");
    }

    Ok(())
}
