use anyhow::Result;

use crate::cli::{FipsCommands, VmArgs, VmCommands};
use crate::store::Store;
use crate::{paths, vm};

pub async fn cmd_vm(args: VmArgs) -> Result<()> {
    match args.cmd {
        VmCommands::Start(args) => {
            let mut store = Store::open(paths::state_file())?;
            let overrides = args.tune.to_overrides()?;
            vm::start(&mut store, &args.vm.vm_name, Some(overrides), true).await
        }
        VmCommands::Stop(args) => vm::stop(&args.vm_name).await,
        VmCommands::Restart(args) => {
            let mut store = Store::open(paths::state_file())?;
            vm::restart(&mut store, &args.vm_name).await
        }
        VmCommands::Delete(args) => {
            let mut store = Store::open(paths::state_file())?;
            vm::delete(&mut store, &args.vm_name).await
        }
        VmCommands::Status(args) => {
            let name = if args.all { "" } else { args.vm.vm_name.as_str() };
            let status = vm::status(name).await?;
            println!("{status}");
            Ok(())
        }
        VmCommands::List => {
            let store = Store::open(paths::state_file())?;
            for name in vm::list(&store) {
                println!("{name}");
            }
            Ok(())
        }
        VmCommands::Shell(args) => vm::shell(&args.vm.vm_name, &args.args).await,
        VmCommands::Edit(args) => vm::edit(&args.vm_name).await,
        VmCommands::Fips(args) => match args.cmd {
            FipsCommands::Check(args) => {
                if vm::fips_check(&args.vm_name).await? {
                    println!("FIPS is enabled in the VM");
                } else {
                    println!("FIPS is not enabled in the VM");
                }
                Ok(())
            }
        },
    }
}
