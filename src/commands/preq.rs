use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::cli::{PreqArgs, PreqCommands};
use crate::preq;

pub async fn cmd_preq(args: PreqArgs) -> Result<()> {
    match args.cmd {
        PreqCommands::Check => {
            let missing = preq::missing();
            for name in &missing {
                warn!("{name} missing");
            }

            if missing.is_empty() {
                info!("all prerequisites satisfied");
            } else {
                error!("prerequisites not satisfied");
            }
            Ok(())
        }
        PreqCommands::Install => run_install().await,
    }
}

/// Install every missing prerequisite, failing fast on the first error.
pub(crate) async fn run_install() -> Result<()> {
    for name in preq::missing() {
        info!("{name} missing: attempting to install");
        preq::install(name)
            .await
            .with_context(|| format!("installing {name}"))?;
        info!("installed {name}");
    }

    info!("all prerequisites satisfied");
    Ok(())
}
