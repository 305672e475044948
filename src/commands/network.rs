use std::io::Write;

use anyhow::{bail, Context, Result};
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, warn};

use crate::cli::{NetworkArgs, NetworkCommands};
use crate::store::Store;
use crate::{net, paths};

pub async fn cmd_network(args: NetworkArgs) -> Result<()> {
    let store = Store::open(paths::state_file())?;

    match args.cmd {
        NetworkCommands::Setup(args) => run_setup(&store, &args.vm.vm_name, args.yes).await,
        NetworkCommands::Cleanup(args) => net::cleanup(&store, &args.vm_name).await,
    }
}

/// Run networking setup, racing it against SIGINT/SIGTERM. An
/// interrupt mid-setup triggers a one-shot cleanup so no half-added
/// route is left behind.
pub(crate) async fn run_setup(store: &Store, vm_name: &str, assume_yes: bool) -> Result<()> {
    if !assume_yes && !confirm()? {
        return Ok(());
    }

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        res = net::setup(store, vm_name) => res,
        _ = sigint.recv() => interrupted(store, vm_name).await,
        _ = sigterm.recv() => interrupted(store, vm_name).await,
    }
}

async fn interrupted(store: &Store, vm_name: &str) -> Result<()> {
    warn!("interrupted, rolling back network changes");

    if let Err(e) = net::cleanup(store, vm_name).await {
        error!("failed to clean up networking: {e:#}");
        warn!("please clean up manually: `kindvm network cleanup --vm-name {vm_name}`");
    }

    bail!("network setup interrupted")
}

fn confirm() -> Result<bool> {
    print!(
        "Warning: managing routes requires privilege escalation and will ask for your password. Continue? [y/n]: "
    );
    std::io::stdout().flush().context("flushing stdout")?;

    let mut input = String::new();
    std::io::stdin()
        .read_line(&mut input)
        .context("reading confirmation")?;

    Ok(input.trim().eq_ignore_ascii_case("y"))
}
