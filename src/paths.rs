use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};

static BASE_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Initialize the base directory from the CLI override.
///
/// Must be called before any other path accessor; later calls are ignored.
pub fn init_base_dir(override_dir: Option<&Path>) {
    let dir = match override_dir {
        Some(dir) => dir.to_path_buf(),
        None => default_base_dir(),
    };
    let _ = BASE_DIR.set(dir);
}

fn default_base_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".kindvm"))
        .unwrap_or_else(|| PathBuf::from(".kindvm"))
}

/// Base directory for all kindvm data
pub fn base_dir() -> PathBuf {
    BASE_DIR.get_or_init(default_base_dir).clone()
}

/// Create the directory layout under the base directory
pub fn ensure_layout() -> Result<()> {
    for dir in [base_dir(), cluster_dir(), lb_dir()] {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("creating directory {}", dir.display()))?;
    }
    Ok(())
}

/// Path to the metadata store file
pub fn state_file() -> PathBuf {
    base_dir().join("state.json")
}

/// Path to the rendered lima config for a VM
pub fn vm_config_path(vm: &str) -> PathBuf {
    base_dir().join(format!("{vm}.yaml"))
}

/// Host-side docker socket forwarded out of a VM
pub fn docker_sock_path(vm: &str) -> PathBuf {
    base_dir().join(format!("{vm}.sock"))
}

/// Directory for rendered kind cluster configs
pub fn cluster_dir() -> PathBuf {
    base_dir().join("kind")
}

pub fn cluster_config_path(cluster: &str) -> PathBuf {
    cluster_dir().join(format!("{cluster}.yaml"))
}

/// Directory for rendered load-balancer manifests
pub fn lb_dir() -> PathBuf {
    base_dir().join("metallb")
}

pub fn lb_config_path(cluster: &str) -> PathBuf {
    lb_dir().join(format!("{cluster}.yaml"))
}

/// Path to the rendered config for a registry-cache container
pub fn registry_config_path(registry: &str) -> PathBuf {
    base_dir().join(format!("{registry}.yaml"))
}
