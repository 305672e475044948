use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use super::types::{ClusterRecord, VmRecord};

/// Hard cap on cluster instance ids: ids live in [0, MAX_CLUSTERS).
pub const MAX_CLUSTERS: usize = 99;

/// First host port handed out for a VM's docker engine.
pub const DOCKER_PORT_BASE: u16 = 2375;

#[derive(Debug, Default, Serialize, Deserialize)]
struct Tables {
    #[serde(default)]
    vms: Vec<VmRecord>,
    #[serde(default)]
    clusters: Vec<ClusterRecord>,
}

/// File-backed metadata store with two tables (vm, cluster).
///
/// The whole file is read into memory on open and rewritten atomically
/// on every mutation. An exclusive advisory lock is held for the life
/// of the store, so a second invocation against the same state file
/// fails fast instead of corrupting it. Single writer only; callers
/// must not assume any coordination beyond that.
pub struct Store {
    path: PathBuf,
    // Held for the lifetime of the store; released on drop.
    _lock: File,
    tables: Tables,
}

impl Store {
    /// Open (or create) the store at `path` and take the lock.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating directory {}", parent.display()))?;
        }

        let lock_path = path.with_extension("lock");
        let lock = File::create(&lock_path)
            .with_context(|| format!("creating lock file {}", lock_path.display()))?;
        lock.try_lock_exclusive()
            .with_context(|| format!("locking {} (is another kindvm running?)", lock_path.display()))?;

        let tables = match fs::read(&path) {
            Ok(bytes) if bytes.is_empty() => Tables::default(),
            Ok(bytes) => serde_json::from_slice(&bytes)
                .with_context(|| format!("parsing store file {}", path.display()))?,
            Err(e) if e.kind() == ErrorKind::NotFound => Tables::default(),
            Err(e) => {
                return Err(e).with_context(|| format!("reading store file {}", path.display()))
            }
        };

        Ok(Self {
            path,
            _lock: lock,
            tables,
        })
    }

    /// Rewrite the whole store file. Writes to a temp file in the same
    /// directory and renames over the target so readers never see a
    /// partial write.
    fn flush(&self) -> Result<()> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir).context("creating temp store file")?;
        serde_json::to_writer_pretty(&mut tmp, &self.tables).context("encoding store")?;
        tmp.persist(&self.path)
            .with_context(|| format!("replacing store file {}", self.path.display()))?;
        Ok(())
    }

    // vm table

    pub fn vms(&self) -> &[VmRecord] {
        &self.tables.vms
    }

    pub fn vm(&self, name: &str) -> Option<&VmRecord> {
        self.tables.vms.iter().find(|vm| vm.name == name)
    }

    pub fn insert_vm(&mut self, record: VmRecord) -> Result<()> {
        if self.vm(&record.name).is_some() {
            bail!("VM \"{}\" already exists", record.name);
        }
        self.tables.vms.push(record);
        self.flush()
    }

    pub fn remove_vm(&mut self, name: &str) -> Result<()> {
        let before = self.tables.vms.len();
        self.tables.vms.retain(|vm| vm.name != name);
        if self.tables.vms.len() == before {
            bail!("VM \"{name}\" not found");
        }
        self.flush()
    }

    /// Next VM id: max seen + 1, starting at 0.
    pub fn next_vm_id(&self) -> u32 {
        self.tables.vms.iter().map(|vm| vm.id + 1).max().unwrap_or(0)
    }

    /// Next docker port: max seen + 1, starting at DOCKER_PORT_BASE.
    pub fn next_docker_port(&self) -> u16 {
        self.tables
            .vms
            .iter()
            .map(|vm| vm.docker_port + 1)
            .max()
            .unwrap_or(DOCKER_PORT_BASE)
    }

    // cluster table

    pub fn clusters(&self) -> &[ClusterRecord] {
        &self.tables.clusters
    }

    /// Look up a cluster by name across all VMs (first match).
    pub fn cluster(&self, name: &str) -> Option<&ClusterRecord> {
        self.tables.clusters.iter().find(|c| c.name == name)
    }

    /// Look up a cluster by name within one VM. Names are only unique
    /// per VM, so this is the precise form.
    pub fn cluster_in_vm(&self, name: &str, vm: &str) -> Option<&ClusterRecord> {
        self.tables
            .clusters
            .iter()
            .find(|c| c.name == name && c.vm == vm)
    }

    pub fn insert_cluster(&mut self, record: ClusterRecord) -> Result<()> {
        if self.cluster_in_vm(&record.name, &record.vm).is_some() {
            bail!(
                "cluster \"{}\" already exists in VM \"{}\"",
                record.name,
                record.vm
            );
        }
        if record.id as usize >= MAX_CLUSTERS {
            bail!("cluster id {} is out of range", record.id);
        }
        self.tables.clusters.push(record);
        self.flush()
    }

    pub fn remove_cluster(&mut self, name: &str) -> Result<()> {
        let before = self.tables.clusters.len();
        self.tables.clusters.retain(|c| c.name != name);
        if self.tables.clusters.len() == before {
            bail!("cluster \"{name}\" not found");
        }
        self.flush()
    }

    /// Smallest unused cluster id in [0, MAX_CLUSTERS); error when all
    /// are taken.
    pub fn next_cluster_id(&self) -> Result<u32> {
        let mut used = [false; MAX_CLUSTERS];
        for cluster in &self.tables.clusters {
            if let Some(slot) = used.get_mut(cluster.id as usize) {
                *slot = true;
            }
        }

        used.iter()
            .position(|taken| !taken)
            .map(|id| id as u32)
            .ok_or_else(|| anyhow!("all {MAX_CLUSTERS} cluster ids are taken"))
    }
}
