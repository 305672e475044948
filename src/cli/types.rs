use anyhow::Result;

use super::args::{ArchOpt, VmTuneArgs};
use crate::vm::{Arch, Mount, VmOverrides};

impl From<ArchOpt> for Arch {
    fn from(arch: ArchOpt) -> Self {
        match arch {
            ArchOpt::X86_64 => Arch::X86_64,
            ArchOpt::Aarch64 => Arch::Aarch64,
        }
    }
}

impl VmTuneArgs {
    /// Turn the CLI tuning flags into VM overrides, parsing mounts.
    pub fn to_overrides(&self) -> Result<VmOverrides> {
        let mounts = self
            .mounts
            .iter()
            .map(|raw| Mount::parse(raw))
            .collect::<Result<Vec<_>>>()?;

        Ok(VmOverrides {
            cpus: self.cpu,
            memory: self.mem.clone(),
            disk: self.disk.clone(),
            arch: self.arch.map(Arch::from),
            mounts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arch_opt_conversion() {
        assert_eq!(Arch::from(ArchOpt::X86_64), Arch::X86_64);
        assert_eq!(Arch::from(ArchOpt::Aarch64), Arch::Aarch64);
    }

    #[test]
    fn test_to_overrides_parses_mounts() {
        let tune = VmTuneArgs {
            cpu: 2,
            mem: "4GiB".to_string(),
            disk: "20GiB".to_string(),
            arch: Some(ArchOpt::Aarch64),
            mounts: vec!["/src:rw".to_string(), "/data:ro".to_string()],
        };

        let overrides = tune.to_overrides().unwrap();
        assert_eq!(overrides.cpus, 2);
        assert_eq!(overrides.arch, Some(Arch::Aarch64));
        assert_eq!(overrides.mounts.len(), 2);
        assert!(overrides.mounts[0].writable);
        assert!(!overrides.mounts[1].writable);
    }
}
