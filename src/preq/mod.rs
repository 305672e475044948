//! Prerequisite checks and installs. The list is fixed: the package
//! manager itself, the build chain for the vde network helpers, and
//! limactl with its sudoers file.

use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::exec;

const CORE: [&str; 6] = ["brew", "git", "make", "automake", "autoconf", "limactl"];
const VDE: [&str; 2] = ["vde_switch", "vde_vmnet"];

const VDE_PREFIX: &str = "/opt/vde/bin";
const LIMA_SUDOERS: &str = "/etc/sudoers.d/lima";

/// Names of prerequisites that are not installed yet.
pub fn missing() -> Vec<&'static str> {
    let mut missing = Vec::new();

    for bin in CORE {
        if !in_path(bin) {
            missing.push(bin);
            continue;
        }
        // limactl without its sudoers file can't manage the shared
        // network
        if bin == "limactl" && !Path::new(LIMA_SUDOERS).exists() {
            missing.push(bin);
        }
    }

    for tool in VDE {
        if !Path::new(VDE_PREFIX).join(tool).exists() {
            missing.push(tool);
        }
    }

    missing
}

/// Install a single missing prerequisite by name.
pub async fn install(name: &str) -> Result<()> {
    match name {
        "brew" => {
            exec::run(
                "/bin/bash -c '$(curl -fsSL https://raw.githubusercontent.com/Homebrew/install/HEAD/install.sh)'",
            )
            .await
        }
        "git" | "make" | "automake" | "autoconf" => exec::run(&format!("brew install {name}")).await,
        "limactl" => {
            let sudoers = format!("limactl sudoers | sudo tee {LIMA_SUDOERS}");
            exec::run_many(&["brew install lima", sudoers.as_str()]).await
        }
        "vde_switch" => {
            build_from_source(
                "https://github.com/virtualsquare/vde-2.git",
                "vde-2",
                &["autoreconf -fis", "./configure --prefix=/opt/vde", "make", "sudo make install"],
            )
            .await
        }
        "vde_vmnet" => {
            build_from_source(
                "https://github.com/lima-vm/vde_vmnet",
                "vde_vmnet",
                &["make PREFIX=/opt/vde", "sudo make PREFIX=/opt/vde install.bin"],
            )
            .await
        }
        other => bail!("don't know how to install \"{other}\""),
    }
}

/// Clone a repo into a scratch directory and run its build steps.
async fn build_from_source(repo: &str, dir: &str, steps: &[&str]) -> Result<()> {
    let build = tempfile::tempdir().context("creating build directory")?;

    let mut script = vec![
        format!("cd {}", build.path().display()),
        format!("git clone {repo}"),
        format!("cd {dir}"),
    ];
    script.extend(steps.iter().map(|s| s.to_string()));

    let script: Vec<&str> = script.iter().map(String::as_str).collect();
    exec::run_many(&script).await
}

fn in_path(bin: &str) -> bool {
    std::env::var_os("PATH")
        .map(|path| std::env::split_paths(&path).any(|dir| dir.join(bin).is_file()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_path_finds_shell() {
        assert!(in_path("sh"));
        assert!(!in_path("definitely-not-a-real-binary-kindvm"));
    }

    #[test]
    fn test_install_unknown_tool_fails() {
        let err = tokio::runtime::Runtime::new()
            .unwrap()
            .block_on(install("frobnicator"))
            .unwrap_err();
        assert!(err.to_string().contains("frobnicator"));
    }
}
