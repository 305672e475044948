//! Shared helpers for integration tests: stub external binaries on a
//! private PATH entry so no real VM/cluster tooling is needed.

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

/// Write an executable shell stub into `bin_dir`.
pub fn write_stub(bin_dir: &Path, name: &str, body: &str) {
    fs::create_dir_all(bin_dir).unwrap();

    let path = bin_dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();

    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
}

/// Put `bin_dir` in front of PATH so stubs shadow the real tools.
pub fn prepend_path(bin_dir: &Path) {
    let current = std::env::var_os("PATH").unwrap_or_default();

    let mut entries = vec![bin_dir.to_path_buf()];
    entries.extend(std::env::split_paths(&current));

    std::env::set_var("PATH", std::env::join_paths(entries).unwrap());
}
