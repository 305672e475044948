//! In-place kubeconfig patching. The file format belongs to kubectl;
//! only the `current-context` field is ever touched.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_yaml::{Mapping, Value};

/// Path to the kubeconfig file: $KUBECONFIG when set, ~/.kube/config
/// otherwise.
pub fn path() -> PathBuf {
    if let Ok(env) = std::env::var("KUBECONFIG") {
        if !env.is_empty() {
            return PathBuf::from(env);
        }
    }

    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".kube").join("config"))
        .unwrap_or_else(|| PathBuf::from(".kube/config"))
}

/// Point `current-context` at the given context, rewriting the file
/// only when it actually changes.
pub fn set_current_context(name: &str) -> Result<()> {
    set_current_context_at(&path(), name)
}

fn set_current_context_at(path: &Path, name: &str) -> Result<()> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading kubeconfig {}", path.display()))?;
    let mut doc: Mapping = serde_yaml::from_str(&raw)
        .with_context(|| format!("parsing kubeconfig {}", path.display()))?;

    if doc.get("current-context").and_then(Value::as_str) == Some(name) {
        return Ok(());
    }

    doc.insert(Value::from("current-context"), Value::from(name));

    let out = serde_yaml::to_string(&doc).context("serializing kubeconfig")?;
    fs::write(path, out).with_context(|| format!("writing kubeconfig {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = "\
apiVersion: v1
kind: Config
clusters: []
contexts: []
current-context: kind-old
";

    #[test]
    fn test_set_current_context_rewrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config");
        fs::write(&path, SAMPLE).unwrap();

        set_current_context_at(&path, "kind-dev").unwrap();

        let doc: Mapping = serde_yaml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            doc.get("current-context").and_then(Value::as_str),
            Some("kind-dev")
        );
    }

    #[test]
    fn test_set_current_context_noop_when_unchanged() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config");
        fs::write(&path, SAMPLE).unwrap();
        let before = fs::metadata(&path).unwrap().modified().unwrap();

        set_current_context_at(&path, "kind-old").unwrap();

        // Untouched file: same contents, byte for byte
        assert_eq!(fs::read_to_string(&path).unwrap(), SAMPLE);
        let after = fs::metadata(&path).unwrap().modified().unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_set_current_context_adds_missing_field() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config");
        fs::write(&path, "apiVersion: v1\nkind: Config\n").unwrap();

        set_current_context_at(&path, "kind-dev").unwrap();

        let doc: Mapping = serde_yaml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            doc.get("current-context").and_then(Value::as_str),
            Some("kind-dev")
        );
    }
}
