//! Typed kind cluster configuration: the user's config file with
//! kindvm's networking and registry-mirror overrides merged in.
//! Unknown user fields pass through untouched.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::net::subnet;
use crate::registry::Registry;

/// The slice of a kind config users are allowed to influence. Anything
/// not modelled here is carried through `rest` verbatim.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct UserClusterConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub nodes: Option<Value>,
    #[serde(default)]
    pub networking: Option<BTreeMap<String, Value>>,
    #[serde(flatten)]
    pub rest: BTreeMap<String, Value>,
}

impl UserClusterConfig {
    /// Load the user's config file, or start from an empty one.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading cluster config {}", path.display()))?;
        serde_yaml::from_str(&raw)
            .with_context(|| format!("parsing cluster config {}", path.display()))
    }
}

/// The full config handed to `kind create cluster`.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterConfig {
    pub kind: &'static str,
    #[serde(rename = "apiVersion")]
    pub api_version: &'static str,
    pub name: String,
    pub networking: BTreeMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Value>,
    #[serde(
        rename = "containerdConfigPatches",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub containerd_config_patches: Vec<String>,
    #[serde(flatten)]
    pub rest: BTreeMap<String, Value>,
}

impl ClusterConfig {
    /// Merge the user's config with the subnets derived from the
    /// instance id and the mirror patches for the enabled registries.
    pub fn merge(user: UserClusterConfig, name: &str, id: u32, mirrors: &[Registry]) -> Self {
        let mut networking = user.networking.unwrap_or_default();
        networking.insert(
            "serviceSubnet".to_string(),
            Value::from(subnet::service_subnet(id)),
        );
        networking.insert("podSubnet".to_string(), Value::from(subnet::pod_subnet(id)));

        let mut rest = user.rest;
        rest.remove("kind");
        rest.remove("apiVersion");

        Self {
            kind: "Cluster",
            api_version: "kind.x-k8s.io/v1alpha4",
            name: name.to_string(),
            networking,
            nodes: user.nodes,
            containerd_config_patches: mirrors.iter().map(Registry::containerd_patch).collect(),
            rest,
        }
    }

    pub fn render(&self) -> Result<String> {
        serde_yaml::to_string(self).context("encoding cluster config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::KNOWN;

    #[test]
    fn test_merge_injects_subnets() {
        let config = ClusterConfig::merge(UserClusterConfig::default(), "dev", 2, &[]);

        assert_eq!(
            config.networking.get("serviceSubnet"),
            Some(&Value::from("10.2.0.0/16"))
        );
        assert_eq!(
            config.networking.get("podSubnet"),
            Some(&Value::from("10.102.0.0/16"))
        );
    }

    #[test]
    fn test_merge_overrides_user_subnets_but_keeps_other_keys() {
        let user: UserClusterConfig = serde_yaml::from_str(
            "\
name: custom
networking:
  serviceSubnet: 10.96.0.0/16
  disableDefaultCNI: true
nodes:
  - role: control-plane
  - role: worker
featureGates:
  SomeGate: true
",
        )
        .unwrap();

        let config = ClusterConfig::merge(user, "custom", 0, &KNOWN);

        assert_eq!(
            config.networking.get("serviceSubnet"),
            Some(&Value::from("10.0.0.0/16"))
        );
        assert_eq!(
            config.networking.get("disableDefaultCNI"),
            Some(&Value::from(true))
        );
        assert!(config.nodes.is_some());
        assert!(config.rest.contains_key("featureGates"));
        assert_eq!(config.containerd_config_patches.len(), 3);
    }

    #[test]
    fn test_render_is_valid_kind_config() {
        let config = ClusterConfig::merge(UserClusterConfig::default(), "dev", 0, &KNOWN);
        let yaml = config.render().unwrap();

        assert!(yaml.contains("kind: Cluster"));
        assert!(yaml.contains("apiVersion: kind.x-k8s.io/v1alpha4"));
        assert!(yaml.contains("name: dev"));
        assert!(yaml.contains("serviceSubnet: 10.0.0.0/16"));
        assert!(yaml.contains("podSubnet: 10.100.0.0/16"));
        assert!(yaml.contains("dockerio-registry:5000"));

        // Round-trips through the user-side parser
        let back: UserClusterConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back.name.as_deref(), Some("dev"));
    }
}
