//! End-to-end cluster creation against stub external tools: two
//! clusters on a fresh store must get ids 0 and 1 and non-overlapping
//! subnets.

mod common;

use std::fs;

use kindvm::cluster::{self, CreateOptions};
use kindvm::store::Store;
use kindvm::paths;
use tempfile::TempDir;

#[tokio::test]
async fn test_create_two_clusters_allocates_disjoint_subnets() {
    let tmp = TempDir::new().unwrap();
    paths::init_base_dir(Some(&tmp.path().join("base")));
    paths::ensure_layout().unwrap();

    let bin = tmp.path().join("bin");
    let log = tmp.path().join("kind.log");

    common::write_stub(&bin, "kind", &format!("echo \"$*\" >> {}", log.display()));
    common::write_stub(&bin, "kubectl", "exit 0");
    common::write_stub(
        &bin,
        "docker",
        r#"case "$*" in
  *"network inspect"*) echo '[{"Subnet":"172.18.0.0/16","Gateway":"172.18.0.1"},{"Subnet":"fc00:f853:ccd:e793::/64"}]' ;;
  *) exit 0 ;;
esac"#,
    );
    common::prepend_path(&bin);

    let mut store = Store::open(paths::state_file()).unwrap();

    let opts = |name: &str| CreateOptions {
        name: Some(name.to_string()),
        ..Default::default()
    };

    let a = cluster::create(&mut store, "kindvm", opts("a")).await.unwrap();
    let b = cluster::create(&mut store, "kindvm", opts("b")).await.unwrap();
    assert_eq!(a, "a");
    assert_eq!(b, "b");

    // First-fit allocation on a fresh store
    assert_eq!(store.cluster("a").unwrap().id, 0);
    assert_eq!(store.cluster("b").unwrap().id, 1);

    // Derived subnets land in the rendered configs and never overlap
    let cfg_a = fs::read_to_string(paths::cluster_config_path("a")).unwrap();
    assert!(cfg_a.contains("serviceSubnet: 10.0.0.0/16"));
    assert!(cfg_a.contains("podSubnet: 10.100.0.0/16"));

    let cfg_b = fs::read_to_string(paths::cluster_config_path("b")).unwrap();
    assert!(cfg_b.contains("serviceSubnet: 10.1.0.0/16"));
    assert!(cfg_b.contains("podSubnet: 10.101.0.0/16"));

    // Load-balancer pools are offset by id inside the bridge subnets
    let lb_a = fs::read_to_string(paths::lb_config_path("a")).unwrap();
    assert!(lb_a.contains("172.18.1.0/24"));
    assert!(lb_a.contains("fc00:f853:ccd:e793:1::/120"));

    let lb_b = fs::read_to_string(paths::lb_config_path("b")).unwrap();
    assert!(lb_b.contains("172.18.2.0/24"));
    assert!(lb_b.contains("fc00:f853:ccd:e793:2::/120"));

    // The cluster tool was actually driven, once per cluster
    let kind_log = fs::read_to_string(&log).unwrap();
    let creates: Vec<&str> = kind_log
        .lines()
        .filter(|l| l.starts_with("create cluster"))
        .collect();
    assert_eq!(creates.len(), 2);

    // Duplicate names within the VM are rejected
    let err = cluster::create(&mut store, "kindvm", opts("a"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("already exists"));

    // Deleting removes the record, the config file and frees the id
    cluster::delete(&mut store, "a").await.unwrap();
    assert!(store.cluster("a").is_none());
    assert!(!paths::cluster_config_path("a").exists());
    assert_eq!(store.next_cluster_id().unwrap(), 0);
}
