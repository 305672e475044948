//! Networking setup idempotency against stub tools: running setup
//! twice must not add the forwarding rule twice, because the rule is
//! probed with a check before it is appended.

mod common;

use std::fs;
use std::path::PathBuf;

use kindvm::store::{Store, VmRecord};
use kindvm::{net, paths};
use tempfile::TempDir;

#[tokio::test]
async fn test_setup_is_idempotent_and_cleanup_removes_route() {
    let tmp = TempDir::new().unwrap();
    paths::init_base_dir(Some(&tmp.path().join("base")));
    paths::ensure_layout().unwrap();

    let bin = tmp.path().join("bin");
    let state = tmp.path().join("stub-state");
    fs::create_dir_all(&state).unwrap();
    std::env::set_var("KINDVM_TEST_DIR", &state);

    // limactl stub: reports the kind bridge interface, and keeps the
    // forwarding rule in a marker file so -C/-A behave like iptables
    common::write_stub(
        &bin,
        "limactl",
        r#"case "$*" in
  *"ip -o link show"*) echo "5: br-ab12cd34ef: <BROADCAST,MULTICAST,UP>" ;;
  *"iptables -t filter -C"*) [ -f "$KINDVM_TEST_DIR/forward-rule" ] || exit 1 ;;
  *"iptables -t filter -A"*) touch "$KINDVM_TEST_DIR/forward-rule"; echo "append $*" >> "$KINDVM_TEST_DIR/iptables.log" ;;
  *) exit 0 ;;
esac"#,
    );
    // sudo stub: records route manipulation instead of touching the host
    common::write_stub(&bin, "sudo", r#"echo "$*" >> "$KINDVM_TEST_DIR/sudo.log""#);
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
    store
        .insert_vm(VmRecord::new(
            0,
            "kindvm",
            PathBuf::from("/tmp/kindvm.yaml"),
            2375,
        ))
        .unwrap();

    net::setup(&store, "kindvm").await.unwrap();
    net::setup(&store, "kindvm").await.unwrap();

    // The forwarding rule was appended exactly once
    let iptables_log = fs::read_to_string(state.join("iptables.log")).unwrap();
    assert_eq!(iptables_log.lines().count(), 1);

    // The host route targets the VM's derived address
    let sudo_log = fs::read_to_string(state.join("sudo.log")).unwrap();
    let adds: Vec<&str> = sudo_log
        .lines()
        .filter(|l| l.starts_with("route -nv add"))
        .collect();
    assert_eq!(adds.len(), 2);
    assert!(adds[0].contains("-net 172.18 192.168.105.10"));

    net::cleanup(&store, "kindvm").await.unwrap();

    let sudo_log = fs::read_to_string(state.join("sudo.log")).unwrap();
    let deletes: Vec<&str> = sudo_log
        .lines()
        .filter(|l| l.starts_with("route -nv delete"))
        .collect();
    assert_eq!(deletes.len(), 1);
    assert!(deletes[0].contains("-net 172.18 192.168.105.10"));
}

#[tokio::test]
async fn test_setup_fails_for_unknown_vm() {
    // Runs in the same process as the test above; base dir and PATH
    // are already pinned there, so only the store matters here.
    let tmp = TempDir::new().unwrap();
    let store = Store::open(tmp.path().join("state.json")).unwrap();

    let err = net::setup(&store, "ghost").await.unwrap_err();
    assert!(format!("{err:#}").contains("ghost"));
}
