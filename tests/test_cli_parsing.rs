// Focused CLI parsing tests (tests command-line parsing only, not business logic)

use clap::Parser;
use kindvm::cli::{Cli, Commands, NetworkCommands, VmCommands};

#[test]
fn test_all_commands_parse() {
    let test_cases = vec![
        vec!["kindvm", "init"],
        vec!["kindvm", "init", "--skip-preq-install", "--cpu", "8"],
        vec!["kindvm", "create", "--config", "cluster.yaml"],
        vec!["kindvm", "create", "--cluster-name", "dev", "--skip-registry-gcr"],
        vec!["kindvm", "delete", "--cluster-name", "dev"],
        vec!["kindvm", "list", "-A"],
        vec!["kindvm", "prune", "--clean-lima"],
        vec!["kindvm", "docker-env", "--vm-name", "other"],
        vec!["kindvm", "vm", "start", "--mem", "8GiB", "--arch", "aarch64"],
        vec!["kindvm", "vm", "stop"],
        vec!["kindvm", "vm", "restart"],
        vec!["kindvm", "vm", "status", "-A"],
        vec!["kindvm", "vm", "list"],
        vec!["kindvm", "vm", "shell", "--vm-name", "other", "--", "ls", "-la"],
        vec!["kindvm", "vm", "edit"],
        vec!["kindvm", "vm", "fips", "check"],
        vec!["kindvm", "network", "setup", "--yes"],
        vec!["kindvm", "network", "cleanup"],
        vec!["kindvm", "image", "load", "nginx:latest", "dev"],
        vec!["kindvm", "preq", "check"],
        vec!["kindvm", "preq", "install"],
    ];

    for args in test_cases {
        Cli::try_parse_from(&args).unwrap_or_else(|e| panic!("failed to parse {args:?}: {e}"));
    }
}

#[test]
fn test_create_with_all_options() {
    let cli = Cli::try_parse_from([
        "kindvm",
        "create",
        "--vm-name",
        "other",
        "--cluster-name",
        "dev",
        "--config",
        "cluster.yaml",
        "--skip-registry-docker",
        "--skip-registry-quay",
    ])
    .unwrap();

    match cli.cmd {
        Commands::Create(args) => {
            assert_eq!(args.vm.vm_name, "other");
            assert_eq!(args.cluster_name, "dev");
            assert_eq!(args.config.unwrap().to_str(), Some("cluster.yaml"));
            assert!(args.skip_registry_docker);
            assert!(args.skip_registry_quay);
            assert!(!args.skip_registry_gcr);
        }
        _ => panic!("expected create command"),
    }
}

#[test]
fn test_defaults() {
    let cli = Cli::try_parse_from(["kindvm", "create"]).unwrap();
    match cli.cmd {
        Commands::Create(args) => {
            assert_eq!(args.vm.vm_name, "kindvm");
            assert_eq!(args.cluster_name, "kindvm");
            assert!(args.config.is_none());
        }
        _ => panic!("expected create command"),
    }

    let cli = Cli::try_parse_from(["kindvm", "vm", "start"]).unwrap();
    match cli.cmd {
        Commands::Vm(args) => match args.cmd {
            VmCommands::Start(args) => {
                assert_eq!(args.tune.cpu, 4);
                assert_eq!(args.tune.mem, "16GiB");
                assert_eq!(args.tune.disk, "100GiB");
                assert!(args.tune.arch.is_none());
                assert!(args.tune.mounts.is_empty());
            }
            _ => panic!("expected vm start"),
        },
        _ => panic!("expected vm command"),
    }
}

#[test]
fn test_prune_all_flag() {
    let cli = Cli::try_parse_from(["kindvm", "prune"]).unwrap();
    match cli.cmd {
        Commands::Prune(args) => assert!(args.all),
        _ => panic!("expected prune command"),
    }

    let cli = Cli::try_parse_from(["kindvm", "prune", "--all=false", "--vm-name", "other"]).unwrap();
    match cli.cmd {
        Commands::Prune(args) => {
            assert!(!args.all);
            assert_eq!(args.vm.vm_name, "other");
        }
        _ => panic!("expected prune command"),
    }
}

#[test]
fn test_network_setup_args() {
    let cli = Cli::try_parse_from(["kindvm", "network", "setup"]).unwrap();
    match cli.cmd {
        Commands::Network(args) => match args.cmd {
            NetworkCommands::Setup(args) => {
                assert_eq!(args.vm.vm_name, "kindvm");
                assert!(!args.yes);
            }
            _ => panic!("expected network setup"),
        },
        _ => panic!("expected network command"),
    }
}

#[test]
fn test_invalid_arch_rejected() {
    assert!(Cli::try_parse_from(["kindvm", "vm", "start", "--arch", "riscv"]).is_err());
}

#[test]
fn test_base_dir_is_global() {
    let cli = Cli::try_parse_from(["kindvm", "list", "--base-dir", "/tmp/kv"]).unwrap();
    assert_eq!(cli.base_dir.unwrap().to_str(), Some("/tmp/kv"));
}
