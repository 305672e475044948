use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "kindvm",
    version,
    about = "Run up to 99 kind clusters inside a Linux VM"
)]
pub struct Cli {
    /// Base directory for configs and state (default: ~/.kindvm)
    #[arg(long, global = true)]
    pub base_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install prerequisites, start the VM and create a first cluster
    Init(InitArgs),
    /// Create a new kind cluster inside the VM
    Create(CreateArgs),
    /// Delete a kind cluster
    Delete(DeleteArgs),
    /// List kind clusters
    List(ListArgs),
    /// Stop and delete VMs and clean up local state
    Prune(PruneArgs),
    /// Print shell exports pointing docker at the VM's engine
    DockerEnv(VmNameArgs),
    /// Manage the VM
    Vm(VmArgs),
    /// Set up or tear down host/VM networking
    Network(NetworkArgs),
    /// Work with OCI images in a cluster
    Image(ImageArgs),
    /// Check or install prerequisites
    Preq(PreqArgs),
}

#[derive(Args, Debug, Clone)]
pub struct VmNameArgs {
    /// Name of the VM
    #[arg(long, default_value = "kindvm")]
    pub vm_name: String,
}

/// Tuning flags applied when a VM is first created.
#[derive(Args, Debug, Clone)]
pub struct VmTuneArgs {
    /// Number of CPUs assigned to the VM
    #[arg(long, default_value_t = 4)]
    pub cpu: u32,

    /// Memory assigned to the VM
    #[arg(long, default_value = "16GiB")]
    pub mem: String,

    /// Disk space assigned to the VM
    #[arg(long, default_value = "100GiB")]
    pub disk: String,

    /// VM architecture
    #[arg(long, value_enum)]
    pub arch: Option<ArchOpt>,

    /// Mounts in the form <PATH>:rw or <PATH>:ro (repeatable)
    #[arg(long = "mount")]
    pub mounts: Vec<String>,
}

#[derive(Args, Debug)]
pub struct InitArgs {
    #[command(flatten)]
    pub vm: VmNameArgs,

    #[command(flatten)]
    pub tune: VmTuneArgs,

    /// Name of the first cluster
    #[arg(long, default_value = "kindvm")]
    pub cluster_name: String,

    /// Skip the prerequisite install step
    #[arg(long)]
    pub skip_preq_install: bool,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    #[command(flatten)]
    pub vm: VmNameArgs,

    /// kind configuration file
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Name of the cluster (a name inside the config file wins)
    #[arg(long, default_value = "kindvm")]
    pub cluster_name: String,

    /// Skip the docker.io registry mirror
    #[arg(long)]
    pub skip_registry_docker: bool,

    /// Skip the quay.io registry mirror
    #[arg(long)]
    pub skip_registry_quay: bool,

    /// Skip the gcr.io registry mirror
    #[arg(long)]
    pub skip_registry_gcr: bool,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    #[command(flatten)]
    pub vm: VmNameArgs,

    /// Name of the cluster
    #[arg(long, default_value = "kindvm")]
    pub cluster_name: String,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub vm: VmNameArgs,

    /// List clusters of all VMs
    #[arg(long, short = 'A')]
    pub all: bool,
}

#[derive(Args, Debug)]
pub struct PruneArgs {
    #[command(flatten)]
    pub vm: VmNameArgs,

    /// Delete all VMs (pass --all=false to prune a single VM)
    #[arg(
        long,
        short = 'a',
        action = clap::ArgAction::Set,
        num_args = 0..=1,
        default_value_t = true,
        default_missing_value = "true"
    )]
    pub all: bool,

    /// Also clear the lima cache
    #[arg(long)]
    pub clean_lima: bool,
}

#[derive(Args, Debug)]
pub struct VmArgs {
    #[command(subcommand)]
    pub cmd: VmCommands,
}

#[derive(Subcommand, Debug)]
pub enum VmCommands {
    /// Start (or create) a VM
    Start(VmStartArgs),
    /// Stop a running VM
    Stop(VmNameArgs),
    /// Restart a VM
    Restart(VmNameArgs),
    /// Delete a stopped VM
    Delete(VmNameArgs),
    /// Show the status of the VM
    Status(VmStatusArgs),
    /// Print the list of VMs
    List,
    /// Open a shell in the VM
    Shell(VmShellArgs),
    /// Edit the VM config
    Edit(VmNameArgs),
    /// FIPS management
    Fips(FipsArgs),
}

#[derive(Args, Debug)]
pub struct VmStartArgs {
    #[command(flatten)]
    pub vm: VmNameArgs,

    #[command(flatten)]
    pub tune: VmTuneArgs,
}

#[derive(Args, Debug)]
pub struct VmStatusArgs {
    #[command(flatten)]
    pub vm: VmNameArgs,

    /// Show status of all VMs
    #[arg(long, short = 'A')]
    pub all: bool,
}

#[derive(Args, Debug)]
pub struct VmShellArgs {
    #[command(flatten)]
    pub vm: VmNameArgs,

    /// Command to run inside the VM
    #[arg(trailing_var_arg = true)]
    pub args: Vec<String>,
}

#[derive(Args, Debug)]
pub struct FipsArgs {
    #[command(subcommand)]
    pub cmd: FipsCommands,
}

#[derive(Subcommand, Debug)]
pub enum FipsCommands {
    /// Check if FIPS is enabled in the VM
    Check(VmNameArgs),
}

#[derive(Args, Debug)]
pub struct NetworkArgs {
    #[command(subcommand)]
    pub cmd: NetworkCommands,
}

#[derive(Subcommand, Debug)]
pub enum NetworkCommands {
    /// Set up end-to-end networking with the cluster network
    Setup(NetworkSetupArgs),
    /// Remove the host route added by setup
    Cleanup(VmNameArgs),
}

#[derive(Args, Debug)]
pub struct NetworkSetupArgs {
    #[command(flatten)]
    pub vm: VmNameArgs,

    /// Don't ask before escalating privileges
    #[arg(long, short)]
    pub yes: bool,
}

#[derive(Args, Debug)]
pub struct ImageArgs {
    #[command(subcommand)]
    pub cmd: ImageCommands,
}

#[derive(Subcommand, Debug)]
pub enum ImageCommands {
    /// Load an OCI image into a cluster
    Load(ImageLoadArgs),
}

#[derive(Args, Debug)]
pub struct ImageLoadArgs {
    /// Image to load
    pub image: String,

    /// Target cluster (default: kindvm)
    pub cluster: Option<String>,
}

#[derive(Args, Debug)]
pub struct PreqArgs {
    #[command(subcommand)]
    pub cmd: PreqCommands,
}

#[derive(Subcommand, Debug)]
pub enum PreqCommands {
    /// Check prerequisites without installing anything
    Check,
    /// Install missing prerequisites
    Install,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, ValueEnum)]
pub enum ArchOpt {
    #[value(name = "x86_64")]
    X86_64,
    #[value(name = "aarch64")]
    Aarch64,
}
