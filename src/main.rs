use anyhow::Result;
use clap::Parser;
use kindvm::cli::Commands;
use kindvm::{cli, commands, paths};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Initialize base directory from CLI argument (must be done before any path access)
    paths::init_base_dir(cli.base_dir.as_deref());
    paths::ensure_layout()?;

    // Initialize logging; only use colors when outputting to a TTY (not when piped to file)
    let use_color = atty::is(atty::Stream::Stdout);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_target(false)
        .with_ansi(use_color)
        .init();

    // Dispatch to appropriate command handler
    let result = match cli.cmd {
        Commands::Init(args) => commands::cmd_init(args).await,
        Commands::Create(args) => commands::cmd_create(args).await,
        Commands::Delete(args) => commands::cmd_delete(args).await,
        Commands::List(args) => commands::cmd_list(args).await,
        Commands::Prune(args) => commands::cmd_prune(args).await,
        Commands::DockerEnv(args) => commands::cmd_docker_env(args).await,
        Commands::Vm(args) => commands::cmd_vm(args).await,
        Commands::Network(args) => commands::cmd_network(args).await,
        Commands::Image(args) => commands::cmd_image(args).await,
        Commands::Preq(args) => commands::cmd_preq(args).await,
    };

    // Handle errors
    if let Err(e) = &result {
        error!("Error: {:#}", e);
        std::process::exit(1);
    }

    result
}
