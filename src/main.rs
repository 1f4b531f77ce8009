use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use commands::{
    connect, AuthCommand, CategoryCommand, ConfigCommand, ListCommand, PantryCommand,
    ProductCommand,
};
use config::Config;

#[derive(Parser)]
#[command(name = "larder")]
#[command(version)]
#[command(about = "Manage pantries and shopping lists from the command line", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in, log out, and show the current user
    Auth(AuthCommand),

    /// Manage product categories
    Category(CategoryCommand),

    /// Manage products
    Product(ProductCommand),

    /// Manage pantries and their items
    Pantry(PantryCommand),

    /// Manage shopping lists and their items
    List(ListCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "larder=warn,larder_core=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let cli_config_path = cli.config.clone();
    let config = Config::load(cli.config)?;

    let command = match cli.command {
        Some(command) => command,
        None => {
            println!("Use --help to see available commands");
            return Ok(());
        }
    };

    // Configuration commands work without a server
    if let Commands::Config(cmd) = &command {
        cmd.run(&config, cli_config_path)?;
        return Ok(());
    }

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(execute_command(&command, &config))
}

async fn execute_command(
    command: &Commands,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = connect(config)?;
    tracing::debug!(api_url = %config.api_url.value, "session ready");

    match command {
        Commands::Auth(cmd) => cmd.run(&session, config).await?,
        Commands::Category(cmd) => cmd.run(&session, config).await?,
        Commands::Product(cmd) => cmd.run(&session, config).await?,
        Commands::Pantry(cmd) => cmd.run(&session, config).await?,
        Commands::List(cmd) => cmd.run(&session, config).await?,
        Commands::Config(_) => {}
    }

    Ok(())
}
