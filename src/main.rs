use anyhow::Result;
use cargobot_personas::cli::{cmd_personas, cmd_run, init_logging, runtime, RunArgs};
use cargobot_personas::load_config;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "cargobot-personas")]
#[command(about = "Scripted usability personas for the CargoBot puzzle game")]
#[command(version, long_version = runtime::long_version())]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Enable debug mode
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the personas one after another (default)
    Run(RunArgs),

    /// List the compiled-in personas
    Personas,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level, cli.debug)?;

    let result = match cli.command.unwrap_or(Commands::Run(RunArgs::default())) {
        Commands::Personas => cmd_personas(),
        Commands::Run(args) => {
            info!("Starting cargobot-personas v{}", env!("CARGO_PKG_VERSION"));
            match load_config(cli.config.as_deref()).await {
                Ok(loaded) => cmd_run(args, &loaded.config).await,
                Err(err) => Err(err),
            }
        }
    };

    match result {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Command failed: {:#}", e);
            std::process::exit(1);
        }
    }
}
