mod ask_cmd;
mod chat_cmd;
mod config;
mod config_cmd;
mod terminal_output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;

use config::Overrides;

#[derive(Parser)]
#[command(name = "streamchat")]
#[command(about = "Stream replies from an OpenAI-compatible chat endpoint")]
#[command(version)]
struct Cli {
    /// Path to the config file (default: ~/.streamchat/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Chat-completions URL, overriding the config file
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Model name, overriding the config file
    #[arg(long, global = true)]
    model: Option<String>,

    /// Log level or filter directive (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one message without history and stream the reply
    Ask {
        message: String,

        /// Maximum completion tokens for this request
        #[arg(long)]
        max_tokens: Option<u32>,

        /// System prompt for this request
        #[arg(long)]
        system: Option<String>,

        /// Print the request body before sending it
        #[arg(long)]
        show_request: bool,
    },
    /// Interactive chat on stdin
    Chat {
        /// Send every turn without earlier exchanges
        #[arg(long)]
        stateless: bool,
    },
    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective config with secrets masked
    Show,
    /// Write a config file with default values
    Init {
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Error bodies can echo request headers.
            terminal_output::print_error(&streamchat_logging::redact_sensitive_data(&format!("{err:#}")));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let overrides = Overrides {
        config_path: cli.config,
        endpoint: cli.endpoint,
        model: cli.model,
        log_level: cli.log_level,
    };
    let path = overrides.config_path();

    // `config init` must work even when the existing file is invalid.
    if let Commands::Config { action: ConfigAction::Init { force } } = cli.command {
        streamchat_logging::init_logger(None, overrides.log_level.as_deref().unwrap_or("warn"));
        return config_cmd::init(&path, force).await;
    }

    let config = config::load(&overrides).await?;
    let logging = config.logging.clone().unwrap_or_default();
    streamchat_logging::init_logger(
        logging.dir.as_deref().map(std::path::Path::new),
        logging.level.as_deref().unwrap_or("warn"),
    );
    debug!(path = %path.display(), "Configuration loaded");

    match cli.command {
        Commands::Ask {
            message,
            max_tokens,
            system,
            show_request,
        } => {
            ask_cmd::run(
                &config,
                ask_cmd::AskArgs {
                    message,
                    max_tokens,
                    system,
                    show_request,
                },
            )
            .await
        }
        Commands::Chat { stateless } => chat_cmd::run(&config, stateless).await,
        Commands::Config { action: ConfigAction::Show } => config_cmd::show(&config, &path),
        Commands::Config { action: ConfigAction::Init { force } } => config_cmd::init(&path, force).await,
    }
}
