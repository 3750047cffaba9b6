use std::sync::Arc;

use chatline::config::{self, ClientConfig, ConfigError, ControllerConfig};
use chatline::controller::ChatController;
use chatline::reply::{HttpReplyClient, ReplyError};
use chatline::stub;
use chatline::terminal::{TerminalSurface, run_interactive};
use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("reply client error: {0}")]
    Reply(#[from] ReplyError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Flags override the matching `CHAT_*` environment variables.
#[derive(Parser, Debug)]
#[command(name = "chatline", about = "Terminal chat client for a JSON reply service")]
struct Cli {
    /// Reply endpoint URL (`CHAT_ENDPOINT`).
    #[arg(long)]
    endpoint: Option<String>,

    /// Include this `user_id` in each request (`CHAT_USER_ID`).
    #[arg(long)]
    user_id: Option<String>,

    /// Text shown when a reply cannot be fetched (`CHAT_ERROR_TEXT`).
    #[arg(long)]
    error_text: Option<String>,

    /// Overall request timeout in seconds (`CHAT_REQUEST_TIMEOUT_SECS`).
    #[arg(long)]
    request_timeout_secs: Option<u64>,

    /// Hide the typing indicator (`CHAT_SHOW_INDICATOR=false`).
    #[arg(long, default_value_t = false)]
    no_indicator: bool,

    /// Send while a reply is pending; replies may arrive out of order
    /// (`CHAT_ALLOW_OVERLAP=true`).
    #[arg(long, default_value_t = false)]
    allow_overlap: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive chat on stdin/stdout (default).
    Chat,
    /// Run the local echo reply service.
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long, default_value_t = 5000)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    match cli.command {
        Some(Command::Serve { ref host, port }) => run_serve(host, port).await,
        Some(Command::Chat) | None => run_chat(&cli).await,
    }
}

async fn run_serve(host: &str, port: u16) -> Result<(), CliError> {
    let listener = tokio::net::TcpListener::bind(format!("{host}:{port}")).await?;
    stub::serve(listener).await?;
    Ok(())
}

async fn run_chat(cli: &Cli) -> Result<(), CliError> {
    let (client_config, controller_config) = resolve_config(cli)?;
    let endpoint = client_config.endpoint.clone();

    let replies = Arc::new(HttpReplyClient::new(client_config)?);
    let surface = Arc::new(TerminalSurface::new(std::io::stdout()));
    let controller = ChatController::new(surface.clone(), replies, controller_config);

    info!(%endpoint, "chat ready; type a message and press Enter, /quit to exit");
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    run_interactive(&controller, &*surface, stdin).await?;
    Ok(())
}

fn resolve_config(cli: &Cli) -> Result<(ClientConfig, ControllerConfig), ConfigError> {
    let mut client = ClientConfig::from_env()?;
    if let Some(endpoint) = &cli.endpoint {
        client.endpoint = config::validate_endpoint(endpoint)?;
    }
    if let Some(user_id) = &cli.user_id {
        client.user_id = Some(user_id.clone());
    }
    if let Some(secs) = cli.request_timeout_secs {
        client.request_timeout_secs = (secs > 0).then_some(secs);
    }

    let mut controller = ControllerConfig::from_env()?;
    if let Some(error_text) = &cli.error_text {
        controller.error_text.clone_from(error_text);
    }
    if cli.no_indicator {
        controller.show_indicator = false;
    }
    if cli.allow_overlap {
        controller.allow_overlap = true;
    }
    Ok((client, controller))
}
