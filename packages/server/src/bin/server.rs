//! Line-oriented broadcast chat server.
//!
//! Accepts raw TCP connections, asks each client for a name and broadcasts
//! every line it sends to all connected clients. Recent history is served
//! over HTTP at `/chat`.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin chatd-server
//! cargo run --bin chatd-server -- --conf-path chatd-conf.json
//! cargo run --bin chatd-server -- --address 0.0.0.0:6000 --http-address 0.0.0.0:8080
//! ```

use std::{path::PathBuf, sync::Arc};

use chatd_server::{
    config::ServerConfig,
    domain::ChatLog,
    infrastructure::{FileChatLog, OutboxPusher},
    ui::Server,
    usecase::ChatManager,
};
use chatd_shared::{logger::setup_logger, time::SystemClock};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "chatd-server")]
#[command(about = "Line-oriented broadcast chat server", long_about = None)]
struct Args {
    /// Configuration file path (JSON). Defaults are used when omitted.
    #[arg(short = 'c', long)]
    conf_path: Option<PathBuf>,

    /// Address of the raw TCP chat listener (overrides the config file)
    #[arg(short = 'a', long)]
    address: Option<String>,

    /// Address of the HTTP facade (overrides the config file)
    #[arg(long)]
    http_address: Option<String>,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    if let Err(e) = run(args).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    // Initialize dependencies in order:
    // 1. Config
    // 2. Chat log
    // 3. ChatManager
    // 4. Server

    // 1. Load config and apply command line overrides
    let mut config = match &args.conf_path {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    if let Some(address) = args.address {
        config.address = address;
    }
    if let Some(http_address) = args.http_address {
        config.http_address = http_address;
    }
    config.validate()?;

    // 2. Open the chat log, if configured
    let chat_log: Option<Arc<dyn ChatLog>> = match &config.log_path {
        Some(path) => {
            tracing::info!("Writing chat log to {}", path.display());
            Some(Arc::new(FileChatLog::open(path).await?))
        }
        None => None,
    };

    // 3. Create the ChatManager (one per server)
    let manager = Arc::new(ChatManager::new(
        Arc::new(OutboxPusher),
        chat_log,
        config.max_history_lines,
        Arc::new(SystemClock),
    ));

    // 4. Create and run the server
    Server::new(manager, config).run().await
}
