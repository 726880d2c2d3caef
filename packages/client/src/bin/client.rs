//! Interactive chat client for chatd.
//!
//! Connects to the raw TCP chat port, prints everything the server sends and
//! sends each line typed at the prompt. The server first asks for a name.
//! Press Ctrl+C or Ctrl+D to leave.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin chatd-client
//! cargo run --bin chatd-client -- --address 127.0.0.1:6000
//! ```

use clap::Parser;

use chatd_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "chatd-client")]
#[command(about = "Line-oriented chat client", long_about = None)]
struct Args {
    /// Address of the chat server's raw TCP listener
    #[arg(short = 'a', long, default_value = "127.0.0.1:6000")]
    address: String,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "warn");

    let args = Args::parse();

    // Run the client
    if let Err(e) = chatd_client::run_client(&args.address).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
