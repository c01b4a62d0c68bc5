//! RIFT Server - Entry Point
//!
//! A Rust file-transfer server speaking a length-prefixed framing protocol
//! with per-user storage namespaces.

use log::{error, info};

use rift_server::{Server, ServerConfig};

#[tokio::main]
async fn main() {
    // Initialize the logger (env_logger picks up RUST_LOG environment variable)
    env_logger::init();

    let config = match ServerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    info!("Launching RIFT file server...");

    match Server::bind(config).await {
        Ok(server) => server.run().await,
        Err(e) => {
            error!("Server startup failed: {e}");
            std::process::exit(1);
        }
    }
}
