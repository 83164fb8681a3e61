//! Lobby Server Binary
//!
//! Serves Bunga lobbies over HTTP and WebSocket.

use ::bunga::config::Config;
use ::bunga::hosting;
use clap::Parser;

#[tokio::main]
async fn main() {
    let config = Config::parse();
    ::bunga::log();
    ::bunga::kys();
    hosting::Server::run(config).await.unwrap();
}
