pub mod cli;
pub mod config;
pub mod history;
pub mod limiter;
pub mod llm;
pub mod models;
pub mod server;
pub mod sse;
pub mod widget;

use cli::Args;
use log::info;
use std::error::Error;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Allowed Origin: {}", args.allowed_origin);
    info!("Upstream URL: {}", args.upstream_url);
    info!("Chat Model: {}", args.model);
    info!("Max Tokens: {}", args.max_tokens);
    info!("Temperature: {}", args.temperature);
    info!("Rate Limit: {} requests per {}s window", args.rate_limit, args.rate_window_secs);
    info!("Client IP Header: {}", args.client_ip_header);
    info!("TLS Enabled: {}", args.enable_tls);
    info!("-------------------------");

    server::run_server(args).await
}
