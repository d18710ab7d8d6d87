pub mod agent;
pub mod models;
pub mod server;
pub mod config;
pub mod llm;
pub mod cli;
pub mod relay;

use agent::ChatAgent;
use cli::Args;
use config::{ AppConfig, ModeConfig };
use llm::chat::new_client as new_chat_client;
use log::info;
use relay::RelayClient;
use server::{ api::Backend, Server };
use std::error::Error;

/// Wires the configured backend behind the HTTP server. Any configuration
/// problem is returned before a socket is bound.
pub fn build(config: &AppConfig) -> Result<Backend, Box<dyn Error + Send + Sync>> {
    let backend = match &config.mode {
        ModeConfig::Assembly(assembly) => {
            let chat_client = new_chat_client(&assembly.llm)?;
            Backend::Chat(ChatAgent::new(chat_client, assembly.persona.clone()))
        }
        ModeConfig::Relay { url } => {
            Backend::Relay(RelayClient::new(url.clone(), config.upstream_timeout)?)
        }
    };
    Ok(backend)
}

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = AppConfig::from_args(&args)?;

    info!("--- Core Configuration ---");
    info!("Server Address: {}", config.server_addr);
    info!("Proxy Mode: {}", config.proxy_mode());
    match &config.mode {
        ModeConfig::Assembly(assembly) => {
            info!("Chat Base URL: {}", args.chat_base_url);
            info!("Chat Model: {}", assembly.persona.model);
            info!("Persona: {}", assembly.persona_name);
            info!("Escape Input: {}", assembly.persona.escape_input);
        }
        ModeConfig::Relay { url } => {
            info!("Relay URL: {}", url);
        }
    }
    info!("CORS Origins: {}", args.cors_origins);
    match config.upstream_timeout {
        Some(timeout) => info!("Upstream Timeout: {}s", timeout.as_secs()),
        None => info!("Upstream Timeout: none"),
    }
    info!("TLS Enabled: {}", config.tls.is_some());
    info!("-------------------------");

    let backend = build(&config)?;
    let server = Server::new(config, backend);
    server.run().await?;

    Ok(())
}
