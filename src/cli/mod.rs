use clap::Parser;
use crate::llm::{ DEFAULT_CHAT_MODEL, DEFAULT_GROQ_BASE_URL };

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Deployment ---
    /// Which endpoint to serve: `assembly` (persona-guided chat) or `relay` (opaque pass-through)
    #[arg(long, env = "PROXY_MODE", default_value = "assembly")]
    pub mode: String,

    /// Host address and port for the server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "0.0.0.0:3000")]
    pub server_addr: String,

    /// Comma-separated list of origins allowed to call the API, or `*` for any origin.
    #[arg(long, env = "CORS_ORIGINS", default_value = "*")]
    pub cors_origins: String,

    // --- Chat LLM Provider Args ---
    /// Groq API key. Required in `assembly` mode.
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    pub groq_api_key: Option<String>,

    /// Base URL of the OpenAI-compatible Groq API.
    #[arg(long, env = "CHAT_BASE_URL", default_value = DEFAULT_GROQ_BASE_URL)]
    pub chat_base_url: String,

    /// Model name for chat completion (e.g., llama3-8b-8192, llama-3.1-8b-instant)
    #[arg(long, env = "CHAT_MODEL", default_value = DEFAULT_CHAT_MODEL)]
    pub chat_model: String,

    /// Seconds to wait for the upstream before giving up. Unset means wait indefinitely.
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS")]
    pub upstream_timeout_secs: Option<u64>,

    // --- Persona Args ---
    /// Path to the persona catalogue file.
    #[arg(long, env = "PERSONAS_PATH", default_value = "json/personas.json")]
    pub personas_path: String,

    /// Persona to use from the catalogue. Defaults to the catalogue's `default` entry.
    #[arg(long, env = "PERSONA")]
    pub persona: Option<String>,

    /// Inline system persona text. Takes precedence over the catalogue when set.
    #[arg(long, env = "SYSTEM_PERSONA")]
    pub system_persona: Option<String>,

    /// Escape backslashes, quotes and newlines in user input before forwarding.
    /// Overrides the persona's own setting when given.
    #[arg(long, env = "ESCAPE_INPUT")]
    pub escape_input: Option<bool>,

    // --- Relay Args ---
    /// Chat service that `relay` mode forwards request bodies to.
    #[arg(long, env = "RELAY_URL")]
    pub relay_url: Option<String>,

    // --- General App Args ---
    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false")]
    pub debug: bool,

    /// Optional path to the TLS certificate file (PEM format). Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Optional path to the TLS private key file (PEM format). Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,

    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,
}
