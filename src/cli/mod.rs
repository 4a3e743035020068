use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Host address and port for the gateway to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:8787")]
    pub server_addr: String,

    /// Origin allowed to call the gateway. Use "*" to allow any origin.
    /// Loopback origins are always allowed so local development works.
    #[arg(long, env = "ALLOWED_ORIGIN", default_value = "*")]
    pub allowed_origin: String,

    /// API key for the upstream Messages API.
    #[arg(long, env = "ANTHROPIC_API_KEY", default_value = "")]
    pub anthropic_api_key: String,

    /// Upstream Messages API endpoint.
    #[arg(long, env = "UPSTREAM_URL", default_value = "https://api.anthropic.com/v1/messages")]
    pub upstream_url: String,

    /// Model identifier sent upstream.
    #[arg(long, env = "CHAT_MODEL", default_value = "claude-3-haiku-20240307")]
    pub model: String,

    /// Maximum output tokens requested from the model.
    #[arg(long, env = "MAX_TOKENS", default_value = "500")]
    pub max_tokens: u32,

    /// Sampling temperature sent upstream.
    #[arg(long, env = "TEMPERATURE", default_value = "0.7")]
    pub temperature: f32,

    /// Requests allowed per client key within one rate window.
    #[arg(long, env = "RATE_LIMIT", default_value = "30")]
    pub rate_limit: u32,

    /// Length of the fixed rate window, in seconds.
    #[arg(long, env = "RATE_WINDOW_SECS", default_value = "3600")]
    pub rate_window_secs: i64,

    /// Header the fronting proxy sets to the client address, used as the
    /// rate-limit key.
    #[arg(long, env = "CLIENT_IP_HEADER", default_value = "x-forwarded-for")]
    pub client_ip_header: String,

    /// Path to a file overriding the built-in system prompt.
    #[arg(long, env = "SYSTEM_PROMPT_PATH")]
    pub system_prompt_path: Option<String>,

    /// Optional path to the TLS certificate file (PEM format) for serving HTTPS. Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Optional path to the TLS private key file (PEM format) for serving HTTPS. Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,

    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,
}
