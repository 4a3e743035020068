pub mod cors;
pub mod error;
pub mod handlers;

use crate::cli::Args;
use crate::config::prompt::load_system_prompt;
use crate::limiter::{ FixedWindowLimiter, RateLimiter };
use crate::llm::AnthropicClient;
use axum::{ routing::any, Router };
use chrono::Duration;
use log::{ error, info, warn };
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub limiter: Arc<dyn RateLimiter>,
    pub upstream: AnthropicClient,
    pub system_prompt: Arc<str>,
    pub allowed_origin: Arc<str>,
    pub client_ip_header: Arc<str>,
}

impl AppState {
    pub fn from_args(args: &Args) -> Result<Self, Box<dyn Error + Send + Sync>> {
        if args.anthropic_api_key.trim().is_empty() {
            warn!("No upstream API key configured. Upstream calls will be rejected.");
        }
        if args.allowed_origin == "*" {
            warn!("ALLOWED_ORIGIN is '*'. Any site may embed this gateway.");
        }

        let system_prompt = load_system_prompt(args.system_prompt_path.as_deref())?;

        let upstream = AnthropicClient::new(
            args.anthropic_api_key.clone(),
            args.upstream_url.clone(),
            args.model.clone(),
            args.max_tokens,
            args.temperature
        )?;

        Ok(Self {
            limiter: Arc::new(
                FixedWindowLimiter::new(args.rate_limit, Duration::seconds(args.rate_window_secs))
            ),
            upstream,
            system_prompt: system_prompt.into(),
            allowed_origin: args.allowed_origin.as_str().into(),
            client_ip_header: args.client_ip_header.to_lowercase().into(),
        })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new().route("/", any(handlers::dispatch)).with_state(state)
}

pub async fn run_server(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    let addr: SocketAddr = args.server_addr.parse()?;
    let state = AppState::from_args(&args)?;
    let app = router(state);

    if args.enable_tls {
        let (cert_path, key_path) = match (&args.tls_cert_path, &args.tls_key_path) {
            (Some(cert), Some(key)) => (cert.clone(), key.clone()),
            (Some(_), None) | (None, Some(_)) => {
                error!("Both --tls-cert-path and --tls-key-path must be provided to enable TLS.");
                return Err("Missing TLS certificate or key path".into());
            }
            (None, None) => {
                error!("--enable-tls was set but no certificate/key paths provided.");
                return Err("TLS enabled without cert/key".into());
            }
        };

        info!(
            "TLS enabled. Loading certificate from '{}' and key from '{}'",
            cert_path,
            key_path
        );
        let tls_config = axum_server::tls_rustls::RustlsConfig
            ::from_pem_file(&cert_path, &key_path).await?;

        info!("Gateway listening on: https://{}", addr);
        axum_server::bind_rustls(addr, tls_config).serve(app.into_make_service()).await?;
    } else {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("Gateway listening on: http://{}", addr);
        axum::serve(listener, app.into_make_service()).await?;
    }

    Ok(())
}
