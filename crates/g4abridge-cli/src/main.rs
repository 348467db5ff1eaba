//! Gateway entry point - the composition root.
//!
//! This is the only place where infrastructure is wired together: the
//! config is built from flags/env, the backend client is constructed, and
//! the server is handed a pre-bound listener plus a cancellation token
//! triggered by ctrl-c.

use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use g4abridge_core::{
    DEFAULT_BACKEND_URL, DEFAULT_LISTEN_PORT, DEFAULT_STREAM_DELAY_SECS, GatewayConfig,
};
use g4abridge_gateway::backend::{GptFourAllClient, InferenceBackend};
use g4abridge_gateway::{AppState, serve};

/// OpenAI-compatibility gateway for a local GPT4All server.
#[derive(Debug, Parser)]
#[command(name = "g4abridge", version)]
struct Cli {
    /// Interface to listen on.
    #[arg(long, default_value = "0.0.0.0", env = "G4ABRIDGE_HOST")]
    host: String,

    /// Port for the compatibility surface.
    #[arg(short, long, default_value_t = DEFAULT_LISTEN_PORT, env = "G4ABRIDGE_PORT")]
    port: u16,

    /// Base URL of the GPT4All server.
    #[arg(long, default_value = DEFAULT_BACKEND_URL, env = "G4ABRIDGE_BACKEND_URL")]
    backend_url: String,

    /// Default pause between synthesized stream chunks, in seconds.
    #[arg(long, default_value_t = DEFAULT_STREAM_DELAY_SECS, env = "G4ABRIDGE_STREAM_DELAY")]
    stream_delay: f64,

    /// Enable debug logging (RUST_LOG still takes precedence).
    #[arg(long, env = "G4ABRIDGE_DEBUG")]
    debug: bool,
}

impl Cli {
    fn into_config(self) -> GatewayConfig {
        GatewayConfig {
            listen_host: self.host,
            listen_port: self.port,
            backend_base_url: self.backend_url,
            stream_delay: self.stream_delay,
            debug: self.debug,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables before clap reads them
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let default_filter = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let config = cli.into_config();

    let listener = TcpListener::bind(config.listen_addr()).await?;
    info!("Serving on port {}", config.listen_port);

    let backend: Arc<dyn InferenceBackend> = Arc::new(GptFourAllClient::new(config.clone()));
    let state = AppState::new(backend, Arc::new(config));

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutting down gateway");
            shutdown.cancel();
        }
    });

    serve(listener, state, cancel).await
}
