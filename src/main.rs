//! Catalog gateway
//!
//! ```text
//!     Client Request
//!     ─────────────▶ request id ─▶ trace ─▶ timeout ─▶ timing
//!                                                        │
//!                                                        ▼
//!                                         authenticate (bearer → identity)
//!                                                        │
//!                                                        ▼
//!                                         admission (fixed window per caller)
//!                                            │                    │
//!                                         admitted              429
//!                                            ▼
//!                          /health   /api/user/login   /api/user/me
//!                                            │
//!                                            ▼
//!                          directory ─▶ password check ─▶ credential issuer
//! ```

use std::path::PathBuf;

use clap::Parser;

use catalog_gateway::config::{default_config, load_config};
use catalog_gateway::lifecycle::{startup, Shutdown};
use catalog_gateway::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "catalog-gateway")]
#[command(about = "Token-issuing, rate-limiting gateway for the catalog API", long_about = None)]
struct Args {
    /// Path to a TOML config file. Built-in defaults are used when omitted.
    #[arg(short, long, env = "CATALOG_GATEWAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => default_config()?,
    };

    init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        permit_limit = config.rate_limit.permit_limit,
        window_ms = config.rate_limit.window_ms,
        token_lifetime_minutes = config.jwt.lifetime_minutes,
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    startup::run(config, &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
