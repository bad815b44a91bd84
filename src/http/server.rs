//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (panic catching, request ID, tracing, timeout,
//!   timing, authentication, admission control)
//! - Bind server to listener and shut down gracefully

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::auth::{authenticate, CredentialIssuer, TokenSettings, TokenVerifier};
use crate::config::{ConfigError, GatewayConfig};
use crate::directory::{InMemoryDirectory, PrincipalDirectory, RoleDirectory};
use crate::http::handlers;
use crate::http::request::request_timing;
use crate::http::response::{panic_response, ErrorBody};
use crate::lifecycle::signals::shutdown_signal;
use crate::security::rate_limit::{admission_middleware, FixedWindowLimiter, RateLimitSettings};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub issuer: Arc<CredentialIssuer>,
    pub principals: Arc<dyn PrincipalDirectory>,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
    limiter: Option<Arc<FixedWindowLimiter>>,
}

impl HttpServer {
    /// Create a server backed by the in-memory directory from `config`.
    pub fn new(config: GatewayConfig) -> Result<Self, ConfigError> {
        let directory = Arc::new(InMemoryDirectory::from_config(&config.directory));
        Self::with_directory(config, directory.clone(), directory)
    }

    /// Create a server backed by external role and user directories.
    ///
    /// Fails if the token settings are unusable; this is a startup error.
    pub fn with_directory(
        config: GatewayConfig,
        roles: Arc<dyn RoleDirectory>,
        principals: Arc<dyn PrincipalDirectory>,
    ) -> Result<Self, ConfigError> {
        let settings = TokenSettings::from_config(&config.jwt)?;
        let verifier = Arc::new(TokenVerifier::new(&settings));
        let issuer = Arc::new(CredentialIssuer::new(settings, roles));

        let limiter = config.rate_limit.enabled.then(|| {
            Arc::new(FixedWindowLimiter::new(RateLimitSettings::from(
                &config.rate_limit,
            )))
        });

        let state = AppState { issuer, principals };
        let router = Self::build_router(&config, state, verifier, limiter.clone());

        Ok(Self {
            router,
            config,
            limiter,
        })
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Layers run outermost first: panic catching, request ID, trace span,
    /// timeout, timing log, authentication, then admission control.
    #[allow(deprecated)]
    fn build_router(
        config: &GatewayConfig,
        state: AppState,
        verifier: Arc<TokenVerifier>,
        limiter: Option<Arc<FixedWindowLimiter>>,
    ) -> Router {
        let mut router = Router::new()
            .route("/health", get(handlers::health))
            .route("/api/user/login", post(handlers::login))
            .route("/api/user/me", get(handlers::me))
            .fallback(not_found)
            .with_state(state);

        if let Some(limiter) = limiter {
            router = router.layer(middleware::from_fn_with_state(limiter, admission_middleware));
        }

        router
            .layer(middleware::from_fn_with_state(verifier, authenticate))
            .layer(middleware::from_fn(request_timing))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(CatchPanicLayer::custom(panic_response))
    }

    /// The fully layered router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// The admission controller, if rate limiting is enabled.
    pub fn limiter(&self) -> Option<Arc<FixedWindowLimiter>> {
        self.limiter.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Run the server until ctrl-c, SIGTERM or the shutdown broadcast fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            rate_limit_enabled = self.limiter.is_some(),
            permit_limit = self.config.rate_limit.permit_limit,
            window_ms = self.config.rate_limit.window_ms,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(ErrorBody::new("Not found")))
}
