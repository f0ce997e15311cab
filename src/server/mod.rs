//! HTTP API for contract analysis.
//!
//! Endpoints live under `/api/contracts`:
//! - `POST /analyze` and `POST /analyze-text` run the pipeline (rate limited)
//! - `GET /{id}` returns a stored analysis
//! - `POST /{id}/generate-email` drafts a negotiation email
//! - `GET /` lists analyses, only when storage is durable

mod error;
mod handlers;
mod limit;
mod routes;

pub use error::{ApiError, ErrorResponse};
pub use handlers::{AnalyzeResponse, EmailResponse};
pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::analysis::ContractAnalyzer;
use crate::config::Settings;
use crate::llm::{LlmClient, TextGenerator};
use crate::rate_limit::RateLimiter;
use crate::store::{open_store, AnalysisStore};

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: ContractAnalyzer,
    pub store: Arc<dyn AnalysisStore>,
    pub limiter: RateLimiter,
    pub max_upload_bytes: usize,
    pub cors_origins: Vec<String>,
    pub trust_proxy: bool,
}

impl AppState {
    /// Wire the real model client and the configured store.
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        settings.require_llm_credentials()?;
        let client = LlmClient::new(settings.llm.clone())?;
        let store = open_store(settings.storage_mode, settings.data_dir.clone());
        Ok(Self::from_parts(Arc::new(client), store, settings))
    }

    pub fn from_parts(
        generator: Arc<dyn TextGenerator>,
        store: Arc<dyn AnalysisStore>,
        settings: &Settings,
    ) -> Self {
        Self {
            analyzer: ContractAnalyzer::new(generator),
            store,
            limiter: RateLimiter::new(settings.rate_limit),
            max_upload_bytes: settings.max_upload_bytes,
            cors_origins: settings.cors_origins(),
            trust_proxy: settings.trust_proxy,
        }
    }

    /// Ephemeral storage loses records on restart, so say so.
    pub fn not_found_message(&self) -> &'static str {
        if self.store.is_durable() {
            "Analysis not found"
        } else {
            "Analysis not found or expired"
        }
    }
}

/// Start the web server.
pub async fn serve(settings: &Settings) -> anyhow::Result<()> {
    let state = AppState::new(settings)?;
    let durable = state.store.is_durable();
    let app = create_router(state);

    let addr: SocketAddr = settings.bind_addr().parse()?;
    tracing::info!(
        provider = settings.llm.provider.as_str(),
        model = %settings.llm.model,
        storage = ?settings.storage_mode,
        listing = durable,
        trust_proxy = settings.trust_proxy,
        "Starting server at http://{}",
        addr
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("Shutting down");
    }
}
