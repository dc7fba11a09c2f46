//! HTTP server entry point and Axum router setup.
//!
//! Loads settings from the environment, builds the template table and LLM
//! client, configures routes and starts the Axum server.

mod dto;
mod error;
mod handlers;
mod middleware;
mod services;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use aigtag_config::{Settings, TemplateStore, VISION_TEMPLATE_FILE};
use aigtag_llm::LlmClient;
use anyhow::{Context, Result};
use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method, Request, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Shared server state accessible from all handlers.
pub struct ServerState {
    pub settings: Settings,
    pub templates: TemplateStore,
    /// System prompt used by the image endpoint.
    pub vision_template: PathBuf,
    pub llm: LlmClient,
}

impl ServerState {
    pub fn new(settings: Settings) -> Self {
        let templates = TemplateStore::builtin(&settings.prompt_dir);
        let vision_template = settings.prompt_dir.join(VISION_TEMPLATE_FILE);
        let llm = LlmClient::new(&settings.llm);
        Self {
            settings,
            templates,
            vision_template,
            llm,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .compact()
        .init();

    let settings = Settings::from_env().context("invalid configuration")?;
    let state = Arc::new(init_server_state(settings).await?);

    let addr = state.settings.bind_addr.clone();
    let app = build_app(state);

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the server state and prepares the upload directory.
async fn init_server_state(settings: Settings) -> Result<ServerState> {
    tokio::fs::create_dir_all(&settings.upload_dir)
        .await
        .with_context(|| format!("creating {}", settings.upload_dir.display()))?;

    let state = ServerState::new(settings);

    info!("Loaded {} prompt templates", state.templates.len());
    for t in state.templates.list_all() {
        info!("  - {} ({})", t.label, t.id);
    }
    for t in state.templates.missing_files() {
        warn!("Template file missing for '{}': {}", t.id, t.file_path.display());
    }
    if !state.vision_template.is_file() {
        warn!("Vision template missing: {}", state.vision_template.display());
    }

    Ok(state)
}

/// Origins the CORS layer accepts.
///
/// A `*` entry accepts every origin by echoing it back, since a literal
/// wildcard cannot be combined with credentials.
fn allowed_origins(origins: &[String]) -> AllowOrigin {
    if origins.iter().any(|o| o == "*") {
        return AllowOrigin::mirror_request();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();
    AllowOrigin::list(origins)
}

/// CORS policy restricted to the configured origins.
fn cors_layer(origins: &[String]) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(allowed_origins(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// Assembles the router with tracing, size guard and CORS layers.
fn build_app(state: Arc<ServerState>) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request<Body>| {
            tracing::info_span!(
                "request",
                method = %req.method(),
                uri = %req.uri(),
                version = ?req.version(),
            )
        })
        .on_response(|res: &Response<Body>, latency: Duration, _span: &tracing::Span| {
            info!(
                latency = %format!("{} ms", latency.as_millis()),
                status = %res.status().as_u16(),
                "finished processing request"
            );
        });

    let body_limit = usize::try_from(state.settings.max_content_length).unwrap_or(usize::MAX);

    let logged_routes = Router::new()
        .route("/ask", post(handlers::ask::ask))
        .route("/get-hero-options", get(handlers::options::list))
        .route("/analyze-image", post(handlers::image::analyze))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::limit_upload_size,
        ))
        .layer(trace_layer);

    Router::new()
        .merge(logged_routes)
        .route("/health", get(handlers::health))
        .layer(cors_layer(&state.settings.allowed_origins))
        .with_state(state)
}
