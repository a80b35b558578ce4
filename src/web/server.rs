use axum::{
    extract::{DefaultBodyLimit, Query, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::limit::ConcurrencyLimitLayer;
use tower::ServiceBuilder;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;
use tracing::info;

use crate::cli::compare::NameComparison;
use crate::cli::search::DirectoryHit;
use crate::cli::{load_context, ServeArgs};
use crate::core::record::DirectoryRecord;
use crate::matching::batch::{BatchResolver, BatchSummary};
use crate::matching::engine::{MatchResolver, MatchResult, MatchingConfig};
use crate::utils::validation::{validate_names, validate_threshold};

/// Maximum request body size
pub const MAX_BODY_SIZE: usize = 2 * 1024 * 1024; // 2MB

/// Requests taking longer than this are answered with 408
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared application state
pub struct AppState {
    pub directory: Vec<DirectoryRecord>,
    pub config: MatchingConfig,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_type: String,
}

#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    pub names: Vec<String>,
    #[serde(default)]
    pub threshold: Option<u16>,
}

#[derive(Debug, Deserialize)]
pub struct CompareRequest {
    pub a: String,
    pub b: String,
}

#[derive(Serialize)]
struct ResolveResponse<'r, 'a> {
    summary: BatchSummary,
    results: Vec<&'r MatchResult<'a>>,
}

#[derive(Debug, Deserialize)]
pub struct DirectoryQuery {
    /// Search term; without it only the summary is returned
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Serialize)]
struct DirectorySummary<'a> {
    records: usize,
    named: usize,
    unnamed: usize,
    threshold: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    hits: Option<Vec<DirectoryHit<'a>>>,
}

/// Build an error response; internal details are logged, never returned
pub fn create_safe_error_response(
    status: StatusCode,
    error_type: &str,
    user_message: &str,
    internal_error: Option<&str>,
) -> Response {
    if let Some(internal_msg) = internal_error {
        tracing::error!("Internal error ({}): {}", error_type, internal_msg);
    }

    (
        status,
        Json(ErrorResponse {
            error: user_message.to_string(),
            error_type: error_type.to_string(),
        }),
    )
        .into_response()
}

/// Run the web server
///
/// # Errors
///
/// Returns an error if the directory cannot be loaded or has unnamed records,
/// the tokio runtime cannot be created, or the server fails to start.
pub fn run(args: ServeArgs, config: Option<&Path>) -> anyhow::Result<()> {
    let (_, directory, matching) = load_context(&args.directory, config)?;

    // Reject unusable directories at startup rather than on every request
    MatchResolver::with_config(&directory, matching.clone())?;

    let state = Arc::new(AppState {
        directory,
        config: matching,
    });

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move { run_server(args, state).await })
}

/// Routes and middleware, without per-IP rate limiting.
///
/// Rate limiting keys on the peer address, which only exists for real
/// connections; see [`create_router`].
pub fn api_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/directory", get(directory_handler))
        .route("/api/resolve", post(resolve_handler))
        .route("/api/compare", post(compare_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                // Security headers for browser protection
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("x-content-type-options"),
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("x-frame-options"),
                    HeaderValue::from_static("DENY"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("referrer-policy"),
                    HeaderValue::from_static("no-referrer"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("cache-control"),
                    HeaderValue::from_static("no-store"),
                ))
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    REQUEST_TIMEOUT,
                ))
                .layer(ConcurrencyLimitLayer::new(100))
                .layer(DefaultBodyLimit::max(MAX_BODY_SIZE)),
        )
}

/// Create the application router with all routes and middleware configured.
///
/// # Errors
///
/// Returns an error if the rate limiter configuration is rejected.
pub fn create_router(state: Arc<AppState>) -> anyhow::Result<Router> {
    let governor_conf = GovernorConfigBuilder::default()
        .per_second(10)
        .burst_size(50)
        .finish()
        .ok_or_else(|| anyhow::anyhow!("Invalid rate limiter configuration"))?;

    Ok(api_router(state).layer(GovernorLayer {
        config: Arc::new(governor_conf),
    }))
}

async fn run_server(args: ServeArgs, state: Arc<AppState>) -> anyhow::Result<()> {
    let records = state.directory.len();
    let app = create_router(state)?;

    let addr = format!("{}:{}", args.address, args.port);
    println!("Starting payer-match web server at http://{addr} ({records} directory records)");

    if args.open {
        let _ = open::that(format!("http://{addr}/api/directory"));
    }

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn directory_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DirectoryQuery>,
) -> Response {
    if let Some(term) = &query.q {
        if let Err(e) = validate_names(std::slice::from_ref(term)) {
            return create_safe_error_response(
                StatusCode::BAD_REQUEST,
                "validation",
                &e.to_string(),
                None,
            );
        }
    }

    let named = state
        .directory
        .iter()
        .filter(|r| r.name().is_some())
        .count();

    Json(DirectorySummary {
        records: state.directory.len(),
        named,
        unnamed: state.directory.len() - named,
        threshold: state.config.threshold,
        hits: query
            .q
            .as_deref()
            .map(|term| DirectoryHit::find(&state.directory, term)),
    })
    .into_response()
}

async fn resolve_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ResolveRequest>,
) -> Response {
    if let Err(e) = validate_names(&request.names) {
        return create_safe_error_response(
            StatusCode::BAD_REQUEST,
            "validation",
            &e.to_string(),
            None,
        );
    }

    let mut config = state.config.clone();
    if let Some(threshold) = request.threshold {
        match validate_threshold(threshold) {
            Ok(threshold) => config.threshold = threshold,
            Err(e) => {
                return create_safe_error_response(
                    StatusCode::BAD_REQUEST,
                    "validation",
                    &e.to_string(),
                    None,
                )
            }
        }
    }

    let start_time = std::time::Instant::now();
    let count = request.names.len();

    // Matching is CPU-bound; keep it off the async workers
    let outcome = tokio::task::spawn_blocking(move || -> anyhow::Result<serde_json::Value> {
        let resolver = MatchResolver::with_config(&state.directory, config)?;
        let outcome = BatchResolver::new(&resolver).resolve_all(&request.names, |_, _| {}, None);

        Ok(serde_json::to_value(ResolveResponse {
            summary: outcome.summary(),
            results: outcome.results.iter().flatten().collect(),
        })?)
    })
    .await;

    match outcome {
        Ok(Ok(body)) => {
            info!(
                "Resolved {} names in {:.1}ms",
                count,
                start_time.elapsed().as_secs_f64() * 1000.0
            );
            Json(body).into_response()
        }
        Ok(Err(e)) => create_safe_error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "resolve",
            "Failed to resolve names",
            Some(&e.to_string()),
        ),
        Err(e) => create_safe_error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal",
            "Internal server error",
            Some(&e.to_string()),
        ),
    }
}

async fn compare_handler(Json(request): Json<CompareRequest>) -> Response {
    if let Err(e) = validate_names(&[&request.a, &request.b]) {
        return create_safe_error_response(
            StatusCode::BAD_REQUEST,
            "validation",
            &e.to_string(),
            None,
        );
    }

    Json(NameComparison::calculate(&request.a, &request.b)).into_response()
}
