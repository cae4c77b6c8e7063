//! HTTP interface to the retrieval engine.
//!
//! Three endpoints, matching the narrow core contract:
//! - `POST /query` - search the index
//! - `POST /init`  - rebuild the index from the corpus (201 on success)
//! - `GET /health` - liveness probe, touches neither index nor provider
//!
//! Expected failures never reach this layer; the engine degrades them.
//! Anything that does surface here is logged and answered with a 500
//! and a generic message. Callers get "no match" or an apology, never
//! a raw internal error.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::index::SqliteStore;
use crate::retrieval::{Match, RetrievalEngine};

/// Boundary error: everything expected was absorbed below, so the only
/// user-visible failure is a generic 500.
struct ServiceError(Error);

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        error!("request failed: {}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "detail": "Internal server error" })),
        )
            .into_response()
    }
}

impl From<Error> for ServiceError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

type ApiResult<T> = std::result::Result<T, ServiceError>;

/// State shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RetrievalEngine<SqliteStore>>,
    /// Default `max_results` when the request omits it.
    pub max_results: usize,
    /// Default `threshold` when the request omits it.
    pub threshold: f32,
}

/// Request body for `POST /query`.
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    pub max_results: Option<usize>,
    pub threshold: Option<f32>,
}

/// Response body for `POST /query`.
#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub query: String,
    pub matches: Vec<Match>,
}

/// Response body for `POST /init`.
#[derive(Debug, Serialize)]
pub struct InitResponse {
    pub status: String,
    pub message: String,
}

/// GET /health - liveness probe.
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// POST /query - search the index for matches.
async fn query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> ApiResult<Json<QueryResponse>> {
    let max_results = request.max_results.unwrap_or(state.max_results);
    let threshold = request.threshold.unwrap_or(state.threshold);

    info!(query = %request.query, max_results, threshold, "search");

    let matches = state
        .engine
        .search(&request.query, max_results, threshold)
        .await?;

    Ok(Json(QueryResponse {
        query: request.query,
        matches,
    }))
}

/// POST /init - rebuild the index from the current corpus.
async fn init(State(state): State<AppState>) -> ApiResult<(StatusCode, Json<InitResponse>)> {
    let count = state.engine.rebuild().await?;

    Ok((
        StatusCode::CREATED,
        Json(InitResponse {
            status: "success".to_string(),
            message: format!("Initialized database with {count} entries"),
        }),
    ))
}

/// Build the router with all endpoints.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/query", post(query))
        .route("/init", post(init))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// G'Day HTTP server.
pub struct Server {
    state: AppState,
    host: String,
    port: u16,
}

impl Server {
    /// Build a server from resolved configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the index database or the embedding
    /// provider cannot be constructed (missing credential).
    pub fn from_config(config: &Config) -> Result<Self> {
        let provider = crate::embeddings::OpenAiProvider::from_config(config)?;
        let store = SqliteStore::open(&config.index_path)?;
        let corpus = crate::corpus::CorpusStore::new(config.corpus_path.clone());
        let engine = RetrievalEngine::new(
            crate::embeddings::BoxedProvider::new(provider),
            store,
            corpus,
            config.collection.clone(),
        );

        Ok(Self {
            state: AppState {
                engine: Arc::new(engine),
                max_results: config.max_results,
                threshold: config.threshold,
            },
            host: config.host.clone(),
            port: config.port,
        })
    }

    /// Bind and serve until a shutdown signal arrives.
    ///
    /// # Errors
    ///
    /// Returns an error when the address cannot be parsed or bound.
    pub async fn start(self) -> Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| Error::Config(format!("Invalid bind address: {e}")))?;

        let app = create_router().with_state(self.state);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Other(format!("Failed to bind to {addr}: {e}")))?;

        info!("listening on http://{addr}");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| Error::Other(format!("Server error: {e}")))
    }
}

/// Resolve when ctrl-c or SIGTERM arrives.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        info!("received shutdown signal");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix;
        unix::signal(unix::SignalKind::terminate())
            .expect("Failed to install TERM handler")
            .recv()
            .await;
        info!("received TERM signal");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::CorpusStore;
    use crate::embeddings::{BoxedProvider, EmbeddingProvider, ProviderInfo};
    use http::Request;
    use tower::util::ServiceExt;

    struct ConstantProvider;

    impl EmbeddingProvider for ConstantProvider {
        fn info(&self) -> ProviderInfo {
            ProviderInfo {
                name: "constant".to_string(),
                model: "none".to_string(),
                dimensions: 3,
                max_chars: 1000,
                available: true,
            }
        }

        async fn is_available(&self) -> bool {
            true
        }

        async fn embed(&self, _text: &str) -> crate::error::Result<Vec<f32>> {
            Ok(vec![1.0, 0.0, 0.0])
        }
    }

    fn test_state() -> AppState {
        let engine = RetrievalEngine::new(
            BoxedProvider::new(ConstantProvider),
            SqliteStore::open_in_memory().unwrap(),
            CorpusStore::new("/nonexistent/australianisms.json"),
            "australianisms",
        );
        AppState {
            engine: Arc::new(engine),
            max_results: 3,
            threshold: 0.7,
        }
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_is_independent_of_index() {
        let app = create_router().with_state(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "healthy");
    }

    #[tokio::test]
    async fn test_init_returns_created_with_count() {
        let app = create_router().with_state(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/init")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let json = body_json(response).await;
        assert_eq!(json["status"], "success");
        // Fallback corpus has two entries.
        assert!(json["message"].as_str().unwrap().contains("2 entries"));
    }

    #[tokio::test]
    async fn test_query_returns_matches_shape() {
        let app = create_router().with_state(test_state());

        let body = serde_json::json!({ "query": "hello", "threshold": 0.0 }).to_string();
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/query")
                    .header("content-type", "application/json")
                    .body(axum::body::Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["query"], "hello");
        let matches = json["matches"].as_array().unwrap();
        // Constant embeddings: both fallback entries tie at distance 0.
        assert_eq!(matches.len(), 2);
        for m in matches {
            assert!(m["phrase"].is_string());
            assert!(m["meaning"].is_string());
            assert!(m["usage_example"].is_string());
            assert!(m["score"].is_number());
        }
    }
}
