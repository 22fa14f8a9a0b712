use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use bn_chain_binomena::{BinomenaClient, ExplorerOverview, NodeConfig, NodeHealth};
use bn_presale::{PaymentDetails, PaymentStatusReport, Presale, PresalePurchase};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

const SERVICE_NAME: &str = "binomena-gateway";
const DEFAULT_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Serialize)]
struct HealthResponse {
    service: &'static str,
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct VersionResponse {
    service: &'static str,
    version: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Deserialize)]
struct TokenQuery {
    symbol: Option<String>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);
type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Clone)]
struct AppState {
    client: BinomenaClient,
    config: Arc<NodeConfig>,
    presale: Arc<Presale>,
}

impl AppState {
    fn from_config(config: NodeConfig) -> Self {
        Self {
            client: BinomenaClient::from_config(&config),
            presale: Arc::new(Presale::from_config(&config)),
            config: Arc::new(config),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = NodeConfig::from_env().context("failed to read node configuration")?;
    if !config.api_url_configured {
        warn!(api_url = %config.api_url, "BINOMENA_API_URL not set, using default node");
    }
    info!(
        api_url = %config.api_url,
        paprd_backend = %config.paprd_backend,
        "node configuration loaded"
    );

    let addr: SocketAddr = std::env::var("GATEWAY_ADDR")
        .unwrap_or_else(|_| DEFAULT_ADDR.to_owned())
        .parse()
        .context("GATEWAY_ADDR must be a socket address")?;

    let app = router(AppState::from_config(config));

    info!("{} listening on {}", SERVICE_NAME, addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/version", get(version))
        .route("/api/tokens", get(tokens))
        .route("/api/node-health", get(node_health))
        .route("/api/explorer", get(explorer))
        .route("/api/presale/purchase", post(presale_purchase))
        .route("/api/presale/status/{purchase_id}", get(presale_status))
        .layer(cors)
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        service: SERVICE_NAME,
        status: "ok",
    })
}

async fn version() -> Json<VersionResponse> {
    Json(VersionResponse {
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Token list document, or a single token's metadata with `?symbol=`.
async fn tokens(Query(query): Query<TokenQuery>) -> ApiResult<Value> {
    let Some(symbol) = query.symbol.filter(|symbol| !symbol.is_empty()) else {
        return Ok(Json(bn_token_registry::token_list_json()));
    };

    let token = bn_token_registry::token_info(&symbol).ok_or_else(|| not_found("Token not found"))?;
    let value = serde_json::to_value(token).map_err(internal_error)?;
    Ok(Json(value))
}

async fn node_health(State(state): State<AppState>) -> Json<NodeHealth> {
    Json(state.client.check_health(state.config.api_url_configured).await)
}

async fn explorer(State(state): State<AppState>) -> ApiResult<ExplorerOverview> {
    let overview = state.client.explorer_overview().await.map_err(bad_gateway)?;
    Ok(Json(overview))
}

async fn presale_purchase(
    State(state): State<AppState>,
    Json(purchase): Json<PresalePurchase>,
) -> ApiResult<PaymentDetails> {
    let details = state
        .presale
        .submit_purchase(&purchase)
        .map_err(|err| bad_request(&err.to_string()))?;
    Ok(Json(details))
}

async fn presale_status(
    State(state): State<AppState>,
    Path(purchase_id): Path<String>,
) -> Json<PaymentStatusReport> {
    Json(state.presale.check_payment_status(&purchase_id))
}

fn bad_request(message: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_owned(),
        }),
    )
}

fn not_found(message: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: message.to_owned(),
        }),
    )
}

fn internal_error(err: impl std::fmt::Display) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

// Node failures are upstream failures, not ours.
fn bad_gateway(err: impl std::fmt::Display) -> ApiError {
    (
        StatusCode::BAD_GATEWAY,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}
