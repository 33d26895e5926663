// In crates/web-server/src/lib.rs

use std::sync::Arc;

use app_config::types::{BacktestDefaults, CacheSettings, ServerSettings};
use axum::{
    Router,
    extract::{Json, Path, State, rejection::JsonRejection},
    routing::{get, post},
};
use backtester::Backtester;
use chrono::Utc;
use market_data::PriceSource;
use serde_json::{Value, json};
use tokio::net::TcpListener;

pub mod cache;
pub mod error;
pub mod types;

// Re-export our custom error type for convenience.
pub use cache::ResultCache;
pub use error::{Error, Result};
use types::{ApiResponse, BacktestData, BacktestParams, BacktestRequest};

pub const SERVICE_NAME: &str = "MA Golden Cross Backtester API";

/// The shared application state that is available to all API handlers.
#[derive(Clone)]
pub struct AppState {
    /// Where daily closes come from.
    pub source: Arc<dyn PriceSource>,
    /// Finished responses, keyed by run key.
    pub cache: ResultCache<BacktestData>,
    /// Parameters applied when a request omits them.
    pub defaults: BacktestDefaults,
}

impl AppState {
    pub fn new(source: Arc<dyn PriceSource>, defaults: BacktestDefaults, cache: &CacheSettings) -> Self {
        Self {
            source,
            cache: ResultCache::new(cache.capacity),
            defaults,
        }
    }
}

/// Creates the main application router with all routes and middleware.
pub fn create_router(app_state: AppState) -> Router {
    let cors = tower_http::cors::CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any);

    // Define the API sub-router
    let api_router = Router::new()
        .route("/health", get(health_check_handler))
        .route("/backtest", post(run_backtest_handler))
        .route(
            "/backtest/results",
            get(latest_result_handler).delete(clear_results_handler),
        )
        .route(
            "/backtest/results/{run_key}",
            get(get_result_handler).delete(delete_result_handler),
        );

    // The main router.
    Router::new()
        .route("/", get(root_handler))
        .nest("/api", api_router)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Handler for `GET /`: service information and the endpoint list.
async fn root_handler() -> Json<Value> {
    Json(json!({
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "health_check": "/api/health",
        "endpoints": {
            "POST /api/backtest": "Run a backtest",
            "GET /api/backtest/results": "Get the latest backtest result",
            "GET /api/backtest/results/{run_key}": "Get a cached backtest result",
            "DELETE /api/backtest/results/{run_key}": "Remove a cached backtest result",
            "DELETE /api/backtest/results": "Clear cached results",
            "GET /api/health": "Health check",
        },
    }))
}

/// Handler for `GET /api/health`
async fn health_check_handler() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// Handler for `POST /api/backtest`
///
/// Always recomputes; the fresh response replaces any cached one with the
/// same run key.
async fn run_backtest_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<BacktestRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<BacktestData>>> {
    let Json(request) = payload.map_err(|e| Error::BadRequest(e.body_text()))?;
    let params = BacktestParams::from_request(request, &state.defaults)?;
    tracing::info!(
        ticker = %params.symbol,
        start = %params.start,
        end = %params.end,
        short_period = params.crossover.short_period,
        long_period = params.crossover.long_period,
        "Running backtest."
    );

    let prices = state
        .source
        .fetch_daily_closes(&params.symbol, params.start, params.end)
        .await?;

    let backtester = Backtester::ma_crossover(params.simulation, params.crossover);
    let outcome = backtester.run(&prices)?;

    let data = BacktestData::new(&params, &outcome);
    state.cache.insert(data.run_key.clone(), data.clone());

    Ok(Json(ApiResponse::ok(data)))
}

/// Handler for `GET /api/backtest/results`
async fn latest_result_handler(State(state): State<AppState>) -> Result<Json<ApiResponse<BacktestData>>> {
    state.cache.latest().map(|data| Json(ApiResponse::ok(data))).ok_or_else(|| {
        Error::NotFound(
            "No backtest results available. Please run a backtest first using POST /api/backtest".to_string(),
        )
    })
}

/// Handler for `GET /api/backtest/results/{run_key}`
async fn get_result_handler(
    State(state): State<AppState>,
    Path(run_key): Path<String>,
) -> Result<Json<ApiResponse<BacktestData>>> {
    match state.cache.get(&run_key) {
        Some(data) => Ok(Json(ApiResponse::ok(data))),
        None => Err(Error::NotFound(format!("No cached result for run {run_key}"))),
    }
}

/// Handler for `DELETE /api/backtest/results/{run_key}`
async fn delete_result_handler(
    State(state): State<AppState>,
    Path(run_key): Path<String>,
) -> Result<Json<Value>> {
    if !state.cache.remove(&run_key) {
        return Err(Error::NotFound(format!("No cached result for run {run_key}")));
    }
    tracing::info!(run_key = %run_key, "Cached result removed.");
    Ok(Json(json!({
        "success": true,
        "message": format!("Cached result {run_key} removed"),
    })))
}

/// Handler for `DELETE /api/backtest/results`
async fn clear_results_handler(State(state): State<AppState>) -> Json<Value> {
    let cleared = state.cache.clear();
    tracing::info!(cleared, "Cached results cleared.");
    Json(json!({
        "success": true,
        "message": "Cached results cleared successfully",
        "cleared": cleared,
    }))
}

/// The main entry point for running the web server.
///
/// This function sets up the TCP listener and serves the application router.
/// It will run forever until the process is terminated.
pub async fn run(settings: &ServerSettings, app_state: AppState) -> Result<()> {
    let app = create_router(app_state);

    let address = format!("{}:{}", settings.host, settings.port);
    tracing::info!("Web server listening on {}", address);

    let listener = TcpListener::bind(&address).await.map_err(Error::ServerBindError)?;

    axum::serve(listener, app).await.map_err(Error::ServerError)?;

    Ok(())
}
