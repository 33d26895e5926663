use std::sync::Arc;

use app_config::types::{BacktestDefaults, CacheSettings};
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, TimeZone, Utc};
use core_types::{PricePoint, Symbol};
use market_data::StaticPriceSource;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use tower::ServiceExt;
use web_server::{AppState, create_router};

// Falls for six days, rallies, then falls again. With periods 2/4 the golden
// cross lands on 2024-01-08 (close 18) and the death cross on 2024-01-13
// (close 20).
const V_SHAPE: [i64; 17] = [20, 19, 18, 17, 16, 15, 16, 18, 20, 22, 24, 22, 20, 18, 16, 14, 12];

fn app() -> Router {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let points = V_SHAPE
        .iter()
        .enumerate()
        .map(|(i, v)| PricePoint::new(start + Duration::days(i as i64), Some(Decimal::from(*v))))
        .collect();
    let source = StaticPriceSource::new().with_series(Symbol::new("SPY"), points);
    let state = AppState::new(Arc::new(source), BacktestDefaults::default(), &CacheSettings { capacity: 4 });
    create_router(state)
}

fn backtest_body(overrides: Value) -> Value {
    let mut body = json!({
        "ticker": "spy",
        "start_date": "2024-01-01",
        "end_date": "2024-02-01",
        "short_period": 2,
        "long_period": 4,
        "initial_capital": 10000,
        "commission": 0
    });
    if let (Some(base), Some(extra)) = (body.as_object_mut(), overrides.as_object()) {
        for (k, v) in extra {
            base.insert(k.clone(), v.clone());
        }
    }
    body
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn health_and_root() {
    let app = app();

    let (status, body) = send(&app, "GET", "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert!(body["timestamp"].is_string());

    let (status, body) = send(&app, "GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["health_check"], "/api/health");
    assert!(body["endpoints"].is_object());
}

#[tokio::test]
async fn backtest_returns_metrics_chart_and_trades() {
    let app = app();
    let (status, body) = send(&app, "POST", "/api/backtest", Some(backtest_body(json!({})))).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["success"], true);

    let data = &body["data"];
    assert_eq!(data["request_params"]["ticker"], "SPY");
    assert_eq!(data["request_params"]["short_period"], 2);

    let chart = &data["chart_data"];
    assert_eq!(chart["dates"].as_array().unwrap().len(), V_SHAPE.len());
    assert_eq!(chart["dates"][0], "2024-01-01");
    assert!(chart["short_ma"][0].is_null());
    assert_eq!(chart["short_ma"][1], 19.5);
    assert!(chart["long_ma"][2].is_null());
    assert_eq!(chart["long_ma"][3], 18.5);
    assert_eq!(chart["portfolio_values"].as_array().unwrap().len(), V_SHAPE.len());
    assert_eq!(
        chart["signals"],
        json!([
            {"date": "2024-01-08", "type": "golden_cross", "price": 18.0},
            {"date": "2024-01-13", "type": "death_cross", "price": 20.0}
        ])
    );

    let trades = data["trades"].as_array().unwrap();
    assert_eq!(trades.len(), 2);
    assert_eq!(trades[0]["type"], "BUY");
    assert_eq!(trades[0]["shares"], 555);
    assert_eq!(trades[1]["type"], "SELL");
    assert_eq!(trades[1]["value"], 11100.0);

    let metrics = &data["performance_metrics"];
    assert_eq!(metrics["final_portfolio_value"], 11110.0);
    assert_eq!(metrics["total_return_pct"], 11.1);
    assert_eq!(metrics["num_trades"], 2);
    assert_eq!(metrics["num_winning_trades"], 1);
    assert_eq!(metrics["win_rate_pct"], 100.0);
    assert_eq!(metrics["trading_days"], 17);
}

#[tokio::test]
async fn results_are_cached_by_run_key() {
    let app = app();
    let (_, body) = send(&app, "POST", "/api/backtest", Some(backtest_body(json!({})))).await;
    let run_key = body["data"]["run_key"].as_str().unwrap().to_string();
    assert_eq!(run_key, "SPY_2024-01-01_2024-02-01_2_4_10000_0");

    let (status, cached) = send(&app, "GET", &format!("/api/backtest/results/{run_key}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cached["data"], body["data"]);

    let (status, latest) = send(&app, "GET", "/api/backtest/results", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(latest["data"]["run_key"], run_key.as_str());

    let (status, _) = send(&app, "DELETE", &format!("/api/backtest/results/{run_key}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, missing) = send(&app, "GET", &format!("/api/backtest/results/{run_key}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(missing["success"], false);
}

#[tokio::test]
async fn clearing_empties_the_cache() {
    let app = app();
    send(&app, "POST", "/api/backtest", Some(backtest_body(json!({})))).await;
    send(&app, "POST", "/api/backtest", Some(backtest_body(json!({"commission": 0.001})))).await;

    let (status, body) = send(&app, "DELETE", "/api/backtest/results", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cleared"], 2);

    let (status, body) = send(&app, "GET", "/api/backtest/results", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("No backtest results"));
}

#[tokio::test]
async fn invalid_requests_are_rejected_with_400() {
    let app = app();
    let cases = [
        json!({"start_date": "01/01/2024"}),
        json!({"start_date": "2024-02-01", "end_date": "2024-01-01"}),
        json!({"short_period": 4, "long_period": 4}),
        json!({"initial_capital": 0}),
        json!({"commission": 0.5}),
        json!({"initial_capital": 1e20}),
        // Valid request, but 17 points cannot fill a 50-day window.
        json!({"short_period": 10, "long_period": 50}),
    ];
    for overrides in cases {
        let (status, body) = send(&app, "POST", "/api/backtest", Some(backtest_body(overrides.clone()))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{overrides}");
        assert_eq!(body["success"], false);
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/backtest")
        .header("content-type", "application/json")
        .body(Body::from("{\"ticker\": "))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_ticker_is_a_server_error() {
    let app = app();
    let (status, body) = send(&app, "POST", "/api/backtest", Some(backtest_body(json!({"ticker": "nope"})))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("No data found for NOPE"));
}
