// In crates/market-data/src/chart.rs

use std::time::Duration;

use crate::types::{ChartResponse, ChartResult};
use crate::{Error, PriceSource, Result};
use app_config::MarketDataSettings;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime};
use core_types::{PricePoint, Symbol};
use reqwest::Client;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde_json::Value;
use tracing::{debug, info};

const USER_AGENT: &str = "Mozilla/5.0 (compatible; ma-backtest/0.1)";

/// Client for a Yahoo-style chart endpoint serving daily bars.
#[derive(Debug, Clone)]
pub struct ChartClient {
    /// The persistent HTTP client.
    http_client: Client,
    /// The base URL, e.g. `https://query1.finance.yahoo.com`.
    base_url: String,
}

impl ChartClient {
    /// Constructs a new ChartClient from MarketDataSettings.
    pub fn new(settings: &MarketDataSettings) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::ClientBuildError(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// The request URL for `[start, end)` at daily resolution.
    pub fn chart_url(&self, symbol: &Symbol, start: NaiveDate, end: NaiveDate) -> String {
        format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d&events=div%2Csplit",
            self.base_url,
            symbol,
            epoch_seconds(start),
            epoch_seconds(end)
        )
    }
}

#[async_trait]
impl PriceSource for ChartClient {
    fn name(&self) -> &'static str {
        "ChartClient"
    }

    async fn fetch_daily_closes(
        &self,
        symbol: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>> {
        let url = self.chart_url(symbol, start, end);
        debug!(url = %url, "Requesting daily chart.");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(Error::RequestFailed)?;
        let status = response.status();
        let body = response.text().await.map_err(Error::RequestFailed)?;

        let points = parse_chart(symbol, start, end, &body).map_err(|e| match e {
            // A non-JSON body on a failed status is the status itself, not a parse bug.
            Error::DeserializationFailed(_) if !status.is_success() => Error::ApiError {
                code: status.as_u16().to_string(),
                msg: status.canonical_reason().unwrap_or("Unknown error").to_string(),
            },
            other => other,
        })?;

        info!(ticker = %symbol, points = points.len(), %start, %end, "Fetched daily closes.");
        Ok(points)
    }
}

/// Converts a chart response body into daily price points within `[start, end)`.
///
/// Adjusted closes are preferred when the response carries them. A `null`
/// close becomes an undefined price. Each point is stamped at midnight UTC of
/// its exchange-local trading date; repeated dates keep the first bar.
pub fn parse_chart(symbol: &Symbol, start: NaiveDate, end: NaiveDate, body: &str) -> Result<Vec<PricePoint>> {
    let value: Value = serde_json::from_str(body).map_err(Error::DeserializationFailed)?;

    // The chart API reports failures inside the body, so we check for that first.
    if let Some(error) = value.pointer("/chart/error").filter(|e| !e.is_null()) {
        let code = match error.get("code") {
            Some(Value::String(code)) => code.clone(),
            Some(other) => other.to_string(),
            None => "unknown".to_string(),
        };
        let msg = error
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or("Unknown error")
            .to_string();
        return Err(Error::ApiError { code, msg });
    }

    let response: ChartResponse = serde_json::from_value(value).map_err(Error::DeserializationFailed)?;
    let no_data = || Error::NoData {
        symbol: symbol.to_string(),
        start,
        end,
    };

    let result = response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(no_data)?;

    let points = to_price_points(&result, start, end);
    if points.is_empty() {
        return Err(no_data());
    }
    Ok(points)
}

fn to_price_points(result: &ChartResult, start: NaiveDate, end: NaiveDate) -> Vec<PricePoint> {
    let closes: &[Option<f64>] = result
        .indicators
        .adjclose
        .first()
        .map(|a| a.adjclose.as_slice())
        .filter(|a| !a.is_empty())
        .or_else(|| result.indicators.quote.first().map(|q| q.close.as_slice()))
        .unwrap_or(&[]);

    let mut points: Vec<PricePoint> = Vec::with_capacity(result.timestamp.len());
    for (i, ts) in result.timestamp.iter().enumerate() {
        let Some(local) = DateTime::from_timestamp(ts + result.meta.gmtoffset, 0) else {
            continue;
        };
        let date = local.date_naive();
        if date < start || date >= end {
            continue;
        }
        let timestamp = date.and_time(NaiveTime::MIN).and_utc();
        if points.last().is_some_and(|p| p.timestamp >= timestamp) {
            continue;
        }

        let close = closes
            .get(i)
            .copied()
            .flatten()
            .and_then(Decimal::from_f64)
            .filter(|c| *c > Decimal::ZERO);
        points.push(PricePoint::new(timestamp, close));
    }
    points
}

fn epoch_seconds(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}
