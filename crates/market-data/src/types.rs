// In crates/market-data/src/types.rs

use serde::Deserialize;

/// Top-level body of a `/v8/finance/chart/{symbol}` response.
#[derive(Debug, Deserialize, Clone)]
pub struct ChartResponse {
    pub chart: ChartBody,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChartBody {
    /// Present (usually with a single element) on success.
    pub result: Option<Vec<ChartResult>>,
    /// Present on failure; `null` otherwise.
    pub error: Option<ChartError>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChartError {
    pub code: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChartResult {
    pub meta: ChartMeta,
    /// Bar open times in epoch seconds. Missing when the range has no bars.
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: Indicators,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ChartMeta {
    pub symbol: String,
    #[serde(default)]
    pub currency: Option<String>,
    /// Offset of the exchange's time zone from UTC, in seconds.
    #[serde(default)]
    pub gmtoffset: i64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<Quote>,
    #[serde(default)]
    pub adjclose: Vec<AdjClose>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Quote {
    #[serde(default)]
    pub close: Vec<Option<f64>>,
}

/// Split- and dividend-adjusted closes.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AdjClose {
    #[serde(default)]
    pub adjclose: Vec<Option<f64>>,
}
