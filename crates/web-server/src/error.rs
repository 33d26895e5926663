// In crates/web-server/src/error.rs

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Backtest failed: {0}")]
    Backtest(#[from] core_types::Error),

    #[error("Backtest failed: {0}")]
    MarketData(#[from] market_data::Error),

    #[error("Failed to bind server address: {0}")]
    ServerBindError(std::io::Error),

    #[error("Server error: {0}")]
    ServerError(std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Backtest(core_types::Error::InvalidParameter(_))
            | Error::Backtest(core_types::Error::InsufficientData { .. })
            | Error::Backtest(core_types::Error::Overflow(_)) => StatusCode::BAD_REQUEST,
            Error::Backtest(core_types::Error::NoData(_))
            | Error::MarketData(_)
            | Error::ServerBindError(_)
            | Error::ServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed.");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self, "Request rejected.");
        }

        let body = Json(json!({
            "success": false,
            "error": self.to_string(),
        }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_client_or_server_status() {
        let invalid = Error::from(core_types::Error::InvalidParameter("x".into()));
        let short = Error::from(core_types::Error::InsufficientData { len: 3, period: 5 });
        let empty = Error::from(core_types::Error::NoData("x".into()));
        assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(short.status_code(), StatusCode::BAD_REQUEST);
        let overflow = Error::from(core_types::Error::Overflow("x".into()));
        assert_eq!(overflow.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(empty.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(Error::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn message_carries_the_cause() {
        let err = Error::from(core_types::Error::InsufficientData { len: 3, period: 5 });
        assert_eq!(err.to_string(), "Backtest failed: Data length (3) must be >= period (5)");
    }
}
