//! 错误到 HTTP 响应的映射

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value as JsonValue};
use tracing::{error, warn};

use crate::error::{AppError, ConfigError, ExportError, RequestError};

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Json(error_body(&self))).into_response()
    }
}

/// 错误响应体：`{error}` 或 `{error, details}`
fn error_body(err: &AppError) -> JsonValue {
    match err {
        AppError::Config(ConfigError::MissingApiKey) => json!({ "error": err.to_string() }),
        AppError::Export(ExportError::DataEmpty { .. }) => {
            json!({ "error": "No data found for export" })
        }
        AppError::Request(e @ RequestError::MalformedBody { message }) => {
            warn!("请求体无法解析: {}", message);
            json!({ "error": e.to_string(), "details": message })
        }
        AppError::Request(e) => json!({ "error": e.to_string() }),
        _ => {
            error!("❌ 抓取出错: {}", err.detail_chain());
            json!({
                "error": err.to_string(),
                "details": err.detail_chain(),
            })
        }
    }
}
