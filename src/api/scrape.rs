//! `POST /api/scrape`
//!
//! - `{query}` → 自适应抽取流程，返回 JSON
//! - `{action: "export", selectors, url}` → 批量抽取，返回 CSV 附件

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use tracing::info;

use super::state::AppState;
use crate::error::{AppError, AppResult, ConfigError, RequestError};
use crate::models::SelectorScheme;

const EXPORT_ACTION: &str = "export";

/// 请求体
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScrapeRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub selectors: Option<JsonValue>,
    #[serde(default)]
    pub url: Option<String>,
}

pub async fn scrape_handler(
    State(state): State<AppState>,
    body: Result<Json<ScrapeRequest>, JsonRejection>,
) -> Response {
    // 请求体解析失败同样返回 `{error, details}`
    let body = match body {
        Ok(Json(body)) => body,
        Err(rejection) => return malformed_body(rejection).into_response(),
    };
    match handle(&state, body).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}

fn malformed_body(rejection: JsonRejection) -> AppError {
    RequestError::MalformedBody {
        message: rejection.body_text(),
    }
    .into()
}

async fn handle(state: &AppState, body: ScrapeRequest) -> AppResult<Response> {
    if !state.credentials_configured {
        return Err(ConfigError::MissingApiKey.into());
    }

    if body.action.as_deref() == Some(EXPORT_ACTION) {
        return export(state, body).await;
    }

    let query = non_blank(body.query).ok_or(RequestError::MissingField("Query is required"))?;
    let outcome = state.scrape_flow.run(&query).await?;
    info!(
        "🏁 抓取完成: success={}, {} 条记录",
        outcome.success, outcome.count
    );

    if outcome.success {
        return Ok(Json(outcome).into_response());
    }

    let response = (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "Could not extract data from the website",
            "details": outcome.ai_agent.message,
            "aiAgent": outcome.ai_agent,
        })),
    );
    Ok(response.into_response())
}

async fn export(state: &AppState, body: ScrapeRequest) -> AppResult<Response> {
    let selectors = body.selectors.filter(|v| !v.is_null());
    let (Some(selectors), Some(url)) = (selectors, non_blank(body.url)) else {
        return Err(
            RequestError::MissingField("Selectors and URL are required for export").into(),
        );
    };

    let scheme =
        SelectorScheme::from_value(selectors, state.default_max_items).map_err(|e| match e {
            AppError::Llm(inner) => AppError::from(RequestError::Invalid(inner.to_string())),
            other => other,
        })?;

    let export = state.export_flow.run(&scheme, &url).await?;
    let disposition = format!("attachment; filename=\"{}\"", export.filename);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        export.content,
    )
        .into_response())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
