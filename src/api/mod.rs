//! API 模块
//!
//! 对外唯一的入口：HTTP 接口

pub mod error;
pub mod health;
pub mod scrape;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use scrape::ScrapeRequest;
pub use state::AppState;

/// 构建路由
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/scrape", post(scrape::scrape_handler))
        .route("/health", get(health::health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
