//! # AI Scraper
//!
//! 一个由 LLM 驱动、能自我修正选择器的网页抓取服务
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `JsExecutor` - 唯一的 page owner，提供带超时的 eval() 能力
//! - `browser/` - 无头浏览器启动与渲染会话（每个请求一个）
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `ReasoningClient` - 确定目标网址、生成选择器方案
//! - `SelectorTester` / `PageSampler` - 测试方案、采集页面结构
//! - `BulkExtractor` / `to_csv` - 批量抽取与 CSV 序列化
//!
//! ### ③ 流程层（Workflow）
//! - `ScrapeFlow` - 自适应抽取流程（生成 → 测试 → 反馈 → 重试）
//! - `ExportFlow` - CSV 导出流程
//!
//! ### ④ 接口层（API）
//! - `api/` - axum 路由，`POST /api/scrape` 与 `GET /health`

pub mod api;
pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use api::{build_router, AppState};
pub use browser::{ChromeRenderer, PageRenderer, RenderedPage};
pub use config::{Config, ExtractionTuning};
pub use error::{AppError, AppResult};
pub use infrastructure::JsExecutor;
pub use models::{ExtractionRecord, SelectorScheme};
pub use services::{OpenAiOracle, ReasoningOracle};
pub use workflow::{ExportFlow, ScrapeFlow, ScrapeOutcome};
