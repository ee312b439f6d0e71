use std::sync::Arc;

use crate::browser::PageRenderer;
use crate::config::Config;
use crate::services::ReasoningOracle;
use crate::workflow::{ExportFlow, ScrapeFlow};

/// 所有请求共享的状态
///
/// 只包含启动时构建好的只读服务，请求之间没有可变共享状态
#[derive(Clone)]
pub struct AppState {
    pub scrape_flow: Arc<ScrapeFlow>,
    pub export_flow: Arc<ExportFlow>,
    pub credentials_configured: bool,
    pub default_max_items: usize,
}

impl AppState {
    pub fn new(
        config: &Config,
        oracle: Arc<dyn ReasoningOracle>,
        renderer: Arc<dyn PageRenderer>,
    ) -> Self {
        Self {
            scrape_flow: Arc::new(ScrapeFlow::new(oracle, renderer.clone(), config.tuning.clone())),
            export_flow: Arc::new(ExportFlow::new(renderer, &config.tuning)),
            credentials_configured: config.has_llm_credentials(),
            default_max_items: config.tuning.default_max_items,
        }
    }
}
