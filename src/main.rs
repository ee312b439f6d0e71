use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use ai_scraper::browser::BrowserSettings;
use ai_scraper::utils::logging;
use ai_scraper::{build_router, AppState, ChromeRenderer, Config, OpenAiOracle};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::load().context("加载配置失败")?;

    // 初始化日志
    logging::init(config.verbose_logging);
    logging::log_startup(&config);

    // 推理服务和渲染器在启动时构建一次，注入到流程中
    let oracle = Arc::new(OpenAiOracle::new(&config));
    let renderer = Arc::new(ChromeRenderer::new(BrowserSettings::from_config(&config)));
    let app = build_router(AppState::new(&config, oracle, renderer));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("无法监听地址 {}", config.bind_addr))?;
    info!("✓ 服务已启动: http://{}/api/scrape", config.bind_addr);

    axum::serve(listener, app).await.context("服务器运行出错")?;
    Ok(())
}
