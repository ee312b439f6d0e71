use std::path::PathBuf;
use std::time::Duration;

use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::{AppResult, BrowserError};

/// 常见桌面浏览器的 User-Agent
pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// 浏览器会话参数
#[derive(Clone, Debug)]
pub struct BrowserSettings {
    /// 浏览器可执行文件（为空时自动查找）
    pub executable: Option<PathBuf>,
    pub user_agent: String,
    pub navigation_timeout: Duration,
    pub settle_delay: Duration,
    pub evaluate_timeout: Duration,
}

impl BrowserSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            executable: config.chrome_executable.clone(),
            user_agent: DESKTOP_USER_AGENT.to_string(),
            navigation_timeout: Duration::from_millis(config.navigation_timeout_ms),
            settle_delay: Duration::from_millis(config.settle_delay_ms),
            evaluate_timeout: Duration::from_millis(config.evaluate_timeout_ms),
        }
    }
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// 启动无头浏览器并创建一个空白页面
///
/// 返回浏览器、页面以及后台事件处理任务的句柄
pub async fn launch_headless_browser(
    settings: &BrowserSettings,
) -> AppResult<(Browser, Page, JoinHandle<()>)> {
    info!("🚀 启动无头浏览器...");

    // 配置无头浏览器
    let mut builder = BrowserConfig::builder().new_headless_mode().args(vec![
        "--no-sandbox",
        "--disable-setuid-sandbox",
        "--disable-gpu",
        "--disable-dev-shm-usage",
    ]);
    if let Some(path) = &settings.executable {
        debug!("使用浏览器: {}", path.display());
        builder = builder.chrome_executable(path);
    }
    let config = builder.build().map_err(|message| {
        error!("配置无头浏览器失败: {}", message);
        BrowserError::ConfigurationFailed { message }
    })?;

    // 启动浏览器
    let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
        error!("启动无头浏览器失败: {}", e);
        BrowserError::LaunchFailed {
            source: Box::new(e),
        }
    })?;
    debug!("无头浏览器启动成功");

    // 在后台处理浏览器事件
    let handler_task = tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 添加短暂延迟以等待浏览器状态同步
    sleep(Duration::from_millis(300)).await;

    let page = match browser.new_page("about:blank").await {
        Ok(page) => page,
        Err(e) => {
            error!("创建页面失败: {}", e);
            handler_task.abort();
            return Err(BrowserError::PageCreationFailed {
                source: Box::new(e),
            }
            .into());
        }
    };

    if let Err(e) = page
        .set_user_agent(SetUserAgentOverrideParams::new(settings.user_agent.clone()))
        .await
    {
        error!("设置 User-Agent 失败: {}", e);
        handler_task.abort();
        return Err(e.into());
    }
    debug!("已设置 User-Agent");

    Ok((browser, page, handler_task))
}
