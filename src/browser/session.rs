//! 渲染会话
//!
//! 一个会话 = 一个浏览器进程 + 一个页面，生命周期限定在单个请求内

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chromiumoxide::Browser;
use serde_json::Value as JsonValue;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use super::headless::{launch_headless_browser, BrowserSettings};
use super::renderer::{PageRenderer, RenderedPage};
use crate::error::{AppError, AppResult, BrowserError};
use crate::infrastructure::js_executor::{
    network_idle_script, JsExecutor, NetworkIdleReport, NETWORK_QUIET_WINDOW, SNAPSHOT_SCRIPT,
};
use crate::models::DomSnapshot;

/// 基于 chromiumoxide 的渲染会话
pub struct RenderingSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
    executor: JsExecutor,
    settings: BrowserSettings,
}

impl RenderingSession {
    async fn wait_for_network_idle(
        &self,
        url: &str,
        remaining: Duration,
        budget: Duration,
    ) -> AppResult<()> {
        let script = network_idle_script(remaining, NETWORK_QUIET_WINDOW);
        let report = match self
            .executor
            .eval_within(script, remaining + IDLE_EVAL_GRACE)
            .await
        {
            Ok(value) => serde_json::from_value(value)?,
            Err(AppError::Browser(BrowserError::EvaluationTimeout { .. })) => {
                NetworkIdleReport::default()
            }
            Err(e) => return Err(e),
        };
        check_network_idle(url, &report, budget)
    }

    /// 启动浏览器并创建页面
    pub async fn open(settings: BrowserSettings) -> AppResult<Self> {
        let (browser, page, handler_task) = launch_headless_browser(&settings).await?;
        let executor = JsExecutor::new(page, settings.evaluate_timeout);
        Ok(Self {
            browser,
            handler_task,
            executor,
            settings,
        })
    }
}

#[async_trait]
impl RenderedPage for RenderingSession {
    async fn navigate(&self, url: &str) -> AppResult<()> {
        info!("🌐 正在导航到: {}", url);
        let budget = self.settings.navigation_timeout;
        let started = Instant::now();
        let page = self.executor.page();
        let navigation = async {
            page.goto(url).await?.wait_for_navigation().await?;
            Ok::<_, chromiumoxide::error::CdpError>(())
        };

        match timeout(budget, navigation).await {
            Err(_) => return Err(navigation_timeout(url, budget)),
            Ok(Err(e)) => return Err(AppError::navigation_failed(url, e)),
            Ok(Ok(())) => {}
        }

        // load 之后仍可能有异步请求在加载列表数据，等待网络空闲（与导航共用同一时限）
        let remaining = budget.saturating_sub(started.elapsed());
        self.wait_for_network_idle(url, remaining, budget).await?;

        // 等待客户端渲染完成
        debug!("导航完成，等待 {:?} 渲染时间", self.settings.settle_delay);
        sleep(self.settings.settle_delay).await;
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> AppResult<JsonValue> {
        self.executor.eval(script).await
    }

    async fn snapshot(&self) -> AppResult<DomSnapshot> {
        let snapshot: DomSnapshot = self.executor.eval_as(SNAPSHOT_SCRIPT).await?;
        debug!(
            "页面快照: {} ({} 字节)",
            snapshot.url,
            snapshot.html.len()
        );
        Ok(snapshot)
    }

    async fn close(self: Box<Self>) {
        let RenderingSession {
            mut browser,
            handler_task,
            ..
        } = *self;

        if let Err(e) = browser.close().await {
            warn!("关闭浏览器失败: {}", e);
        }
        if let Err(e) = browser.wait().await {
            warn!("等待浏览器进程退出失败: {}", e);
        }
        handler_task.abort();
        debug!("浏览器已关闭");
    }
}

/// 网络空闲脚本在页面内自行计时，外层超时只需略长一些
const IDLE_EVAL_GRACE: Duration = Duration::from_secs(2);

fn navigation_timeout(url: &str, budget: Duration) -> AppError {
    BrowserError::NavigationTimeout {
        url: url.to_string(),
        timeout_ms: budget.as_millis() as u64,
    }
    .into()
}

/// 时限内未达到网络空闲按导航超时处理
fn check_network_idle(
    url: &str,
    report: &NetworkIdleReport,
    budget: Duration,
) -> AppResult<()> {
    if !report.ok {
        warn!("⏱ 网络未在时限内空闲: {} (资源 {} 个)", url, report.resource_count);
        return Err(navigation_timeout(url, budget));
    }
    debug!(
        "网络已空闲: 资源 {} 个, 等待 {} ms",
        report.resource_count, report.waited_ms
    );
    Ok(())
}

/// 生产环境的渲染器：每次 open 都启动一个独立的浏览器进程
#[derive(Clone, Debug)]
pub struct ChromeRenderer {
    settings: BrowserSettings,
}

impl ChromeRenderer {
    pub fn new(settings: BrowserSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl PageRenderer for ChromeRenderer {
    async fn open(&self) -> AppResult<Box<dyn RenderedPage>> {
        let session = RenderingSession::open(self.settings.clone()).await?;
        Ok(Box::new(session))
    }
}
