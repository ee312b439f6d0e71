//! JS 执行器 - 基础设施层
//!
//! 持有唯一的 page 资源，只暴露"执行 JS"的能力

use std::time::Duration;

use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tokio::time::timeout;

use crate::error::{AppResult, BrowserError};

/// 页面快照脚本：只返回可序列化的数据，DOM 节点不会离开页面
pub const SNAPSHOT_SCRIPT: &str = r#"(() => ({
    url: window.location.href,
    title: document.title || '',
    html: document.documentElement ? document.documentElement.outerHTML : ''
}))()"#;

/// 网络空闲判定：资源条目数连续保持不变的时长
pub const NETWORK_QUIET_WINDOW: Duration = Duration::from_millis(500);

/// 构建等待网络空闲的页面脚本
///
/// 每 100 ms 读取一次 `performance` 中的资源条目数，文档加载完成且条目数在
/// `quiet` 内不再变化即视为空闲；超过 `budget` 仍未空闲时返回 `ok: false`
pub fn network_idle_script(budget: Duration, quiet: Duration) -> String {
    format!(
        r#"(async () => {{
    const timeoutMs = {timeout_ms};
    const quietMs = {quiet_ms};
    const interval = 100;
    const count = () => {{
        try {{ return performance.getEntriesByType('resource').length; }} catch (_) {{ return 0; }}
    }};
    const start = Date.now();
    let last = count();
    let stable = 0;
    while (Date.now() - start < timeoutMs) {{
        await new Promise(r => setTimeout(r, interval));
        const current = count();
        if (document.readyState === 'complete' && current === last) {{
            stable += interval;
            if (stable >= quietMs) {{
                return {{ ok: true, resourceCount: current, waitedMs: Date.now() - start }};
            }}
        }} else {{
            stable = 0;
        }}
        last = current;
    }}
    return {{ ok: false, resourceCount: last, waitedMs: Date.now() - start }};
}})()"#,
        timeout_ms = budget.as_millis(),
        quiet_ms = quiet.as_millis(),
    )
}

/// 网络空闲脚本的返回值
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkIdleReport {
    pub ok: bool,
    #[serde(default)]
    pub resource_count: u64,
    #[serde(default)]
    pub waited_ms: u64,
}

/// JS 执行器
///
/// 职责：
/// - 持有唯一的 Page 资源
/// - 暴露 eval() 能力，每次执行都有超时保护
/// - 不认识选择器方案 / 抽取流程
pub struct JsExecutor {
    page: Page,
    eval_timeout: Duration,
}

impl JsExecutor {
    /// 创建新的 JS 执行器
    pub fn new(page: Page, eval_timeout: Duration) -> Self {
        Self { page, eval_timeout }
    }

    /// 获取 page 的引用（用于导航等操作）
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 执行 JS 代码并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> AppResult<JsonValue> {
        self.eval_within(js_code, self.eval_timeout).await
    }

    /// 使用指定的超时执行 JS 代码（脚本本身需要等待较长时间时使用）
    pub async fn eval_within(
        &self,
        js_code: impl Into<String>,
        limit: Duration,
    ) -> AppResult<JsonValue> {
        let result = timeout(limit, self.page.evaluate(js_code.into()))
            .await
            .map_err(|_| BrowserError::EvaluationTimeout {
                timeout_ms: limit.as_millis() as u64,
            })??;
        let json_value = result.into_value()?;
        Ok(json_value)
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(
        &self,
        js_code: impl Into<String>,
    ) -> AppResult<T> {
        let json_value = self.eval(js_code).await?;
        let typed_value = serde_json::from_value(json_value)?;
        Ok(typed_value)
    }
}
