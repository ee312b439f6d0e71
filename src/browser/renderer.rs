//! 渲染能力的抽象
//!
//! 抽取流程只依赖这两个 trait，生产环境使用 chromiumoxide，测试中可以替换为固定 HTML

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::error::AppResult;
use crate::models::DomSnapshot;

/// 一个已打开的页面会话
///
/// 会话由单个请求独占，请求结束时必须调用 [`RenderedPage::close`]
#[async_trait]
pub trait RenderedPage: Send + Sync {
    /// 导航到指定 URL，等待网络空闲后再等待固定的渲染时间
    async fn navigate(&self, url: &str) -> AppResult<()>;

    /// 在页面中执行无副作用的查询脚本，只返回可序列化的数据
    async fn evaluate(&self, script: &str) -> AppResult<JsonValue>;

    /// 获取当前渲染状态的快照
    async fn snapshot(&self) -> AppResult<DomSnapshot>;

    /// 释放浏览器资源，任何情况下都不会失败
    async fn close(self: Box<Self>);
}

/// 页面会话工厂
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// 启动浏览器并创建一个页面
    async fn open(&self) -> AppResult<Box<dyn RenderedPage>>;
}
