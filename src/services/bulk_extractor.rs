//! 批量抽取 - 业务能力层
//!
//! 使用已知的选择器方案，在独立的渲染会话中抽取页面上的全部记录

use std::sync::Arc;

use tracing::info;

use super::extractor::{extract_records, ExtractionLimits};
use crate::browser::{PageRenderer, RenderedPage};
use crate::config::ExtractionTuning;
use crate::error::AppResult;
use crate::models::{ExtractionRecord, SelectorScheme};

/// 批量抽取器
pub struct BulkExtractor {
    renderer: Arc<dyn PageRenderer>,
    limits: ExtractionLimits,
}

impl BulkExtractor {
    pub fn new(renderer: Arc<dyn PageRenderer>, tuning: &ExtractionTuning) -> Self {
        Self {
            renderer,
            limits: ExtractionLimits::bulk(tuning),
        }
    }

    /// 打开新会话 → 导航 → 抽取，无论成功与否都会关闭会话
    pub async fn extract_all(
        &self,
        scheme: &SelectorScheme,
        url: &str,
    ) -> AppResult<Vec<ExtractionRecord>> {
        let page = self.renderer.open().await?;
        let result = self.extract_on(page.as_ref(), scheme, url).await;
        page.close().await;
        result
    }

    async fn extract_on(
        &self,
        page: &dyn RenderedPage,
        scheme: &SelectorScheme,
        url: &str,
    ) -> AppResult<Vec<ExtractionRecord>> {
        page.navigate(url).await?;
        let snapshot = page.snapshot().await?;
        let output = extract_records(&snapshot.html, scheme, &self.limits);
        info!(
            "📦 批量抽取完成: 容器 {} 个, 记录 {} 条",
            output.containers_found,
            output.records.len()
        );
        Ok(output.records)
    }
}
