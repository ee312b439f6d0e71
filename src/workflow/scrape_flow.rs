//! 自适应抽取流程 - 流程层
//!
//! 核心职责：定义"一次抓取请求"的完整处理流程
//!
//! 流程顺序：
//! 1. 确定目标网址（请求中包含 URL 时直接使用）
//! 2. 打开渲染会话并导航
//! 3. 最多 N 次：采样页面结构 → 生成选择器 → 测试 → 达到阈值则完整抽取
//! 4. 用尽次数后返回成功率最高的样本

use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::{debug, info, warn};

use crate::browser::{PageRenderer, RenderedPage};
use crate::config::ExtractionTuning;
use crate::error::AppResult;
use crate::models::{AttemptResult, BestSoFar, ExtractionRecord, SelectorScheme};
use crate::services::extractor::{extract_records, ExtractionLimits};
use crate::services::{
    meets_threshold, PageSampler, ReasoningClient, ReasoningOracle, SelectorTester,
};
use crate::workflow::report::{ScrapeOutcome, ScrapePhase};

static URL_IN_QUERY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+").expect("URL 正则表达式无效"));

/// 在请求文本中查找第一个 http(s) URL
pub fn find_url_in_query(query: &str) -> Option<&str> {
    URL_IN_QUERY.find(query).map(|m| m.as_str())
}

/// 自适应抽取流程
///
/// - 编排整个请求的处理流程
/// - 持有注入的推理服务和渲染器，不持有任何页面
/// - 每个请求独占一个渲染会话，所有退出路径上都会关闭
pub struct ScrapeFlow {
    reasoning: ReasoningClient,
    renderer: Arc<dyn PageRenderer>,
    tester: SelectorTester,
    sampler: PageSampler,
    tuning: ExtractionTuning,
}

impl ScrapeFlow {
    pub fn new(
        oracle: Arc<dyn ReasoningOracle>,
        renderer: Arc<dyn PageRenderer>,
        tuning: ExtractionTuning,
    ) -> Self {
        Self {
            reasoning: ReasoningClient::new(oracle),
            renderer,
            tester: SelectorTester::new(&tuning),
            sampler: PageSampler::new(tuning.snippet_len),
            tuning,
        }
    }

    pub async fn run(&self, query: &str) -> AppResult<ScrapeOutcome> {
        info!("🚀 开始智能抓取: {}", query);

        debug!("阶段: {}", ScrapePhase::ResolvingUrl);
        let url = self.resolve_url(query).await?;

        debug!("阶段: {}", ScrapePhase::Navigating);
        let page = self.renderer.open().await?;
        let result = self.run_on_page(page.as_ref(), query, &url).await;
        page.close().await;
        result
    }

    async fn resolve_url(&self, query: &str) -> AppResult<String> {
        if let Some(url) = find_url_in_query(query) {
            info!("🔗 请求中包含 URL: {}", url);
            return Ok(url.to_string());
        }

        let site = self.reasoning.resolve_target_url(query).await?;
        info!("🎯 AI 确定的目标网站: {} ({})", site.url, site.reasoning);
        Ok(site.url)
    }

    async fn run_on_page(
        &self,
        page: &dyn RenderedPage,
        query: &str,
        url: &str,
    ) -> AppResult<ScrapeOutcome> {
        page.navigate(url).await?;

        let max_attempts = self.tuning.max_attempts;
        let mut best = BestSoFar::new();

        for attempt in 1..=max_attempts {
            info!("🤖 AI 代理 {} / {}", ScrapePhase::Attempting(attempt), max_attempts);
            match self.attempt(page, query, url, attempt, &mut best).await {
                Ok(Some(outcome)) => {
                    debug!("阶段: {}", ScrapePhase::Succeeded);
                    return Ok(outcome);
                }
                Ok(None) => {}
                Err(e) => warn!("第 {} 次尝试出错: {}", attempt, e),
            }
        }

        debug!("阶段: {}", ScrapePhase::Exhausted);
        Ok(self.exhausted(url, best))
    }

    /// 单次尝试：达到阈值时返回完整结果，否则返回 None
    async fn attempt(
        &self,
        page: &dyn RenderedPage,
        query: &str,
        url: &str,
        attempt: usize,
        best: &mut BestSoFar,
    ) -> AppResult<Option<ScrapeOutcome>> {
        let page_sample = if attempt > 1 {
            let sample = self.sampler.sample(page).await?;
            info!("📄 已采集页面结构: {} 个结构元素", sample.structure.len());
            sample.to_prompt_json()
        } else {
            String::new()
        };

        let scheme = self
            .reasoning
            .generate_scheme(query, &page_sample, attempt, self.tuning.default_max_items)
            .await?;

        info!("🧪 测试选择器...");
        let report = self.tester.test(page, &scheme).await?;
        let result = AttemptResult {
            attempt,
            scheme,
            report,
        };
        if best.offer(&result) {
            debug!("第 {} 次尝试成为目前最好的结果", attempt);
        }

        let rate = result.success_rate();
        if !meets_threshold(rate, self.tuning.success_threshold) {
            info!("❌ 成功率过低 ({:.1}%)，继续尝试", rate * 100.0);
            return Ok(None);
        }

        info!("✅ 找到可用的选择器 ({:.1}%)，开始完整抽取", rate * 100.0);
        let data = self.extract_full(page, &result.scheme).await?;
        info!("✓ 完整抽取完成: {} 条记录", data.len());

        let AttemptResult { scheme, report, .. } = result;
        Ok(Some(ScrapeOutcome::succeeded(
            url,
            data,
            attempt,
            rate,
            scheme,
            report.debug_info,
        )))
    }

    /// 使用已通过测试的方案，抽取最多 maxItems 条记录
    async fn extract_full(
        &self,
        page: &dyn RenderedPage,
        scheme: &SelectorScheme,
    ) -> AppResult<Vec<ExtractionRecord>> {
        let snapshot = page.snapshot().await?;
        let limits = ExtractionLimits::full(&self.tuning, scheme.max_items);
        Ok(extract_records(&snapshot.html, scheme, &limits).records)
    }

    fn exhausted(&self, url: &str, best: BestSoFar) -> ScrapeOutcome {
        let attempts_used = self.tuning.max_attempts;
        let Some(best) = best.into_inner() else {
            info!("🏁 所有尝试完成，没有任何可用结果");
            return ScrapeOutcome::exhausted(
                url,
                Vec::new(),
                attempts_used,
                0.0,
                None,
                Default::default(),
            );
        };

        let rate = best.success_rate();
        let data: Vec<ExtractionRecord> = best
            .report
            .sample_records
            .into_iter()
            .filter(ExtractionRecord::has_content)
            .collect();
        info!(
            "🏁 所有尝试完成，最好结果来自第 {} 次尝试: {} 条记录, {:.1}%",
            best.attempt,
            data.len(),
            rate * 100.0
        );

        ScrapeOutcome::exhausted(
            url,
            data,
            attempts_used,
            rate,
            Some(best.scheme),
            best.report.debug_info,
        )
    }
}
