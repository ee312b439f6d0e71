//! 选择器测试 - 业务能力层
//!
//! 在当前页面上试运行选择器方案，只取少量容器，给出平均字段填充率

use tracing::{debug, info};

use super::extractor::{extract_records, ExtractionLimits};
use crate::browser::RenderedPage;
use crate::config::ExtractionTuning;
use crate::error::AppResult;
use crate::models::{DomSnapshot, ExtractionRecord, ProbeReport, SelectorScheme};

/// 选择器测试器
pub struct SelectorTester {
    limits: ExtractionLimits,
}

impl SelectorTester {
    pub fn new(tuning: &ExtractionTuning) -> Self {
        Self {
            limits: ExtractionLimits::probe(tuning),
        }
    }

    /// 对页面当前状态测试方案
    pub async fn test(
        &self,
        page: &dyn RenderedPage,
        scheme: &SelectorScheme,
    ) -> AppResult<ProbeReport> {
        let snapshot = page.snapshot().await?;
        let report = self.test_snapshot(&snapshot, scheme);
        info!(
            "🔍 选择器测试: 容器 {} 个, 成功率 {:.1}%",
            report.containers_found,
            report.success_rate * 100.0
        );
        Ok(report)
    }

    /// 对快照测试方案（纯函数，同一输入结果相同）
    pub fn test_snapshot(&self, snapshot: &DomSnapshot, scheme: &SelectorScheme) -> ProbeReport {
        let output = extract_records(&snapshot.html, scheme, &self.limits);
        let success_rate = success_rate(&output.records, scheme.elements.len());
        debug!("诊断信息: {:?}", output.debug_info);

        ProbeReport {
            success_rate,
            containers_found: output.containers_found,
            sample_records: output.records,
            debug_info: output.debug_info,
        }
    }
}

/// 平均字段填充率
///
/// 每条记录的得分 = 非空字段数 / 字段总数，没有记录时为 0
pub fn success_rate(records: &[ExtractionRecord], field_count: usize) -> f64 {
    if records.is_empty() || field_count == 0 {
        return 0.0;
    }
    let total: f64 = records
        .iter()
        .map(|record| record.filled_count() as f64 / field_count as f64)
        .sum();
    total / records.len() as f64
}

/// 成功率达到阈值即视为可用（恰好等于阈值也算）
pub fn meets_threshold(rate: f64, threshold: f64) -> bool {
    rate >= threshold
}
