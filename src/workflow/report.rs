//! 流程输出

use serde::Serialize;

use crate::models::{DebugInfo, ExtractionRecord, SelectorScheme};

/// 抽取流程的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapePhase {
    ResolvingUrl,
    Navigating,
    Attempting(usize),
    Succeeded,
    Exhausted,
}

impl std::fmt::Display for ScrapePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ResolvingUrl => write!(f, "确定目标网址"),
            Self::Navigating => write!(f, "导航"),
            Self::Attempting(n) => write!(f, "第 {} 次尝试", n),
            Self::Succeeded => write!(f, "成功"),
            Self::Exhausted => write!(f, "尝试次数用尽"),
        }
    }
}

/// AI 代理的诊断信息
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentReport {
    pub attempts_used: usize,
    pub final_success_rate: f64,
    /// 最终使用的选择器方案（从未得到有效方案时为 null）
    pub selectors_used: Option<SelectorScheme>,
    pub debug_info: DebugInfo,
    pub message: String,
}

/// 抽取流程的最终结果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeOutcome {
    pub success: bool,
    pub data: Vec<ExtractionRecord>,
    pub count: usize,
    pub url: String,
    pub ai_agent: AgentReport,
}

impl ScrapeOutcome {
    /// 达到阈值后的完整抽取结果
    pub fn succeeded(
        url: &str,
        data: Vec<ExtractionRecord>,
        attempt: usize,
        success_rate: f64,
        scheme: SelectorScheme,
        debug_info: DebugInfo,
    ) -> Self {
        let message = format!(
            "Extracted {} items with {:.1}% success rate",
            data.len(),
            success_rate * 100.0
        );
        Self {
            success: true,
            count: data.len(),
            data,
            url: url.to_string(),
            ai_agent: AgentReport {
                attempts_used: attempt,
                final_success_rate: success_rate,
                selectors_used: Some(scheme),
                debug_info,
                message,
            },
        }
    }

    /// 尝试次数用尽，返回最好的一次样本
    pub fn exhausted(
        url: &str,
        data: Vec<ExtractionRecord>,
        attempts_used: usize,
        success_rate: f64,
        scheme: Option<SelectorScheme>,
        debug_info: DebugInfo,
    ) -> Self {
        let message = if data.is_empty() {
            "AI agent could not find suitable selectors. The website structure might be complex or protected."
                .to_string()
        } else {
            format!(
                "Found {} items with {:.1}% success rate",
                data.len(),
                success_rate * 100.0
            )
        };
        Self {
            success: !data.is_empty(),
            count: data.len(),
            data,
            url: url.to_string(),
            ai_agent: AgentReport {
                attempts_used,
                final_success_rate: success_rate,
                selectors_used: scheme,
                debug_info,
                message,
            },
        }
    }
}
