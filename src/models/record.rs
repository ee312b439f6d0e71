use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::scheme::SelectorScheme;

/// 诊断信息：键 → 生效的选择器或错误信息
pub type DebugInfo = IndexMap<String, String>;

/// 一条抽取记录（字段名 → 文本，保持字段顺序）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractionRecord(IndexMap<String, String>);

impl ExtractionRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// 字段名（按插入顺序）
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// 非空字段数量
    pub fn filled_count(&self) -> usize {
        self.0.values().filter(|v| !v.is_empty()).count()
    }

    /// 至少有一个字段非空
    pub fn has_content(&self) -> bool {
        self.filled_count() > 0
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ExtractionRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// 选择器测试报告（不含方案本身，由调用方补充）
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeReport {
    /// 平均字段填充率，取值 [0, 1]
    pub success_rate: f64,
    pub containers_found: usize,
    /// 参与评分的样本记录（最多 sample_size 条）
    pub sample_records: Vec<ExtractionRecord>,
    pub debug_info: DebugInfo,
}

/// 一次尝试的完整结果
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptResult {
    /// 尝试编号（从 1 开始）
    pub attempt: usize,
    pub scheme: SelectorScheme,
    pub report: ProbeReport,
}

impl AttemptResult {
    pub fn success_rate(&self) -> f64 {
        self.report.success_rate
    }
}

/// 目前为止成功率最高的尝试
///
/// 只有严格超过当前最好成绩时才替换，并列时保留更早的尝试
#[derive(Debug, Clone, Default)]
pub struct BestSoFar {
    best: Option<AttemptResult>,
}

impl BestSoFar {
    pub fn new() -> Self {
        Self::default()
    }

    /// 提交一次尝试结果，返回是否成为新的最好成绩
    pub fn offer(&mut self, candidate: &AttemptResult) -> bool {
        if candidate.success_rate() > self.success_rate() {
            self.best = Some(candidate.clone());
            true
        } else {
            false
        }
    }

    pub fn success_rate(&self) -> f64 {
        self.best.as_ref().map_or(0.0, AttemptResult::success_rate)
    }

    pub fn get(&self) -> Option<&AttemptResult> {
        self.best.as_ref()
    }

    pub fn into_inner(self) -> Option<AttemptResult> {
        self.best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attempt(n: usize, rate: f64) -> AttemptResult {
        AttemptResult {
            attempt: n,
            scheme: SelectorScheme {
                elements: [("name".to_string(), "h2".to_string())].into_iter().collect(),
                containers: Vec::new(),
                max_items: 20,
            },
            report: ProbeReport {
                success_rate: rate,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_record_content_checks() {
        let blank: ExtractionRecord = [("name", ""), ("price", "")].into_iter().collect();
        assert!(!blank.has_content());
        let partial: ExtractionRecord = [("name", "Lamp"), ("price", "")].into_iter().collect();
        assert!(partial.has_content());
        assert_eq!(partial.filled_count(), 1);
        assert_eq!(partial.fields().collect::<Vec<_>>(), vec!["name", "price"]);
    }

    #[test]
    fn test_best_so_far_starts_empty() {
        let best = BestSoFar::new();
        assert_eq!(best.success_rate(), 0.0);
        assert!(best.get().is_none());
    }

    #[test]
    fn test_best_so_far_ignores_zero_rate() {
        let mut best = BestSoFar::new();
        assert!(!best.offer(&attempt(1, 0.0)));
        assert!(best.get().is_none());
    }

    #[test]
    fn test_best_so_far_keeps_earliest_on_tie() {
        let mut best = BestSoFar::new();
        assert!(best.offer(&attempt(1, 0.2)));
        assert!(!best.offer(&attempt(2, 0.2)));
        assert!(best.offer(&attempt(3, 0.22)));
        assert_eq!(best.get().map(|a| a.attempt), Some(3));
        assert!(!best.offer(&attempt(4, 0.1)));
        assert_eq!(best.into_inner().map(|a| a.attempt), Some(3));
    }
}
