//! 抽取例程 - 业务能力层
//!
//! 测试模式、完整抽取、批量导出共用同一套"容器定位 → 字段抽取 → 兜底选择器"逻辑，
//! 差异只体现在 [`ExtractionLimits`] 上。
//!
//! 所有工作都在页面快照上完成（`scraper` 解析 outerHTML），
//! 对同一个快照和同一个方案，结果是确定的。

use std::collections::HashMap;

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::config::ExtractionTuning;
use crate::error::SelectorError;
use crate::models::{DebugInfo, ExtractionRecord, FieldFamily, SelectorScheme};
use crate::models::scheme::split_selector_list;

/// 声明的容器选择器全部失败时使用的通用容器选择器（按顺序尝试）
pub const FALLBACK_CONTAINERS: &[&str] = &[
    "[class*=\"product\"]",
    "[class*=\"item\"]",
    "[class*=\"card\"]",
    ".grid > *",
    ".collection > *",
    ".listing > *",
    "li",
    "article",
    ".entry",
];

/// 抽取的边界参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractionLimits {
    /// 最多处理的容器数量
    pub max_containers: Option<usize>,
    /// 字段文本的最大字符数
    pub truncate_len: Option<usize>,
    /// 兜底容器的最大数量
    pub fallback_cap: Option<usize>,
    /// 兜底容器选择器的匹配数必须严格大于该值
    pub fallback_min_matches: usize,
    /// 是否保留所有字段都为空的记录
    pub retain_empty: bool,
}

impl ExtractionLimits {
    /// 测试模式：只取少量容器评分，文本截断
    pub fn probe(tuning: &ExtractionTuning) -> Self {
        Self {
            max_containers: Some(tuning.sample_size),
            truncate_len: Some(tuning.probe_text_limit),
            fallback_cap: Some(tuning.fallback_cap),
            fallback_min_matches: tuning.fallback_min_matches,
            retain_empty: true,
        }
    }

    /// 完整抽取：受方案的 maxItems 限制，不截断
    pub fn full(tuning: &ExtractionTuning, max_items: usize) -> Self {
        Self {
            max_containers: Some(max_items),
            truncate_len: None,
            fallback_cap: None,
            fallback_min_matches: tuning.fallback_min_matches,
            retain_empty: false,
        }
    }

    /// 批量导出：没有数量限制，也不截断
    pub fn bulk(tuning: &ExtractionTuning) -> Self {
        Self {
            max_containers: None,
            truncate_len: None,
            fallback_cap: None,
            fallback_min_matches: tuning.fallback_min_matches,
            retain_empty: false,
        }
    }
}

/// 抽取结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionOutput {
    /// 定位到的容器数量（兜底时已应用 fallback_cap）
    pub containers_found: usize,
    pub records: Vec<ExtractionRecord>,
    pub debug_info: DebugInfo,
}

/// 从 HTML 中按方案抽取记录
pub fn extract_records(
    html: &str,
    scheme: &SelectorScheme,
    limits: &ExtractionLimits,
) -> ExtractionOutput {
    let document = Html::parse_document(html);
    extract_from_document(&document, scheme, limits)
}

/// 从已解析的文档中按方案抽取记录
pub fn extract_from_document(
    document: &Html,
    scheme: &SelectorScheme,
    limits: &ExtractionLimits,
) -> ExtractionOutput {
    let mut cache = SelectorCache::default();
    let mut debug_info = DebugInfo::new();

    let containers = resolve_containers(document, scheme, limits, &mut cache, &mut debug_info);
    let containers_found = containers.len();
    let take = limits
        .max_containers
        .map_or(containers_found, |max| max.min(containers_found));

    let mut records = Vec::with_capacity(take);
    for container in containers.into_iter().take(take) {
        let record = extract_record(container, scheme, limits, &mut cache, &mut debug_info);
        if limits.retain_empty || record.has_content() {
            records.push(record);
        }
    }

    debug!(
        "抽取完成: 容器 {} 个, 处理 {} 个, 保留记录 {} 条",
        containers_found,
        take,
        records.len()
    );

    ExtractionOutput {
        containers_found,
        records,
        debug_info,
    }
}

/// 定位容器
///
/// 1. 按顺序尝试方案中的容器选择器，第一个匹配到至少一个元素的生效
/// 2. 全部失败时尝试通用容器选择器，匹配数严格大于阈值才生效
pub fn resolve_containers<'a>(
    document: &'a Html,
    scheme: &SelectorScheme,
    limits: &ExtractionLimits,
    cache: &mut SelectorCache,
    debug_info: &mut DebugInfo,
) -> Vec<ElementRef<'a>> {
    for raw in &scheme.containers {
        let selector_text = raw.trim();
        match cache.get(selector_text) {
            Ok(selector) => {
                let elements: Vec<_> = document.select(selector).collect();
                if !elements.is_empty() {
                    debug_info.insert("workingContainerSelector".to_string(), raw.clone());
                    return elements;
                }
            }
            Err(message) => {
                debug_info.insert(format!("container_error_{}", raw), message.clone());
            }
        }
    }

    for fallback in FALLBACK_CONTAINERS {
        if let Ok(selector) = cache.get(fallback) {
            let elements: Vec<_> = document.select(selector).collect();
            if elements.len() > limits.fallback_min_matches {
                let cap = limits.fallback_cap.unwrap_or(elements.len());
                debug_info.insert("fallbackContainerSelector".to_string(), fallback.to_string());
                return elements.into_iter().take(cap).collect();
            }
        }
    }

    Vec::new()
}

/// 从单个容器中抽取所有字段
fn extract_record(
    container: ElementRef<'_>,
    scheme: &SelectorScheme,
    limits: &ExtractionLimits,
    cache: &mut SelectorCache,
    debug_info: &mut DebugInfo,
) -> ExtractionRecord {
    let mut record = ExtractionRecord::new();

    for (field, selector_list) in &scheme.elements {
        let mut value = None;

        for selector_text in split_selector_list(selector_list) {
            match cache.get(selector_text) {
                Ok(selector) => {
                    if let Some(text) = first_match_text(container, selector) {
                        debug_info.insert(
                            format!("{}_working_selector", field),
                            selector_text.to_string(),
                        );
                        value = Some(text);
                        break;
                    }
                }
                Err(message) => {
                    debug_info.insert(format!("{}_error_{}", field, selector_text), message.clone());
                }
            }
        }

        if value.is_none() {
            for fallback in FieldFamily::fallbacks_for(field) {
                if let Ok(selector) = cache.get(fallback) {
                    if let Some(text) = first_match_text(container, selector) {
                        debug_info.insert(
                            format!("{}_fallback_selector", field),
                            fallback.to_string(),
                        );
                        value = Some(text);
                        break;
                    }
                }
            }
        }

        let value = value
            .map(|text| truncate_chars(text, limits.truncate_len))
            .unwrap_or_default();
        record.insert(field.clone(), value);
    }

    record
}

/// 容器内第一个匹配元素的去空白文本，文本为空时视为未匹配
fn first_match_text(container: ElementRef<'_>, selector: &Selector) -> Option<String> {
    let element = container.select(selector).next()?;
    let text = element.text().collect::<String>();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn truncate_chars(text: String, limit: Option<usize>) -> String {
    match limit {
        Some(max) if text.chars().count() > max => text.chars().take(max).collect(),
        _ => text,
    }
}

/// 选择器解析缓存
///
/// 同一个选择器在每个容器上都会用到，只解析一次；无效的选择器记住错误信息
#[derive(Default)]
pub struct SelectorCache {
    parsed: HashMap<String, Result<Selector, String>>,
}

impl SelectorCache {
    pub fn get(&mut self, selector: &str) -> &Result<Selector, String> {
        self.parsed
            .entry(selector.to_string())
            .or_insert_with(|| parse_selector(selector).map_err(|e| e.to_string()))
    }
}

/// 解析 CSS 选择器
pub fn parse_selector(selector: &str) -> Result<Selector, SelectorError> {
    Selector::parse(selector).map_err(|e| SelectorError::Invalid {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}
