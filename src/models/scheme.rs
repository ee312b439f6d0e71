//! 选择器方案
//!
//! LLM 返回的 JSON 没有任何结构保证，先反序列化为 [`RawScheme`]，
//! 校验通过后才得到可以使用的 [`SelectorScheme`]。

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{AppError, AppResult};

/// 校验后的选择器方案
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectorScheme {
    /// 字段名 → 逗号分隔的候选选择器（先匹配者优先）
    pub elements: IndexMap<String, String>,
    /// 候选容器选择器（第一个匹配到元素的生效）
    pub containers: Vec<String>,
    /// 完整抽取时的最大条目数
    pub max_items: usize,
}

impl SelectorScheme {
    /// 从任意 JSON 值构建并校验
    pub fn from_value(value: JsonValue, default_max_items: usize) -> AppResult<Self> {
        let raw: RawScheme = serde_json::from_value(value)
            .map_err(|e| AppError::invalid_scheme(format!("结构不符合要求: {}", e)))?;
        raw.validate(default_max_items)
    }
}

/// 把逗号分隔的选择器字符串拆成列表
pub fn split_selector_list(selectors: &str) -> Vec<&str> {
    selectors
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// 未校验的选择器方案
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawScheme {
    #[serde(default)]
    pub elements: IndexMap<String, JsonValue>,
    #[serde(default)]
    pub containers: JsonValue,
    #[serde(default, rename = "maxItems")]
    pub max_items: JsonValue,
}

impl RawScheme {
    /// 校验并转换为 [`SelectorScheme`]
    ///
    /// CSS 语法本身不在这里校验，无效的选择器在执行时被跳过并记录
    pub fn validate(self, default_max_items: usize) -> AppResult<SelectorScheme> {
        if self.elements.is_empty() {
            return Err(AppError::invalid_scheme("elements 不能为空"));
        }

        let mut elements = IndexMap::with_capacity(self.elements.len());
        for (field, value) in self.elements {
            let field = field.trim().to_string();
            if field.is_empty() {
                return Err(AppError::invalid_scheme("字段名不能为空"));
            }
            let selectors = match value {
                JsonValue::String(s) => s,
                JsonValue::Array(items) => items
                    .iter()
                    .filter_map(JsonValue::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
                other => {
                    return Err(AppError::invalid_scheme(format!(
                        "字段 {} 的选择器类型无效: {}",
                        field, other
                    )))
                }
            };
            if split_selector_list(&selectors).is_empty() {
                return Err(AppError::invalid_scheme(format!(
                    "字段 {} 没有任何选择器",
                    field
                )));
            }
            elements.insert(field, selectors);
        }

        let containers = match self.containers {
            JsonValue::Null => Vec::new(),
            JsonValue::String(s) => vec![s],
            JsonValue::Array(items) => items
                .iter()
                .filter_map(JsonValue::as_str)
                .map(str::to_string)
                .collect(),
            other => {
                return Err(AppError::invalid_scheme(format!(
                    "containers 类型无效: {}",
                    other
                )))
            }
        };
        let containers = containers
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_items = parse_max_items(&self.max_items, default_max_items)?;

        Ok(SelectorScheme {
            elements,
            containers,
            max_items,
        })
    }
}

fn parse_max_items(value: &JsonValue, default_max_items: usize) -> AppResult<usize> {
    let parsed = match value {
        JsonValue::Null => return Ok(default_max_items),
        JsonValue::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64)),
        JsonValue::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    match parsed {
        Some(n) if n > 0 => Ok(n as usize),
        _ => Err(AppError::invalid_scheme(format!(
            "maxItems 必须是正整数: {}",
            value
        ))),
    }
}
