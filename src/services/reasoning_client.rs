//! 推理客户端 - 业务能力层
//!
//! 把用户请求变成目标 URL 和选择器方案。所有网络调用都委托给 [`ReasoningOracle`]

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{debug, info};

use super::llm_service::ReasoningOracle;
use super::prompts;
use crate::error::{AppResult, LlmError};
use crate::models::SelectorScheme;
use crate::utils::logging::truncate_text;

/// LLM 判断出的目标网站
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetSite {
    pub url: String,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub data_type: String,
}

/// 推理客户端
///
/// 职责：
/// - 构建提示词
/// - 从响应文本中取出 JSON 对象
/// - 校验结构后再交给调用方
pub struct ReasoningClient {
    oracle: Arc<dyn ReasoningOracle>,
}

impl ReasoningClient {
    pub fn new(oracle: Arc<dyn ReasoningOracle>) -> Self {
        Self { oracle }
    }

    /// 根据请求确定目标网站
    pub async fn resolve_target_url(&self, query: &str) -> AppResult<TargetSite> {
        let response = self.oracle.complete(&prompts::target_site_prompt(query)).await?;
        let value = extract_json_object(&response)?;
        let site: TargetSite = serde_json::from_value(value).map_err(|e| LlmError::InvalidTarget {
            reason: e.to_string(),
        })?;

        let url = site.url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(LlmError::InvalidTarget {
                reason: format!("不是合法的 http(s) URL: '{}'", site.url),
            }
            .into());
        }

        Ok(TargetSite {
            url: url.to_string(),
            ..site
        })
    }

    /// 生成选择器方案
    ///
    /// 第一次尝试只使用请求本身；之后的尝试附带页面结构样本
    pub async fn generate_scheme(
        &self,
        query: &str,
        page_sample: &str,
        attempt: usize,
        default_max_items: usize,
    ) -> AppResult<SelectorScheme> {
        let prompt = if attempt <= 1 {
            prompts::initial_scheme_prompt(query)
        } else {
            prompts::retry_scheme_prompt(query, page_sample, attempt)
        };

        let response = self.oracle.complete(&prompt).await?;
        let value = extract_json_object(&response)?;
        let scheme = SelectorScheme::from_value(value, default_max_items)?;

        info!(
            "🧠 第 {} 次生成选择器: {} 个字段, {} 个容器选择器",
            attempt,
            scheme.elements.len(),
            scheme.containers.len()
        );
        debug!("生成的选择器: {:?}", scheme);
        Ok(scheme)
    }
}

/// 从自由文本中取出 JSON 对象
///
/// 取第一个 `{` 到最后一个 `}` 之间的内容（贪婪匹配，不做括号配对），
/// 结果必须能严格解析为 JSON 对象
pub fn extract_json_object(text: &str) -> AppResult<JsonValue> {
    let preview = || truncate_text(text.trim(), 200);

    let start = text.find('{').ok_or_else(|| LlmError::OracleFormat {
        reason: "找不到 '{'".to_string(),
        preview: preview(),
    })?;
    let end = text
        .rfind('}')
        .filter(|end| *end > start)
        .ok_or_else(|| LlmError::OracleFormat {
            reason: "找不到匹配的 '}'".to_string(),
            preview: preview(),
        })?;

    let candidate = &text[start..=end];
    let value: JsonValue = serde_json::from_str(candidate).map_err(|e| LlmError::OracleFormat {
        reason: e.to_string(),
        preview: preview(),
    })?;

    if !value.is_object() {
        return Err(LlmError::OracleFormat {
            reason: "不是 JSON 对象".to_string(),
            preview: preview(),
        }
        .into());
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    use crate::error::AppError;

    /// 按顺序返回预设响应，并记录收到的提示词
    struct ScriptedOracle {
        responses: Mutex<Vec<String>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedOracle {
        fn new(responses: &[&str]) -> Self {
            Self {
                responses: Mutex::new(responses.iter().rev().map(|s| s.to_string()).collect()),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ReasoningOracle for ScriptedOracle {
        async fn complete(&self, prompt: &str) -> AppResult<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.responses.lock().unwrap().pop().unwrap_or_default())
        }
    }

    #[test]
    fn test_extract_json_with_surrounding_prose() {
        let text = "Sure! Here you go:\n```json\n{\"url\": \"https://github.com/trending\"}\n```\nHope it helps.";
        let value = extract_json_object(text).unwrap();
        assert_eq!(value["url"], json!("https://github.com/trending"));
    }

    #[test]
    fn test_extract_json_with_nested_braces() {
        let text = r#"{"elements": {"name": "h2"}, "containers": ["li"]}"#;
        let value = extract_json_object(text).unwrap();
        assert_eq!(value["elements"]["name"], json!("h2"));
    }

    #[test]
    fn test_extract_json_rejects_truncated_stream() {
        let text = r#"{"elements": {"name": "h2""#;
        let err = extract_json_object(text).unwrap_err();
        assert!(matches!(err, AppError::Llm(LlmError::OracleFormat { .. })));
    }

    #[test]
    fn test_extract_json_rejects_concatenated_objects() {
        // 贪婪匹配会把两个对象连在一起，严格解析失败
        let text = r#"{"a": 1} and {"b": 2}"#;
        assert!(extract_json_object(text).is_err());
    }

    #[test]
    fn test_extract_json_rejects_plain_text() {
        assert!(extract_json_object("I cannot help with that").is_err());
        assert!(extract_json_object("} backwards {").is_err());
    }

    #[tokio::test]
    async fn test_resolve_target_url() {
        let oracle = Arc::new(ScriptedOracle::new(&[
            r#"{"url": " https://news.ycombinator.com ", "reasoning": "HN front page", "dataType": "posts"}"#,
        ]));
        let client = ReasoningClient::new(oracle.clone());

        let site = client.resolve_target_url("Hacker News posts").await.unwrap();
        assert_eq!(site.url, "https://news.ycombinator.com");
        assert_eq!(site.data_type, "posts");
        assert!(oracle.prompts.lock().unwrap()[0].contains("Hacker News posts"));
    }

    #[tokio::test]
    async fn test_resolve_target_url_rejects_relative_url() {
        let oracle = Arc::new(ScriptedOracle::new(&[r#"{"url": "/trending"}"#]));
        let client = ReasoningClient::new(oracle);
        let err = client.resolve_target_url("GitHub trending").await.unwrap_err();
        assert!(matches!(err, AppError::Llm(LlmError::InvalidTarget { .. })));
    }

    #[tokio::test]
    async fn test_generate_scheme_prompt_depends_on_attempt() {
        let scheme_json = r#"{"elements": {"name": "h2"}, "containers": [".card"], "maxItems": 10}"#;
        let oracle = Arc::new(ScriptedOracle::new(&[scheme_json, scheme_json]));
        let client = ReasoningClient::new(oracle.clone());

        let first = client.generate_scheme("shoes", "", 1, 20).await.unwrap();
        assert_eq!(first.max_items, 10);
        client
            .generate_scheme("shoes", "{\"structure\": []}", 2, 20)
            .await
            .unwrap();

        let prompts = oracle.prompts.lock().unwrap();
        assert!(!prompts[0].contains("PREVIOUS SELECTORS FAILED"));
        assert!(prompts[1].contains("PREVIOUS SELECTORS FAILED"));
        assert!(prompts[1].contains("{\"structure\": []}"));
    }

    #[tokio::test]
    async fn test_generate_scheme_rejects_invalid_shape() {
        let oracle = Arc::new(ScriptedOracle::new(&[r#"{"elements": {}}"#]));
        let client = ReasoningClient::new(oracle);
        let err = client.generate_scheme("shoes", "", 1, 20).await.unwrap_err();
        assert!(matches!(err, AppError::Llm(LlmError::InvalidScheme { .. })));
    }
}
