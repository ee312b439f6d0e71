use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{AppResult, ConfigError};

/// 默认配置文件路径
const DEFAULT_CONFIG_FILE: &str = "scraper.toml";

/// 抽取流程的可调参数
#[derive(Clone, Debug, PartialEq)]
pub struct ExtractionTuning {
    /// 每个请求最多生成选择器方案的次数
    pub max_attempts: usize,
    /// 成功率达到该值即进入完整抽取（包含边界值）
    pub success_threshold: f64,
    /// 测试模式下参与评分的容器数量
    pub sample_size: usize,
    /// 测试模式下字段文本的最大长度（字符）
    pub probe_text_limit: usize,
    /// 兜底容器选择器需要匹配到的元素数量必须严格大于该值
    pub fallback_min_matches: usize,
    /// 测试模式下兜底容器的最大数量
    pub fallback_cap: usize,
    /// LLM 未给出 maxItems 时的默认值
    pub default_max_items: usize,
    /// 页面结构样本中每个片段的 innerHTML 长度
    pub snippet_len: usize,
}

impl Default for ExtractionTuning {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            success_threshold: 0.25,
            sample_size: 3,
            probe_text_limit: 100,
            fallback_min_matches: 3,
            fallback_cap: 20,
            default_max_items: 20,
            snippet_len: 300,
        }
    }
}

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// HTTP 监听地址
    pub bind_addr: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub llm_timeout_secs: u64,
    // --- 浏览器配置 ---
    /// 浏览器可执行文件路径（为空时由 chromiumoxide 自动查找）
    pub chrome_executable: Option<PathBuf>,
    pub navigation_timeout_ms: u64,
    pub settle_delay_ms: u64,
    pub evaluate_timeout_ms: u64,
    // --- 抽取参数 ---
    pub tuning: ExtractionTuning,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            verbose_logging: false,
            llm_api_key: String::new(),
            llm_api_base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            llm_model_name: "gemini-2.5-flash".to_string(),
            llm_timeout_secs: 60,
            chrome_executable: None,
            navigation_timeout_ms: 30_000,
            settle_delay_ms: 3_000,
            evaluate_timeout_ms: 15_000,
            tuning: ExtractionTuning::default(),
        }
    }
}

/// TOML 配置文件内容，所有字段可选
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    bind_addr: Option<String>,
    verbose_logging: Option<bool>,
    llm: LlmSection,
    browser: BrowserSection,
    extraction: ExtractionSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LlmSection {
    api_key: Option<String>,
    api_base_url: Option<String>,
    model_name: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BrowserSection {
    executable: Option<PathBuf>,
    navigation_timeout_ms: Option<u64>,
    settle_delay_ms: Option<u64>,
    evaluate_timeout_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ExtractionSection {
    max_attempts: Option<usize>,
    success_threshold: Option<f64>,
    sample_size: Option<usize>,
    probe_text_limit: Option<usize>,
    fallback_min_matches: Option<usize>,
    fallback_cap: Option<usize>,
    default_max_items: Option<usize>,
    snippet_len: Option<usize>,
}

impl Config {
    /// 加载配置：默认值 → TOML 文件 → 环境变量
    pub fn load() -> AppResult<Self> {
        let path = std::env::var("SCRAPER_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let mut config = Self::default();
        if Path::new(&path).exists() {
            config.merge_toml(&path)?;
        } else {
            debug!("配置文件 {} 不存在，使用默认值", path);
        }
        config.apply_env()?;
        Ok(config)
    }

    /// 只从环境变量加载（忽略配置文件）
    pub fn from_env() -> AppResult<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// 合并 TOML 配置文件
    fn merge_toml(&mut self, path: &str) -> AppResult<()> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileReadFailed {
            path: path.to_string(),
            source,
        })?;
        self.merge_toml_str(&content, path)
    }

    fn merge_toml_str(&mut self, content: &str, path: &str) -> AppResult<()> {
        let file: FileConfig =
            toml::from_str(content).map_err(|source| ConfigError::TomlParseFailed {
                path: path.to_string(),
                source,
            })?;

        if let Some(v) = file.bind_addr {
            self.bind_addr = v;
        }
        if let Some(v) = file.verbose_logging {
            self.verbose_logging = v;
        }
        if let Some(v) = file.llm.api_key {
            self.llm_api_key = v;
        }
        if let Some(v) = file.llm.api_base_url {
            self.llm_api_base_url = v;
        }
        if let Some(v) = file.llm.model_name {
            self.llm_model_name = v;
        }
        if let Some(v) = file.llm.timeout_secs {
            self.llm_timeout_secs = v;
        }
        if file.browser.executable.is_some() {
            self.chrome_executable = file.browser.executable;
        }
        if let Some(v) = file.browser.navigation_timeout_ms {
            self.navigation_timeout_ms = v;
        }
        if let Some(v) = file.browser.settle_delay_ms {
            self.settle_delay_ms = v;
        }
        if let Some(v) = file.browser.evaluate_timeout_ms {
            self.evaluate_timeout_ms = v;
        }

        let ext = file.extraction;
        let tuning = &mut self.tuning;
        if let Some(v) = ext.max_attempts {
            tuning.max_attempts = v;
        }
        if let Some(v) = ext.success_threshold {
            tuning.success_threshold = v;
        }
        if let Some(v) = ext.sample_size {
            tuning.sample_size = v;
        }
        if let Some(v) = ext.probe_text_limit {
            tuning.probe_text_limit = v;
        }
        if let Some(v) = ext.fallback_min_matches {
            tuning.fallback_min_matches = v;
        }
        if let Some(v) = ext.fallback_cap {
            tuning.fallback_cap = v;
        }
        if let Some(v) = ext.default_max_items {
            tuning.default_max_items = v;
        }
        if let Some(v) = ext.snippet_len {
            tuning.snippet_len = v;
        }
        Ok(())
    }

    /// 用环境变量覆盖配置
    fn apply_env(&mut self) -> AppResult<()> {
        if let Ok(v) = std::env::var("BIND_ADDR") {
            self.bind_addr = v;
        }
        if let Some(v) = parse_env("VERBOSE_LOGGING", "bool")? {
            self.verbose_logging = v;
        }
        if let Ok(v) = std::env::var("LLM_API_KEY") {
            self.llm_api_key = v;
        }
        if let Ok(v) = std::env::var("LLM_API_BASE_URL") {
            self.llm_api_base_url = v;
        }
        if let Ok(v) = std::env::var("LLM_MODEL_NAME") {
            self.llm_model_name = v;
        }
        if let Some(v) = parse_env("LLM_TIMEOUT_SECS", "u64")? {
            self.llm_timeout_secs = v;
        }
        if let Ok(v) = std::env::var("CHROME_EXECUTABLE") {
            if !v.trim().is_empty() {
                self.chrome_executable = Some(PathBuf::from(v));
            }
        }
        if let Some(v) = parse_env("NAVIGATION_TIMEOUT_MS", "u64")? {
            self.navigation_timeout_ms = v;
        }
        if let Some(v) = parse_env("SETTLE_DELAY_MS", "u64")? {
            self.settle_delay_ms = v;
        }
        if let Some(v) = parse_env("EVALUATE_TIMEOUT_MS", "u64")? {
            self.evaluate_timeout_ms = v;
        }
        if let Some(v) = parse_env("SUCCESS_THRESHOLD", "f64")? {
            self.tuning.success_threshold = v;
        }
        if let Some(v) = parse_env("MAX_ATTEMPTS", "usize")? {
            self.tuning.max_attempts = v;
        }
        Ok(())
    }

    /// 是否已配置 LLM 密钥
    pub fn has_llm_credentials(&self) -> bool {
        !self.llm_api_key.trim().is_empty()
    }
}

/// 解析环境变量，不存在时返回 None，无法解析时报错
fn parse_env<T: std::str::FromStr>(var_name: &str, expected_type: &str) -> AppResult<Option<T>> {
    match std::env::var(var_name) {
        Ok(value) => value.trim().parse::<T>().map(Some).map_err(|_| {
            ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }
            .into()
        }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tuning_matches_documented_constants() {
        let tuning = ExtractionTuning::default();
        assert_eq!(tuning.max_attempts, 3);
        assert_eq!(tuning.success_threshold, 0.25);
        assert_eq!(tuning.sample_size, 3);
        assert_eq!(tuning.probe_text_limit, 100);
        assert_eq!(tuning.fallback_min_matches, 3);
        assert_eq!(tuning.fallback_cap, 20);
    }

    #[test]
    fn test_merge_toml_overrides_sections() {
        let mut config = Config::default();
        let content = r#"
            bind_addr = "127.0.0.1:9000"

            [llm]
            model_name = "gpt-4o-mini"
            timeout_secs = 20

            [browser]
            settle_delay_ms = 500

            [extraction]
            success_threshold = 0.5
            fallback_cap = 10
        "#;
        config.merge_toml_str(content, "inline.toml").unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:9000");
        assert_eq!(config.llm_model_name, "gpt-4o-mini");
        assert_eq!(config.llm_timeout_secs, 20);
        assert_eq!(config.settle_delay_ms, 500);
        assert_eq!(config.tuning.success_threshold, 0.5);
        assert_eq!(config.tuning.fallback_cap, 10);
        // 未出现的字段保持默认值
        assert_eq!(config.navigation_timeout_ms, 30_000);
        assert_eq!(config.tuning.max_attempts, 3);
    }

    #[test]
    fn test_merge_toml_rejects_bad_syntax() {
        let mut config = Config::default();
        let err = config.merge_toml_str("bind_addr = ", "broken.toml").unwrap_err();
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn test_missing_key_is_reported() {
        let config = Config::default();
        assert!(!config.has_llm_credentials());
    }
}
