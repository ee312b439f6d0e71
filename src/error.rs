use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 浏览器相关错误
    #[error("浏览器错误: {0}")]
    Browser(#[from] BrowserError),
    /// LLM 服务错误
    #[error("LLM错误: {0}")]
    Llm(#[from] LlmError),
    /// 选择器错误（只在单个字段内部被记录，不会中断流程）
    #[error("选择器错误: {0}")]
    Selector(#[from] SelectorError),
    /// 导出错误
    #[error("导出错误: {0}")]
    Export(#[from] ExportError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 请求参数错误
    #[error("请求错误: {0}")]
    Request(#[from] RequestError),
}

/// 浏览器相关错误
#[derive(Debug, Error)]
pub enum BrowserError {
    /// 启动浏览器失败
    #[error("启动无头浏览器失败: {source}")]
    LaunchFailed {
        #[source]
        source: BoxError,
    },
    /// 浏览器配置失败
    #[error("浏览器配置失败: {message}")]
    ConfigurationFailed { message: String },
    /// 创建页面失败
    #[error("创建页面失败: {source}")]
    PageCreationFailed {
        #[source]
        source: BoxError,
    },
    /// 导航失败
    #[error("导航到 {url} 失败: {source}")]
    NavigationFailed {
        url: String,
        #[source]
        source: BoxError,
    },
    /// 导航超时
    #[error("导航到 {url} 超时 ({timeout_ms} ms)")]
    NavigationTimeout { url: String, timeout_ms: u64 },
    /// 执行脚本失败
    #[error("执行脚本失败: {source}")]
    ScriptExecutionFailed {
        #[source]
        source: BoxError,
    },
    /// 执行脚本超时
    #[error("执行脚本超时 ({timeout_ms} ms)")]
    EvaluationTimeout { timeout_ms: u64 },
}

/// LLM 服务错误
#[derive(Debug, Error)]
pub enum LlmError {
    /// API 调用失败
    #[error("LLM API调用失败 (模型: {model}): {source}")]
    ApiCallFailed {
        model: String,
        #[source]
        source: BoxError,
    },
    /// API 调用超时
    #[error("LLM API调用超时 (模型: {model}, {timeout_secs} 秒)")]
    Timeout { model: String, timeout_secs: u64 },
    /// 返回内容为空
    #[error("LLM返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
    /// 响应中找不到合法的 JSON 对象
    #[error("LLM返回内容不是合法的JSON: {reason} (响应: {preview})")]
    OracleFormat { reason: String, preview: String },
    /// 选择器方案不满足约束
    #[error("选择器方案无效: {reason}")]
    InvalidScheme { reason: String },
    /// 目标网站信息无效
    #[error("目标网站无效: {reason}")]
    InvalidTarget { reason: String },
}

/// 选择器错误
#[derive(Debug, Error)]
pub enum SelectorError {
    /// CSS 选择器无法解析
    #[error("无效的CSS选择器 '{selector}': {message}")]
    Invalid { selector: String, message: String },
}

/// 导出错误
#[derive(Debug, Error)]
pub enum ExportError {
    /// 批量抽取没有得到任何记录
    #[error("No data found for export ({url})")]
    DataEmpty { url: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 读取配置文件失败
    #[error("读取配置文件失败 ({path}): {source}")]
    FileReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 未配置 LLM 密钥
    #[error("LLM_API_KEY is not configured")]
    MissingApiKey,
}

/// 请求参数错误
#[derive(Debug, Error)]
pub enum RequestError {
    /// 缺少必填字段
    #[error("{0}")]
    MissingField(&'static str),
    /// 字段内容无效
    #[error("{0}")]
    Invalid(String),
    /// 请求体不是合法的 JSON
    #[error("Invalid request body")]
    MalformedBody { message: String },
}

// ========== 从常见错误类型转换 ==========

impl From<chromiumoxide::error::CdpError> for AppError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        AppError::Browser(BrowserError::ScriptExecutionFailed {
            source: Box::new(err),
        })
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Browser(BrowserError::ScriptExecutionFailed {
            source: Box::new(err),
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建导航失败错误
    pub fn navigation_failed(
        url: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Browser(BrowserError::NavigationFailed {
            url: url.into(),
            source: Box::new(source),
        })
    }

    /// 创建LLM API调用错误
    pub fn llm_api_failed(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Llm(LlmError::ApiCallFailed {
            model: model.into(),
            source: Box::new(source),
        })
    }

    /// 创建选择器方案无效错误
    pub fn invalid_scheme(reason: impl Into<String>) -> Self {
        AppError::Llm(LlmError::InvalidScheme {
            reason: reason.into(),
        })
    }

    /// 是否属于用户输入问题（对应 HTTP 400）
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::Request(_) | AppError::Export(ExportError::DataEmpty { .. })
        )
    }

    /// 展开完整的错误链，用于返回给调用方的诊断信息
    pub fn detail_chain(&self) -> String {
        let mut detail = self.to_string();
        let mut current = std::error::Error::source(self);
        while let Some(source) = current {
            detail.push_str(" <- ");
            detail.push_str(&source.to_string());
            current = source.source();
        }
        detail
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_classification() {
        let empty = AppError::from(ExportError::DataEmpty {
            url: "https://example.com".to_string(),
        });
        assert!(empty.is_client_error());

        let missing = AppError::from(RequestError::MissingField("Query is required"));
        assert!(missing.is_client_error());

        let malformed = AppError::from(RequestError::MalformedBody {
            message: "expected value at line 1 column 1".to_string(),
        });
        assert!(malformed.is_client_error());

        let no_key = AppError::from(ConfigError::MissingApiKey);
        assert!(!no_key.is_client_error());

        let timeout = AppError::from(BrowserError::NavigationTimeout {
            url: "https://example.com".to_string(),
            timeout_ms: 30_000,
        });
        assert!(!timeout.is_client_error());
    }

    #[test]
    fn test_detail_chain_includes_sources() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "连接被重置");
        let err = AppError::navigation_failed("https://example.com", io);
        let detail = err.detail_chain();
        assert!(detail.contains("https://example.com"));
        assert!(detail.contains("连接被重置"));
    }
}
