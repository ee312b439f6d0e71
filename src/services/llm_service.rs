//! LLM 服务 - 业务能力层
//!
//! 只负责"把提示词变成文本"的能力，不关心提示词内容和流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行流式 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 Gemini, Azure, Doubao 等）

use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use futures::StreamExt;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, LlmError};

/// 推理服务接口
///
/// 发送一个提示词，返回拼接后的完整文本响应。每次调用相互独立，没有缓存
#[async_trait]
pub trait ReasoningOracle: Send + Sync {
    async fn complete(&self, prompt: &str) -> AppResult<String>;
}

/// 基于 OpenAI 兼容接口的推理服务
///
/// 职责：
/// - 以流式方式调用 chat completion 接口
/// - 拼接所有文本片段
/// - 整个调用受超时保护
pub struct OpenAiOracle {
    client: Client<OpenAIConfig>,
    model_name: String,
    request_timeout: Duration,
}

impl OpenAiOracle {
    /// 创建新的推理服务
    pub fn new(config: &Config) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        let client = Client::with_config(openai_config);

        Self {
            client,
            model_name: config.llm_model_name.clone(),
            request_timeout: Duration::from_secs(config.llm_timeout_secs),
        }
    }

    /// 发送请求并收集流式响应
    async fn stream_completion(&self, prompt: &str) -> AppResult<String> {
        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| AppError::llm_api_failed(&self.model_name, e))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(vec![ChatCompletionRequestMessage::User(user_msg)])
            .temperature(0.3)
            .stream(true)
            .build()
            .map_err(|e| AppError::llm_api_failed(&self.model_name, e))?;

        let mut stream = self.client.chat().create_stream(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            AppError::llm_api_failed(&self.model_name, e)
        })?;

        let mut result = String::new();
        let mut chunks = 0usize;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| {
                warn!("LLM 流式响应中断: {}", e);
                AppError::llm_api_failed(&self.model_name, e)
            })?;
            chunks += 1;
            for choice in chunk.choices {
                if let Some(content) = choice.delta.content {
                    result.push_str(&content);
                }
            }
        }
        debug!("LLM 流式响应完成: {} 个片段, {} 字符", chunks, result.len());

        if result.trim().is_empty() {
            return Err(LlmError::EmptyContent {
                model: self.model_name.clone(),
            }
            .into());
        }
        Ok(result)
    }
}

#[async_trait]
impl ReasoningOracle for OpenAiOracle {
    async fn complete(&self, prompt: &str) -> AppResult<String> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("提示词长度: {} 字符", prompt.len());

        match timeout(self.request_timeout, self.stream_completion(prompt)).await {
            Ok(result) => result,
            Err(_) => {
                warn!("LLM API 调用超时 ({:?})", self.request_timeout);
                Err(LlmError::Timeout {
                    model: self.model_name.clone(),
                    timeout_secs: self.request_timeout.as_secs(),
                }
                .into())
            }
        }
    }
}
