//! 集成测试用的假推理服务和假渲染器
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use ai_scraper::error::{AppError, AppResult, BrowserError, LlmError};
use ai_scraper::models::DomSnapshot;
use ai_scraper::{Config, PageRenderer, ReasoningOracle, RenderedPage};

/// 确定目标网址的提示词中的固定片段
const TARGET_PROMPT_MARKER: &str = "determine the target website URL";

/// 假推理服务
///
/// - 目标网址提示词返回固定的 URL 响应
/// - 生成选择器的提示词按顺序返回预设响应，用完后重复最后一个
pub struct FakeOracle {
    target_response: Option<String>,
    scheme_responses: Mutex<VecDeque<String>>,
    last_scheme: Mutex<String>,
    pub target_calls: AtomicUsize,
    pub scheme_calls: AtomicUsize,
    pub prompts: Mutex<Vec<String>>,
}

impl FakeOracle {
    pub fn new(target_response: Option<&str>, scheme_responses: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            target_response: target_response.map(str::to_string),
            scheme_responses: Mutex::new(scheme_responses.iter().map(|s| s.to_string()).collect()),
            last_scheme: Mutex::new(String::new()),
            target_calls: AtomicUsize::new(0),
            scheme_calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn target_calls(&self) -> usize {
        self.target_calls.load(Ordering::SeqCst)
    }

    pub fn scheme_calls(&self) -> usize {
        self.scheme_calls.load(Ordering::SeqCst)
    }

    pub fn scheme_prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| !p.contains(TARGET_PROMPT_MARKER))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ReasoningOracle for FakeOracle {
    async fn complete(&self, prompt: &str) -> AppResult<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        if prompt.contains(TARGET_PROMPT_MARKER) {
            self.target_calls.fetch_add(1, Ordering::SeqCst);
            return self.target_response.clone().ok_or_else(|| {
                AppError::from(LlmError::EmptyContent {
                    model: "fake".to_string(),
                })
            });
        }

        self.scheme_calls.fetch_add(1, Ordering::SeqCst);
        let mut queue = self.scheme_responses.lock().unwrap();
        let mut last = self.last_scheme.lock().unwrap();
        if let Some(next) = queue.pop_front() {
            *last = next;
        }
        Ok(last.clone())
    }
}

/// 渲染器调用记录
#[derive(Default)]
pub struct RendererLog {
    pub opened: AtomicUsize,
    pub closed: AtomicUsize,
    pub navigated: Mutex<Vec<String>>,
}

/// 假渲染器：每个页面都返回同一份 HTML
pub struct FakeRenderer {
    html: String,
    fail_navigation: bool,
    pub log: Arc<RendererLog>,
}

impl FakeRenderer {
    pub fn new(html: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            html: html.into(),
            fail_navigation: false,
            log: Arc::new(RendererLog::default()),
        })
    }

    pub fn failing_navigation() -> Arc<Self> {
        Arc::new(Self {
            html: String::new(),
            fail_navigation: true,
            log: Arc::new(RendererLog::default()),
        })
    }

    pub fn opened(&self) -> usize {
        self.log.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.log.closed.load(Ordering::SeqCst)
    }

    pub fn navigated(&self) -> Vec<String> {
        self.log.navigated.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageRenderer for FakeRenderer {
    async fn open(&self) -> AppResult<Box<dyn RenderedPage>> {
        self.log.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakePage {
            html: self.html.clone(),
            url: Mutex::new(String::new()),
            fail_navigation: self.fail_navigation,
            log: self.log.clone(),
        }))
    }
}

pub struct FakePage {
    html: String,
    url: Mutex<String>,
    fail_navigation: bool,
    log: Arc<RendererLog>,
}

#[async_trait]
impl RenderedPage for FakePage {
    async fn navigate(&self, url: &str) -> AppResult<()> {
        self.log.navigated.lock().unwrap().push(url.to_string());
        if self.fail_navigation {
            return Err(BrowserError::NavigationTimeout {
                url: url.to_string(),
                timeout_ms: 30_000,
            }
            .into());
        }
        *self.url.lock().unwrap() = url.to_string();
        Ok(())
    }

    async fn evaluate(&self, _script: &str) -> AppResult<JsonValue> {
        Ok(JsonValue::Null)
    }

    async fn snapshot(&self) -> AppResult<DomSnapshot> {
        Ok(DomSnapshot {
            url: self.url.lock().unwrap().clone(),
            title: "Fake Shop".to_string(),
            html: self.html.clone(),
        })
    }

    async fn close(self: Box<Self>) {
        self.log.closed.fetch_add(1, Ordering::SeqCst);
    }
}

/// 带 API 密钥的测试配置
pub fn test_config() -> Config {
    Config {
        llm_api_key: "test-key".to_string(),
        ..Config::default()
    }
}

/// 商品列表页：每个商品有名称、价格和评分
pub fn product_page(count: usize) -> String {
    let tiles: String = (1..=count)
        .map(|i| {
            format!(
                r#"<div class="product-tile"><h3 class="title">Product {i}</h3><span class="money">${i}.99</span><span class="rating">{i}.0</span></div>"#
            )
        })
        .collect();
    format!(
        r#"<html><head><title>Fake Shop</title></head><body class="template-collection"><main class="catalog">{tiles}</main></body></html>"#
    )
}

/// 只匹配到名称的方案（4 个字段中 1 个非空 → 0.25）
pub const QUARTER_SCHEME: &str = r#"{"elements": {"headline": ".title", "sku": ".sku", "stock": ".stock", "color": ".color"}, "containers": [".product-tile"], "maxItems": 20}"#;

/// 5 个字段中 1 个非空 → 0.2
pub const FIFTH_SCHEME: &str = r#"{"elements": {"headline": ".title", "sku": ".sku", "stock": ".stock", "color": ".color", "size": ".size"}, "containers": [".product-tile"], "maxItems": 20}"#;

/// 完全匹配不到任何字段的方案
pub const MISSING_SCHEME: &str = r#"{"elements": {"sku": ".sku", "stock": ".stock"}, "containers": [".nothing-here"], "maxItems": 20}"#;

/// 所有字段都能匹配的方案
pub fn good_scheme(max_items: usize) -> String {
    format!(
        r#"Here is the JSON: {{"elements": {{"name": "h3.title", "price": ".money", "rating": ".rating"}}, "containers": [".product-tile"], "maxItems": {max_items}}}"#
    )
}
