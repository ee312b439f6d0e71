//! 页面结构采样 - 业务能力层
//!
//! 选择器失败后，采集页面上常见结构元素的类名和 HTML 片段，
//! 作为下一次生成选择器的参考

use scraper::Html;
use tracing::debug;

use super::extractor::parse_selector;
use crate::browser::RenderedPage;
use crate::error::AppResult;
use crate::models::{DomSnapshot, PageStructuralSample, StructureEntry};

/// 结构探测选择器（按顺序输出）
pub const STRUCTURE_PROBES: &[&str] = &[
    "main",
    "section",
    "article",
    "div[class*=\"product\"]",
    "div[class*=\"item\"]",
    "div[class*=\"card\"]",
    "div[class*=\"grid\"]",
    "div[class*=\"collection\"]",
    "div[class*=\"listing\"]",
    "ul",
    "ol",
];

/// 页面结构采样器
pub struct PageSampler {
    snippet_len: usize,
}

impl PageSampler {
    pub fn new(snippet_len: usize) -> Self {
        Self { snippet_len }
    }

    /// 对页面当前状态采样
    pub async fn sample(&self, page: &dyn RenderedPage) -> AppResult<PageStructuralSample> {
        let snapshot = page.snapshot().await?;
        let sample = self.sample_snapshot(&snapshot);
        debug!("页面结构样本: {} 个结构元素", sample.structure.len());
        Ok(sample)
    }

    /// 对快照采样
    pub fn sample_snapshot(&self, snapshot: &DomSnapshot) -> PageStructuralSample {
        let document = Html::parse_document(&snapshot.html);

        let body_classes = parse_selector("body")
            .ok()
            .and_then(|selector| document.select(&selector).next())
            .and_then(|body| body.value().attr("class"))
            .unwrap_or_default()
            .to_string();

        let mut structure = Vec::new();
        for probe in STRUCTURE_PROBES {
            let Ok(selector) = parse_selector(probe) else {
                continue;
            };
            let mut matches = document.select(&selector);
            let Some(first) = matches.next() else {
                continue;
            };
            let count = 1 + matches.count();
            let inner_html: String = first.inner_html().chars().take(self.snippet_len).collect();

            structure.push(StructureEntry {
                selector: probe.to_string(),
                count,
                class_name: first.value().attr("class").unwrap_or_default().to_string(),
                inner_html: inner_html + "...",
            });
        }

        PageStructuralSample {
            title: snapshot.title.clone(),
            url: snapshot.url.clone(),
            body_classes,
            structure,
        }
    }
}
