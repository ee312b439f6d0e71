//! CSV 导出流程 - 流程层
//!
//! 使用已知的方案和 URL 批量抽取，并序列化为 CSV

use std::sync::Arc;

use tracing::info;

use crate::browser::PageRenderer;
use crate::config::ExtractionTuning;
use crate::error::{AppResult, ExportError};
use crate::models::SelectorScheme;
use crate::services::{to_csv, BulkExtractor};

/// 导出结果
#[derive(Debug, Clone, PartialEq)]
pub struct CsvExport {
    pub filename: String,
    pub content: String,
    pub count: usize,
}

/// CSV 导出流程
pub struct ExportFlow {
    bulk: BulkExtractor,
}

impl ExportFlow {
    pub fn new(renderer: Arc<dyn PageRenderer>, tuning: &ExtractionTuning) -> Self {
        Self {
            bulk: BulkExtractor::new(renderer, tuning),
        }
    }

    /// 没有抽取到任何记录时返回 [`ExportError::DataEmpty`]
    pub async fn run(&self, scheme: &SelectorScheme, url: &str) -> AppResult<CsvExport> {
        info!("📊 开始批量抽取用于 CSV 导出: {}", url);
        let records = self.bulk.extract_all(scheme, url).await?;
        if records.is_empty() {
            return Err(ExportError::DataEmpty { url: url.to_string() }.into());
        }

        let filename = export_filename(chrono::Utc::now().date_naive());
        info!("✅ 批量抽取完成: 导出 {} 条记录", records.len());
        Ok(CsvExport {
            filename,
            content: to_csv(&records),
            count: records.len(),
        })
    }
}

/// `scraped-data-YYYY-MM-DD.csv`
pub fn export_filename(date: chrono::NaiveDate) -> String {
    format!("scraped-data-{}.csv", date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_filename() {
        let date = chrono::NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(export_filename(date), "scraped-data-2024-03-09.csv");
    }
}
