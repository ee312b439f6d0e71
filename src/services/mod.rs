//! 业务能力层（Services）
//!
//! 描述"我能做什么"，每个服务只负责一种能力，不关心整体流程

pub mod bulk_extractor;
pub mod csv_writer;
pub mod extractor;
pub mod llm_service;
pub mod page_sampler;
pub mod prompts;
pub mod reasoning_client;
pub mod selector_tester;

pub use bulk_extractor::BulkExtractor;
pub use csv_writer::to_csv;
pub use extractor::{extract_records, ExtractionLimits, ExtractionOutput, FALLBACK_CONTAINERS};
pub use llm_service::{OpenAiOracle, ReasoningOracle};
pub use page_sampler::PageSampler;
pub use reasoning_client::{extract_json_object, ReasoningClient, TargetSite};
pub use selector_tester::{meets_threshold, SelectorTester};
