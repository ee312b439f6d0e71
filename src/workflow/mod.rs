pub mod export_flow;
pub mod report;
pub mod scrape_flow;

pub use export_flow::{CsvExport, ExportFlow};
pub use report::{AgentReport, ScrapeOutcome, ScrapePhase};
pub use scrape_flow::{find_url_in_query, ScrapeFlow};
