//! Ingestion and maintenance over the product store: site scraping, the
//! write-time and maintenance deduplicators, and the tiered batch executor.
//!
//! Every entry point returns an outcome struct from `shelfdb_core`; failures
//! are reported in its `errors` list rather than as `Err`.

pub mod batch;
pub mod dedup;
pub mod error;
pub mod favorites;
pub mod orchestrator;
pub mod restore;

pub use batch::{execute, BatchConfig, BatchItem};
pub use dedup::{deduplicate, is_duplicate};
pub use error::IngestError;
pub use favorites::refresh_favorites;
pub use orchestrator::{run_full_catalog, run_targeted, ScrapeOptions};
pub use restore::{load_backup, parse_backup, restore};
