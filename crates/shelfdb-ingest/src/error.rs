use shelfdb_db::DbError;
use shelfdb_scraper::ScraperError;
use thiserror::Error;

/// Per-item and per-call failures. These end up as strings in outcome
/// `errors` lists; only backup loading surfaces them as `Err` to callers.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Scrape(#[from] ScraperError),

    #[error("store error: {0}")]
    Store(#[from] DbError),

    #[error("record {0} has no source_url to refresh from")]
    MissingSourceUrl(i64),

    #[error("record {0} no longer exists")]
    RecordVanished(i64),

    #[error("failed to read backup {path}: {source}")]
    BackupIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse backup: {0}")]
    BackupParse(#[from] serde_json::Error),
}
