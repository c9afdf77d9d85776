pub mod app_config;
pub mod config;
pub mod outcomes;
pub mod products;
pub mod sources;

pub use app_config::{AppConfig, Environment, ProxySettings};
pub use config::{load_app_config, load_app_config_from_env};
pub use outcomes::{BatchOutcome, BatchTier, DedupOutcome, ItemResult, ScrapeResult, TargetedResult};
pub use products::{
    IdentityKey, NewProduct, ProductPatch, ProductRecord, ProductRef, RawProduct, COPY_MEMO_MARKER,
};
pub use sources::{load_sources, parse_sources, AdapterKind, SourceConfig, SourcesFile};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read sources file {path}: {source}")]
    SourcesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse sources file: {0}")]
    SourcesFileParse(#[source] serde_yaml::Error),

    #[error("sources validation failed: {0}")]
    Validation(String),
}
