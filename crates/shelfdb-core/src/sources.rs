use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Which site adapter implementation handles a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterKind {
    Shopify,
    JsonFeed,
}

impl std::fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdapterKind::Shopify => write!(f, "shopify"),
            AdapterKind::JsonFeed => write!(f, "json_feed"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Site or marketplace display name, stored as `source_type`.
    pub source_type: String,
    /// Shop label within the site, stored as `source_name`.
    pub source_name: String,
    pub adapter: AdapterKind,
    /// Storefront root (Shopify) or listing feed URL (JSON feed).
    pub url: String,
    /// Explicit slug for endpoints and CLI flags. Derived from
    /// `source_type` when absent.
    #[serde(default)]
    pub slug: Option<String>,
}

impl SourceConfig {
    /// URL-safe identifier for the source.
    #[must_use]
    pub fn slug(&self) -> String {
        if let Some(slug) = self.slug.as_deref().filter(|s| !s.trim().is_empty()) {
            return slug.trim().to_string();
        }

        self.source_type
            .to_lowercase()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' {
                    c
                } else if c == ' ' || c == '_' {
                    '-'
                } else {
                    '\0'
                }
            })
            .filter(|&c| c != '\0')
            .collect::<String>()
            .split('-')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("-")
    }
}

#[derive(Debug, Deserialize)]
pub struct SourcesFile {
    pub sources: Vec<SourceConfig>,
}

impl SourcesFile {
    #[must_use]
    pub fn find_by_slug(&self, slug: &str) -> Option<&SourceConfig> {
        self.sources.iter().find(|s| s.slug() == slug)
    }
}

/// Load and validate the sources configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_sources(path: &Path) -> Result<SourcesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SourcesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_sources(&content)
}

/// Parse and validate sources YAML already in memory.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_sources(content: &str) -> Result<SourcesFile, ConfigError> {
    let sources_file: SourcesFile =
        serde_yaml::from_str(content).map_err(ConfigError::SourcesFileParse)?;

    validate_sources(&sources_file)?;

    Ok(sources_file)
}

fn validate_sources(sources_file: &SourcesFile) -> Result<(), ConfigError> {
    let mut seen_labels = HashSet::new();
    let mut seen_slugs = HashSet::new();

    for source in &sources_file.sources {
        if source.source_type.trim().is_empty() || source.source_name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "source_type and source_name must be non-empty".to_string(),
            ));
        }

        if !(source.url.starts_with("http://") || source.url.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "source '{}' has invalid url '{}'; must be http(s)",
                source.source_type, source.url
            )));
        }

        let label = (source.source_type.clone(), source.source_name.clone());
        if !seen_labels.insert(label) {
            return Err(ConfigError::Validation(format!(
                "duplicate source: '{}' / '{}'",
                source.source_type, source.source_name
            )));
        }

        let slug = source.slug();
        if slug.is_empty() {
            return Err(ConfigError::Validation(format!(
                "source '{}' produces an empty slug; set `slug` explicitly",
                source.source_type
            )));
        }
        if !seen_slugs.insert(slug.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate source slug: '{}' (from source '{}')",
                slug, source.source_type
            )));
        }
    }

    Ok(())
}
