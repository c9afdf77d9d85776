//! Restoring products from a JSON backup through the batch executor.

use std::path::Path;

use shelfdb_core::{BatchOutcome, NewProduct};
use shelfdb_db::BatchSink;

use crate::batch::{execute, BatchConfig};
use crate::error::IngestError;

/// Reads a backup file: a JSON array of products. `created_at` is kept when
/// present so restored rows sort as they did originally.
///
/// # Errors
///
/// Returns [`IngestError::BackupIo`] if the file cannot be read and
/// [`IngestError::BackupParse`] if it is not a product array.
pub fn load_backup(path: &Path) -> Result<Vec<NewProduct>, IngestError> {
    let content = std::fs::read_to_string(path).map_err(|e| IngestError::BackupIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_backup(&content)
}

/// # Errors
///
/// Returns [`IngestError::BackupParse`] if `content` is not a product array.
pub fn parse_backup(content: &str) -> Result<Vec<NewProduct>, IngestError> {
    Ok(serde_json::from_str(content)?)
}

/// Inserts `products` into `sink` using the tiered strategy.
pub async fn restore<S>(sink: &S, products: &[NewProduct], config: &BatchConfig) -> BatchOutcome
where
    S: BatchSink<NewProduct> + ?Sized,
{
    tracing::info!(products = products.len(), batch_size = config.batch_size, "restore started");
    execute(sink, products, config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_and_full_entries() {
        let products = parse_backup(
            r#"[
                {"source_type": "DHC", "source_name": "DHC Online Shop",
                 "name": "Lip Cream", "price": "770"},
                {"source_type": "Amazon", "source_name": "Beauty Select",
                 "name": "Serum", "price": "1980.00", "sale_price": "1580",
                 "asin": "B0SERUM001", "is_favorite": true,
                 "created_at": "2025-11-02T09:30:00Z"}
            ]"#,
        )
        .unwrap();

        assert_eq!(products.len(), 2);
        assert!(products[0].asin.is_none());
        assert!(!products[0].is_favorite);
        assert!(products[1].is_favorite);
        assert!(products[1].created_at.is_some());
    }

    #[test]
    fn rejects_non_array() {
        assert!(matches!(
            parse_backup(r#"{"products": []}"#),
            Err(IngestError::BackupParse(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = load_backup(Path::new("/nonexistent/shelfdb-backup.json"));
        assert!(matches!(result, Err(IngestError::BackupIo { .. })));
    }
}
