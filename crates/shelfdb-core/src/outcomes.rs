//! Result objects returned once per ingestion or maintenance invocation.
//!
//! None of these are persisted. Every component that produces one reports
//! failures through its `errors` list instead of returning `Err`.

use serde::{Deserialize, Serialize};

/// Aggregate outcome of one full-catalog scrape run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeResult {
    pub success: bool,
    pub total_found: usize,
    pub saved_count: usize,
    pub skipped_count: usize,
    pub proxy_used: bool,
    pub errors: Vec<String>,
}

impl ScrapeResult {
    /// A run that never got past list discovery.
    #[must_use]
    pub fn list_failed(proxy_used: bool, error: String) -> Self {
        Self {
            success: false,
            proxy_used,
            errors: vec![error],
            ..Self::default()
        }
    }

    /// Number of listed items that produced neither a save nor a skip.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.total_found
            .saturating_sub(self.saved_count + self.skipped_count)
    }
}

/// Per-item outcome in targeted runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemResult {
    pub item_id: i64,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ItemResult {
    #[must_use]
    pub fn ok(item_id: i64) -> Self {
        Self {
            item_id,
            success: true,
            error: None,
        }
    }

    #[must_use]
    pub fn failed(item_id: i64, error: impl Into<String>) -> Self {
        Self {
            item_id,
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Outcome of a targeted run (e.g. the favorites refresher), which updates
/// existing records in place and reports each one individually.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetedResult {
    pub success: bool,
    pub total: usize,
    pub updated_count: usize,
    pub failed_count: usize,
    pub proxy_used: bool,
    pub errors: Vec<String>,
    pub results: Vec<ItemResult>,
}

impl TargetedResult {
    /// Appends a per-item result and keeps the counters in step.
    pub fn push(&mut self, result: ItemResult) {
        self.total += 1;
        if result.success {
            self.updated_count += 1;
        } else {
            self.failed_count += 1;
            if let Some(error) = &result.error {
                self.errors.push(format!("item {}: {error}", result.item_id));
            }
        }
        self.results.push(result);
    }

    /// Folds another targeted result (e.g. from a different source) into this one.
    pub fn merge(&mut self, other: TargetedResult) {
        self.proxy_used |= other.proxy_used;
        for result in other.results {
            self.push(result);
        }
        self.success = self.total == 0 || self.updated_count > 0;
    }
}

/// Outcome of a maintenance dedup pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupOutcome {
    pub deleted_count: u64,
    /// Identity groups that had more than one member.
    pub groups_processed: usize,
    pub errors: Vec<String>,
}

impl DedupOutcome {
    /// A pass fails only when it hit errors and removed nothing.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.errors.is_empty() || self.deleted_count > 0
    }
}

/// The most degraded strategy the batch executor had to fall back to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchTier {
    #[default]
    Bulk,
    Batched,
    Individual,
}

/// Outcome of a tiered batch execution. Partial success is a normal
/// terminal state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub inserted_count: u64,
    pub failed_batches: usize,
    pub tier_reached: BatchTier,
    /// Items that failed at every tier.
    pub errors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_failed_reports_single_error() {
        let result = ScrapeResult::list_failed(true, "timeout".to_string());
        assert!(!result.success);
        assert!(result.proxy_used);
        assert_eq!(result.total_found, 0);
        assert_eq!(result.errors, vec!["timeout".to_string()]);
    }

    #[test]
    fn failed_count_is_remainder_of_listed_items() {
        let result = ScrapeResult {
            success: true,
            total_found: 10,
            saved_count: 6,
            skipped_count: 2,
            proxy_used: false,
            errors: vec!["a".into(), "b".into()],
        };
        assert_eq!(result.failed_count(), 2);
    }

    #[test]
    fn targeted_push_tracks_counters() {
        let mut result = TargetedResult::default();
        result.push(ItemResult::ok(1));
        result.push(ItemResult::failed(2, "HTTP 404"));
        assert_eq!(result.total, 2);
        assert_eq!(result.updated_count, 1);
        assert_eq!(result.failed_count, 1);
        assert_eq!(result.errors, vec!["item 2: HTTP 404".to_string()]);
    }

    #[test]
    fn targeted_merge_combines_sources() {
        let mut left = TargetedResult::default();
        left.push(ItemResult::failed(1, "boom"));
        let mut right = TargetedResult {
            proxy_used: true,
            ..TargetedResult::default()
        };
        right.push(ItemResult::ok(2));

        let mut merged = TargetedResult::default();
        merged.merge(left);
        merged.merge(right);
        assert_eq!(merged.total, 2);
        assert_eq!(merged.updated_count, 1);
        assert!(merged.success);
        assert!(merged.proxy_used);
    }

    #[test]
    fn dedup_partial_pass_still_succeeds() {
        let mut outcome = DedupOutcome {
            deleted_count: 3,
            groups_processed: 2,
            errors: vec!["group failed".to_string()],
        };
        assert!(outcome.succeeded());
        outcome.deleted_count = 0;
        assert!(!outcome.succeeded());
        assert!(DedupOutcome::default().succeeded());
    }

    #[test]
    fn item_result_omits_error_when_successful() {
        let json = serde_json::to_string(&ItemResult::ok(5)).expect("serialize");
        assert!(!json.contains("error"));
    }
}
