//! Summary statistics over a harvested record collection.

use std::collections::BTreeMap;

use tracing::info;

use super::product::ProductRecord;

/// Distributions reported at the end of a successful extraction run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionSummary {
    /// Record counts by category label.
    pub categories: BTreeMap<String, usize>,
    /// Record counts by update-time phrase.
    pub update_times: BTreeMap<String, usize>,
}

impl ExtractionSummary {
    /// Build the category and update-time distributions for `records`.
    pub fn from_records(records: &[ProductRecord]) -> Self {
        let mut summary = Self::default();

        for record in records {
            *summary
                .categories
                .entry(record.category.clone())
                .or_insert(0) += 1;

            let key = if record.updated == "Unknown" {
                "Unknown time".to_string()
            } else {
                record.updated.clone()
            };
            *summary.update_times.entry(key).or_insert(0) += 1;
        }

        summary
    }

    /// Log both distributions, sorted by key.
    pub fn log(&self) {
        info!("Product counts by category:");
        for (category, count) in &self.categories {
            info!("  {}: {}", category, count);
        }

        info!("Update time distribution:");
        for (time_frame, count) in &self.update_times {
            info!("  {}: {}", time_frame, count);
        }
    }
}
