//! Product record entity extracted from inventory cards.

use serde::{Deserialize, Serialize};

/// A single product record harvested from one inventory card.
///
/// Every field is kept as the string captured from the card text so the
/// persisted JSON matches the source representation exactly. Only `id` is
/// validated; all other fields fall back to their defaults when the card
/// does not carry them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Numeric identifier (digits only). Unique key for deduplication.
    pub id: String,
    /// First non-empty line of the card text.
    pub name: String,
    /// Category label, `"Unknown"` when neither pattern matched.
    pub category: String,
    /// Non-negative stock count as string, `"0"` by default.
    pub inventory: String,
    /// Currency-formatted price (`"$" + fixed-point amount`), `"$0.00"` by default.
    pub cost: String,
    /// Short modification token (usually date-like), `"Unknown"` by default.
    pub modified: String,
    /// Relative-time phrase such as `"3 days ago"`, `"Unknown"` by default.
    pub updated: String,
}

impl ProductRecord {
    /// Deterministic ordering key: numeric id ascending, non-numeric ids last.
    ///
    /// Persisted snapshots are sorted with this key so repeated saves of the
    /// same collection are byte-identical and diff-friendly.
    pub fn sort_key(&self) -> u64 {
        self.id.parse::<u64>().unwrap_or(u64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> ProductRecord {
        ProductRecord {
            id: id.to_string(),
            name: "Widget".to_string(),
            category: "Unknown".to_string(),
            inventory: "0".to_string(),
            cost: "$0.00".to_string(),
            modified: "Unknown".to_string(),
            updated: "Unknown".to_string(),
        }
    }

    #[test]
    fn numeric_ids_sort_ascending() {
        let mut records = vec![record("30"), record("4"), record("1024")];
        records.sort_by_key(ProductRecord::sort_key);
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["4", "30", "1024"]);
    }

    #[test]
    fn non_numeric_ids_sort_last() {
        let mut records = vec![record("junk"), record("7")];
        records.sort_by_key(ProductRecord::sort_key);
        assert_eq!(records[0].id, "7");
        assert_eq!(records[1].id, "junk");
    }

    #[test]
    fn serde_round_trip_preserves_field_names() {
        let json = serde_json::to_value(record("1024")).unwrap();
        assert_eq!(json["id"], "1024");
        assert_eq!(json["cost"], "$0.00");
        assert_eq!(json["updated"], "Unknown");
    }
}
