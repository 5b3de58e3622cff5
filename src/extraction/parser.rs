//! Card text parsing with fallback extraction strategies
//!
//! Turns one opaque card blob into a validated [`ProductRecord`] or rejects
//! it. Only the numeric id is required; every other field is extracted
//! best-effort and falls back to its default, so a partially rendered card
//! still yields a usable record.

use once_cell::sync::Lazy;
use regex::Regex;

use super::dedup::DedupStore;
use crate::domain::ProductRecord;

/// Text fragments that identify interface furniture rather than a card.
const NON_CARD_MARKERS: &[&str] = &["Product Inventory", "Showing"];

/// Control token guarded against in the inventory capture. A card whose
/// inventory-labeled capture equals this token is a parser collision with the
/// progress banner and is rejected outright.
const BANNER_CONTROL_TOKEN: &str = "Showing";

/// Compiled extraction patterns, shared across all parser instances.
struct CardPatterns {
    product_id: Regex,
    category: Regex,
    category_fallback: Regex,
    inventory: Regex,
    dollar: Regex,
    modified: Regex,
    updated: Regex,
    progress: Regex,
}

static PATTERNS: Lazy<CardPatterns> = Lazy::new(|| CardPatterns {
    product_id: Regex::new(r"ID:\s*(\d+)").expect("static pattern"),
    category: Regex::new(r"•\s*([^•\n]+)").expect("static pattern"),
    category_fallback: Regex::new(
        r"(Books|Toys|Electronics|Health|Clothing|Office|Garden|Sports|Beauty|Home|Kitchen|Automotive)",
    )
    .expect("static pattern"),
    inventory: Regex::new(r"Inventory\s+(\w+)").expect("static pattern"),
    dollar: Regex::new(r"\$(\d+\.\d+)").expect("static pattern"),
    modified: Regex::new(r"Modified\s+([\w\-]+)").expect("static pattern"),
    updated: Regex::new(
        r"Updated\s+([\w\s]+(?:days?|hours?|day|hour|about|ago|minutes?)(?:\s+\w+)?)",
    )
    .expect("static pattern"),
    progress: Regex::new(r"Showing\s+(\d+)\s+of\s+(\d+)").expect("static pattern"),
});

/// Parse the `"Showing X of Y"` progress banner into `(shown, total)`.
pub fn parse_progress_banner(text: &str) -> Option<(u64, u64)> {
    let captures = PATTERNS.progress.captures(text)?;
    let shown = captures.get(1)?.as_str().parse().ok()?;
    let total = captures.get(2)?.as_str().parse().ok()?;
    Some((shown, total))
}

/// Parser for one card blob. Stateless; safe to share.
#[derive(Debug, Default)]
pub struct CardParser;

impl CardParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse one card blob into a record, or reject it.
    ///
    /// `seen` is consulted for an early-exit duplicate check only; the parser
    /// never mutates it. Rejection is silent by design: banner text, id-less
    /// blobs and duplicates are expected in every pass.
    pub fn parse(&self, text: &str, seen: &DedupStore) -> Option<ProductRecord> {
        if text.is_empty() || NON_CARD_MARKERS.iter().any(|m| text.contains(m)) {
            return None;
        }

        // The numeric id is the sole required field.
        let id = PATTERNS
            .product_id
            .captures(text)?
            .get(1)?
            .as_str()
            .to_string();
        id.parse::<u64>().ok()?;

        if seen.contains(&id) {
            return None;
        }

        let inventory = self.extract_inventory(text)?;

        Some(ProductRecord {
            id,
            name: self.extract_name(text),
            category: self.extract_category(text),
            inventory,
            cost: self.extract_cost(text),
            modified: self.extract_modified(text),
            updated: self.extract_updated(text),
        })
    }

    /// First non-empty line of the card text, trimmed.
    fn extract_name(&self, text: &str) -> String {
        text.lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or_default()
            .to_string()
    }

    /// Bullet-delimited category, then the enumerated fallback set.
    fn extract_category(&self, text: &str) -> String {
        if let Some(captures) = PATTERNS.category.captures(text) {
            if let Some(value) = captures.get(1) {
                return value.as_str().trim().to_string();
            }
        }

        PATTERNS
            .category_fallback
            .find(text)
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| "Unknown".to_string())
    }

    /// Labeled inventory count. Returns `None` (rejecting the whole card)
    /// when the capture collides with the progress banner control token.
    fn extract_inventory(&self, text: &str) -> Option<String> {
        let captured = PATTERNS
            .inventory
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str());

        match captured {
            Some(BANNER_CONTROL_TOKEN) => None,
            Some(value) if value.chars().all(|c| c.is_ascii_digit()) => Some(value.to_string()),
            _ => Some("0".to_string()),
        }
    }

    fn extract_cost(&self, text: &str) -> String {
        PATTERNS
            .dollar
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| format!("${}", m.as_str()))
            .unwrap_or_else(|| "$0.00".to_string())
    }

    fn extract_modified(&self, text: &str) -> String {
        PATTERNS
            .modified
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| "Unknown".to_string())
    }

    fn extract_updated(&self, text: &str) -> String {
        PATTERNS
            .updated
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_else(|| "Unknown".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Option<ProductRecord> {
        CardParser::new().parse(text, &DedupStore::new())
    }

    #[test]
    fn full_card_extracts_every_field() {
        let text = "Wireless Mouse\nID: 1024 • Electronics\nInventory 87\n$19.99\nModified 2024-01-03\nUpdated 3 days ago";
        let record = parse(text).expect("card should parse");

        assert_eq!(record.id, "1024");
        assert_eq!(record.name, "Wireless Mouse");
        assert_eq!(record.category, "Electronics");
        assert_eq!(record.inventory, "87");
        assert_eq!(record.cost, "$19.99");
        assert_eq!(record.modified, "2024-01-03");
        assert_eq!(record.updated, "3 days ago");
    }

    #[test]
    fn minimal_card_gets_default_fields() {
        let record = parse("Widget\nID: 42").expect("minimal card should parse");

        assert_eq!(record.id, "42");
        assert_eq!(record.name, "Widget");
        assert_eq!(record.category, "Unknown");
        assert_eq!(record.inventory, "0");
        assert_eq!(record.cost, "$0.00");
        assert_eq!(record.modified, "Unknown");
        assert_eq!(record.updated, "Unknown");
    }

    #[test]
    fn empty_text_is_rejected() {
        assert!(parse("").is_none());
    }

    #[test]
    fn progress_banner_is_never_a_record() {
        assert!(parse("Showing 40 of 400").is_none());
        assert!(parse("Product Inventory").is_none());
    }

    #[test]
    fn missing_id_is_rejected() {
        assert!(parse("Widget\nInventory 12").is_none());
        assert!(parse("Widget\nID: abc").is_none());
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let mut seen = DedupStore::new();
        seen.insert("42".to_string());
        assert!(CardParser::new().parse("Widget\nID: 42", &seen).is_none());
    }

    #[test]
    fn inventory_banner_collision_rejects_card() {
        // Guard against misclassifying banner furniture as a card even if
        // the marker scan were ever narrowed.
        assert!(parse("Widget\nID: 42\nInventory Showing").is_none());
    }

    #[test]
    fn non_numeric_inventory_capture_defaults_to_zero() {
        let record = parse("Widget\nID: 42\nInventory low").expect("card should parse");
        assert_eq!(record.inventory, "0");
    }

    #[test]
    fn category_falls_back_to_enumerated_set() {
        let record = parse("Garden Hose\nID: 7\nGarden tools aisle").expect("card should parse");
        assert_eq!(record.category, "Garden");
    }

    #[test]
    fn banner_text_parses_shown_and_total() {
        assert_eq!(parse_progress_banner("Showing 40 of 400"), Some((40, 400)));
        assert_eq!(parse_progress_banner("no banner here"), None);
    }
}
