//! Domain module - Core entities of the extraction engine
//!
//! This module contains the record entity harvested from inventory cards and
//! the summary statistics derived from a completed run.

pub mod product;
pub mod summary;

// Re-export commonly used items
pub use product::ProductRecord;
pub use summary::ExtractionSummary;
