//! Inventory Harvester - incremental extraction engine
//!
//! Harvests structured product records from a dynamically-loading
//! (infinite-scroll) interface and persists them crash-safely, resuming
//! across restarts. The page itself is reached only through the narrow
//! [`extraction::PageDriver`] capability; login and wizard navigation are the
//! host's concern.

// Module declarations
pub mod domain;
pub mod extraction;
pub mod infrastructure;

// Re-export the pieces hosts typically wire together
pub use domain::{ExtractionSummary, ProductRecord};
pub use extraction::{
    ExtractionOrchestrator, ExtractionPhase, ExtractionReport, PageDriver, ScriptedPageDriver,
};
pub use infrastructure::{ConfigManager, HarvesterConfig, PersistenceManager};
