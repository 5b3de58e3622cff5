//! Extraction engine - the incremental harvest loop and its collaborators
//!
//! Leaves first: the card parser, dedup store, progress tracker and scroll
//! controller are independent pieces; the orchestrator wires them to a
//! [`driver::PageDriver`] and owns the pass loop.

pub mod dedup;
pub mod driver;
pub mod orchestrator;
pub mod parser;
pub mod progress;
pub mod scroll;

// Re-export commonly used items
pub use dedup::DedupStore;
pub use driver::{DriverError, PageDriver, ScriptedPageDriver, ScriptedPass};
pub use orchestrator::{ExtractionOrchestrator, ExtractionPhase, ExtractionReport};
pub use parser::CardParser;
pub use progress::ProgressTracker;
pub use scroll::{ScrollController, StopReason};
