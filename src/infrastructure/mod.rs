//! Infrastructure layer for configuration, logging and durable persistence
//!
//! Everything the extraction engine needs from the outside world that is not
//! the page itself: the config file, the tracing setup and the crash-safe
//! record store.

pub mod config;
pub mod logging;
pub mod persistence;

// Re-export commonly used items
pub use config::{ConfigManager, HarvesterConfig, LoggingConfig};
pub use persistence::PersistenceManager;
