//! Host shell: configuration, logging, signal wiring and the replay driver.
//!
//! The extraction engine consumes a `PageDriver`; this binary feeds it the
//! scripted replay driver, either from a pass-schedule JSON file given as the
//! first argument or from a small built-in demonstration schedule. A real
//! browser-backed driver plugs in the same way.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::info;

use inventory_harvester::extraction::{ExtractionOrchestrator, ScriptedPageDriver, ScriptedPass};
use inventory_harvester::infrastructure::{logging, ConfigManager};

#[tokio::main]
async fn main() -> Result<()> {
    let manager = ConfigManager::new()?;
    let config = manager.load_config().await?;
    logging::init_logging_with_config(&config.logging)?;

    let driver = match std::env::args().nth(1) {
        Some(path) => ScriptedPageDriver::from_replay_file(Path::new(&path))?,
        None => {
            info!("No replay file given, using the built-in demonstration schedule");
            ScriptedPageDriver::new(demo_passes())
        }
    };

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_token.cancel();
        }
    });

    let mut orchestrator = ExtractionOrchestrator::new(driver, Arc::new(config), cancel);
    let report = orchestrator.run().await?;

    info!(
        "Session finished in phase {:?} after {} passes ({} records, {} new)",
        report.phase, report.passes, report.total_records, report.newly_added
    );
    Ok(())
}

/// Built-in schedule: three passes surfacing six cards, then a banner that
/// reports everything shown.
fn demo_passes() -> Vec<ScriptedPass> {
    let card = |id: u32, name: &str, category: &str| {
        format!(
            "{}\nID: {} • {}\nInventory {}\n${}.99\nModified 2024-01-0{}\nUpdated {} days ago",
            name,
            id,
            category,
            id * 3 % 50,
            id % 40,
            id % 9 + 1,
            id % 6 + 1,
        )
    };

    vec![
        ScriptedPass {
            cards: vec![card(1, "Wireless Mouse", "Electronics"), card(2, "Desk Lamp", "Office")],
            banner: Some("Showing 2 of 6".to_string()),
        },
        ScriptedPass {
            cards: vec![card(2, "Desk Lamp", "Office"), card(3, "Garden Hose", "Garden"), card(4, "Yoga Mat", "Sports")],
            banner: Some("Showing 4 of 6".to_string()),
        },
        ScriptedPass {
            cards: vec![card(5, "Face Cream", "Beauty"), card(6, "Blender", "Kitchen")],
            banner: Some("Showing 6 of 6".to_string()),
        },
    ]
}
