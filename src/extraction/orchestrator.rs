//! Extraction orchestrator state machine
//!
//! Drives the pass loop: snapshot rendered cards, parse and deduplicate,
//! report progress, checkpoint, re-read the progress banner, decide whether
//! to stop, advance the viewport. Every exit path (completion, abort,
//! interrupt) ends in a durable save, so an accepted record is never lost.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::dedup::DedupStore;
use super::driver::{DriverError, PageDriver};
use super::parser::{parse_progress_banner, CardParser};
use super::progress::ProgressTracker;
use super::scroll::{ScrollController, StopReason};
use crate::domain::{ExtractionSummary, ProductRecord};
use crate::infrastructure::{HarvesterConfig, PersistenceManager};

/// Lifecycle phase of an extraction session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionPhase {
    Init,
    Running,
    Complete,
    Aborted,
    Interrupted,
}

/// Outcome of a finished (non-aborted) run.
#[derive(Debug, Clone)]
pub struct ExtractionReport {
    pub phase: ExtractionPhase,
    /// Total records in the collection, including those loaded at startup.
    pub total_records: usize,
    /// Records accepted during this run.
    pub newly_added: usize,
    /// Passes executed.
    pub passes: u32,
    /// Why the loop stopped; `None` when interrupted.
    pub stop_reason: Option<StopReason>,
}

/// Drives one extraction session against a [`PageDriver`].
///
/// Single writer: the record collection, dedup store and progress tracker are
/// mutated exclusively by this task. Cancellation arrives through the token
/// and is observed at suspension points between loop steps only.
pub struct ExtractionOrchestrator<D: PageDriver> {
    session_id: String,
    driver: D,
    config: Arc<HarvesterConfig>,
    persistence: PersistenceManager,
    parser: CardParser,
    records: Vec<ProductRecord>,
    dedup: DedupStore,
    progress: ProgressTracker,
    phase: ExtractionPhase,
    cancel: CancellationToken,
}

impl<D: PageDriver> ExtractionOrchestrator<D> {
    pub fn new(driver: D, config: Arc<HarvesterConfig>, cancel: CancellationToken) -> Self {
        let persistence =
            PersistenceManager::new(config.output_file.clone(), config.backup_dir.clone());
        let progress =
            ProgressTracker::new(Duration::from_secs(config.progress_update_interval_secs));

        Self {
            session_id: Uuid::new_v4().to_string(),
            driver,
            config,
            persistence,
            parser: CardParser::new(),
            records: Vec::new(),
            dedup: DedupStore::new(),
            progress,
            phase: ExtractionPhase::Init,
            cancel,
        }
    }

    pub fn phase(&self) -> ExtractionPhase {
        self.phase
    }

    /// Records accepted so far (including any loaded snapshot).
    pub fn records(&self) -> &[ProductRecord] {
        &self.records
    }

    /// Hand the driver back, for hosts that want to inspect or reuse it.
    pub fn into_driver(self) -> D {
        self.driver
    }

    /// Run the session to a terminal phase.
    ///
    /// Returns `Ok` for both completion and interruption (the host exits 0 in
    /// either case); an unrecoverable driver failure saves an error backup
    /// and propagates.
    pub async fn run(&mut self) -> Result<ExtractionReport> {
        self.initialize().await?;
        self.phase = ExtractionPhase::Running;
        info!("Extraction session {} running", self.session_id);

        let mut scroll = ScrollController::new(
            self.config.max_scroll_attempts,
            self.config.no_new_threshold,
        );
        let pause = Duration::from_millis(self.config.scroll_pause_ms);
        let mut newly_added = 0usize;
        let mut since_checkpoint = 0u32;

        let stop_reason = loop {
            if self.cancel.is_cancelled() {
                return self.finalize_interrupted(newly_added, scroll.attempts());
            }

            scroll.begin_pass();

            match self.driver.rendered_card_texts().await {
                Ok(cards) => {
                    let accepted = self.process_cards(&cards, &mut since_checkpoint);
                    newly_added += accepted;
                    scroll.observe_pass(accepted);
                }
                Err(DriverError::Fatal(reason)) => {
                    return self.abort(anyhow!("card read failed: {}", reason));
                }
                Err(DriverError::Transient(reason)) => {
                    // Skipped pass: counts against the ceiling but does not
                    // advance the no-new streak.
                    warn!("Skipping pass {}: {}", scroll.attempts(), reason);
                }
            }

            let (shown, total) = match self.read_banner().await {
                Ok(banner) => banner,
                Err(fatal) => return self.abort(fatal),
            };
            if let Some(total) = total {
                if self.progress.total() != Some(total) {
                    debug!("Source revised total to {}", total);
                    self.progress.set_total(total);
                }
            }

            if let Some(reason) = scroll.check_stop(shown, total) {
                info!("Stopping extraction: {}", reason);
                break reason;
            }

            match self.driver.advance_viewport(scroll.pacing_factor()).await {
                Ok(()) => {}
                Err(DriverError::Fatal(reason)) => {
                    return self.abort(anyhow!("viewport advance failed: {}", reason));
                }
                Err(DriverError::Transient(reason)) => {
                    warn!("Viewport advance failed, continuing: {}", reason);
                }
            }

            tokio::select! {
                _ = self.cancel.cancelled() => {
                    return self.finalize_interrupted(newly_added, scroll.attempts());
                }
                _ = tokio::time::sleep(pause) => {}
            }
        };

        self.finalize_complete(newly_added, scroll.attempts(), stop_reason)
    }

    /// Load prior state, seed the trackers and take the initial total.
    async fn initialize(&mut self) -> Result<()> {
        info!("Extraction session {} initializing", self.session_id);

        if let Some(parent) = self.config.output_file.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        self.records = self.persistence.load_canonical()?;
        self.dedup.seed(&self.records);
        self.progress.set_initial_count(self.records.len() as u64);

        match self.driver.is_stable_view().await {
            Ok(true) => {}
            Ok(false) => debug!("View not yet settled at session start"),
            Err(e) => warn!("Stability probe failed: {}", e),
        }

        match self.read_banner().await {
            Ok((_, Some(total))) => {
                info!("Source reports {} total items", total);
                self.progress.set_total(total);
            }
            Ok(_) => {
                debug!(
                    "No usable progress banner, assuming {} items",
                    self.config.total_estimate
                );
                self.progress.set_total(self.config.total_estimate);
            }
            Err(fatal) => return Err(fatal),
        }

        info!("{}", self.progress.render());
        Ok(())
    }

    /// Parse one pass worth of card snapshots, accepting previously unseen
    /// records and checkpointing when enough new work has accumulated.
    fn process_cards(&mut self, cards: &[String], since_checkpoint: &mut u32) -> usize {
        let mut accepted = 0usize;

        for text in cards {
            let Some(record) = self.parser.parse(text, &self.dedup) else {
                continue;
            };

            self.dedup.insert(record.id.clone());
            self.records.push(record);
            accepted += 1;
            *since_checkpoint += 1;

            if self.progress.update(self.records.len() as u64, false) {
                info!("{}", self.progress.render());
            }

            if *since_checkpoint >= self.config.autosave_threshold {
                info!("Autosaving after {} new records", *since_checkpoint);
                match self.persistence.save_canonical(&self.records) {
                    // A failed checkpoint is retried on the next accepted
                    // record; in-memory data is unaffected.
                    Ok(()) => *since_checkpoint = 0,
                    Err(e) => warn!("Checkpoint write failed: {:#}", e),
                }
            }
        }

        accepted
    }

    /// Read and parse the progress banner. Transient failures degrade to
    /// "no banner"; fatal ones bubble up as the abort error.
    async fn read_banner(&mut self) -> Result<(Option<u64>, Option<u64>)> {
        match self.driver.progress_banner_text().await {
            Ok(Some(text)) => Ok(parse_progress_banner(&text)
                .map(|(shown, total)| (Some(shown), Some(total)))
                .unwrap_or((None, None))),
            Ok(None) => Ok((None, None)),
            Err(DriverError::Fatal(reason)) => Err(anyhow!("banner read failed: {}", reason)),
            Err(DriverError::Transient(reason)) => {
                debug!("Banner read failed, continuing: {}", reason);
                Ok((None, None))
            }
        }
    }

    /// Normal completion: forced report, final save, summary distributions.
    fn finalize_complete(
        &mut self,
        newly_added: usize,
        passes: u32,
        stop_reason: StopReason,
    ) -> Result<ExtractionReport> {
        if self.progress.update(self.records.len() as u64, true) {
            info!("{}", self.progress.render());
        }

        if let Err(e) = self.persistence.save_canonical(&self.records) {
            warn!("Final save failed: {:#}", e);
        }

        info!(
            "Extraction complete! Total: {} (new: {})",
            self.records.len(),
            newly_added
        );
        ExtractionSummary::from_records(&self.records).log();

        self.phase = ExtractionPhase::Complete;
        Ok(ExtractionReport {
            phase: self.phase,
            total_records: self.records.len(),
            newly_added,
            passes,
            stop_reason: Some(stop_reason),
        })
    }

    /// Interrupt path: reentrant-safe relative to a partially built pass.
    /// Whatever was accepted before the interrupt is persisted exactly once.
    fn finalize_interrupted(
        &mut self,
        newly_added: usize,
        passes: u32,
    ) -> Result<ExtractionReport> {
        warn!("Interrupted! Saving progress...");

        if self.progress.update(self.records.len() as u64, true) {
            info!("{}", self.progress.render());
        }

        match self.persistence.timestamped_backup(&self.records) {
            Ok(path) => info!("Wrote interrupt snapshot: {:?}", path),
            Err(e) => warn!("Interrupt snapshot failed: {:#}", e),
        }
        if let Err(e) = self.persistence.save_canonical(&self.records) {
            warn!("Canonical save on interrupt failed: {:#}", e);
        }

        info!("Data saved, exiting");
        self.phase = ExtractionPhase::Interrupted;
        Ok(ExtractionReport {
            phase: self.phase,
            total_records: self.records.len(),
            newly_added,
            passes,
            stop_reason: None,
        })
    }

    /// Unrecoverable failure: error snapshot plus best-effort canonical save,
    /// then the error propagates to the host.
    fn abort(&mut self, cause: anyhow::Error) -> Result<ExtractionReport> {
        error!("Extraction aborted: {:#}", cause);

        match self.persistence.error_backup(&self.records) {
            Ok(path) => info!("Wrote error snapshot: {:?}", path),
            Err(e) => warn!("Error snapshot failed: {:#}", e),
        }
        if let Err(e) = self.persistence.save_canonical(&self.records) {
            warn!("Canonical save on abort failed: {:#}", e);
        }

        self.phase = ExtractionPhase::Aborted;
        Err(cause)
    }
}
