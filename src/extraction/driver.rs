//! Page driver capability boundary
//!
//! The extraction engine never touches the page directly; everything it
//! knows about the source arrives through [`PageDriver`]. Login, wizard
//! navigation and element-level interaction live behind this trait in the
//! host, which also owns per-call timeout policy.

use std::collections::VecDeque;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure reported by a page driver call.
#[derive(Debug, Error)]
pub enum DriverError {
    /// A single read/scroll call failed; the pass is skipped and the loop
    /// continues.
    #[error("transient driver failure: {0}")]
    Transient(String),

    /// The driver cannot recover (browser gone, session torn down). Triggers
    /// an emergency save and aborts the run.
    #[error("fatal driver failure: {0}")]
    Fatal(String),
}

/// Narrow capability interface to the lazily-rendered source page.
#[async_trait]
pub trait PageDriver: Send {
    /// Text blobs of the cards currently rendered in the viewport.
    async fn rendered_card_texts(&mut self) -> Result<Vec<String>, DriverError>;

    /// Raw `"Showing X of Y"` banner text, if the banner is present.
    async fn progress_banner_text(&mut self) -> Result<Option<String>, DriverError>;

    /// Scroll/advance the viewport by an amount proportional to `factor`.
    async fn advance_viewport(&mut self, factor: f64) -> Result<(), DriverError>;

    /// Whether the view has settled after the last navigation action.
    /// Optional capability; drivers without it report a settled view.
    async fn is_stable_view(&mut self) -> Result<bool, DriverError> {
        Ok(true)
    }
}

/// One scripted pass: the cards rendered during it and the banner shown.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScriptedPass {
    #[serde(default)]
    pub cards: Vec<String>,
    #[serde(default)]
    pub banner: Option<String>,
}

/// Deterministic [`PageDriver`] replaying a fixed schedule of passes.
///
/// Used by the integration tests and by the binary's replay mode. Once the
/// schedule is exhausted the driver keeps serving the last pass, which is how
/// a real page behaves when scrolling stops surfacing new content.
#[derive(Debug, Default)]
pub struct ScriptedPageDriver {
    pending: VecDeque<ScriptedPass>,
    current: ScriptedPass,
    advances: Vec<f64>,
}

impl ScriptedPageDriver {
    pub fn new(passes: impl IntoIterator<Item = ScriptedPass>) -> Self {
        let mut pending: VecDeque<ScriptedPass> = passes.into_iter().collect();
        let current = pending.pop_front().unwrap_or_default();
        Self {
            pending,
            current,
            advances: Vec::new(),
        }
    }

    /// Load a replay schedule from a JSON file (array of passes).
    pub fn from_replay_file(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read replay file {:?}", path))?;
        let passes: Vec<ScriptedPass> = serde_json::from_str(&content)
            .with_context(|| format!("replay file {:?} is not a valid pass schedule", path))?;
        Ok(Self::new(passes))
    }

    /// Pacing factors observed so far, in call order.
    pub fn observed_factors(&self) -> &[f64] {
        &self.advances
    }
}

#[async_trait]
impl PageDriver for ScriptedPageDriver {
    async fn rendered_card_texts(&mut self) -> Result<Vec<String>, DriverError> {
        Ok(self.current.cards.clone())
    }

    async fn progress_banner_text(&mut self) -> Result<Option<String>, DriverError> {
        Ok(self.current.banner.clone())
    }

    async fn advance_viewport(&mut self, factor: f64) -> Result<(), DriverError> {
        self.advances.push(factor);
        if let Some(next) = self.pending.pop_front() {
            self.current = next;
        }
        Ok(())
    }
}
