//! Adaptive viewport pacing and extraction stop signals.

/// Record density at which the pacing factor bottoms out.
const PACING_DENSITY_DIVISOR: f64 = 30.0;
const MIN_PACING_FACTOR: f64 = 0.3;
const MAX_PACING_FACTOR: f64 = 1.0;

/// Why the extraction loop decided to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Primary signal: `no_new_threshold` consecutive passes yielded nothing.
    NoNewContent,
    /// Fast path: the source reported `shown >= total`.
    TotalReached,
    /// Defensive bound: the hard pass ceiling was exhausted.
    AttemptCeiling,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoNewContent => write!(f, "no new content"),
            Self::TotalReached => write!(f, "reported total reached"),
            Self::AttemptCeiling => write!(f, "scroll attempt ceiling reached"),
        }
    }
}

/// Decides how fast to advance the viewport and when to stop.
///
/// Dense passes slow the pacing so content that is still rendering is not
/// skipped; sparse passes keep it fast. The no-new-content streak is the
/// authoritative termination signal because the source's advertised total is
/// advisory at best.
#[derive(Debug)]
pub struct ScrollController {
    max_attempts: u32,
    no_new_threshold: u32,
    attempts: u32,
    no_new_streak: u32,
    pacing_factor: f64,
}

impl ScrollController {
    pub fn new(max_attempts: u32, no_new_threshold: u32) -> Self {
        Self {
            max_attempts,
            no_new_threshold,
            attempts: 0,
            no_new_streak: 0,
            pacing_factor: MAX_PACING_FACTOR,
        }
    }

    /// Count one pass against the hard ceiling.
    pub fn begin_pass(&mut self) {
        self.attempts += 1;
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Fraction of a full viewport advance to apply next, in [0.3, 1.0].
    pub fn pacing_factor(&self) -> f64 {
        self.pacing_factor
    }

    /// Feed the result of one completed pass into the streak and pacing state.
    pub fn observe_pass(&mut self, newly_accepted: usize) {
        if newly_accepted == 0 {
            self.no_new_streak += 1;
        } else {
            self.no_new_streak = 0;
            self.pacing_factor = (MAX_PACING_FACTOR
                - newly_accepted as f64 / PACING_DENSITY_DIVISOR)
                .clamp(MIN_PACING_FACTOR, MAX_PACING_FACTOR);
        }
    }

    /// Evaluate the stop conditions, in priority order.
    ///
    /// `shown`/`total` come from the source's progress banner when present.
    /// The total-reached check is only a fast path; the streak fires
    /// regardless of what the banner claims.
    pub fn check_stop(&self, shown: Option<u64>, total: Option<u64>) -> Option<StopReason> {
        if self.no_new_streak >= self.no_new_threshold {
            return Some(StopReason::NoNewContent);
        }

        if let (Some(shown), Some(total)) = (shown, total) {
            if shown >= total {
                return Some(StopReason::TotalReached);
            }
        }

        if self.attempts >= self.max_attempts {
            return Some(StopReason::AttemptCeiling);
        }

        None
    }
}
