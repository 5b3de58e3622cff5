//! Progress tracking with smoothed extraction rate and ETA.

use std::time::{Duration, Instant};

/// Width of the rendered progress bar in characters.
const BAR_LENGTH: usize = 30;

/// Tracks counts, extraction rate and report throttling for one run.
///
/// The advertised total is advisory: the source may revise it upward or
/// downward between passes, so the latest reported value always wins and the
/// ETA degrades to `"unknown"` instead of producing nonsensical figures.
#[derive(Debug)]
pub struct ProgressTracker {
    started_at: Instant,
    report_interval: Duration,
    total_items: Option<u64>,
    current_count: u64,
    initial_count: u64,
    extraction_rate: f64,
    last_report: Option<Instant>,
}

impl ProgressTracker {
    pub fn new(report_interval: Duration) -> Self {
        Self {
            started_at: Instant::now(),
            report_interval,
            total_items: None,
            current_count: 0,
            initial_count: 0,
            extraction_rate: 0.0,
            last_report: None,
        }
    }

    /// Record the source-reported total. Latest value wins.
    pub fn set_total(&mut self, total: u64) {
        self.total_items = Some(total);
    }

    pub fn total(&self) -> Option<u64> {
        self.total_items
    }

    /// Seed the count baseline so the rate reflects only this run's work,
    /// not records loaded from a previous snapshot.
    pub fn set_initial_count(&mut self, count: u64) {
        self.initial_count = count;
        self.current_count = count;
    }

    /// Record the new count and decide whether a report is due.
    ///
    /// Reports are throttled to one per `report_interval`; `force` bypasses
    /// the throttle and is used at shutdown so the final line always appears.
    /// The smoothed rate is recomputed whenever a report is due.
    pub fn update(&mut self, current: u64, force: bool) -> bool {
        self.current_count = current;

        let now = Instant::now();
        if !force {
            if let Some(last) = self.last_report {
                if now.duration_since(last) < self.report_interval {
                    return false;
                }
            }
        }

        let elapsed_minutes = self.started_at.elapsed().as_secs_f64() / 60.0;
        if elapsed_minutes > 0.0 {
            let harvested = current.saturating_sub(self.initial_count) as f64;
            self.extraction_rate = (harvested / elapsed_minutes).max(0.1);
        }

        self.last_report = Some(now);
        true
    }

    /// Human-readable progress line: bar + percentage when a total is known,
    /// plus rate, elapsed wall time and estimated remaining time.
    pub fn render(&self) -> String {
        let elapsed = format_duration(self.started_at.elapsed().as_secs());

        let progress_info = match self.total_items {
            Some(total) if total > 0 => {
                let percent = self.current_count as f64 / total as f64 * 100.0;
                let filled = ((BAR_LENGTH as u64 * self.current_count.min(total)) / total) as usize;
                let bar: String = "█".repeat(filled) + &"░".repeat(BAR_LENGTH - filled);
                format!("[{}] {}/{} ({:.1}%)", bar, self.current_count, total, percent)
            }
            _ => format!("{} items", self.current_count),
        };

        let remaining = match self.total_items {
            Some(total) if total > 0 && self.extraction_rate > 0.0 => {
                let items_remaining = total.saturating_sub(self.current_count) as f64;
                let minutes_remaining = items_remaining / self.extraction_rate;
                format_duration((minutes_remaining * 60.0) as u64)
            }
            _ => "unknown".to_string(),
        };

        format!(
            "Progress: {} | Rate: {:.1} items/min | Elapsed: {} | Est. remaining: {}",
            progress_info, self.extraction_rate, elapsed, remaining
        )
    }
}

/// `H:MM:SS` formatting for elapsed/remaining durations.
fn format_duration(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{}:{:02}:{:02}", hours, minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forced_update_always_reports() {
        let mut tracker = ProgressTracker::new(Duration::from_secs(3));
        assert!(tracker.update(1, false));
        // Immediately after a report the throttle suppresses the next one.
        assert!(!tracker.update(2, false));
        assert!(tracker.update(3, true));
    }

    #[test]
    fn eta_is_unknown_without_total() {
        let mut tracker = ProgressTracker::new(Duration::from_secs(0));
        tracker.update(10, true);
        assert!(tracker.render().contains("Est. remaining: unknown"));
        assert!(tracker.render().contains("10 items"));
    }

    #[test]
    fn eta_is_unknown_with_zero_rate() {
        let mut tracker = ProgressTracker::new(Duration::from_secs(0));
        tracker.set_total(100);
        // No update() call, so the rate is still zero.
        let line = tracker.render();
        assert!(line.contains("Est. remaining: unknown"));
        assert!(!line.contains("NaN"));
        assert!(!line.contains("inf"));
    }

    #[test]
    fn render_shows_bar_and_percentage_when_total_known() {
        let mut tracker = ProgressTracker::new(Duration::from_secs(0));
        tracker.set_total(200);
        tracker.update(50, true);
        let line = tracker.render();
        assert!(line.contains("50/200"));
        assert!(line.contains("(25.0%)"));
        assert!(line.contains('█') || line.contains('░'));
    }

    #[test]
    fn count_past_total_does_not_overflow_bar() {
        let mut tracker = ProgressTracker::new(Duration::from_secs(0));
        tracker.set_total(10);
        tracker.update(25, true);
        let line = tracker.render();
        assert!(line.contains("25/10"));
        // Remaining work saturates at zero rather than going negative.
        assert!(line.contains("Est. remaining: 0:00:00"));
    }

    #[test]
    fn latest_total_wins() {
        let mut tracker = ProgressTracker::new(Duration::from_secs(0));
        tracker.set_total(400);
        tracker.set_total(380);
        assert_eq!(tracker.total(), Some(380));
    }

    #[test]
    fn initial_count_seeds_baseline() {
        let mut tracker = ProgressTracker::new(Duration::from_secs(0));
        tracker.set_initial_count(150);
        assert!(tracker.render().contains("150 items"));
    }

    #[test]
    fn duration_formatting() {
        assert_eq!(format_duration(0), "0:00:00");
        assert_eq!(format_duration(61), "0:01:01");
        assert_eq!(format_duration(3723), "1:02:03");
    }
}
