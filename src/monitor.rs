//! Interaction monitoring: append-only log plus derived metrics.
//!
//! Every retrieval/generation round is recorded as an [`Interaction`].
//! Metrics are always recomputed from the log; nothing derived is ever
//! stored, so a snapshot can never drift from the record.
//!
//! The monitor is an explicit, constructed component owned by the
//! engine, not a process-global accumulator. Lifecycle and test
//! isolation are controlled by the caller.
//!
//! # Concurrency
//!
//! Appends from concurrent requests take a short write lock and are
//! never lost. Metric recomputation clones the log under a read lock and
//! does all arithmetic outside it, so recomputation never holds up new
//! appends.

use std::sync::RwLock;

use chrono::{DateTime, Utc};

use crate::config::MonitorConfig;
use crate::models::{Domain, Interaction, MetricsSnapshot};

/// Append-only interaction log with windowed improvement tracking.
pub struct InteractionMonitor {
    log: RwLock<Vec<Interaction>>,
    recent_window: usize,
    baseline_window: usize,
}

impl InteractionMonitor {
    pub fn new(config: &MonitorConfig) -> Self {
        Self {
            log: RwLock::new(Vec::new()),
            recent_window: config.recent_window,
            baseline_window: config.baseline_window,
        }
    }

    /// Append one interaction to the log. Confidence is clamped to
    /// `[0.0, 1.0]`.
    pub fn record(&self, query: &str, domain: Domain, success: bool, confidence: f64) {
        let interaction = Interaction {
            query: query.to_string(),
            domain,
            success,
            confidence: confidence.clamp(0.0, 1.0),
            recorded_at: Utc::now(),
        };
        let mut log = self.log.write().unwrap();
        log.push(interaction);
    }

    /// Number of recorded interactions.
    pub fn len(&self) -> usize {
        self.log.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop interactions recorded before `cutoff`. Pruning by age is the
    /// only permitted mutation; entries are never edited.
    pub fn prune_before(&self, cutoff: DateTime<Utc>) {
        let mut log = self.log.write().unwrap();
        log.retain(|i| i.recorded_at >= cutoff);
    }

    /// Recompute the metrics snapshot from the current log.
    ///
    /// `learned_examples` is supplied by the caller (the example bank
    /// owns that count). The empty log yields a success rate and average
    /// confidence of `0.0`, not NaN.
    pub fn metrics(&self, learned_examples: usize) -> MetricsSnapshot {
        // Stable snapshot: clone under the read lock, compute outside it.
        let log: Vec<Interaction> = self.log.read().unwrap().clone();

        let total = log.len();
        let successful = log.iter().filter(|i| i.success).count();
        let success_rate = ratio(successful, total);
        let average_confidence = if total == 0 {
            0.0
        } else {
            log.iter().map(|i| i.confidence).sum::<f64>() / total as f64
        };

        MetricsSnapshot {
            total_interactions: total,
            successful,
            success_rate,
            average_confidence,
            learned_examples,
            improvement: self.improvement(&log),
        }
    }

    /// Recent-window success rate minus the baseline window before it.
    ///
    /// Returns `0.0` until there is at least one interaction in each
    /// window; a trend needs something to compare against.
    fn improvement(&self, log: &[Interaction]) -> f64 {
        if log.len() <= self.recent_window {
            return 0.0;
        }

        let recent = &log[log.len() - self.recent_window..];
        let baseline_end = log.len() - self.recent_window;
        let baseline_start = baseline_end.saturating_sub(self.baseline_window);
        let baseline = &log[baseline_start..baseline_end];

        success_rate_of(recent) - success_rate_of(baseline)
    }
}

fn success_rate_of(interactions: &[Interaction]) -> f64 {
    let successful = interactions.iter().filter(|i| i.success).count();
    ratio(successful, interactions.len())
}

fn ratio(num: usize, denom: usize) -> f64 {
    if denom == 0 {
        0.0
    } else {
        num as f64 / denom as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor(recent: usize, baseline: usize) -> InteractionMonitor {
        InteractionMonitor::new(&MonitorConfig {
            recent_window: recent,
            baseline_window: baseline,
        })
    }

    #[test]
    fn test_empty_log_zero_not_nan() {
        let m = monitor(10, 10);
        let snap = m.metrics(0);
        assert_eq!(snap.total_interactions, 0);
        assert_eq!(snap.success_rate, 0.0);
        assert_eq!(snap.average_confidence, 0.0);
        assert_eq!(snap.improvement, 0.0);
    }

    #[test]
    fn test_success_rate_seven_of_ten() {
        let m = monitor(10, 10);
        for i in 0..10 {
            m.record("q", Domain::General, i < 7, 0.8);
        }
        let snap = m.metrics(0);
        assert_eq!(snap.total_interactions, 10);
        assert_eq!(snap.successful, 7);
        assert!((snap.success_rate - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_average_confidence() {
        let m = monitor(10, 10);
        m.record("q", Domain::Chart, true, 0.5);
        m.record("q", Domain::Chart, true, 1.0);
        let snap = m.metrics(0);
        assert!((snap.average_confidence - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_confidence_clamped() {
        let m = monitor(10, 10);
        m.record("q", Domain::General, true, 3.5);
        m.record("q", Domain::General, true, -1.0);
        let snap = m.metrics(0);
        assert!((snap.average_confidence - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_improvement_compares_windows() {
        let m = monitor(5, 5);
        // Baseline: 1/5 successful. Recent: 4/5 successful.
        for i in 0..5 {
            m.record("q", Domain::General, i == 0, 0.5);
        }
        for i in 0..5 {
            m.record("q", Domain::General, i != 0, 0.5);
        }
        let snap = m.metrics(0);
        assert!((snap.improvement - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_improvement_zero_without_baseline() {
        let m = monitor(10, 10);
        for _ in 0..8 {
            m.record("q", Domain::General, true, 0.9);
        }
        assert_eq!(m.metrics(0).improvement, 0.0);
    }

    #[test]
    fn test_prune_before() {
        let m = monitor(10, 10);
        m.record("old", Domain::General, true, 0.9);
        let cutoff = Utc::now() + chrono::Duration::seconds(1);
        m.prune_before(cutoff);
        assert!(m.is_empty());
    }

    #[test]
    fn test_concurrent_appends_not_lost() {
        use std::sync::Arc;

        let m = Arc::new(monitor(10, 10));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let m = Arc::clone(&m);
            handles.push(std::thread::spawn(move || {
                for _ in 0..50 {
                    m.record("q", Domain::Crm, true, 0.6);
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(m.len(), 400);
    }
}
