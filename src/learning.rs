//! Labeled example bank for the learning loop.
//!
//! Stores labeled interaction examples for later inspection and
//! retrieval tuning. Each domain (general, chart, analysis, CRM,
//! conversation) has its own independent append-only log with the same
//! contract; logs can be queried individually or combined for aggregate
//! stats. A monotonic sequence number assigned at insertion lets the
//! combined export preserve global insertion order.
//!
//! Like the monitor, the bank is a constructed component owned by the
//! engine rather than a process-global accumulator.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use crate::models::{Domain, LearningExample, Outcome};

/// Counts by domain and outcome across all logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankStats {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub by_domain: BTreeMap<Domain, usize>,
}

/// Append-only labeled example store with per-domain logs.
#[derive(Default)]
pub struct ExampleBank {
    logs: RwLock<BTreeMap<Domain, Vec<LearningExample>>>,
    next_seq: AtomicU64,
}

impl ExampleBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a labeled example to its domain log.
    pub fn add_example(
        &self,
        query: &str,
        domain: Domain,
        outcome: Outcome,
        confidence: f64,
        note: Option<String>,
    ) {
        let example = LearningExample {
            seq: self.next_seq.fetch_add(1, Ordering::SeqCst),
            query: query.to_string(),
            domain,
            outcome,
            confidence: confidence.clamp(0.0, 1.0),
            note,
            recorded_at: Utc::now(),
        };
        let mut logs = self.logs.write().unwrap();
        logs.entry(domain).or_default().push(example);
    }

    /// All examples for one domain, in insertion order.
    pub fn export_domain(&self, domain: Domain) -> Vec<LearningExample> {
        let logs = self.logs.read().unwrap();
        logs.get(&domain).cloned().unwrap_or_default()
    }

    /// All examples across every domain, in global insertion order.
    pub fn export_examples(&self) -> Vec<LearningExample> {
        let logs = self.logs.read().unwrap();
        let mut all: Vec<LearningExample> = logs.values().flatten().cloned().collect();
        all.sort_by_key(|e| e.seq);
        all
    }

    /// Number of examples across all domain logs.
    pub fn len(&self) -> usize {
        let logs = self.logs.read().unwrap();
        logs.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop examples recorded before `cutoff` from every log. Entries
    /// are never edited, only pruned by age.
    pub fn prune_before(&self, cutoff: DateTime<Utc>) {
        let mut logs = self.logs.write().unwrap();
        for log in logs.values_mut() {
            log.retain(|e| e.recorded_at >= cutoff);
        }
    }

    /// Counts by domain and outcome, aggregated over all logs.
    pub fn stats(&self) -> BankStats {
        let logs = self.logs.read().unwrap();

        let mut by_domain = BTreeMap::new();
        let mut successful = 0;
        let mut failed = 0;

        for (domain, log) in logs.iter() {
            if !log.is_empty() {
                by_domain.insert(*domain, log.len());
            }
            for e in log {
                match e.outcome {
                    Outcome::Successful => successful += 1,
                    Outcome::Failed => failed += 1,
                }
            }
        }

        BankStats {
            total: successful + failed,
            successful,
            failed,
            by_domain,
        }
    }
}
