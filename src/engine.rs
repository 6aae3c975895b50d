//! The Groundwork engine: one constructed object tying the pipeline
//! together.
//!
//! Owns the storage backend, the embedding provider, the interaction
//! monitor, and the example bank, and exposes the operations callers
//! use: ingest a document, build retrieval context for a query, record
//! how an interaction went, and report metrics. Construction is explicit
//! so tests can assemble an engine from an in-memory store and a stub
//! provider.

use std::sync::Arc;

use crate::config::Config;
use crate::context::ContextBundle;
use crate::error::IngestError;
use crate::ingest::{process_document, DocumentSource};
use crate::learning::{BankStats, ExampleBank};
use crate::models::{
    Document, Domain, LearningExample, MetricsSnapshot, Outcome, ProcessedDocument,
    TeamDocumentStats,
};
use crate::monitor::InteractionMonitor;
use crate::embedding::EmbeddingProvider;
use crate::search::create_context;
use crate::store::ChunkStore;

pub struct Engine {
    store: Arc<dyn ChunkStore>,
    provider: Arc<dyn EmbeddingProvider>,
    config: Config,
    monitor: InteractionMonitor,
    bank: ExampleBank,
}

impl Engine {
    pub fn new(
        store: Arc<dyn ChunkStore>,
        provider: Arc<dyn EmbeddingProvider>,
        config: Config,
    ) -> Self {
        let monitor = InteractionMonitor::new(&config.monitor);
        Self {
            store,
            provider,
            config,
            monitor,
            bank: ExampleBank::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Chunk, embed, and store one document for a team. See
    /// [`process_document`] for the failure semantics.
    pub async fn process_document(
        &self,
        team_id: &str,
        source: DocumentSource,
    ) -> Result<ProcessedDocument, IngestError> {
        process_document(
            self.store.as_ref(),
            self.provider.as_ref(),
            &self.config,
            team_id,
            source,
        )
        .await
    }

    /// Build the retrieval context for a query against a team's corpus.
    /// Embedding failures degrade to an ungrounded bundle.
    pub async fn create_context(
        &self,
        team_id: &str,
        query: &str,
        max_results: Option<usize>,
    ) -> anyhow::Result<ContextBundle> {
        create_context(
            self.store.as_ref(),
            self.provider.as_ref(),
            &self.config,
            team_id,
            query,
            max_results,
        )
        .await
    }

    /// Record the outcome of one retrieval/generation round.
    ///
    /// The interaction goes into the monitor log; a labeled example with
    /// the same outcome goes into the bank, closing the learning loop.
    pub fn record_interaction(
        &self,
        query: &str,
        domain: Domain,
        success: bool,
        confidence: f64,
        note: Option<String>,
    ) {
        self.monitor.record(query, domain, success, confidence);
        let outcome = if success {
            Outcome::Successful
        } else {
            Outcome::Failed
        };
        self.bank.add_example(query, domain, outcome, confidence, note);
    }

    /// Current metrics snapshot, recomputed from the interaction log.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.monitor.metrics(self.bank.len())
    }

    /// Labeled examples for one domain, in insertion order.
    pub fn examples_for(&self, domain: Domain) -> Vec<LearningExample> {
        self.bank.export_domain(domain)
    }

    /// All labeled examples across domains, in global insertion order.
    pub fn export_examples(&self) -> Vec<LearningExample> {
        self.bank.export_examples()
    }

    /// Example counts by domain and outcome.
    pub fn bank_stats(&self) -> BankStats {
        self.bank.stats()
    }

    /// Drop interactions and examples recorded before `cutoff`.
    pub fn prune_before(&self, cutoff: chrono::DateTime<chrono::Utc>) {
        self.monitor.prune_before(cutoff);
        self.bank.prune_before(cutoff);
    }

    pub async fn list_documents(&self, team_id: &str) -> anyhow::Result<Vec<Document>> {
        self.store.list_documents(team_id).await
    }

    pub async fn delete_document(&self, document_id: &str) -> anyhow::Result<()> {
        self.store.delete_document(document_id).await
    }

    pub async fn team_stats(&self, team_id: &str) -> anyhow::Result<TeamDocumentStats> {
        self.store.team_stats(team_id).await
    }
}
