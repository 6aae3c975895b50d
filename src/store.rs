//! Storage abstraction for Groundwork.
//!
//! The [`ChunkStore`] trait defines all persistence operations needed by
//! the ingestion and retrieval pipeline, enabling pluggable backends
//! (SQLite, in-memory). Implementations must be `Send + Sync` to work
//! with async runtimes.
//!
//! # Atomicity contract
//!
//! [`replace_chunks`](ChunkStore::replace_chunks) must be atomic from a
//! consumer's point of view: a reader never observes a state where the
//! old chunk set is partially deleted and the new set partially inserted.
//! Writers must serialize per document; concurrent re-ingestions of the
//! same document must not interleave their delete/insert steps. Reads
//! may return stale-but-consistent snapshots.

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Chunk, Document, ProcessingStatus, TeamDocumentStats};

/// Abstract storage backend for documents and their chunk sets.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`upsert_document`](ChunkStore::upsert_document) | Insert or update a document by `(team_id, source_id)` |
/// | [`set_document_status`](ChunkStore::set_document_status) | Move a document through its processing lifecycle |
/// | [`finalize_document`](ChunkStore::finalize_document) | Mark completed and record chunk/embedding counts |
/// | [`replace_chunks`](ChunkStore::replace_chunks) | Atomically replace all chunks for a document |
/// | [`delete_document_chunks`](ChunkStore::delete_document_chunks) | Compensating cleanup after a failed replace |
/// | [`get_document`](ChunkStore::get_document) | Fetch one document by id |
/// | [`find_by_source`](ChunkStore::find_by_source) | Fetch one document by `(team_id, source_id)` |
/// | [`list_documents`](ChunkStore::list_documents) | All documents for a team, with status |
/// | [`chunks_by_team`](ChunkStore::chunks_by_team) | The retrieval candidate pool for a team |
/// | [`embedding_dims`](ChunkStore::embedding_dims) | Stored corpus dimensionality for a team |
/// | [`delete_document`](ChunkStore::delete_document) | Remove a document and its chunks together |
/// | [`team_stats`](ChunkStore::team_stats) | Per-team document/chunk/character counts |
#[async_trait]
pub trait ChunkStore: Send + Sync {
    /// Insert or update a document keyed by `(team_id, source_id)`.
    ///
    /// Re-processing the same source id updates the existing row rather
    /// than creating a duplicate. Returns the document id (existing or
    /// newly assigned).
    async fn upsert_document(&self, doc: &Document) -> Result<String>;

    /// Update a document's processing status.
    async fn set_document_status(&self, document_id: &str, status: ProcessingStatus)
        -> Result<()>;

    /// Mark a document `Completed` and record its final counts.
    async fn finalize_document(
        &self,
        document_id: &str,
        chunk_count: i64,
        embedding_count: i64,
    ) -> Result<()>;

    /// Atomically replace all chunks for a document.
    async fn replace_chunks(&self, document_id: &str, chunks: &[Chunk]) -> Result<()>;

    /// Delete all chunks for a document without touching the document
    /// row. Used as compensating cleanup when a replace fails on a
    /// backend without multi-row transactions.
    async fn delete_document_chunks(&self, document_id: &str) -> Result<()>;

    /// Fetch a document by id.
    async fn get_document(&self, document_id: &str) -> Result<Option<Document>>;

    /// Fetch a document by its source identity within a team.
    async fn find_by_source(&self, team_id: &str, source_id: &str) -> Result<Option<Document>>;

    /// All documents for a team, most recently updated first. `Failed`
    /// documents appear here with their status so they can be
    /// re-submitted.
    async fn list_documents(&self, team_id: &str) -> Result<Vec<Document>>;

    /// All chunks across all documents for a team: the retrieval
    /// candidate pool.
    async fn chunks_by_team(&self, team_id: &str) -> Result<Vec<Chunk>>;

    /// Dimensionality of the stored corpus for a team, if any chunks
    /// exist. Used to reject `DimensionMismatch` ingestions up front.
    async fn embedding_dims(&self, team_id: &str) -> Result<Option<usize>>;

    /// Delete a document and its chunks together.
    async fn delete_document(&self, document_id: &str) -> Result<()>;

    /// Document, chunk, and character totals for a team.
    async fn team_stats(&self, team_id: &str) -> Result<TeamDocumentStats>;
}
