//! Core data models used throughout Groundwork.
//!
//! These types represent the documents, chunks, embeddings, and interaction
//! records that flow through the ingestion, retrieval, and learning pipeline.
//! Everything here is team-scoped: the team is the tenancy boundary for
//! documents, chunks, and retrieval candidate pools.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Processing lifecycle of a document.
///
/// A document is created as `Pending`, moves to `Processing` while its
/// chunks are being embedded and written, and ends in `Completed` or
/// `Failed`. A `Failed` document stays visible in listings and can be
/// re-submitted for processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl ProcessingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingStatus::Pending => "pending",
            ProcessingStatus::Processing => "processing",
            ProcessingStatus::Completed => "completed",
            ProcessingStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ProcessingStatus::Pending),
            "processing" => Some(ProcessingStatus::Processing),
            "completed" => Some(ProcessingStatus::Completed),
            "failed" => Some(ProcessingStatus::Failed),
            _ => None,
        }
    }
}

/// An opaque embedding vector with a fixed, corpus-wide dimensionality.
///
/// Wrapping the raw float buffer makes dimensionality a property of the
/// type rather than an ad-hoc length comparison: every consumer goes
/// through [`Embedding::dims`], and mismatches are caught at the ingestion
/// boundary instead of silently truncated or padded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding(Vec<f32>);

impl Embedding {
    pub fn from_vec(values: Vec<f32>) -> Self {
        Embedding(values)
    }

    /// The vector dimensionality.
    pub fn dims(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.0
    }
}

impl AsRef<[f32]> for Embedding {
    fn as_ref(&self) -> &[f32] {
        &self.0
    }
}

/// A document owned by a team, created on first successful extraction and
/// updated (never duplicated) on re-processing of the same source id.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub team_id: String,
    /// Display name shown in listings and context prefixes.
    pub name: String,
    pub media_type: String,
    /// Path of the document relative to its source root.
    pub source_path: String,
    /// Identifier of the document within its external source.
    pub source_id: String,
    /// Total character length of the extracted text.
    pub char_length: i64,
    pub chunk_count: i64,
    pub embedding_count: i64,
    pub status: ProcessingStatus,
    /// Last-modified time reported by the external source.
    pub last_modified: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Metadata snapshot carried on every chunk.
///
/// Denormalized from the parent document at ingestion time so retrieval
/// and context assembly never need a second lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub document_name: String,
    pub media_type: String,
    pub source_path: String,
    pub total_chunks: i64,
    pub document_last_modified: DateTime<Utc>,
}

/// A contiguous text span of a document, small enough to embed and rank
/// individually. The set of chunks for a document is always replaced
/// wholesale; partial chunk sets are never visible.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub id: String,
    pub team_id: String,
    pub document_id: String,
    /// Zero-based position within the document.
    pub chunk_index: i64,
    pub text: String,
    pub embedding: Embedding,
    pub metadata: ChunkMetadata,
    /// SHA-256 of the chunk text, for staleness detection on re-ingestion.
    pub hash: String,
}

/// Domain tag attached to each recorded interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    General,
    Chart,
    Analysis,
    Crm,
    Conversation,
}

impl Domain {
    pub const ALL: [Domain; 5] = [
        Domain::General,
        Domain::Chart,
        Domain::Analysis,
        Domain::Crm,
        Domain::Conversation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::General => "general",
            Domain::Chart => "chart",
            Domain::Analysis => "analysis",
            Domain::Crm => "crm",
            Domain::Conversation => "conversation",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "general" => Some(Domain::General),
            "chart" => Some(Domain::Chart),
            "analysis" => Some(Domain::Analysis),
            "crm" => Some(Domain::Crm),
            "conversation" => Some(Domain::Conversation),
            _ => None,
        }
    }
}

/// A single retrieval/generation attempt. Immutable once recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    pub query: String,
    pub domain: Domain,
    pub success: bool,
    /// Confidence score in `[0.0, 1.0]`.
    pub confidence: f64,
    pub recorded_at: DateTime<Utc>,
}

/// Outcome classification of a labeled example.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Successful,
    Failed,
}

/// A labeled interaction retained for later inspection and tuning.
///
/// `seq` is a bank-assigned monotonic sequence number; combined exports
/// across domain logs sort by it to preserve global insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningExample {
    pub seq: u64,
    pub query: String,
    pub domain: Domain,
    pub outcome: Outcome,
    pub confidence: f64,
    /// Optional free-text corrective note attached by the caller.
    pub note: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// A derived, recomputable aggregate over the interaction log.
///
/// Never persisted as ground truth; always rebuildable from the log.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub total_interactions: usize,
    pub successful: usize,
    /// `successful / total`, defined as `0.0` for an empty log.
    pub success_rate: f64,
    /// Mean confidence across the log, `0.0` for an empty log.
    pub average_confidence: f64,
    /// Number of labeled examples accumulated in the bank.
    pub learned_examples: usize,
    /// Recent-window success rate minus baseline-window success rate.
    pub improvement: f64,
}

/// Result of a successful document ingestion.
#[derive(Debug, Clone)]
pub struct ProcessedDocument {
    pub document_id: String,
    pub chunk_count: usize,
    pub embedding_count: usize,
}

/// Per-team document statistics.
#[derive(Debug, Clone, Serialize)]
pub struct TeamDocumentStats {
    pub document_count: i64,
    pub chunk_count: i64,
    pub total_characters: i64,
}
