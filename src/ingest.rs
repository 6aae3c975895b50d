//! Document ingestion pipeline: chunk → embed → store.
//!
//! Coordinates a single `process_document` call: validates and chunks
//! the extracted text, embeds every chunk in batches, verifies corpus
//! dimensionality, and atomically replaces the document's chunk set.
//!
//! # Status discipline
//!
//! The document row is written with status `processing` before any
//! external call and only moves to `completed` after the chunk set has
//! been fully replaced and counted. Every failure path marks the
//! document `failed` and leaves no partial chunk set behind, so an
//! abandoned or failed ingestion can never masquerade as a completed
//! one. A `failed` document remains visible in listings and can be
//! re-submitted as-is.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::chunk::{chunk_text, ChunkSpan};
use crate::config::Config;
use crate::embedding::EmbeddingProvider;
use crate::error::IngestError;
use crate::models::{
    Chunk, ChunkMetadata, Document, Embedding, ProcessedDocument, ProcessingStatus,
};
use crate::store::ChunkStore;

/// Everything the external document-source connector hands us about one
/// document.
#[derive(Debug, Clone)]
pub struct DocumentSource {
    /// Identifier of the document within its external source.
    pub source_id: String,
    /// Display name (typically the file name).
    pub name: String,
    pub media_type: String,
    /// Label of the folder the document came from; combined with `name`
    /// to form the stored source path.
    pub folder_label: String,
    /// Extracted text content.
    pub text: String,
    /// Last-modified time reported by the source.
    pub last_modified: DateTime<Utc>,
}

/// Process one document end to end: chunk, embed, and store.
///
/// Re-processing the same `(team_id, source_id)` replaces the previous
/// document state wholesale. Errors carry enough detail to retry; see
/// [`IngestError`] for the taxonomy. Text below the minimum viable
/// length is rejected before any document row is created.
pub async fn process_document(
    store: &dyn ChunkStore,
    provider: &dyn EmbeddingProvider,
    config: &Config,
    team_id: &str,
    source: DocumentSource,
) -> Result<ProcessedDocument, IngestError> {
    // Chunk first: a too-short document must not leave any trace.
    let spans = chunk_text(
        &source.text,
        config.chunking.target_chars,
        config.chunking.overlap_chars,
        config.chunking.min_document_chars,
    )?;

    let char_length = source.text.chars().count() as i64;
    let now = Utc::now();
    let doc = Document {
        id: Uuid::new_v4().to_string(),
        team_id: team_id.to_string(),
        name: source.name.clone(),
        media_type: source.media_type.clone(),
        source_path: format!("{}/{}", source.folder_label, source.name),
        source_id: source.source_id.clone(),
        char_length,
        chunk_count: 0,
        embedding_count: 0,
        status: ProcessingStatus::Processing,
        last_modified: source.last_modified,
        created_at: now,
        updated_at: now,
    };

    let doc_id = store
        .upsert_document(&doc)
        .await
        .map_err(|e| IngestError::StoreWriteFailed(e.to_string()))?;

    tracing::info!(
        team = team_id,
        document = %doc_id,
        chunks = spans.len(),
        chars = char_length,
        "processing document"
    );

    // Corpus-wide dimensionality is fixed: reject a provider whose
    // declared dims disagree with what this team already stores.
    let corpus_dims = store.embedding_dims(team_id).await?;
    if let Some(expected) = corpus_dims {
        if provider.dims() != expected {
            store
                .set_document_status(&doc_id, ProcessingStatus::Failed)
                .await?;
            return Err(IngestError::DimensionMismatch {
                expected,
                actual: provider.dims(),
            });
        }
    }
    let expected_dims = corpus_dims.unwrap_or_else(|| provider.dims());

    let embeddings = match embed_spans(provider, config, &spans).await {
        Ok(vectors) => vectors,
        Err(e) => {
            store
                .set_document_status(&doc_id, ProcessingStatus::Failed)
                .await?;
            return Err(IngestError::EmbeddingFailed(e.to_string()));
        }
    };

    for vector in &embeddings {
        if vector.dims() != expected_dims {
            store
                .set_document_status(&doc_id, ProcessingStatus::Failed)
                .await?;
            return Err(IngestError::DimensionMismatch {
                expected: expected_dims,
                actual: vector.dims(),
            });
        }
    }

    let chunks = build_chunks(team_id, &doc_id, &doc, &spans, embeddings);

    if let Err(e) = store.replace_chunks(&doc_id, &chunks).await {
        // Compensating cleanup: a backend without transactions may have
        // deleted the old set already. Stale chunks must not sit under a
        // document that claims success.
        let _ = store.delete_document_chunks(&doc_id).await;
        store
            .set_document_status(&doc_id, ProcessingStatus::Failed)
            .await?;
        return Err(IngestError::StoreWriteFailed(e.to_string()));
    }

    let embedding_count = chunks.len();
    store
        .finalize_document(&doc_id, chunks.len() as i64, embedding_count as i64)
        .await
        .map_err(|e| IngestError::StoreWriteFailed(e.to_string()))?;

    tracing::info!(
        team = team_id,
        document = %doc_id,
        chunks = chunks.len(),
        "document completed"
    );

    Ok(ProcessedDocument {
        document_id: doc_id,
        chunk_count: chunks.len(),
        embedding_count,
    })
}

/// Embed all spans in config-sized batches, preserving order.
async fn embed_spans(
    provider: &dyn EmbeddingProvider,
    config: &Config,
    spans: &[ChunkSpan],
) -> anyhow::Result<Vec<Embedding>> {
    let batch_size = config.embedding.batch_size.max(1);
    let mut out = Vec::with_capacity(spans.len());

    for batch in spans.chunks(batch_size) {
        let texts: Vec<String> = batch.iter().map(|s| s.text.clone()).collect();
        let vectors = provider.embed_batch(&texts).await?;
        if vectors.len() != texts.len() {
            anyhow::bail!(
                "provider returned {} vectors for {} texts",
                vectors.len(),
                texts.len()
            );
        }
        out.extend(vectors);
    }

    Ok(out)
}

fn build_chunks(
    team_id: &str,
    doc_id: &str,
    doc: &Document,
    spans: &[ChunkSpan],
    embeddings: Vec<Embedding>,
) -> Vec<Chunk> {
    let total_chunks = spans.len() as i64;
    spans
        .iter()
        .zip(embeddings)
        .map(|(span, embedding)| {
            let mut hasher = Sha256::new();
            hasher.update(span.text.as_bytes());
            let hash = format!("{:x}", hasher.finalize());

            Chunk {
                id: Uuid::new_v4().to_string(),
                team_id: team_id.to_string(),
                document_id: doc_id.to_string(),
                chunk_index: span.index,
                text: span.text.clone(),
                embedding,
                metadata: ChunkMetadata {
                    document_name: doc.name.clone(),
                    media_type: doc.media_type.clone(),
                    source_path: doc.source_path.clone(),
                    total_chunks,
                    document_last_modified: doc.last_modified,
                },
                hash,
            }
        })
        .collect()
}
