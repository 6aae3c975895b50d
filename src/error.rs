//! Error taxonomy for the ingestion and retrieval pipeline.
//!
//! Ingestion errors carry enough detail for the caller to decide whether
//! to retry. Retrieval-time failures are deliberately not represented
//! here: a query that cannot be embedded degrades to "no relevant
//! context" inside [`crate::search`] instead of surfacing an error.

use thiserror::Error;

/// Errors that can end a document-processing operation.
#[derive(Error, Debug)]
pub enum IngestError {
    /// Input text is below the minimum viable length. Non-fatal: no
    /// document is created and the caller is informed.
    #[error("extracted text too short: {length} chars (minimum {minimum})")]
    ExtractionTooShort { length: usize, minimum: usize },

    /// An embedding vector's size is inconsistent with the stored corpus
    /// for the same team. Fatal for this ingestion; vectors are never
    /// truncated or padded to fit.
    #[error("embedding dimension mismatch: got {actual}, corpus uses {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// External embedding calls exhausted their retries. The document is
    /// marked `failed` and no partial chunk set is stored.
    #[error("embedding failed after retries: {0}")]
    EmbeddingFailed(String),

    /// The persistence adapter failed during a chunk replace. The
    /// document is marked `failed` and no partial chunk set is retained.
    #[error("store write failed: {0}")]
    StoreWriteFailed(String),

    /// Anything else (configuration, I/O) wrapped for propagation.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl IngestError {
    /// True when re-submitting the same document may succeed without any
    /// change to the input (transient external failures).
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            IngestError::EmbeddingFailed(_) | IngestError::StoreWriteFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_detail() {
        let err = IngestError::DimensionMismatch {
            expected: 1536,
            actual: 768,
        };
        assert!(err.to_string().contains("1536"));
        assert!(err.to_string().contains("768"));
    }

    #[test]
    fn test_retryable_classification() {
        assert!(IngestError::EmbeddingFailed("429".into()).is_retryable());
        assert!(IngestError::StoreWriteFailed("disk".into()).is_retryable());
        assert!(!IngestError::ExtractionTooShort {
            length: 30,
            minimum: 50
        }
        .is_retryable());
    }
}
