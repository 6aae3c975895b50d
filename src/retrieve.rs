//! Similarity ranking over a team's chunk pool.
//!
//! Exact nearest-neighbor retrieval via a linear cosine scan over every
//! candidate chunk. Corpora are hundreds to low thousands of chunks per
//! team, so no approximate index is involved.
//!
//! Ordering is fully specified: similarity descending, ties broken by
//! ascending chunk index, then by document id. Repeated queries over
//! the same pool always return the same sequence.

use crate::embedding::cosine_similarity;
use crate::models::Chunk;

/// A candidate chunk paired with its similarity to the query.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub similarity: f32,
}

/// Rank `candidates` against `query_vec` and return at most `k` chunks
/// with `similarity >= min_similarity`, best first.
///
/// A zero-norm vector (query or candidate) scores 0.0 rather than
/// dividing by zero; dimension-mismatched candidates also score 0.0 and
/// therefore fall below any positive floor.
pub fn rank_chunks(
    query_vec: &[f32],
    candidates: Vec<Chunk>,
    k: usize,
    min_similarity: f32,
) -> Vec<ScoredChunk> {
    let mut scored: Vec<ScoredChunk> = candidates
        .into_iter()
        .map(|chunk| {
            let similarity = cosine_similarity(query_vec, chunk.embedding.as_slice());
            ScoredChunk { chunk, similarity }
        })
        .filter(|sc| sc.similarity >= min_similarity)
        .collect();

    scored.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.chunk.chunk_index.cmp(&b.chunk.chunk_index))
            .then(a.chunk.document_id.cmp(&b.chunk.document_id))
    });
    scored.truncate(k);
    scored
}
