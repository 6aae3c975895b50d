//! Context assembly for the generation step.
//!
//! Turns ranked chunks into a bounded, LLM-ready context bundle. Each
//! included chunk is prefixed with its source document name so the
//! generation step can attribute statements. The overall output is held
//! under a character budget by dropping whole chunks from the tail;
//! a chunk is never split mid-string.
//!
//! When nothing passed the relevance floor the bundle is empty and
//! `has_relevant_context` is false; the caller proceeds without document
//! grounding rather than fabricating context.

use crate::retrieve::ScoredChunk;

/// An assembled, bounded context bundle.
#[derive(Debug, Clone)]
pub struct ContextBundle {
    /// True iff at least one ranked chunk passed the relevance floor.
    pub has_relevant_context: bool,
    /// Concatenated chunk texts with document-name prefixes; empty when
    /// no relevant context exists.
    pub context_text: String,
    /// Names of the source documents that contributed chunks, in first
    /// appearance order, deduplicated.
    pub included_documents: Vec<String>,
    /// Number of ranked candidates that were considered.
    pub total_candidates_considered: usize,
}

/// Assemble the top `max_results` ranked chunks into a context bundle,
/// truncated to `char_budget` characters overall.
pub fn assemble(
    query: &str,
    ranked: &[ScoredChunk],
    max_results: usize,
    char_budget: usize,
) -> ContextBundle {
    let total_candidates_considered = ranked.len();

    if ranked.is_empty() {
        return ContextBundle {
            has_relevant_context: false,
            context_text: String::new(),
            included_documents: Vec::new(),
            total_candidates_considered,
        };
    }

    let mut context_text = String::new();
    let mut context_chars = 0usize;
    let mut included_documents: Vec<String> = Vec::new();

    for sc in ranked.iter().take(max_results) {
        let block = format!("[{}]\n{}", sc.chunk.metadata.document_name, sc.chunk.text);
        let block_chars = block.chars().count();
        let separator_chars = if context_text.is_empty() { 0 } else { 2 };

        if context_chars + separator_chars + block_chars > char_budget {
            // Budget exhausted: drop this and everything after it.
            break;
        }

        if !context_text.is_empty() {
            context_text.push_str("\n\n");
        }
        context_text.push_str(&block);
        context_chars += separator_chars + block_chars;

        let name = &sc.chunk.metadata.document_name;
        if !included_documents.iter().any(|n| n == name) {
            included_documents.push(name.clone());
        }
    }

    tracing::debug!(
        query_chars = query.chars().count(),
        candidates = total_candidates_considered,
        included = included_documents.len(),
        context_chars,
        "assembled retrieval context"
    );

    ContextBundle {
        has_relevant_context: true,
        context_text,
        included_documents,
        total_candidates_considered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Chunk, ChunkMetadata, Embedding};
    use chrono::Utc;

    fn scored(doc_name: &str, index: i64, text: &str, similarity: f32) -> ScoredChunk {
        ScoredChunk {
            chunk: Chunk {
                id: format!("{doc_name}-{index}"),
                team_id: "team-a".to_string(),
                document_id: doc_name.to_string(),
                chunk_index: index,
                text: text.to_string(),
                embedding: Embedding::from_vec(vec![1.0]),
                metadata: ChunkMetadata {
                    document_name: doc_name.to_string(),
                    media_type: "text/plain".to_string(),
                    source_path: format!("/{doc_name}"),
                    total_chunks: 1,
                    document_last_modified: Utc::now(),
                },
                hash: String::new(),
            },
            similarity,
        }
    }

    #[test]
    fn test_empty_ranked_means_no_context() {
        let bundle = assemble("anything", &[], 5, 1000);
        assert!(!bundle.has_relevant_context);
        assert!(bundle.context_text.is_empty());
        assert!(bundle.included_documents.is_empty());
        assert_eq!(bundle.total_candidates_considered, 0);
    }

    #[test]
    fn test_prefixes_with_document_name() {
        let ranked = vec![scored("handbook.md", 0, "Payroll runs on Fridays.", 0.9)];
        let bundle = assemble("payroll", &ranked, 5, 1000);
        assert!(bundle.has_relevant_context);
        assert!(bundle.context_text.starts_with("[handbook.md]\n"));
        assert!(bundle.context_text.contains("Payroll runs on Fridays."));
        assert_eq!(bundle.included_documents, vec!["handbook.md"]);
    }

    #[test]
    fn test_max_results_limits_chunks() {
        let ranked: Vec<ScoredChunk> = (0..6)
            .map(|i| scored("doc.md", i, &format!("chunk {i}"), 0.9))
            .collect();
        let bundle = assemble("q", &ranked, 2, 10_000);
        assert!(bundle.context_text.contains("chunk 0"));
        assert!(bundle.context_text.contains("chunk 1"));
        assert!(!bundle.context_text.contains("chunk 2"));
        assert_eq!(bundle.total_candidates_considered, 6);
    }

    #[test]
    fn test_budget_drops_whole_chunks_from_tail() {
        let ranked = vec![
            scored("a.md", 0, "0123456789", 0.9),
            scored("b.md", 0, "abcdefghij", 0.8),
        ];
        // Budget fits the first block ("[a.md]\n" + 10 = 17 chars) but
        // not the separator plus the second block.
        let bundle = assemble("q", &ranked, 5, 20);
        assert!(bundle.context_text.contains("0123456789"));
        assert!(!bundle.context_text.contains("abcdef"));
        assert!(bundle.context_text.chars().count() <= 20);
        assert_eq!(bundle.included_documents, vec!["a.md"]);
    }

    #[test]
    fn test_budget_never_splits_mid_chunk() {
        let long_text = "x".repeat(500);
        let ranked = vec![
            scored("a.md", 0, "short one", 0.9),
            scored("b.md", 0, &long_text, 0.8),
            scored("c.md", 0, "short two", 0.7),
        ];
        let bundle = assemble("q", &ranked, 5, 60);
        // The 500-char chunk cannot fit whole; nothing after it is taken
        // either; truncation cuts the tail, it does not skip-and-continue.
        assert!(bundle.context_text.contains("short one"));
        assert!(!bundle.context_text.contains("xxx"));
        assert!(!bundle.context_text.contains("short two"));
        assert!(bundle.context_text.chars().count() <= 60);
    }

    #[test]
    fn test_documents_deduplicated_in_order() {
        let ranked = vec![
            scored("a.md", 0, "first", 0.9),
            scored("b.md", 0, "second", 0.8),
            scored("a.md", 1, "third", 0.7),
        ];
        let bundle = assemble("q", &ranked, 5, 10_000);
        assert_eq!(bundle.included_documents, vec!["a.md", "b.md"]);
    }
}
