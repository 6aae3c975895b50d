//! Query-time retrieval: embed the query, rank the team's chunk pool,
//! assemble the bounded context bundle.
//!
//! Retrieval failures are non-fatal. If the query cannot be embedded
//! (provider outage, retries exhausted) the caller still gets a bundle,
//! just an ungrounded one with `has_relevant_context == false`. The
//! generation step then answers without document grounding instead of
//! the whole request failing.

use crate::config::Config;
use crate::context::{assemble, ContextBundle};
use crate::embedding::EmbeddingProvider;
use crate::retrieve::rank_chunks;
use crate::store::ChunkStore;

/// Build the retrieval context for one query against a team's corpus.
///
/// `max_results` overrides the configured cap when given; the relevance
/// floor and character budget always come from config.
pub async fn create_context(
    store: &dyn ChunkStore,
    provider: &dyn EmbeddingProvider,
    config: &Config,
    team_id: &str,
    query: &str,
    max_results: Option<usize>,
) -> anyhow::Result<ContextBundle> {
    let k = max_results.unwrap_or(config.retrieval.max_results);

    let query_vec = match provider.embed(query).await {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(
                team = team_id,
                error = %e,
                "query embedding failed, answering without document context"
            );
            return Ok(ContextBundle {
                has_relevant_context: false,
                context_text: String::new(),
                included_documents: Vec::new(),
                total_candidates_considered: 0,
            });
        }
    };

    let candidates = store.chunks_by_team(team_id).await?;
    let pool_size = candidates.len();

    let ranked = rank_chunks(
        query_vec.as_slice(),
        candidates,
        k,
        config.retrieval.min_similarity,
    );

    tracing::debug!(
        team = team_id,
        pool = pool_size,
        passed_floor = ranked.len(),
        "ranked retrieval candidates"
    );

    Ok(assemble(query, &ranked, k, config.context.char_budget))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ChunkingConfig, Config, ContextConfig, DbConfig, EmbeddingConfig,
        MonitorConfig, RetrievalConfig};
    use crate::memory_store::MemoryStore;
    use crate::models::{Chunk, ChunkMetadata, Document, Embedding, ProcessingStatus};
    use anyhow::Result;
    use async_trait::async_trait;
    use chrono::Utc;

    fn test_config(min_similarity: f32) -> Config {
        Config {
            db: DbConfig {
                path: "unused.sqlite".into(),
            },
            chunking: ChunkingConfig {
                target_chars: 200,
                overlap_chars: 50,
                min_document_chars: 50,
            },
            retrieval: RetrievalConfig {
                min_similarity,
                max_results: 5,
            },
            context: ContextConfig::default(),
            embedding: EmbeddingConfig::default(),
            monitor: MonitorConfig::default(),
        }
    }

    struct FixedProvider {
        vector: Vec<f32>,
        fail: bool,
    }

    #[async_trait]
    impl EmbeddingProvider for FixedProvider {
        fn model_name(&self) -> &str {
            "fixed"
        }
        fn dims(&self) -> usize {
            self.vector.len()
        }
        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
            if self.fail {
                anyhow::bail!("provider unavailable");
            }
            Ok(texts
                .iter()
                .map(|_| Embedding::from_vec(self.vector.clone()))
                .collect())
        }
    }

    async fn seed_chunk(store: &MemoryStore, doc_id: &str, index: i64, vector: Vec<f32>) {
        let now = Utc::now();
        let doc = Document {
            id: doc_id.to_string(),
            team_id: "team-a".to_string(),
            name: format!("{doc_id}.txt"),
            media_type: "text/plain".to_string(),
            source_path: format!("shared/{doc_id}.txt"),
            source_id: doc_id.to_string(),
            char_length: 100,
            chunk_count: 1,
            embedding_count: 1,
            status: ProcessingStatus::Completed,
            last_modified: now,
            created_at: now,
            updated_at: now,
        };
        store.upsert_document(&doc).await.unwrap();
        let chunk = Chunk {
            id: format!("{doc_id}-{index}"),
            team_id: "team-a".to_string(),
            document_id: doc_id.to_string(),
            chunk_index: index,
            text: format!("content of {doc_id} chunk {index}"),
            embedding: Embedding::from_vec(vector),
            metadata: ChunkMetadata {
                document_name: format!("{doc_id}.txt"),
                media_type: "text/plain".to_string(),
                source_path: format!("shared/{doc_id}.txt"),
                total_chunks: 1,
                document_last_modified: now,
            },
            hash: String::new(),
        };
        store.replace_chunks(doc_id, &[chunk]).await.unwrap();
    }

    #[tokio::test]
    async fn test_returns_relevant_context() {
        let store = MemoryStore::new();
        seed_chunk(&store, "match", 0, vec![1.0, 0.0]).await;
        seed_chunk(&store, "other", 0, vec![0.0, 1.0]).await;

        let provider = FixedProvider {
            vector: vec![1.0, 0.0],
            fail: false,
        };
        let bundle = create_context(
            &store,
            &provider,
            &test_config(0.5),
            "team-a",
            "what is in match?",
            None,
        )
        .await
        .unwrap();

        assert!(bundle.has_relevant_context);
        assert!(bundle.context_text.contains("content of match"));
        assert!(!bundle.context_text.contains("content of other"));
        assert_eq!(bundle.included_documents, vec!["match.txt"]);
    }

    #[tokio::test]
    async fn test_nothing_above_floor_means_no_context() {
        let store = MemoryStore::new();
        seed_chunk(&store, "other", 0, vec![0.0, 1.0]).await;

        let provider = FixedProvider {
            vector: vec![1.0, 0.0],
            fail: false,
        };
        let bundle = create_context(&store, &provider, &test_config(0.5), "team-a", "q", None)
            .await
            .unwrap();

        assert!(!bundle.has_relevant_context);
        assert!(bundle.context_text.is_empty());
    }

    #[tokio::test]
    async fn test_embed_failure_degrades_gracefully() {
        let store = MemoryStore::new();
        seed_chunk(&store, "match", 0, vec![1.0, 0.0]).await;

        let provider = FixedProvider {
            vector: vec![1.0, 0.0],
            fail: true,
        };
        let bundle = create_context(&store, &provider, &test_config(0.5), "team-a", "q", None)
            .await
            .unwrap();

        assert!(!bundle.has_relevant_context);
        assert!(bundle.context_text.is_empty());
        assert!(bundle.included_documents.is_empty());
    }

    #[tokio::test]
    async fn test_max_results_override() {
        let store = MemoryStore::new();
        for i in 0..4 {
            seed_chunk(&store, &format!("doc{i}"), 0, vec![1.0, 0.0]).await;
        }

        let provider = FixedProvider {
            vector: vec![1.0, 0.0],
            fail: false,
        };
        let bundle = create_context(
            &store,
            &provider,
            &test_config(0.5),
            "team-a",
            "q",
            Some(2),
        )
        .await
        .unwrap();

        assert_eq!(bundle.included_documents.len(), 2);
    }

    #[tokio::test]
    async fn test_team_isolation() {
        let store = MemoryStore::new();
        seed_chunk(&store, "match", 0, vec![1.0, 0.0]).await;

        let provider = FixedProvider {
            vector: vec![1.0, 0.0],
            fail: false,
        };
        let bundle = create_context(&store, &provider, &test_config(0.5), "team-b", "q", None)
            .await
            .unwrap();

        assert!(!bundle.has_relevant_context);
    }
}
