//! In-memory [`ChunkStore`] implementation.
//!
//! Uses `HashMap` and `Vec` behind `std::sync::RwLock` for thread safety.
//! Replace operations hold the chunk write lock for the whole
//! delete-then-insert sequence, so readers only ever see the old set or
//! the new set. Used in tests and for embedding-free experimentation.

use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;

use crate::models::{Chunk, Document, ProcessingStatus, TeamDocumentStats};
use crate::store::ChunkStore;

/// In-memory store for tests and single-process use.
#[derive(Default)]
pub struct MemoryStore {
    docs: RwLock<HashMap<String, Document>>,
    chunks: RwLock<Vec<Chunk>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChunkStore for MemoryStore {
    async fn upsert_document(&self, doc: &Document) -> Result<String> {
        let mut docs = self.docs.write().unwrap();
        let existing_id = docs
            .values()
            .find(|d| d.team_id == doc.team_id && d.source_id == doc.source_id)
            .map(|d| d.id.clone());

        match existing_id {
            Some(id) => {
                let created_at = docs[&id].created_at;
                let mut updated = doc.clone();
                updated.id = id.clone();
                updated.created_at = created_at;
                updated.updated_at = Utc::now();
                docs.insert(id.clone(), updated);
                Ok(id)
            }
            None => {
                docs.insert(doc.id.clone(), doc.clone());
                Ok(doc.id.clone())
            }
        }
    }

    async fn set_document_status(
        &self,
        document_id: &str,
        status: ProcessingStatus,
    ) -> Result<()> {
        let mut docs = self.docs.write().unwrap();
        if let Some(doc) = docs.get_mut(document_id) {
            doc.status = status;
            doc.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn finalize_document(
        &self,
        document_id: &str,
        chunk_count: i64,
        embedding_count: i64,
    ) -> Result<()> {
        let mut docs = self.docs.write().unwrap();
        if let Some(doc) = docs.get_mut(document_id) {
            doc.status = ProcessingStatus::Completed;
            doc.chunk_count = chunk_count;
            doc.embedding_count = embedding_count;
            doc.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn replace_chunks(&self, document_id: &str, chunks: &[Chunk]) -> Result<()> {
        // Single write guard covers the whole swap.
        let mut stored = self.chunks.write().unwrap();
        stored.retain(|c| c.document_id != document_id);
        stored.extend(chunks.iter().cloned());
        Ok(())
    }

    async fn delete_document_chunks(&self, document_id: &str) -> Result<()> {
        let mut stored = self.chunks.write().unwrap();
        stored.retain(|c| c.document_id != document_id);
        Ok(())
    }

    async fn get_document(&self, document_id: &str) -> Result<Option<Document>> {
        let docs = self.docs.read().unwrap();
        Ok(docs.get(document_id).cloned())
    }

    async fn find_by_source(&self, team_id: &str, source_id: &str) -> Result<Option<Document>> {
        let docs = self.docs.read().unwrap();
        Ok(docs
            .values()
            .find(|d| d.team_id == team_id && d.source_id == source_id)
            .cloned())
    }

    async fn list_documents(&self, team_id: &str) -> Result<Vec<Document>> {
        let docs = self.docs.read().unwrap();
        let mut out: Vec<Document> = docs
            .values()
            .filter(|d| d.team_id == team_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(a.id.cmp(&b.id)));
        Ok(out)
    }

    async fn chunks_by_team(&self, team_id: &str) -> Result<Vec<Chunk>> {
        let stored = self.chunks.read().unwrap();
        Ok(stored
            .iter()
            .filter(|c| c.team_id == team_id)
            .cloned()
            .collect())
    }

    async fn embedding_dims(&self, team_id: &str) -> Result<Option<usize>> {
        let stored = self.chunks.read().unwrap();
        Ok(stored
            .iter()
            .find(|c| c.team_id == team_id)
            .map(|c| c.embedding.dims()))
    }

    async fn delete_document(&self, document_id: &str) -> Result<()> {
        {
            let mut stored = self.chunks.write().unwrap();
            stored.retain(|c| c.document_id != document_id);
        }
        let mut docs = self.docs.write().unwrap();
        docs.remove(document_id);
        Ok(())
    }

    async fn team_stats(&self, team_id: &str) -> Result<TeamDocumentStats> {
        let docs = self.docs.read().unwrap();
        let chunks = self.chunks.read().unwrap();

        let team_docs: Vec<&Document> = docs.values().filter(|d| d.team_id == team_id).collect();
        let chunk_count = chunks.iter().filter(|c| c.team_id == team_id).count() as i64;
        let total_characters = team_docs.iter().map(|d| d.char_length).sum();

        Ok(TeamDocumentStats {
            document_count: team_docs.len() as i64,
            chunk_count,
            total_characters,
        })
    }
}
