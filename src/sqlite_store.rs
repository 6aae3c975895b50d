//! SQLite-backed [`ChunkStore`] implementation.
//!
//! Maps each [`ChunkStore`] operation onto the schema created by
//! [`crate::migrate`]. `replace_chunks` runs as a single transaction, so
//! readers see either the old chunk set or the new one, never a mix.
//! Embedding vectors are stored as little-endian f32 BLOBs; the chunk
//! metadata snapshot is stored as JSON.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

use crate::embedding::{blob_to_vec, vec_to_blob};
use crate::models::{
    Chunk, ChunkMetadata, Document, Embedding, ProcessingStatus, TeamDocumentStats,
};
use crate::store::ChunkStore;

/// SQLite implementation of the [`ChunkStore`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn ts(dt: DateTime<Utc>) -> i64 {
    dt.timestamp()
}

fn from_ts(ts: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(ts, 0).unwrap_or_default()
}

fn document_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Document> {
    let status_str: String = row.get("status");
    let status = ProcessingStatus::parse(&status_str)
        .ok_or_else(|| anyhow!("unknown document status in store: {}", status_str))?;

    Ok(Document {
        id: row.get("id"),
        team_id: row.get("team_id"),
        name: row.get("name"),
        media_type: row.get("media_type"),
        source_path: row.get("source_path"),
        source_id: row.get("source_id"),
        char_length: row.get("char_length"),
        chunk_count: row.get("chunk_count"),
        embedding_count: row.get("embedding_count"),
        status,
        last_modified: from_ts(row.get("last_modified")),
        created_at: from_ts(row.get("created_at")),
        updated_at: from_ts(row.get("updated_at")),
    })
}

fn chunk_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Chunk> {
    let blob: Vec<u8> = row.get("embedding");
    let metadata_json: String = row.get("metadata_json");
    let metadata: ChunkMetadata = serde_json::from_str(&metadata_json)?;

    Ok(Chunk {
        id: row.get("id"),
        team_id: row.get("team_id"),
        document_id: row.get("document_id"),
        chunk_index: row.get("chunk_index"),
        text: row.get("text"),
        embedding: Embedding::from_vec(blob_to_vec(&blob)),
        metadata,
        hash: row.get("hash"),
    })
}

const SELECT_DOCUMENT: &str = "SELECT id, team_id, name, media_type, source_path, source_id, \
     char_length, chunk_count, embedding_count, status, last_modified, created_at, updated_at \
     FROM documents";

const SELECT_CHUNK: &str = "SELECT id, team_id, document_id, chunk_index, text, embedding, \
     metadata_json, hash FROM chunks";

#[async_trait]
impl ChunkStore for SqliteStore {
    async fn upsert_document(&self, doc: &Document) -> Result<String> {
        // Keep the existing id and created_at when re-processing the
        // same source: update-in-place, never duplicate.
        let existing_id: Option<String> =
            sqlx::query_scalar("SELECT id FROM documents WHERE team_id = ? AND source_id = ?")
                .bind(&doc.team_id)
                .bind(&doc.source_id)
                .fetch_optional(&self.pool)
                .await?;

        let doc_id = existing_id.unwrap_or_else(|| doc.id.clone());

        sqlx::query(
            r#"
            INSERT INTO documents (id, team_id, name, media_type, source_path, source_id,
                                   char_length, chunk_count, embedding_count, status,
                                   last_modified, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(team_id, source_id) DO UPDATE SET
                name = excluded.name,
                media_type = excluded.media_type,
                source_path = excluded.source_path,
                char_length = excluded.char_length,
                status = excluded.status,
                last_modified = excluded.last_modified,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&doc_id)
        .bind(&doc.team_id)
        .bind(&doc.name)
        .bind(&doc.media_type)
        .bind(&doc.source_path)
        .bind(&doc.source_id)
        .bind(doc.char_length)
        .bind(doc.chunk_count)
        .bind(doc.embedding_count)
        .bind(doc.status.as_str())
        .bind(ts(doc.last_modified))
        .bind(ts(doc.created_at))
        .bind(ts(doc.updated_at))
        .execute(&self.pool)
        .await?;

        Ok(doc_id)
    }

    async fn set_document_status(
        &self,
        document_id: &str,
        status: ProcessingStatus,
    ) -> Result<()> {
        sqlx::query("UPDATE documents SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(Utc::now().timestamp())
            .bind(document_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn finalize_document(
        &self,
        document_id: &str,
        chunk_count: i64,
        embedding_count: i64,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE documents SET status = ?, chunk_count = ?, embedding_count = ?, updated_at = ? \
             WHERE id = ?",
        )
        .bind(ProcessingStatus::Completed.as_str())
        .bind(chunk_count)
        .bind(embedding_count)
        .bind(Utc::now().timestamp())
        .bind(document_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn replace_chunks(&self, document_id: &str, chunks: &[Chunk]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM chunks WHERE document_id = ?")
            .bind(document_id)
            .execute(&mut *tx)
            .await?;

        for chunk in chunks {
            let blob = vec_to_blob(chunk.embedding.as_slice());
            let metadata_json = serde_json::to_string(&chunk.metadata)?;

            sqlx::query(
                "INSERT INTO chunks (id, team_id, document_id, chunk_index, text, embedding, \
                 metadata_json, hash) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&chunk.id)
            .bind(&chunk.team_id)
            .bind(&chunk.document_id)
            .bind(chunk.chunk_index)
            .bind(&chunk.text)
            .bind(&blob)
            .bind(&metadata_json)
            .bind(&chunk.hash)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete_document_chunks(&self, document_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM chunks WHERE document_id = ?")
            .bind(document_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_document(&self, document_id: &str) -> Result<Option<Document>> {
        let row = sqlx::query(&format!("{SELECT_DOCUMENT} WHERE id = ?"))
            .bind(document_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(document_from_row).transpose()
    }

    async fn find_by_source(&self, team_id: &str, source_id: &str) -> Result<Option<Document>> {
        let row = sqlx::query(&format!(
            "{SELECT_DOCUMENT} WHERE team_id = ? AND source_id = ?"
        ))
        .bind(team_id)
        .bind(source_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(document_from_row).transpose()
    }

    async fn list_documents(&self, team_id: &str) -> Result<Vec<Document>> {
        let rows = sqlx::query(&format!(
            "{SELECT_DOCUMENT} WHERE team_id = ? ORDER BY updated_at DESC, id ASC"
        ))
        .bind(team_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(document_from_row).collect()
    }

    async fn chunks_by_team(&self, team_id: &str) -> Result<Vec<Chunk>> {
        let rows = sqlx::query(&format!(
            "{SELECT_CHUNK} WHERE team_id = ? ORDER BY document_id ASC, chunk_index ASC"
        ))
        .bind(team_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(chunk_from_row).collect()
    }

    async fn embedding_dims(&self, team_id: &str) -> Result<Option<usize>> {
        let blob: Option<Vec<u8>> =
            sqlx::query_scalar("SELECT embedding FROM chunks WHERE team_id = ? LIMIT 1")
                .bind(team_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(blob.map(|b| b.len() / 4))
    }

    async fn delete_document(&self, document_id: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM chunks WHERE document_id = ?")
            .bind(document_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM documents WHERE id = ?")
            .bind(document_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn team_stats(&self, team_id: &str) -> Result<TeamDocumentStats> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS doc_count, COALESCE(SUM(char_length), 0) AS total_chars \
             FROM documents WHERE team_id = ?",
        )
        .bind(team_id)
        .fetch_one(&self.pool)
        .await?;

        let chunk_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM chunks WHERE team_id = ?")
                .bind(team_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(TeamDocumentStats {
            document_count: row.get("doc_count"),
            chunk_count,
            total_characters: row.get("total_chars"),
        })
    }
}
