//! Corpus statistics and health overview.
//!
//! Provides a quick summary of what's indexed: document counts, chunk
//! counts, status breakdowns, and per-team totals. Used by `gw stats` to
//! give confidence that ingestion is working as expected.

use anyhow::Result;
use sqlx::Row;

use crate::config::Config;
use crate::db;

/// Per-team breakdown of document and chunk counts.
struct TeamStats {
    team_id: String,
    doc_count: i64,
    completed_count: i64,
    failed_count: i64,
    chunk_count: i64,
    total_chars: i64,
}

/// Run the stats command: query the database and print a summary.
pub async fn run_stats(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;

    let total_docs: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents")
        .fetch_one(&pool)
        .await?;

    let total_chunks: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chunks")
        .fetch_one(&pool)
        .await?;

    let completed_docs: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM documents WHERE status = 'completed'")
            .fetch_one(&pool)
            .await?;

    let db_size = std::fs::metadata(&config.db.path)
        .map(|m| m.len())
        .unwrap_or(0);

    println!("Groundwork — Corpus Stats");
    println!("=========================");
    println!();
    println!("  Database:    {}", config.db.path.display());
    println!("  Size:        {}", format_bytes(db_size));
    println!();
    println!("  Documents:   {}", total_docs);
    println!(
        "  Completed:   {} / {} ({}%)",
        completed_docs,
        total_docs,
        if total_docs > 0 {
            (completed_docs * 100) / total_docs
        } else {
            0
        }
    );
    println!("  Chunks:      {}", total_chunks);

    let team_rows = sqlx::query(
        r#"
        SELECT
            d.team_id,
            COUNT(*) AS doc_count,
            SUM(CASE WHEN d.status = 'completed' THEN 1 ELSE 0 END) AS completed_count,
            SUM(CASE WHEN d.status = 'failed' THEN 1 ELSE 0 END) AS failed_count,
            (SELECT COUNT(*) FROM chunks c WHERE c.team_id = d.team_id) AS chunk_count,
            SUM(d.char_length) AS total_chars
        FROM documents d
        GROUP BY d.team_id
        ORDER BY doc_count DESC
        "#,
    )
    .fetch_all(&pool)
    .await?;

    let team_stats: Vec<TeamStats> = team_rows
        .iter()
        .map(|row| TeamStats {
            team_id: row.get("team_id"),
            doc_count: row.get("doc_count"),
            completed_count: row.get("completed_count"),
            failed_count: row.get("failed_count"),
            chunk_count: row.get("chunk_count"),
            total_chars: row.get("total_chars"),
        })
        .collect();

    if !team_stats.is_empty() {
        println!();
        println!("  By team:");
        println!(
            "  {:<24} {:>6} {:>10} {:>7} {:>8} {:>12}",
            "TEAM", "DOCS", "COMPLETED", "FAILED", "CHUNKS", "CHARS"
        );
        println!("  {}", "-".repeat(72));

        for t in &team_stats {
            println!(
                "  {:<24} {:>6} {:>10} {:>7} {:>8} {:>12}",
                t.team_id,
                t.doc_count,
                t.completed_count,
                t.failed_count,
                t.chunk_count,
                t.total_chars
            );
        }
    }

    println!();

    pool.close().await;
    Ok(())
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
    }
}
