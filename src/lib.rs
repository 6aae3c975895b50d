//! # Groundwork
//!
//! A retrieval-augmented grounding engine for team document corpora.
//! Documents are chunked into overlapping character windows, embedded
//! via an external provider, and stored per team; queries are answered
//! by ranking the team's chunk pool with cosine similarity and
//! assembling a bounded context bundle for the generation step. A
//! monitoring loop records interaction outcomes and derives success and
//! improvement metrics from the log.
//!
//! ## Pipeline
//!
//! | Stage | Module |
//! |-------|--------|
//! | Chunking | [`chunk`] |
//! | Embedding providers | [`embedding`] |
//! | Storage backends | [`store`], [`sqlite_store`], [`memory_store`] |
//! | Ingestion | [`ingest`] |
//! | Ranking | [`retrieve`] |
//! | Context assembly | [`context`], [`search`] |
//! | Monitoring and learning | [`monitor`], [`learning`] |
//! | Facade | [`engine`] |

pub mod chunk;
pub mod config;
pub mod context;
pub mod db;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod learning;
pub mod memory_store;
pub mod migrate;
pub mod models;
pub mod monitor;
pub mod retrieve;
pub mod search;
pub mod sqlite_store;
pub mod stats;
pub mod store;

pub use engine::Engine;
pub use error::IngestError;
