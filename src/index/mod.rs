//! Inverted index with TF-IDF scoring
//!
//! This module turns extracted words into stemmed terms and stores them in one
//! of two interchangeable backends:
//! - `MemoryIndex`: volatile maps behind a read/write lock
//! - `SqliteIndex`: a transactional SQLite store that survives restarts
//!
//! Both implement [`SearchIndex`]. Backends store terms exactly as given (the
//! [`Analyzer`] stems them once, before indexing) and only expose raw postings;
//! ranking is shared in [`tfidf`].

mod analyzer;
mod memory;
mod schema;
mod sqlite;
mod stopwords;
pub mod tfidf;

pub use analyzer::{stem_query, Analyzer};
pub use memory::MemoryIndex;
pub use sqlite::SqliteIndex;
pub use stopwords::{builtin_stopwords, load_stopwords, parse_stopwords, BUILTIN_STOPWORDS};

use crate::config::{IndexBackend, IndexConfig};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during index operations
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Failed to read stopwords from {path}: {source}")]
    Stopwords {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("The sqlite backend needs a database path")]
    MissingDatabasePath,
}

/// Result type for index operations
pub type IndexResult<T> = Result<T, IndexError>;

/// One (term, document) occurrence record, joined with the document's length
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posting {
    pub url: String,
    pub count: u64,
    pub doc_length: u64,
}

/// A ranked search result
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub url: String,
    pub tf: f64,
    pub idf: f64,
    pub score: f64,
}

/// Size of an index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndexStats {
    pub documents: usize,
    pub terms: usize,
    pub postings: usize,
}

/// Trait for index backend implementations
///
/// Methods take `&self`; each backend guards its own state so the crawl can
/// share one index across tasks. Every document-level mutation is applied
/// atomically: either all of a document's term counts and its length change,
/// or none do.
pub trait SearchIndex: Send + Sync {
    /// Records one occurrence of an (already analyzed) term in a document
    ///
    /// The document is registered on its first posting.
    fn add_word(&self, url: &str, term: &str) -> IndexResult<()>;

    /// Records every term occurrence of a document in one atomic step
    ///
    /// The document counter increases only the first time a URL gets a
    /// posting; calling this with no terms leaves the index untouched. Empty
    /// terms are skipped.
    fn add_document(&self, url: &str, terms: &[String]) -> IndexResult<()>;

    /// Raw postings for a stored term
    fn postings(&self, term: &str) -> IndexResult<Vec<Posting>>;

    /// Number of documents with at least one posting
    fn total_docs(&self) -> IndexResult<usize>;

    fn stats(&self) -> IndexResult<IndexStats>;

    /// Short backend name for logs
    fn backend_name(&self) -> &'static str;

    /// Ranks documents by term frequency alone
    fn search(&self, query: &str) -> IndexResult<Vec<SearchHit>> {
        match stem_query(query) {
            Some(term) => Ok(tfidf::tf_hits(&self.postings(&term)?)),
            None => Ok(Vec::new()),
        }
    }

    /// Ranks documents by TF-IDF for a single query term
    ///
    /// Blank queries, unknown terms and an empty corpus all yield no hits.
    fn tfidf(&self, query: &str) -> IndexResult<Vec<SearchHit>> {
        let Some(term) = stem_query(query) else {
            return Ok(Vec::new());
        };
        let postings = self.postings(&term)?;
        if postings.is_empty() {
            return Ok(Vec::new());
        }
        Ok(tfidf::compute_tfidf(&postings, self.total_docs()?))
    }
}

/// Opens the backend selected by the configuration
///
/// # Example
///
/// ```
/// use sumi_seek::config::IndexConfig;
/// use sumi_seek::index::open_index;
///
/// let index = open_index(&IndexConfig::default()).unwrap();
/// assert_eq!(index.backend_name(), "memory");
/// ```
pub fn open_index(config: &IndexConfig) -> IndexResult<Arc<dyn SearchIndex>> {
    let index: Arc<dyn SearchIndex> = match config.backend {
        IndexBackend::Memory => Arc::new(MemoryIndex::new()),
        IndexBackend::Sqlite => {
            if config.database_path.trim().is_empty() {
                return Err(IndexError::MissingDatabasePath);
            }
            Arc::new(SqliteIndex::open(Path::new(&config.database_path), config.reset)?)
        }
    };

    tracing::info!("Opened {} index", index.backend_name());
    Ok(index)
}
