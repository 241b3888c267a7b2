//! In-memory index backend

use crate::index::{IndexResult, IndexStats, Posting, SearchIndex};
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Debug, Default)]
struct Inner {
    /// term -> url -> occurrence count
    postings: HashMap<String, HashMap<String, u64>>,
    /// url -> number of indexed terms
    doc_lengths: HashMap<String, u64>,
    /// documents with at least one posting
    doc_count: usize,
}

impl Inner {
    fn add_word(&mut self, url: &str, term: &str) {
        if term.is_empty() {
            return;
        }

        match self.doc_lengths.get_mut(url) {
            Some(length) => *length += 1,
            None => {
                self.doc_count += 1;
                self.doc_lengths.insert(url.to_string(), 1);
            }
        }

        *self
            .postings
            .entry(term.to_string())
            .or_default()
            .entry(url.to_string())
            .or_insert(0) += 1;
    }
}

/// Volatile index held in process memory
///
/// A single write lock covers the whole of `add_document`, so readers never
/// see a document half-indexed.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    inner: RwLock<Inner>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SearchIndex for MemoryIndex {
    fn add_word(&self, url: &str, term: &str) -> IndexResult<()> {
        self.inner.write().add_word(url, term);
        Ok(())
    }

    fn add_document(&self, url: &str, terms: &[String]) -> IndexResult<()> {
        let mut inner = self.inner.write();
        for term in terms {
            inner.add_word(url, term);
        }
        Ok(())
    }

    fn postings(&self, term: &str) -> IndexResult<Vec<Posting>> {
        let inner = self.inner.read();
        let Some(docs) = inner.postings.get(term) else {
            return Ok(Vec::new());
        };

        Ok(docs
            .iter()
            .map(|(url, count)| Posting {
                url: url.clone(),
                count: *count,
                doc_length: inner.doc_lengths.get(url).copied().unwrap_or(0),
            })
            .collect())
    }

    fn total_docs(&self) -> IndexResult<usize> {
        Ok(self.inner.read().doc_count)
    }

    fn stats(&self) -> IndexResult<IndexStats> {
        let inner = self.inner.read();
        Ok(IndexStats {
            documents: inner.doc_count,
            terms: inner.postings.len(),
            postings: inner.postings.values().map(HashMap::len).sum(),
        })
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
