//! SQLite index backend
//!
//! Each `add_document` runs in one transaction: the document row, any new
//! terms, the posting upserts and the length update commit or roll back
//! together. Term and document lookups use `INSERT OR IGNORE` followed by a
//! select, so concurrent writers for different documents never create
//! duplicate rows.

use crate::index::schema::{initialize_schema, reset_schema};
use crate::index::{IndexResult, IndexStats, Posting, SearchIndex};
use parking_lot::Mutex;
use rusqlite::{params, Connection, Transaction};
use std::collections::HashMap;
use std::path::Path;

/// Durable index stored in a SQLite database
pub struct SqliteIndex {
    conn: Mutex<Connection>,
}

impl SqliteIndex {
    /// Opens (or creates) the database at `path`
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    /// * `reset` - Drop and recreate the index tables before use
    pub fn open(path: &Path, reset: bool) -> IndexResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        Self::with_connection(conn, reset)
    }

    /// Creates a private in-memory database
    pub fn open_in_memory() -> IndexResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Self::with_connection(conn, false)
    }

    fn with_connection(conn: Connection, reset: bool) -> IndexResult<Self> {
        if reset {
            reset_schema(&conn)?;
            tracing::info!("Reset index tables");
        } else {
            initialize_schema(&conn)?;
        }
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn count(&self, sql: &str) -> IndexResult<usize> {
        let n: i64 = self.conn.lock().query_row(sql, [], |row| row.get(0))?;
        Ok(n as usize)
    }
}

/// Applies one document's aggregated term counts inside `tx`
fn write_document(
    tx: &Transaction<'_>,
    url: &str,
    counts: &HashMap<&str, u64>,
    length: u64,
) -> rusqlite::Result<()> {
    tx.execute(
        "INSERT OR IGNORE INTO documents (url, doc_length) VALUES (?1, 0)",
        params![url],
    )?;
    let doc_id: i64 = tx.query_row(
        "SELECT doc_id FROM documents WHERE url = ?1",
        params![url],
        |row| row.get(0),
    )?;

    let mut insert_term = tx.prepare_cached("INSERT OR IGNORE INTO terms (term) VALUES (?1)")?;
    let mut select_term = tx.prepare_cached("SELECT term_id FROM terms WHERE term = ?1")?;
    let mut upsert_posting = tx.prepare_cached(
        "INSERT INTO frequencies (term_id, doc_id, tf) VALUES (?1, ?2, ?3)
         ON CONFLICT(term_id, doc_id) DO UPDATE SET tf = tf + excluded.tf",
    )?;

    for (term, count) in counts {
        insert_term.execute(params![term])?;
        let term_id: i64 = select_term.query_row(params![term], |row| row.get(0))?;
        upsert_posting.execute(params![term_id, doc_id, *count as i64])?;
    }

    tx.execute(
        "UPDATE documents SET doc_length = doc_length + ?1 WHERE doc_id = ?2",
        params![length as i64, doc_id],
    )?;
    Ok(())
}

impl SearchIndex for SqliteIndex {
    fn add_word(&self, url: &str, term: &str) -> IndexResult<()> {
        self.add_document(url, &[term.to_string()])
    }

    fn add_document(&self, url: &str, terms: &[String]) -> IndexResult<()> {
        let mut counts: HashMap<&str, u64> = HashMap::new();
        let mut length = 0u64;
        for term in terms.iter().filter(|t| !t.is_empty()) {
            *counts.entry(term.as_str()).or_insert(0) += 1;
            length += 1;
        }
        if counts.is_empty() {
            return Ok(());
        }

        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        write_document(&tx, url, &counts, length)?;
        tx.commit()?;
        Ok(())
    }

    fn postings(&self, term: &str) -> IndexResult<Vec<Posting>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT d.url, f.tf, d.doc_length
             FROM terms t
             JOIN frequencies f ON f.term_id = t.term_id
             JOIN documents d ON d.doc_id = f.doc_id
             WHERE t.term = ?1",
        )?;

        let postings = stmt
            .query_map(params![term], |row| {
                Ok(Posting {
                    url: row.get(0)?,
                    count: row.get::<_, i64>(1)? as u64,
                    doc_length: row.get::<_, i64>(2)? as u64,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(postings)
    }

    fn total_docs(&self) -> IndexResult<usize> {
        self.count("SELECT COUNT(*) FROM documents WHERE doc_length > 0")
    }

    fn stats(&self) -> IndexResult<IndexStats> {
        Ok(IndexStats {
            documents: self.total_docs()?,
            terms: self.count("SELECT COUNT(*) FROM terms")?,
            postings: self.count("SELECT COUNT(*) FROM frequencies")?,
        })
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    fn terms(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_create_in_memory() {
        let index = SqliteIndex::open_in_memory().unwrap();
        assert_eq!(index.total_docs().unwrap(), 0);
    }

    #[test]
    fn test_index_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("index.db");

        {
            let index = SqliteIndex::open(&path, false).unwrap();
            index.add_document("https://x.org/", &terms(&["kept", "kept"])).unwrap();
        }

        let index = SqliteIndex::open(&path, false).unwrap();
        assert_eq!(index.total_docs().unwrap(), 1);
        assert_eq!(index.postings("kept").unwrap()[0].count, 2);
    }

    #[test]
    fn test_reset_on_open_drops_data() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("index.db");

        {
            let index = SqliteIndex::open(&path, false).unwrap();
            index.add_document("https://x.org/", &terms(&["gone"])).unwrap();
        }

        let index = SqliteIndex::open(&path, true).unwrap();
        assert_eq!(index.total_docs().unwrap(), 0);
        assert!(index.postings("gone").unwrap().is_empty());
    }

    #[test]
    fn test_failed_document_rolls_back() {
        let index = SqliteIndex::open_in_memory().unwrap();
        index
            .conn
            .lock()
            .execute_batch(
                "CREATE TRIGGER reject_poison BEFORE INSERT ON terms
                 WHEN NEW.term = 'poison'
                 BEGIN SELECT RAISE(ABORT, 'poisoned term'); END;",
            )
            .unwrap();

        let result = index.add_document("https://x.org/bad", &terms(&["good", "poison", "good"]));
        assert!(result.is_err());

        assert_eq!(index.total_docs().unwrap(), 0);
        assert!(index.postings("good").unwrap().is_empty());
        let documents: i64 = index
            .conn
            .lock()
            .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))
            .unwrap();
        assert_eq!(documents, 0);

        // the index stays usable afterwards
        index.add_document("https://x.org/ok", &terms(&["good"])).unwrap();
        assert_eq!(index.total_docs().unwrap(), 1);
    }

    #[test]
    fn test_concurrent_documents_share_terms() {
        let dir = TempDir::new().unwrap();
        let index = Arc::new(SqliteIndex::open(&dir.path().join("index.db"), false).unwrap());

        let handles: Vec<_> = (0..6)
            .map(|i| {
                let index = Arc::clone(&index);
                thread::spawn(move || {
                    let url = format!("https://x.org/{}", i);
                    index
                        .add_document(&url, &terms(&["common", "common", "rare"]))
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let stats = index.stats().unwrap();
        assert_eq!(stats.documents, 6);
        assert_eq!(stats.terms, 2);
        assert_eq!(stats.postings, 12);

        let common = index.postings("common").unwrap();
        assert!(common.iter().all(|p| p.count == 2 && p.doc_length == 3));
    }
}
