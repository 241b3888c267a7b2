//! Database schema for the persistent index

/// SQL schema for the index tables
pub const SCHEMA_SQL: &str = r#"
-- One row per indexed page
CREATE TABLE IF NOT EXISTS documents (
    doc_id INTEGER PRIMARY KEY,
    url TEXT NOT NULL UNIQUE,
    doc_length INTEGER NOT NULL DEFAULT 0
);

-- Interned stemmed terms
CREATE TABLE IF NOT EXISTS terms (
    term_id INTEGER PRIMARY KEY,
    term TEXT NOT NULL UNIQUE
);

-- Postings: occurrence count of a term in a document
CREATE TABLE IF NOT EXISTS frequencies (
    freq_id INTEGER PRIMARY KEY,
    term_id INTEGER NOT NULL REFERENCES terms(term_id),
    doc_id INTEGER NOT NULL REFERENCES documents(doc_id),
    tf INTEGER NOT NULL,
    UNIQUE(term_id, doc_id)
);

CREATE INDEX IF NOT EXISTS idx_frequencies_doc ON frequencies(doc_id);
"#;

/// Drops the index tables, children first
pub const DROP_SQL: &str = r#"
DROP TABLE IF EXISTS frequencies;
DROP TABLE IF EXISTS terms;
DROP TABLE IF EXISTS documents;
"#;

/// Creates any missing index tables
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

/// Drops and recreates the index tables
pub fn reset_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(DROP_SQL)?;
    initialize_schema(conn)
}
