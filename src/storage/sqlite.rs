//! Embedded SQLite backend with full-text search (§4.G).
use std::path::Path;

use chrono::Utc;
use rusqlite::Connection;

use crate::entry::Entry;
use crate::error::StorageError;
use crate::logger::debug;

use super::backend::{Backend, BackendStatistics};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS entries (
    key TEXT PRIMARY KEY,
    type TEXT NOT NULL,
    data_json TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_entries_type ON entries(type);
CREATE INDEX IF NOT EXISTS idx_entries_updated_at ON entries(updated_at);

CREATE VIRTUAL TABLE IF NOT EXISTS entries_fts USING fts5(
    key, title, author, abstract, keywords,
    content='entries', content_rowid='rowid'
);

CREATE TRIGGER IF NOT EXISTS entries_ai AFTER INSERT ON entries BEGIN
    INSERT INTO entries_fts(rowid, key, title, author, abstract, keywords)
    VALUES (
        new.rowid, new.key,
        json_extract(new.data_json, '$.fields.title'),
        json_extract(new.data_json, '$.fields.author'),
        json_extract(new.data_json, '$.fields.abstract_'),
        (SELECT group_concat(value, ' ') FROM json_each(new.data_json, '$.fields.keywords'))
    );
END;

CREATE TRIGGER IF NOT EXISTS entries_ad AFTER DELETE ON entries BEGIN
    INSERT INTO entries_fts(entries_fts, rowid, key, title, author, abstract, keywords)
    VALUES (
        'delete', old.rowid, old.key,
        json_extract(old.data_json, '$.fields.title'),
        json_extract(old.data_json, '$.fields.author'),
        json_extract(old.data_json, '$.fields.abstract_'),
        (SELECT group_concat(value, ' ') FROM json_each(old.data_json, '$.fields.keywords'))
    );
END;

CREATE TRIGGER IF NOT EXISTS entries_au AFTER UPDATE ON entries BEGIN
    INSERT INTO entries_fts(entries_fts, rowid, key, title, author, abstract, keywords)
    VALUES (
        'delete', old.rowid, old.key,
        json_extract(old.data_json, '$.fields.title'),
        json_extract(old.data_json, '$.fields.author'),
        json_extract(old.data_json, '$.fields.abstract_'),
        (SELECT group_concat(value, ' ') FROM json_each(old.data_json, '$.fields.keywords'))
    );
    INSERT INTO entries_fts(rowid, key, title, author, abstract, keywords)
    VALUES (
        new.rowid, new.key,
        json_extract(new.data_json, '$.fields.title'),
        json_extract(new.data_json, '$.fields.author'),
        json_extract(new.data_json, '$.fields.abstract_'),
        (SELECT group_concat(value, ' ') FROM json_each(new.data_json, '$.fields.keywords'))
    );
END;
";

/// A single-writer, WAL-mode SQLite backend (§4.G). Concurrent readers are supported via
/// WAL mode; this process holds one [`Connection`], matching the single-writer model in §5.
pub struct SqliteBackend {
    conn: Connection,
    tx_depth: u32,
}

impl SqliteBackend {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        Ok(Self { conn, tx_depth: 0 })
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn, tx_depth: 0 })
    }

    /// Full-text search over title/author/abstract/keywords, ordered by FTS5's built-in
    /// relevance rank (§4.G "Full text search").
    pub fn search(&self, query: &str) -> Result<Vec<String>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM entries_fts WHERE entries_fts MATCH ?1 ORDER BY rank")?;
        let rows = stmt.query_map([query], |row| row.get::<_, String>(0))?;
        let mut keys = Vec::new();
        for row in rows {
            keys.push(row?);
        }
        Ok(keys)
    }

    /// Exact-match filters on type/year, with `author` matched by substring (§4.G
    /// "Structured query helper").
    pub fn query_exact(
        &self,
        entry_type: Option<&str>,
        year: Option<i32>,
        author_contains: Option<&str>,
    ) -> Result<Vec<String>, StorageError> {
        let mut sql = String::from("SELECT key FROM entries WHERE 1=1");
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
        if let Some(t) = entry_type {
            sql.push_str(" AND type = ?");
            params.push(Box::new(t.to_owned()));
        }
        if let Some(y) = year {
            sql.push_str(" AND json_extract(data_json, '$.fields.year') = ?");
            params.push(Box::new(y));
        }
        if let Some(a) = author_contains {
            sql.push_str(" AND json_extract(data_json, '$.fields.author') LIKE ?");
            params.push(Box::new(format!("%{a}%")));
        }
        let mut stmt = self.conn.prepare(&sql)?;
        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let rows = stmt.query_map(param_refs.as_slice(), |row| row.get::<_, String>(0))?;
        let mut keys = Vec::new();
        for row in rows {
            keys.push(row?);
        }
        Ok(keys)
    }

    /// Entry counts by type and year (§4.G "get-statistics").
    pub fn statistics(&self) -> Result<BackendStatistics, StorageError> {
        let mut stats = BackendStatistics::default();

        let mut by_type = self.conn.prepare("SELECT type, COUNT(*) FROM entries GROUP BY type")?;
        let rows = by_type.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?;
        for row in rows {
            let (kind, count) = row?;
            stats.by_type.insert(kind, count as usize);
        }

        let mut by_year = self
            .conn
            .prepare("SELECT json_extract(data_json, '$.fields.year'), COUNT(*) FROM entries WHERE json_extract(data_json, '$.fields.year') IS NOT NULL GROUP BY 1")?;
        let rows = by_year.query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)))?;
        for row in rows {
            let (year, count) = row?;
            stats.by_year.insert(year as i32, count as usize);
        }

        stats.total = self.keys()?.len();
        Ok(stats)
    }
}

impl Backend for SqliteBackend {
    fn initialize(&mut self) -> Result<(), StorageError> {
        self.conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        self.conn.execute_batch(SCHEMA)?;
        debug!("sqlite backend initialized");
        Ok(())
    }

    fn read(&self, key: &str) -> Result<Option<Entry>, StorageError> {
        let result = self.conn.query_row(
            "SELECT data_json FROM entries WHERE key = ?1",
            [key],
            |row| row.get::<_, String>(0),
        );
        match result {
            Ok(data_json) => match serde_json::from_str(&data_json) {
                Ok(entry) => Ok(Some(entry)),
                Err(_) => Ok(None),
            },
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&mut self, key: &str, entry: &Entry) -> Result<(), StorageError> {
        let data_json = serde_json::to_string(entry)?;
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "REPLACE INTO entries (key, type, data_json, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![key, entry.entry_type.as_str(), data_json, entry.created_at.to_rfc3339(), now],
        )?;
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<bool, StorageError> {
        let affected = self.conn.execute("DELETE FROM entries WHERE key = ?1", [key])?;
        Ok(affected > 0)
    }

    fn exists(&self, key: &str) -> Result<bool, StorageError> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM entries WHERE key = ?1", [key], |row| row.get(0))?;
        Ok(count > 0)
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT key FROM entries")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut keys = Vec::new();
        for row in rows {
            keys.push(row?);
        }
        Ok(keys)
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.conn.execute("DELETE FROM entries", [])?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), StorageError> {
        Ok(())
    }

    fn supports_transactions(&self) -> bool {
        true
    }

    /// Begin (or, if a transaction is already open, no-op within) a context-scoped
    /// transaction (§4.G "nested scopes are no-ops inside the outer transaction").
    fn begin_transaction(&mut self) -> Result<(), StorageError> {
        if self.tx_depth == 0 {
            self.conn.execute_batch("BEGIN IMMEDIATE;")?;
        }
        self.tx_depth += 1;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StorageError> {
        if self.tx_depth == 0 {
            return Err(StorageError::Other("no transaction in progress".into()));
        }
        self.tx_depth -= 1;
        if self.tx_depth == 0 {
            self.conn.execute_batch("COMMIT;")?;
        }
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), StorageError> {
        if self.tx_depth == 0 {
            return Err(StorageError::Other("no transaction in progress".into()));
        }
        self.tx_depth = 0;
        self.conn.execute_batch("ROLLBACK;")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{EntryKey, EntryType, Fields};

    fn entry(key: &str, title: &str) -> Entry {
        let mut fields = Fields::default();
        fields.set("title", title);
        fields.set("author", "Smith, John");
        fields.set("year", "2024");
        Entry::new(EntryKey::new(key).unwrap(), EntryType::Article, fields)
    }

    #[test]
    fn write_then_read_round_trips() {
        let mut backend = SqliteBackend::open_in_memory().unwrap();
        backend.initialize().unwrap();
        let e = entry("smith2024", "Quantum Mechanics");
        backend.write("smith2024", &e).unwrap();
        let read_back = backend.read("smith2024").unwrap().unwrap();
        assert_eq!(read_back.fields.title, e.fields.title);
    }

    #[test]
    fn full_text_search_finds_entry_by_title() {
        let mut backend = SqliteBackend::open_in_memory().unwrap();
        backend.initialize().unwrap();
        backend.write("smith2024", &entry("smith2024", "Quantum Mechanics")).unwrap();
        let hits = backend.search("Quantum").unwrap();
        assert_eq!(hits, vec!["smith2024".to_string()]);
    }

    #[test]
    fn full_text_search_index_updates_on_delete() {
        let mut backend = SqliteBackend::open_in_memory().unwrap();
        backend.initialize().unwrap();
        backend.write("smith2024", &entry("smith2024", "Quantum Mechanics")).unwrap();
        backend.delete("smith2024").unwrap();
        assert!(backend.search("Quantum").unwrap().is_empty());
    }

    #[test]
    fn statistics_counts_by_type_and_year() {
        let mut backend = SqliteBackend::open_in_memory().unwrap();
        backend.initialize().unwrap();
        backend.write("a", &entry("a", "First")).unwrap();
        backend.write("b", &entry("b", "Second")).unwrap();
        let stats = backend.statistics().unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.by_type.get("article"), Some(&2));
        assert_eq!(stats.by_year.get(&2024), Some(&2));
    }

    #[test]
    fn nested_transaction_scopes_are_no_ops() {
        let mut backend = SqliteBackend::open_in_memory().unwrap();
        backend.initialize().unwrap();
        backend.begin_transaction().unwrap();
        backend.begin_transaction().unwrap();
        backend.write("a", &entry("a", "First")).unwrap();
        backend.commit().unwrap();
        assert!(backend.exists("a").unwrap());
        backend.commit().unwrap();
    }
}
