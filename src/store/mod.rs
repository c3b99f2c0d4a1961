//! Server-side document store holding the single site document

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::core::error::StoreError;
use crate::core::site::SiteConfiguration;

/// The stored document plus the bookkeeping the store adds to it
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSite {
    pub config: SiteConfiguration,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Persistence for exactly one configuration document
pub trait DocumentStore: Send + Sync {
    /// The current document, if one was ever written
    fn fetch_latest(&self) -> Result<Option<StoredSite>, StoreError>;
    /// Create the document or overwrite all three sections of it
    fn upsert_latest(&self, config: &SiteConfiguration) -> Result<StoredSite, StoreError>;
    /// Remove every stored document, returning how many were removed
    fn delete_all(&self) -> Result<usize, StoreError>;
}

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS site_components (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    header TEXT NOT NULL,
    navbar TEXT NOT NULL,
    footer TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
";

/// The document always lives under this row id
const SINGLETON_ID: i64 = 1;

/// SQLite-backed [`DocumentStore`]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (and create if needed) a database file
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StoreError::Backend(format!("create {}: {e}", parent.display())))?;
            }
        }
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::Backend("connection lock poisoned".to_string()))?;
        f(&conn)
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StoreError::Decode(format!("timestamp {raw:?}: {e}")))
}

fn read_row(conn: &Connection) -> Result<Option<StoredSite>, StoreError> {
    let row = conn
        .query_row(
            "SELECT header, navbar, footer, created_at, updated_at
             FROM site_components WHERE id = ?1",
            params![SINGLETON_ID],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            },
        )
        .optional()?;

    let Some((header, navbar, footer, created_at, updated_at)) = row else {
        return Ok(None);
    };

    // Stored sections are returned as-is; write-time rules are not re-checked
    let config = SiteConfiguration {
        header: serde_json::from_str(&header)?,
        navbar: serde_json::from_str(&navbar)?,
        footer: serde_json::from_str(&footer)?,
    };

    Ok(Some(StoredSite {
        config,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    }))
}

impl DocumentStore for SqliteStore {
    fn fetch_latest(&self) -> Result<Option<StoredSite>, StoreError> {
        self.with_conn(read_row)
    }

    fn upsert_latest(&self, config: &SiteConfiguration) -> Result<StoredSite, StoreError> {
        let header = serde_json::to_string(&config.header)?;
        let navbar = serde_json::to_string(&config.navbar)?;
        let footer = serde_json::to_string(&config.footer)?;
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO site_components (id, header, navbar, footer, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)
                 ON CONFLICT(id) DO UPDATE SET
                     header = excluded.header,
                     navbar = excluded.navbar,
                     footer = excluded.footer,
                     updated_at = excluded.updated_at",
                params![SINGLETON_ID, header, navbar, footer, now],
            )?;
            read_row(conn)?.ok_or_else(|| StoreError::Backend("document vanished after write".to_string()))
        })
    }

    fn delete_all(&self) -> Result<usize, StoreError> {
        self.with_conn(|conn| Ok(conn.execute("DELETE FROM site_components", [])?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::site::NavLink;
    use tempfile::tempdir;

    fn custom_config(title: &str) -> SiteConfiguration {
        let mut config = SiteConfiguration::default();
        config.header.title = title.to_string();
        config.navbar = vec![
            NavLink::new("One", "/1"),
            NavLink::new("Two", "/2"),
            NavLink::new("Three", "https://three.example"),
        ];
        config
    }

    fn row_count(store: &SqliteStore) -> i64 {
        store
            .with_conn(|conn| {
                Ok(conn.query_row("SELECT COUNT(*) FROM site_components", [], |r| r.get(0))?)
            })
            .unwrap()
    }

    #[test]
    fn test_empty_store_has_no_document() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.fetch_latest().unwrap().is_none());
    }

    #[test]
    fn test_upsert_overwrites_single_document() {
        let store = SqliteStore::open_in_memory().unwrap();

        let first = store.upsert_latest(&custom_config("First")).unwrap();
        let second = store.upsert_latest(&custom_config("Second")).unwrap();

        assert_eq!(row_count(&store), 1);
        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at >= first.updated_at);

        let latest = store.fetch_latest().unwrap().unwrap();
        assert_eq!(latest.config, custom_config("Second"));
    }

    #[test]
    fn test_delete_all_then_fetch() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.upsert_latest(&custom_config("Gone")).unwrap();

        assert_eq!(store.delete_all().unwrap(), 1);
        assert!(store.fetch_latest().unwrap().is_none());
        assert_eq!(store.delete_all().unwrap(), 0);
    }

    #[test]
    fn test_malformed_document_is_returned_as_is() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .with_conn(|conn| {
                conn.execute(
                    "INSERT INTO site_components VALUES (1, '{}', '[{\"label\":\"Only\"}]', '{}', ?1, ?1)",
                    params!["2024-01-01T00:00:00Z"],
                )?;
                Ok(())
            })
            .unwrap();

        let stored = store.fetch_latest().unwrap().unwrap();
        assert_eq!(stored.config.navbar, vec![NavLink::new("Only", "")]);
        assert_eq!(stored.config.header.title, "My Site");
        assert!(stored.config.validate().is_err());
    }

    #[test]
    fn test_file_database_persists_across_opens() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data").join("site.db");

        SqliteStore::open(&path)
            .unwrap()
            .upsert_latest(&custom_config("Durable"))
            .unwrap();

        let reopened = SqliteStore::open(&path).unwrap();
        let stored = reopened.fetch_latest().unwrap().unwrap();
        assert_eq!(stored.config.header.title, "Durable");
    }
}
