//! sqlite-adapter — SQLite implementation of the `KvStore` port for local/dev.
//!
//! Purpose
//! - Provide a lightweight, file-based key-value namespace to run the todo
//!   list locally without cloud dependencies.
//! - Implements the `KvStore` trait from the `domain` crate.
//!
//! Notes
//! - Uses `rusqlite` with the `bundled` feature for portability.
//! - One table holds every namespace; a `SqliteKv` handle is bound to exactly
//!   one namespace and never sees keys from another.
//! - `put` is an upsert. There is no compare-and-swap; callers doing
//!   read-modify-write get last-writer-wins semantics.
//! - Stores `updated_at` as seconds since UNIX_EPOCH for inspection only.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use domain::{CoreError, KvStore};
use rusqlite::{params, Connection, OptionalExtension};

/// SQLite-backed key-value namespace.
pub struct SqliteKv {
    conn: std::sync::Mutex<Connection>,
    namespace: String,
}

impl SqliteKv {
    /// Open (or create) a SQLite database at the given path and ensure schema.
    pub fn new<P: AsRef<Path>>(path: P, namespace: impl Into<String>) -> Result<Self, CoreError> {
        let conn = Connection::open(path).map_err(map_sqerr)?;
        Self::with_connection(conn, namespace)
    }

    /// Private in-memory database; useful for tests and throwaway runs.
    pub fn in_memory(namespace: impl Into<String>) -> Result<Self, CoreError> {
        let conn = Connection::open_in_memory().map_err(map_sqerr)?;
        Self::with_connection(conn, namespace)
    }

    fn with_connection(conn: Connection, namespace: impl Into<String>) -> Result<Self, CoreError> {
        let namespace = namespace.into();
        if namespace.is_empty() {
            return Err(CoreError::StoreUnavailable("empty namespace".into()));
        }
        init_schema(&conn)?;
        Ok(Self {
            conn: std::sync::Mutex::new(conn),
            namespace,
        })
    }

    /// Construct from env var `DB_PATH` (defaults to `./data/todos.db`).
    pub fn from_env(namespace: impl Into<String>) -> Result<Self, CoreError> {
        let path = std::env::var("DB_PATH").unwrap_or_else(|_| "./data/todos.db".to_string());
        // Ensure directory exists
        if let Some(dir) = Path::new(&path).parent() {
            let _ = std::fs::create_dir_all(dir);
        }
        Self::new(path, namespace)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, CoreError> {
        self.conn
            .lock()
            .map_err(|_| CoreError::StoreUnavailable("mutex poisoned".into()))
    }
}

fn init_schema(conn: &Connection) -> Result<(), CoreError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS kv (
            namespace TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at INTEGER NOT NULL,
            PRIMARY KEY (namespace, key)
        );
        "#,
    )
    .map_err(map_sqerr)?;
    Ok(())
}

impl KvStore for SqliteKv {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT value FROM kv WHERE namespace = ?1 AND key = ?2",
            params![self.namespace, key],
            |row| row.get::<_, String>(0),
        )
        .optional()
        .map_err(map_sqerr)
    }

    fn put(&self, key: &str, value: String) -> Result<(), CoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO kv(namespace, key, value, updated_at) VALUES(?1, ?2, ?3, ?4)
             ON CONFLICT(namespace, key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![self.namespace, key, value, now_secs()],
        )
        .map_err(map_sqerr)?;
        Ok(())
    }
}

fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

fn map_sqerr(e: rusqlite::Error) -> CoreError {
    CoreError::StoreUnavailable(format!("sqlite error: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::service::TodoListService;

    fn tmp_db(namespace: &str) -> (SqliteKv, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.db");
        let kv = SqliteKv::new(path, namespace).unwrap();
        (kv, dir)
    }

    #[test]
    fn get_missing_is_none() {
        let (kv, _dir) = tmp_db("todolist");
        assert_eq!(kv.get("todos").unwrap(), None);
    }

    #[test]
    fn put_get_roundtrip_and_overwrite() {
        let (kv, _dir) = tmp_db("todolist");
        kv.put("todos", "[]".into()).unwrap();
        kv.put("todos", r#"[{"text":"A"}]"#.into()).unwrap();
        assert_eq!(kv.get("todos").unwrap().as_deref(), Some(r#"[{"text":"A"}]"#));
    }

    #[test]
    fn namespaces_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shared.db");
        let a = SqliteKv::new(&path, "a").unwrap();
        let b = SqliteKv::new(&path, "b").unwrap();
        a.put("todos", "[]".into()).unwrap();
        assert!(b.get("todos").unwrap().is_none());
        assert_eq!(a.namespace(), "a");
    }

    #[test]
    fn data_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("persist.db");
        {
            let svc = TodoListService::new(SqliteKv::new(&path, "todolist").unwrap());
            svc.add_item("Buy milk").unwrap();
        }
        let svc = TodoListService::new(SqliteKv::new(&path, "todolist").unwrap());
        let list = svc.load_list().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].text(), "Buy milk");
    }

    #[test]
    fn empty_namespace_rejected() {
        assert!(matches!(
            SqliteKv::in_memory(""),
            Err(CoreError::StoreUnavailable(_))
        ));
    }
}
