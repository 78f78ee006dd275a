use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::{Connection, Transaction};
use tracing::debug;

use crate::error::{Result, StoreError};

#[derive(Debug, Clone)]
pub struct OpenOptions {
    pub busy_timeout: Duration,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            busy_timeout: Duration::from_millis(5_000),
        }
    }
}

/// One SQLite connection guarded by a mutex. Pass it by reference; there is
/// no process-wide handle.
pub struct Db {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl Db {
    /// Open (or create) a database file. Parent directories are created.
    pub fn open_path(path: &Path, options: &OpenOptions) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let open_err = |source| StoreError::Open {
            path: path.to_path_buf(),
            source,
        };
        let conn = Connection::open(path).map_err(open_err)?;
        configure(&conn, options).map_err(open_err)?;
        debug!(path = %path.display(), "opened database");
        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path.to_path_buf()),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let open_err = |source| StoreError::Open {
            path: PathBuf::from(":memory:"),
            source,
        };
        let conn = Connection::open_in_memory().map_err(open_err)?;
        configure(&conn, &OpenOptions::default()).map_err(open_err)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub(crate) fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("db mutex poisoned")
    }

    /// Run `f` in one transaction. Any error rolls the whole unit back.
    pub(crate) fn write<T>(&self, f: impl FnOnce(&Transaction<'_>) -> Result<T>) -> Result<T> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let out = f(&tx)?;
        tx.commit()?;
        Ok(out)
    }

    pub fn sqlite_version(&self) -> Result<String> {
        Ok(self
            .conn()
            .query_row("SELECT sqlite_version()", [], |row| row.get(0))?)
    }

    pub fn foreign_keys_enabled(&self) -> Result<bool> {
        Ok(self
            .conn()
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))?)
    }
}

fn configure(conn: &Connection, options: &OpenOptions) -> rusqlite::Result<()> {
    conn.busy_timeout(options.busy_timeout)?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_enables_foreign_keys() {
        let dir = tempfile::tempdir().unwrap();
        let db = Db::open_path(&dir.path().join("nested/school.db"), &OpenOptions::default())
            .unwrap();
        assert!(db.foreign_keys_enabled().unwrap());
        assert!(db.sqlite_version().unwrap().starts_with('3'));
        assert!(db.path().unwrap().ends_with("school.db"));
    }

    #[test]
    fn test_write_rolls_back_on_error() {
        let db = Db::open_in_memory().unwrap();
        db.conn().execute_batch("CREATE TABLE t (v INTEGER)").unwrap();
        let result: Result<()> = db.write(|tx| {
            tx.execute("INSERT INTO t VALUES (1)", [])?;
            Err(StoreError::not_found("t", 1))
        });
        assert!(result.is_err());
        let count: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM t", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
