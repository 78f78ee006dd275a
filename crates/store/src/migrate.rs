//! Applies and reverts the ordered schema migrations.

use std::collections::HashMap;

use rusqlite::{Connection, Transaction, params};
use schoolbase_schema::migrations::{Direction, MIGRATIONS, Migration};
use schoolbase_schema::Dialect;
use tracing::{info, warn};

use crate::db::Db;
use crate::error::{Result, StoreError, is_already_exists};

const BOOKKEEPING: &str = "CREATE TABLE IF NOT EXISTS _migrations (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    pub name: &'static str,
    /// `None` while pending.
    pub applied_at: Option<String>,
}

impl MigrationStatus {
    pub fn is_applied(&self) -> bool {
        self.applied_at.is_some()
    }
}

pub struct Migrator<'a> {
    db: &'a Db,
    migrations: &'a [Migration],
}

impl<'a> Migrator<'a> {
    pub fn new(db: &'a Db) -> Self {
        Self::with_migrations(db, MIGRATIONS)
    }

    pub fn with_migrations(db: &'a Db, migrations: &'a [Migration]) -> Self {
        Self { db, migrations }
    }

    /// Every known migration in name order with its applied time.
    pub fn status(&self) -> Result<Vec<MigrationStatus>> {
        let conn = self.db.conn();
        let applied = applied(&conn)?;
        self.check_known(applied.iter().map(|(name, _)| name.as_str()))?;
        let applied: HashMap<_, _> = applied.into_iter().collect();
        Ok(self
            .migrations
            .iter()
            .map(|m| MigrationStatus {
                name: m.name,
                applied_at: applied.get(m.name).cloned(),
            })
            .collect())
    }

    /// Apply every pending migration, each in its own transaction.
    /// Stops at the first failure.
    pub fn migrate(&self) -> Result<Vec<&'static str>> {
        let mut conn = self.db.conn();
        let done = applied(&conn)?;
        self.check_known(done.iter().map(|(name, _)| name.as_str()))?;

        let mut ran = Vec::new();
        for migration in self.migrations {
            if done.iter().any(|(name, _)| name == migration.name) {
                continue;
            }
            let mut tx = conn.transaction()?;
            run_changes(&mut tx, migration, Direction::Up)?;
            tx.execute("INSERT INTO _migrations (name) VALUES (?1)", params![migration.name])?;
            tx.commit()?;
            info!(migration = migration.name, "applied migration");
            ran.push(migration.name);
        }
        Ok(ran)
    }

    /// Revert the last `steps` applied migrations, newest first.
    pub fn rollback(&self, steps: usize) -> Result<Vec<&'static str>> {
        let mut conn = self.db.conn();
        let done = applied(&conn)?;
        let mut reverted = Vec::new();
        for (name, _) in done.iter().rev().take(steps) {
            let migration = self
                .migrations
                .iter()
                .find(|m| m.name == name)
                .ok_or_else(|| StoreError::UnknownMigration(name.clone()))?;
            let mut tx = conn.transaction()?;
            run_changes(&mut tx, migration, Direction::Down)?;
            tx.execute("DELETE FROM _migrations WHERE name = ?1", params![migration.name])?;
            tx.commit()?;
            info!(migration = migration.name, "reverted migration");
            reverted.push(migration.name);
        }
        Ok(reverted)
    }

    fn check_known<'n>(&self, mut names: impl Iterator<Item = &'n str>) -> Result<()> {
        match names.find(|name| !self.migrations.iter().any(|m| m.name == *name)) {
            Some(unknown) => Err(StoreError::UnknownMigration(unknown.to_string())),
            None => Ok(()),
        }
    }
}

/// `(name, applied_at)` in application order.
fn applied(conn: &Connection) -> Result<Vec<(String, String)>> {
    conn.execute_batch(BOOKKEEPING)?;
    let mut stmt = conn.prepare("SELECT name, applied_at FROM _migrations ORDER BY id")?;
    let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
    let out = rows.collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(out)
}

fn run_changes(tx: &mut Transaction<'_>, migration: &Migration, direction: Direction) -> Result<()> {
    let failed = |source| StoreError::Migration {
        name: migration.name.to_string(),
        source,
    };
    for change in migration.changes(direction) {
        let sql = change.to_sql(Dialect::Sqlite);
        if !change.tolerates_existing() {
            tx.execute_batch(&sql).map_err(failed)?;
            continue;
        }
        let sp = tx.savepoint().map_err(failed)?;
        match sp.execute_batch(&sql) {
            Ok(()) => sp.commit().map_err(failed)?,
            Err(err) if is_already_exists(&err) => {
                warn!(
                    migration = migration.name,
                    statement = %sql,
                    "index already exists, skipping"
                );
            }
            Err(err) => return Err(failed(err)),
        }
    }
    Ok(())
}
