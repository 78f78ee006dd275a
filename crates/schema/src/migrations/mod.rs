//! Ordered schema migrations.
//!
//! Each migration is a named pair of change lists. `up` moves the schema
//! forward, `down` undoes exactly what `up` did. Names sort lexically in
//! application order.

use sea_query::{
    ColumnDef, Expr, ForeignKey, ForeignKeyAction, ForeignKeyCreateStatement, Iden, IndexCreateStatement,
    IndexDropStatement, IntoIden, IntoTableRef, PostgresQueryBuilder, SchemaBuilder,
    SqliteQueryBuilder, TableAlterStatement, TableCreateStatement,
    TableDropStatement,
};

use crate::dialect::Dialect;

mod m0001_create_subscriptions;
mod m0002_create_schools;
mod m0003_create_users;
mod m0004_create_classes;
mod m0005_create_subjects;
mod m0006_create_teachers;
mod m0007_create_students;
mod m0008_create_parents;
mod m0009_create_attendance;
mod m0010_create_fees;
mod m0011_create_complaints;
mod m0012_create_events;
mod m0013_create_inquiries;
mod m0014_add_scholarship_details;
mod m0015_add_lookup_indexes;

/// One DDL step of a migration.
#[derive(Debug, Clone)]
pub enum SchemaChange {
    CreateTable(TableCreateStatement),
    DropTable(TableDropStatement),
    AlterTable(TableAlterStatement),
    /// With `tolerate_existing` the runner treats "already exists" as success.
    CreateIndex {
        stmt: IndexCreateStatement,
        tolerate_existing: bool,
    },
    DropIndex(IndexDropStatement),
    /// Dialect-specific SQL the builders cannot express (triggers, functions).
    Raw {
        sqlite: &'static str,
        postgres: &'static str,
    },
}

impl SchemaChange {
    pub fn to_sql(&self, dialect: Dialect) -> String {
        match dialect {
            Dialect::Sqlite => self.build(SqliteQueryBuilder, dialect),
            Dialect::Postgres => self.build(PostgresQueryBuilder, dialect),
        }
    }

    pub fn tolerates_existing(&self) -> bool {
        matches!(
            self,
            SchemaChange::CreateIndex {
                tolerate_existing: true,
                ..
            }
        )
    }

    fn build<B: SchemaBuilder>(&self, builder: B, dialect: Dialect) -> String {
        match self {
            SchemaChange::CreateTable(stmt) => stmt.build(builder),
            SchemaChange::DropTable(stmt) => stmt.build(builder),
            SchemaChange::AlterTable(stmt) => stmt.build(builder),
            SchemaChange::CreateIndex { stmt, .. } => stmt.build(builder),
            SchemaChange::DropIndex(stmt) => stmt.build(builder),
            SchemaChange::Raw { sqlite, postgres } => match dialect {
                Dialect::Sqlite => ToString::to_string(sqlite),
                Dialect::Postgres => ToString::to_string(postgres),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

#[derive(Clone, Copy)]
pub struct Migration {
    pub name: &'static str,
    pub up: fn() -> Vec<SchemaChange>,
    pub down: fn() -> Vec<SchemaChange>,
}

impl Migration {
    pub fn changes(&self, direction: Direction) -> Vec<SchemaChange> {
        match direction {
            Direction::Up => (self.up)(),
            Direction::Down => (self.down)(),
        }
    }

    /// Full SQL script for one direction, statements separated by `;`.
    pub fn script(&self, direction: Direction, dialect: Dialect) -> String {
        self.changes(direction)
            .iter()
            .map(|change| {
                let sql = change.to_sql(dialect);
                let sql = sql.trim_end();
                if sql.ends_with(';') {
                    sql.to_string()
                } else {
                    format!("{sql};")
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl std::fmt::Debug for Migration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Migration").field("name", &self.name).finish()
    }
}

macro_rules! migration {
    ($name:literal, $module:ident) => {
        Migration {
            name: $name,
            up: $module::up,
            down: $module::down,
        }
    };
}

pub const MIGRATIONS: &[Migration] = &[
    migration!("0001_create_subscriptions", m0001_create_subscriptions),
    migration!("0002_create_schools", m0002_create_schools),
    migration!("0003_create_users", m0003_create_users),
    migration!("0004_create_classes", m0004_create_classes),
    migration!("0005_create_subjects", m0005_create_subjects),
    migration!("0006_create_teachers", m0006_create_teachers),
    migration!("0007_create_students", m0007_create_students),
    migration!("0008_create_parents", m0008_create_parents),
    migration!("0009_create_attendance", m0009_create_attendance),
    migration!("0010_create_fees", m0010_create_fees),
    migration!("0011_create_complaints", m0011_create_complaints),
    migration!("0012_create_events", m0012_create_events),
    migration!("0013_create_inquiries", m0013_create_inquiries),
    migration!("0014_add_scholarship_details", m0014_add_scholarship_details),
    migration!("0015_add_lookup_indexes", m0015_add_lookup_indexes),
];

pub fn find(name: &str) -> Option<&'static Migration> {
    MIGRATIONS.iter().find(|m| m.name == name)
}

// ── Column helpers shared by migrations ────────────────────────────────────

pub(crate) fn uuid_pk<C: IntoIden>(column: C) -> ColumnDef {
    ColumnDef::new(column).uuid().not_null().primary_key().to_owned()
}

pub(crate) fn uuid_ref<C: IntoIden>(column: C) -> ColumnDef {
    ColumnDef::new(column).uuid().not_null().to_owned()
}

pub(crate) fn uuid_ref_null<C: IntoIden>(column: C) -> ColumnDef {
    ColumnDef::new(column).uuid().null().to_owned()
}

pub(crate) fn text_col<C: IntoIden>(column: C, len: u32) -> ColumnDef {
    ColumnDef::new(column).string_len(len).not_null().to_owned()
}

pub(crate) fn text_col_null<C: IntoIden>(column: C, len: u32) -> ColumnDef {
    ColumnDef::new(column).string_len(len).null().to_owned()
}

pub(crate) fn flag<C: IntoIden>(column: C, default: bool) -> ColumnDef {
    ColumnDef::new(column)
        .boolean()
        .not_null()
        .default(default)
        .to_owned()
}

pub(crate) fn stamp<C: IntoIden>(column: C) -> ColumnDef {
    ColumnDef::new(column)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

pub(crate) fn stamp_null<C: IntoIden>(column: C) -> ColumnDef {
    ColumnDef::new(column)
        .timestamp_with_time_zone()
        .null()
        .to_owned()
}

/// Closed-set column: `CHECK (col IN (...))` over the enum's stored values.
pub(crate) fn enum_col<C, I>(column: C, values: I) -> ColumnDef
where
    C: Iden + Copy + 'static,
    I: IntoIterator<Item = &'static str>,
{
    ColumnDef::new(column)
        .string_len(32)
        .not_null()
        .check(Expr::col(column).is_in(values))
        .to_owned()
}

pub(crate) fn enum_col_null<C, I>(column: C, values: I) -> ColumnDef
where
    C: Iden + Copy + 'static,
    I: IntoIterator<Item = &'static str>,
{
    ColumnDef::new(column)
        .string_len(32)
        .null()
        .check(Expr::col(column).is_in(values))
        .to_owned()
}

pub(crate) fn non_negative<C>(column: C) -> ColumnDef
where
    C: Iden + Copy + 'static,
{
    ColumnDef::new(column)
        .big_integer()
        .not_null()
        .default(0)
        .check(Expr::col(column).gte(0))
        .to_owned()
}

pub(crate) fn foreign_key<FT, FC, TT, TC>(
    name: &str,
    from_table: FT,
    from_column: FC,
    to_table: TT,
    to_column: TC,
    on_delete: ForeignKeyAction,
) -> ForeignKeyCreateStatement
where
    FT: IntoTableRef,
    FC: IntoIden,
    TT: IntoTableRef,
    TC: IntoIden,
{
    ForeignKey::create()
        .name(name)
        .from(from_table, from_column)
        .to(to_table, to_column)
        .on_delete(on_delete)
        .to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_unique_and_sorted() {
        let names: Vec<_> = MIGRATIONS.iter().map(|m| m.name).collect();
        let mut sorted = names.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_every_migration_has_both_directions() {
        for migration in MIGRATIONS {
            assert!(!migration.changes(Direction::Up).is_empty(), "{}", migration.name);
            assert!(!migration.changes(Direction::Down).is_empty(), "{}", migration.name);
        }
    }

    #[test]
    fn test_renders_both_dialects() {
        for migration in MIGRATIONS {
            for dialect in [Dialect::Sqlite, Dialect::Postgres] {
                let script = migration.script(Direction::Up, dialect);
                assert!(script.ends_with(';'), "{} {dialect}", migration.name);
            }
        }
    }

    #[test]
    fn test_raw_step_picks_dialect_text() {
        let change = SchemaChange::Raw {
            sqlite: "SELECT 1",
            postgres: "SELECT 2",
        };
        assert_eq!(change.to_sql(Dialect::Sqlite), "SELECT 1");
        assert_eq!(change.to_sql(Dialect::Postgres), "SELECT 2");
    }

    #[test]
    fn test_only_index_steps_tolerate_existing() {
        for migration in MIGRATIONS {
            for change in migration.changes(Direction::Up) {
                if change.tolerates_existing() {
                    assert!(matches!(change, SchemaChange::CreateIndex { .. }));
                }
            }
        }
        let indexes = find("0015_add_lookup_indexes").unwrap();
        assert!(indexes.changes(Direction::Up).iter().all(SchemaChange::tolerates_existing));
    }
}
