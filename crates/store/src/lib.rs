//! SQLite-backed store: connection handling, the migration runner,
//! per-entity repositories, seeders and demo cleanup.

mod bind;
pub mod cleanup;
mod db;
mod decode;
pub mod error;
pub mod migrate;
mod repo;
pub mod seed;

pub use db::{Db, OpenOptions};
pub use error::{ConstraintKind, Result, StoreError};
pub use migrate::{MigrationStatus, Migrator};
pub use repo::complaints::ComplaintChange;
pub use repo::fees::{FeeAssignment, Payment};
pub use schoolbase_schema::db::events::EventFilter;
