pub mod db;
pub mod dialect;
pub mod migrations;

pub use dialect::Dialect;
pub use migrations::{Direction, MIGRATIONS, Migration, SchemaChange};
