use anyhow::{Context, Result};
use schoolbase_store::Migrator;

use crate::runtime::Runtime;

pub fn run_check(rt: &Runtime) -> Result<()> {
    let db = rt.open()?;
    let version = db
        .sqlite_version()
        .context("Database did not answer a version query")?;
    let foreign_keys = db
        .foreign_keys_enabled()
        .context("Failed to read foreign key setting")?;
    let status = Migrator::new(&db)
        .status()
        .context("Failed to read migration status")?;
    let applied = status.iter().filter(|m| m.is_applied()).count();

    println!("Database:     {}", rt.database.display());
    println!("SQLite:       {version}");
    println!("Foreign keys: {}", if foreign_keys { "on" } else { "off" });
    println!("Migrations:   {applied}/{} applied", status.len());
    for pending in status.iter().filter(|m| !m.is_applied()) {
        println!("  pending     {}", pending.name);
    }
    Ok(())
}
