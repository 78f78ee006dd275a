use anyhow::{Context, Result};
use schoolbase_schema::{Dialect, Direction, MIGRATIONS};
use schoolbase_store::Migrator;

use crate::runtime::Runtime;

pub fn run_migrate(rt: &Runtime) -> Result<()> {
    let db = rt.open()?;
    let applied = Migrator::new(&db).migrate().context("Migration failed")?;
    if applied.is_empty() {
        println!("Database is up to date ({}).", rt.database.display());
        return Ok(());
    }
    for name in &applied {
        println!("  applied   {name}");
    }
    println!("Applied {} migration(s) to {}", applied.len(), rt.database.display());
    Ok(())
}

pub fn run_status(rt: &Runtime) -> Result<()> {
    let db = rt.open()?;
    let status = Migrator::new(&db)
        .status()
        .context("Failed to read migration status")?;
    let width = status.iter().map(|m| m.name.len()).max().unwrap_or(0);
    for migration in &status {
        match &migration.applied_at {
            Some(at) => println!("  applied   {:<width$}  {at}", migration.name),
            None => println!("  pending   {}", migration.name),
        }
    }
    let pending = status.iter().filter(|m| !m.is_applied()).count();
    println!("{} applied, {pending} pending", status.len() - pending);
    Ok(())
}

pub fn run_rollback(rt: &Runtime, steps: usize) -> Result<()> {
    let db = rt.open()?;
    let reverted = Migrator::new(&db)
        .rollback(steps)
        .context("Rollback failed")?;
    if reverted.is_empty() {
        println!("Nothing to roll back.");
        return Ok(());
    }
    for name in &reverted {
        println!("  reverted  {name}");
    }
    Ok(())
}

pub fn print_schema(dialect: Dialect, down: bool) {
    let direction = if down { Direction::Down } else { Direction::Up };
    let mut migrations: Vec<_> = MIGRATIONS.iter().collect();
    if down {
        migrations.reverse();
    }
    for migration in migrations {
        println!("-- {} ({dialect})", migration.name);
        println!("{}\n", migration.script(direction, dialect));
    }
}
