use anyhow::{Context, Result, bail};
use schoolbase_runtime_config::{SchoolbaseConfig, load};
use schoolbase_store::{Db, Migrator, OpenOptions};
use std::path::{Path, PathBuf};

/// Loaded configuration plus the database path every command works on.
pub struct Runtime {
    pub config: SchoolbaseConfig,
    pub database: PathBuf,
}

impl Runtime {
    pub fn load(config: Option<&Path>, database: Option<&Path>) -> Result<Self> {
        let config = load(config).context("Failed to load configuration")?;
        let database = match database {
            Some(path) => path.to_path_buf(),
            None => config.database.resolved_path(),
        };
        Ok(Self { config, database })
    }

    pub fn open(&self) -> Result<Db> {
        let options = OpenOptions {
            busy_timeout: self.config.database.busy_timeout(),
        };
        Db::open_path(&self.database, &options)
            .with_context(|| format!("Cannot connect to database {}", self.database.display()))
    }

    /// Open the database and refuse to continue while migrations are pending.
    pub fn open_migrated(&self) -> Result<Db> {
        let db = self.open()?;
        let pending = Migrator::new(&db)
            .status()
            .context("Failed to read migration status")?
            .into_iter()
            .filter(|m| !m.is_applied())
            .count();
        if pending > 0 {
            bail!("{pending} migration(s) pending; run `schoolbase migrate` first");
        }
        Ok(db)
    }
}
