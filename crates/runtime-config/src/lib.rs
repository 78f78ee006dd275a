//! Runtime configuration shared by the schoolbase binaries.
//!
//! `schoolbase.toml` holds where the database lives and which secret sources
//! the seeders read passwords from. Passwords themselves never appear in the
//! file: a section names an environment variable and optionally a file path,
//! and the secret is read from there at the moment it is needed.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical config file name.
pub const CONFIG_FILE_NAME: &str = "schoolbase.toml";
/// Points at a config file, replacing the per-user default location.
pub const CONFIG_ENV: &str = "SCHOOLBASE_CONFIG";
/// Overrides `[database] path`.
pub const DATABASE_ENV: &str = "SCHOOLBASE_DATABASE";
pub const DEFAULT_ADMIN_PASSWORD_ENV: &str = "SCHOOLBASE_ADMIN_PASSWORD";
pub const DEFAULT_DEMO_PASSWORD_ENV: &str = "SCHOOLBASE_DEMO_PASSWORD";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("no secret available: set {env}{}", file_hint(.file))]
    MissingSecret { env: String, file: Option<String> },
    #[error("cannot read secret file {}: {source}", path.display())]
    SecretFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("secret from {origin} is empty")]
    EmptySecret { origin: String },
}

fn file_hint(file: &Option<String>) -> String {
    match file {
        Some(path) => format!(" or create {path}"),
        None => " or configure password_file".to_string(),
    }
}

/// Top-level configuration (persisted as `schoolbase.toml`).
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct SchoolbaseConfig {
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub seed: SeedSettings,
    #[serde(default)]
    pub demo: DemoSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DatabaseSettings {
    /// `~` is expanded when the path is resolved.
    #[serde(default = "default_database_path")]
    pub path: String,
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

impl DatabaseSettings {
    pub fn resolved_path(&self) -> PathBuf {
        expand(&self.path)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

/// Platform operator account created by `schoolbase seed`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeedSettings {
    #[serde(default = "default_admin_email")]
    pub admin_email: String,
    #[serde(default = "default_admin_first_name")]
    pub admin_first_name: String,
    #[serde(default = "default_admin_last_name")]
    pub admin_last_name: String,
    #[serde(default = "default_admin_password_env")]
    pub password_env: String,
    #[serde(default)]
    pub password_file: Option<String>,
}

impl Default for SeedSettings {
    fn default() -> Self {
        Self {
            admin_email: default_admin_email(),
            admin_first_name: default_admin_first_name(),
            admin_last_name: default_admin_last_name(),
            password_env: default_admin_password_env(),
            password_file: None,
        }
    }
}

impl SeedSettings {
    pub fn admin_password(&self) -> Result<String, ConfigError> {
        self.admin_password_from(|name| std::env::var(name).ok())
    }

    pub fn admin_password_from(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<String, ConfigError> {
        resolve_secret(&self.password_env, self.password_file.as_deref(), lookup)
    }
}

/// Demo tenant settings. Every demo account uses an address in `email_domain`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DemoSettings {
    #[serde(default = "default_demo_domain")]
    pub email_domain: String,
    #[serde(default = "default_demo_password_env")]
    pub password_env: String,
    #[serde(default)]
    pub password_file: Option<String>,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            email_domain: default_demo_domain(),
            password_env: default_demo_password_env(),
            password_file: None,
        }
    }
}

impl DemoSettings {
    pub fn password(&self) -> Result<String, ConfigError> {
        self.password_from(|name| std::env::var(name).ok())
    }

    pub fn password_from(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<String, ConfigError> {
        resolve_secret(&self.password_env, self.password_file.as_deref(), lookup)
    }
}

// ── Serde default functions ─────────────────────────────────────────────

fn default_database_path() -> String {
    ProjectDirs::from("", "", "schoolbase")
        .map(|dirs| dirs.data_dir().join("schoolbase.db"))
        .unwrap_or_else(|| PathBuf::from("schoolbase.db"))
        .to_string_lossy()
        .into_owned()
}
fn default_busy_timeout_ms() -> u64 {
    5_000
}
fn default_admin_email() -> String {
    "admin@schoolbase.local".to_string()
}
fn default_admin_first_name() -> String {
    "Platform".to_string()
}
fn default_admin_last_name() -> String {
    "Admin".to_string()
}
fn default_admin_password_env() -> String {
    DEFAULT_ADMIN_PASSWORD_ENV.to_string()
}
fn default_demo_domain() -> String {
    "demo.schoolbase.local".to_string()
}
fn default_demo_password_env() -> String {
    DEFAULT_DEMO_PASSWORD_ENV.to_string()
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

/// Env var first, then the file. Surrounding whitespace is trimmed.
pub fn resolve_secret(
    env: &str,
    file: Option<&str>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String, ConfigError> {
    if let Some(value) = lookup(env) {
        return non_empty(value, format!("${env}"));
    }
    let Some(file) = file else {
        return Err(ConfigError::MissingSecret {
            env: env.to_string(),
            file: None,
        });
    };
    let path = expand(file);
    match std::fs::read_to_string(&path) {
        Ok(value) => non_empty(value, path.display().to_string()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(ConfigError::MissingSecret {
            env: env.to_string(),
            file: Some(file.to_string()),
        }),
        Err(source) => Err(ConfigError::SecretFile { path, source }),
    }
}

fn non_empty(value: String, origin: String) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::EmptySecret { origin });
    }
    Ok(trimmed.to_string())
}

/// `$SCHOOLBASE_CONFIG`, else `schoolbase.toml` in the per-user config dir.
pub fn default_config_path() -> Option<PathBuf> {
    default_config_path_from(|name| std::env::var(name).ok())
}

fn default_config_path_from(lookup: impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    if let Some(path) = lookup(CONFIG_ENV).filter(|p| !p.is_empty()) {
        return Some(expand(&path));
    }
    ProjectDirs::from("", "", "schoolbase").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// Load configuration. An explicit path must exist; the default location may
/// be absent, in which case defaults apply. Env overrides are applied last.
pub fn load(explicit: Option<&Path>) -> Result<SchoolbaseConfig, ConfigError> {
    load_with(explicit, |name| std::env::var(name).ok())
}

pub fn load_with(
    explicit: Option<&Path>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<SchoolbaseConfig, ConfigError> {
    let mut config = match explicit {
        Some(path) => read(path)?,
        None => match default_config_path_from(&lookup) {
            Some(path) if path.exists() => read(&path)?,
            _ => SchoolbaseConfig::default(),
        },
    };
    if let Some(path) = lookup(DATABASE_ENV).filter(|p| !p.is_empty()) {
        config.database.path = path;
    }
    Ok(config)
}

fn read(path: &Path) -> Result<SchoolbaseConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let cfg: SchoolbaseConfig = toml::from_str(
            r#"
[database]
path = "/srv/schoolbase/main.db"

[demo]
email_domain = "sandbox.example.org"
"#,
        )
        .expect("parse toml");

        assert_eq!(cfg.database.resolved_path(), PathBuf::from("/srv/schoolbase/main.db"));
        assert_eq!(cfg.database.busy_timeout(), Duration::from_secs(5));
        assert_eq!(cfg.seed.password_env, DEFAULT_ADMIN_PASSWORD_ENV);
        assert_eq!(cfg.demo.email_domain, "sandbox.example.org");
        assert_eq!(cfg.demo.password_env, DEFAULT_DEMO_PASSWORD_ENV);
    }

    #[test]
    fn explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_with(Some(&dir.path().join("missing.toml")), env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn config_env_and_database_override() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("custom.toml");
        std::fs::write(&file, "[database]\npath = \"/from/file.db\"\nbusy_timeout_ms = 250\n").unwrap();
        let file_str = file.to_string_lossy().into_owned();

        let cfg = load_with(None, env(&[(CONFIG_ENV, &file_str)])).unwrap();
        assert_eq!(cfg.database.path, "/from/file.db");
        assert_eq!(cfg.database.busy_timeout_ms, 250);

        let cfg = load_with(
            None,
            env(&[(CONFIG_ENV, &file_str), (DATABASE_ENV, "/from/env.db")]),
        )
        .unwrap();
        assert_eq!(cfg.database.path, "/from/env.db");
        assert_eq!(cfg.database.busy_timeout_ms, 250);
    }

    #[test]
    fn malformed_file_reports_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&file, "[database\npath = 1").unwrap();
        let err = load_with(Some(&file), env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn tilde_expands_to_home() {
        let settings = DatabaseSettings {
            path: "~/school.db".to_string(),
            busy_timeout_ms: 1,
        };
        let resolved = settings.resolved_path();
        assert!(resolved.ends_with("school.db"));
        assert!(!resolved.to_string_lossy().starts_with('~'));
    }

    #[test]
    fn secret_prefers_env_then_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("admin.secret");
        std::fs::write(&file, "from-the-file\n").unwrap();

        let settings = SeedSettings {
            password_file: Some(file.to_string_lossy().into_owned()),
            ..SeedSettings::default()
        };
        let from_env = settings
            .admin_password_from(env(&[(DEFAULT_ADMIN_PASSWORD_ENV, "from-the-env")]))
            .unwrap();
        assert_eq!(from_env, "from-the-env");
        assert_eq!(settings.admin_password_from(env(&[])).unwrap(), "from-the-file");
    }

    #[test]
    fn missing_or_blank_secret_is_an_error() {
        let err = SeedSettings::default().admin_password_from(env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSecret { file: None, .. }));
        assert!(err.to_string().contains(DEFAULT_ADMIN_PASSWORD_ENV));

        let dir = tempfile::tempdir().unwrap();
        let settings = DemoSettings {
            password_file: Some(dir.path().join("absent").to_string_lossy().into_owned()),
            ..DemoSettings::default()
        };
        assert!(matches!(
            settings.password_from(env(&[])).unwrap_err(),
            ConfigError::MissingSecret { file: Some(_), .. }
        ));

        let err = settings
            .password_from(env(&[(DEFAULT_DEMO_PASSWORD_ENV, "   ")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::EmptySecret { .. }));
    }

    #[test]
    fn secrets_are_not_serialized() {
        let encoded = toml::to_string(&SchoolbaseConfig::default()).expect("serialize config");
        assert!(encoded.contains("password_env"));
        assert!(!encoded.contains("password ="));
    }
}
