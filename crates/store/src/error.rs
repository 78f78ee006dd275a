use std::fmt;
use std::path::PathBuf;

use rusqlite::{ErrorCode, ffi};
use schoolbase_core::credentials::CredentialError;
use schoolbase_core::validate::ValidationError;
use schoolbase_core::{PaymentError, PlanResource, TransitionError};
use thiserror::Error;

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

/// Which database constraint rejected a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Unique,
    ForeignKey,
    Check,
    NotNull,
    PrimaryKey,
    Trigger,
    Other,
}

impl ConstraintKind {
    fn from_extended_code(code: i32) -> Self {
        match code {
            ffi::SQLITE_CONSTRAINT_UNIQUE => ConstraintKind::Unique,
            ffi::SQLITE_CONSTRAINT_FOREIGNKEY => ConstraintKind::ForeignKey,
            ffi::SQLITE_CONSTRAINT_CHECK => ConstraintKind::Check,
            ffi::SQLITE_CONSTRAINT_NOTNULL => ConstraintKind::NotNull,
            ffi::SQLITE_CONSTRAINT_PRIMARYKEY => ConstraintKind::PrimaryKey,
            ffi::SQLITE_CONSTRAINT_TRIGGER => ConstraintKind::Trigger,
            _ => ConstraintKind::Other,
        }
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConstraintKind::Unique => "unique",
            ConstraintKind::ForeignKey => "foreign key",
            ConstraintKind::Check => "check",
            ConstraintKind::NotNull => "not null",
            ConstraintKind::PrimaryKey => "primary key",
            ConstraintKind::Trigger => "trigger",
            ConstraintKind::Other => "constraint",
        })
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} constraint violated: {message}")]
    Constraint {
        kind: ConstraintKind,
        message: String,
    },
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    #[error("invalid input: {}", join(.0))]
    Validation(Vec<ValidationError>),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Payment(#[from] PaymentError),
    #[error("plan allows at most {limit} active {resource}")]
    PlanLimitExceeded { resource: PlanResource, limit: i64 },
    #[error("migration {name} failed: {source}")]
    Migration {
        name: String,
        #[source]
        source: rusqlite::Error,
    },
    #[error("database records migration {0}, which this build does not know")]
    UnknownMigration(String),
    #[error("cannot open database {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    #[error("cannot create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot bind value: {0}")]
    Bind(String),
    #[error("cannot decode stored value: {0}")]
    Decode(String),
    #[error(transparent)]
    Credentials(#[from] CredentialError),
    #[error(transparent)]
    Sqlite(rusqlite::Error),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        StoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn constraint_kind(&self) -> Option<ConstraintKind> {
        match self {
            StoreError::Constraint { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Unique index or primary key collision.
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self.constraint_kind(),
            Some(ConstraintKind::Unique | ConstraintKind::PrimaryKey)
        )
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(e, message)
                if e.code == ErrorCode::ConstraintViolation =>
            {
                StoreError::Constraint {
                    kind: ConstraintKind::from_extended_code(e.extended_code),
                    message: message.unwrap_or_else(|| e.to_string()),
                }
            }
            rusqlite::Error::FromSqlConversionFailure(idx, _, source) => {
                StoreError::Decode(format!("column {idx}: {source}"))
            }
            rusqlite::Error::InvalidColumnType(idx, name, ty) => {
                StoreError::Decode(format!("column {idx} ({name}) holds {ty}"))
            }
            other => StoreError::Sqlite(other),
        }
    }
}

impl From<Vec<ValidationError>> for StoreError {
    fn from(errors: Vec<ValidationError>) -> Self {
        StoreError::Validation(errors)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Decode(err.to_string())
    }
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// `CREATE INDEX` on a name that is already taken.
pub(crate) fn is_already_exists(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(_, Some(message)) if message.contains("already exists")
    )
}
