use std::env;
use std::str::FromStr;

use crate::error::AppError;

/// Storage backend selected by `DB_KIND`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbKind {
    Postgres,
    SqliteFile,
    SqliteMemory,
}

impl DbKind {
    pub const fn engine(self) -> &'static str {
        match self {
            DbKind::Postgres => "postgresql",
            DbKind::SqliteFile | DbKind::SqliteMemory => "sqlite",
        }
    }
}

impl FromStr for DbKind {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(DbKind::Postgres),
            "sqlite-file" | "sqlite_file" | "sqlite" => Ok(DbKind::SqliteFile),
            "sqlite-memory" | "sqlite_memory" | "memory" => Ok(DbKind::SqliteMemory),
            other => Err(AppError::config(format!("Unknown DB_KIND '{other}'"))),
        }
    }
}

/// Reads `DB_KIND` (default `postgres`).
pub fn db_kind_from_env() -> Result<DbKind, AppError> {
    match env::var("DB_KIND") {
        Ok(raw) => raw.parse(),
        Err(_) => Ok(DbKind::Postgres),
    }
}

/// Builds the connection URL for `kind` from the process environment.
pub fn db_url(kind: DbKind) -> Result<String, AppError> {
    db_url_with(kind, |name| env::var(name).ok())
}

/// Same as [`db_url`] with an explicit variable lookup.
pub fn db_url_with<F>(kind: DbKind, lookup: F) -> Result<String, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    let must = |name: &str| {
        lookup(name).ok_or_else(|| {
            AppError::config(format!("Required environment variable '{name}' is not set"))
        })
    };

    match kind {
        DbKind::Postgres => {
            let host = lookup("POSTGRES_HOST").unwrap_or_else(|| "localhost".to_string());
            let port = lookup("POSTGRES_PORT").unwrap_or_else(|| "5432".to_string());
            let db_name = must("POSTGRES_DB")?;
            let user = must("APP_DB_USER")?;
            let password = must("APP_DB_PASSWORD")?;
            Ok(format!(
                "postgresql://{user}:{password}@{host}:{port}/{db_name}"
            ))
        }
        DbKind::SqliteFile => {
            let path = must("SQLITE_DB_PATH")?;
            Ok(format!("sqlite://{path}?mode=rwc"))
        }
        DbKind::SqliteMemory => Ok("sqlite::memory:".to_string()),
    }
}
