//! Durable, origin-scoped key-value storage backed by SQLite.

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use std::{fs, path::PathBuf, str::FromStr};
use url::Url;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://./data/admit.db";

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

impl Storage {
    /// Opens (creating if needed) the database at `database_url`, which may
    /// also be a plain file path.
    pub async fn new(database_url: &str) -> Result<Self> {
        let database_url = normalize_database_url(database_url);
        ensure_parent_dir(&database_url)?;

        let connect_options =
            SqliteConnectOptions::from_str(&database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    /// Writes `value` under `key`, replacing whatever the origin held before.
    pub async fn set_item(&self, origin: &str, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO local_storage (origin, item_key, item_value, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(origin, item_key) DO UPDATE SET
                item_value = excluded.item_value,
                updated_at = excluded.updated_at",
        )
        .bind(origin)
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to store item '{key}' for origin '{origin}'"))?;
        Ok(())
    }

    pub async fn get_item(&self, origin: &str, key: &str) -> Result<Option<String>> {
        let row = sqlx::query(
            "SELECT item_value FROM local_storage WHERE origin = ?1 AND item_key = ?2",
        )
        .bind(origin)
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| r.get::<String, _>(0)))
    }

    pub async fn keys(&self, origin: &str) -> Result<Vec<String>> {
        let rows = sqlx::query(
            "SELECT item_key FROM local_storage WHERE origin = ?1 ORDER BY item_key",
        )
        .bind(origin)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|row| row.get::<String, _>(0))
            .collect())
    }
}

/// Serializes the origin (scheme, host, port) of `base_url`.
///
/// Default ports are dropped, so `http://host:80` and `http://host` share
/// one origin.
pub fn origin_of(base_url: &str) -> Result<String> {
    let url = Url::parse(base_url.trim())
        .with_context(|| format!("invalid origin url '{base_url}'"))?;
    let origin = url.origin();
    if !origin.is_tuple() {
        return Err(anyhow!("url '{base_url}' has an opaque origin"));
    }
    Ok(origin.ascii_serialization())
}

/// Rewrites plain paths and `sqlite:` shorthands into `sqlite://` URLs.
///
/// An empty value falls back to [`DEFAULT_DATABASE_URL`]; in-memory and
/// other full URLs pass through untouched.
pub fn normalize_database_url(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return DEFAULT_DATABASE_URL.to_string();
    }
    if raw.starts_with("sqlite::memory:") || raw.contains("://") {
        return raw.to_string();
    }

    let path = raw.strip_prefix("sqlite:").unwrap_or(raw);
    format!("sqlite://{}", path.replace('\\', "/"))
}

fn ensure_parent_dir(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_file_path(database_url) else {
        return Ok(());
    };
    let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })
}

fn sqlite_file_path(database_url: &str) -> Option<PathBuf> {
    let path = database_url
        .strip_prefix("sqlite://")?
        .split('?')
        .next()
        .filter(|path| !path.is_empty() && !path.starts_with(":memory:"))?;
    Some(PathBuf::from(path))
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
