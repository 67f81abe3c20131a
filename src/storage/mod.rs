//! Persistent key/value storage for the client.
//!
//! Holds the small amount of state that must survive restarts: the auth
//! token and the chosen theme. Backed by a single SQLite file in the
//! user's data directory.

mod schema;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use crate::ui::theme::Theme;

const TOKEN_KEY: &str = "token";
const THEME_KEY: &str = "theme";

pub(crate) struct LocalStorage {
    conn: Connection,
}

impl LocalStorage {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open local storage: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .context("Failed to set storage pragmas")?;
        let mut storage = Self { conn };
        storage.migrate().context("Local storage migration failed")?;
        Ok(storage)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let mut storage = Self { conn };
        storage.migrate()?;
        Ok(storage)
    }

    fn migrate(&mut self) -> Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            return Ok(());
        }

        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                self.conn.execute_batch(sql)?;
            }
        }

        if current < schema::CURRENT_VERSION {
            self.conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
        }

        Ok(())
    }

    // ── Raw key/value ─────────────────────────────────────────

    pub(crate) fn get_item(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM local_storage WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    pub(crate) fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO local_storage (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, chrono::Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub(crate) fn remove_item(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM local_storage WHERE key = ?1", params![key])?;
        Ok(())
    }

    // ── Typed accessors ───────────────────────────────────────

    pub(crate) fn token(&self) -> Result<Option<String>> {
        Ok(self.get_item(TOKEN_KEY)?.filter(|t| !t.is_empty()))
    }

    pub(crate) fn set_token(&self, token: &str) -> Result<()> {
        self.set_item(TOKEN_KEY, token)
    }

    pub(crate) fn remove_token(&self) -> Result<()> {
        self.remove_item(TOKEN_KEY)
    }

    /// Stored theme, defaulting to dark when unset or unrecognised.
    pub(crate) fn theme(&self) -> Result<Theme> {
        Ok(self
            .get_item(THEME_KEY)?
            .and_then(|t| Theme::parse(&t))
            .unwrap_or_default())
    }

    pub(crate) fn set_theme(&self, theme: Theme) -> Result<()> {
        self.set_item(THEME_KEY, theme.as_str())
    }
}
