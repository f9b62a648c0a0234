//! Confirmed mapping cache
//!
//! Append-only SQLite log of reviewed classifications keyed by
//! (account text, context). Confirmations and rejections are both kept;
//! lookups only ever see confirmed rows, latest insert first.
//!
//! The `mappings` table layout (including the unused `label_code` column and
//! the `ind_as` / `timestamp` column names) stays compatible with existing
//! `account_mappings.db` files.

use crate::error::Result;
use chrono::{NaiveDateTime, Utc};
use indas_mapper_common::{ClassificationResult, Context};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One persisted review decision
#[derive(Debug, Clone, PartialEq)]
pub struct MappingRecord {
    pub id: i64,
    pub input_text: String,
    pub context: String,
    pub result: ClassificationResult,
    pub confirmed: bool,
    pub created_at: Option<NaiveDateTime>,
}

/// Row counts of the mapping log
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub total: usize,
    pub confirmed: usize,
    pub rejected: usize,
}

pub struct MappingStore {
    conn: Connection,
}

impl MappingStore {
    /// Open (creating if absent) the mapping database
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        setup_database(&conn)?;
        Ok(Self { conn })
    }

    /// Latest confirmed classification for (text, context)
    pub fn lookup(&self, text: &str, context: Context) -> Result<Option<ClassificationResult>> {
        let result = self
            .conn
            .query_row(
                "SELECT classification_type, label_path, reasoning, ind_as
                 FROM mappings
                 WHERE input_text = ?1 AND context = ?2 AND confirmed = 1
                 ORDER BY id DESC
                 LIMIT 1",
                params![text, context.as_str()],
                |row| {
                    Ok(ClassificationResult {
                        classification_type: text_or_unknown(row, 0)?,
                        label_path: text_or_unknown(row, 1)?,
                        reasoning: text_or_unknown(row, 2)?,
                        ind_as_reference: text_or_unknown(row, 3)?,
                    })
                },
            )
            .optional()?;

        Ok(result)
    }

    /// Append a review decision. Never updates or deduplicates.
    ///
    /// Returns the new row id.
    pub fn record(
        &self,
        text: &str,
        context: Context,
        result: &ClassificationResult,
        confirmed: bool,
    ) -> Result<i64> {
        let created_at = Utc::now().naive_utc().format(TIMESTAMP_FORMAT).to_string();

        self.conn.execute(
            "INSERT INTO mappings (
                input_text, context, classification_type, label_path,
                reasoning, ind_as, confirmed, timestamp
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                text,
                context.as_str(),
                result.classification_type,
                result.label_path,
                result.reasoning,
                result.ind_as_reference,
                confirmed,
                created_at,
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    /// Every record for (text, context), newest first
    pub fn history(&self, text: &str, context: Context) -> Result<Vec<MappingRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, input_text, context, classification_type, label_path,
                    reasoning, ind_as, confirmed, timestamp
             FROM mappings
             WHERE input_text = ?1 AND context = ?2
             ORDER BY id DESC",
        )?;

        let records = stmt
            .query_map(params![text, context.as_str()], |row| {
                let timestamp: Option<String> = row.get(8)?;
                Ok(MappingRecord {
                    id: row.get(0)?,
                    input_text: row.get(1)?,
                    context: row.get(2)?,
                    result: ClassificationResult {
                        classification_type: text_or_unknown(row, 3)?,
                        label_path: text_or_unknown(row, 4)?,
                        reasoning: text_or_unknown(row, 5)?,
                        ind_as_reference: text_or_unknown(row, 6)?,
                    },
                    confirmed: row.get::<_, Option<bool>>(7)?.unwrap_or(false),
                    created_at: timestamp
                        .and_then(|t| NaiveDateTime::parse_from_str(&t, TIMESTAMP_FORMAT).ok()),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(records)
    }

    pub fn stats(&self) -> Result<CacheStats> {
        let (total, confirmed): (i64, i64) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(CASE WHEN confirmed = 1 THEN 1 ELSE 0 END), 0)
             FROM mappings",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok(CacheStats {
            total: total as usize,
            confirmed: confirmed as usize,
            rejected: (total - confirmed) as usize,
        })
    }
}

/// Create the mapping table and lookup index if they do not exist
pub fn setup_database(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS mappings (
            id INTEGER PRIMARY KEY,
            input_text TEXT,
            context TEXT,
            classification_type TEXT,
            label_path TEXT,
            label_code TEXT,
            reasoning TEXT,
            ind_as TEXT,
            confirmed BOOLEAN,
            timestamp DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_mappings_lookup
         ON mappings(input_text, context, confirmed)",
        [],
    )?;

    Ok(())
}

// legacy rows may hold NULLs
fn text_or_unknown(row: &Row<'_>, idx: usize) -> rusqlite::Result<String> {
    Ok(row
        .get::<_, Option<String>>(idx)?
        .unwrap_or_else(|| indas_mapper_common::UNKNOWN.to_string()))
}
