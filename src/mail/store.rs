//! SQLite persistence for emails and their embedded body sections.
//!
//! Embeddings are stored as little-endian f32 BLOBs next to the section
//! text; retrieval is brute-force cosine scoring over the candidate rows.

use std::path::{Path, PathBuf};

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::types::Json;
use sqlx::{Row, SqlitePool};

use super::types::{EmailDetail, EmailPayload, EmailSection, SectionMatch, StoredEmail};
use crate::core::config::AppPaths;
use crate::core::errors::ApiError;

#[derive(Clone)]
pub struct MailStore {
    pool: SqlitePool,
    db_path: PathBuf,
}

impl MailStore {
    pub async fn new(paths: &AppPaths) -> Result<Self, ApiError> {
        Self::with_path(paths.db_path.clone()).await
    }

    pub async fn with_path(db_path: PathBuf) -> Result<Self, ApiError> {
        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(ApiError::internal)?;

        let store = Self { pool, db_path };
        store.init_schema().await?;
        Ok(store)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    async fn init_schema(&self) -> Result<(), ApiError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS emails (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                subject TEXT NOT NULL,
                sender TEXT NOT NULL,
                recipient TEXT NOT NULL,
                cc TEXT,
                bcc TEXT,
                body TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(ApiError::internal)?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS email_sections (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email_id INTEGER NOT NULL REFERENCES emails(id) ON DELETE CASCADE,
                section_order INTEGER NOT NULL,
                content TEXT NOT NULL,
                embedding BLOB NOT NULL,
                UNIQUE(email_id, section_order)
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(ApiError::internal)?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_sections_email ON email_sections(email_id)")
            .execute(&self.pool)
            .await
            .map_err(ApiError::internal)?;

        Ok(())
    }

    /// Persist an email and its embedded sections in one transaction.
    ///
    /// Sections are numbered 1..=n in the order given, so committed rows
    /// always carry a contiguous order sequence. A failure on any row rolls
    /// the whole email back. An email whose body produced no sections
    /// stores just the email row.
    pub async fn insert_email_with_sections(
        &self,
        email: &EmailPayload,
        sections: &[(String, Vec<f32>)],
    ) -> Result<i64, ApiError> {
        let mut tx = self.pool.begin().await.map_err(ApiError::internal)?;

        let result = sqlx::query(
            "INSERT INTO emails (subject, sender, recipient, cc, bcc, body, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&email.subject)
        .bind(&email.sender)
        .bind(Json(&email.recipient))
        .bind(email.cc.as_ref().map(Json))
        .bind(email.bcc.as_ref().map(Json))
        .bind(&email.body)
        .bind(Utc::now().to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(ApiError::internal)?;

        let email_id = result.last_insert_rowid();

        for (index, (content, embedding)) in sections.iter().enumerate() {
            sqlx::query(
                "INSERT INTO email_sections (email_id, section_order, content, embedding)
                 VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(email_id)
            .bind(index as i64 + 1)
            .bind(content)
            .bind(Self::serialize_embedding(embedding))
            .execute(&mut *tx)
            .await
            .map_err(ApiError::internal)?;
        }

        tx.commit().await.map_err(ApiError::internal)?;
        Ok(email_id)
    }

    pub async fn list_emails(&self) -> Result<Vec<StoredEmail>, ApiError> {
        let rows = sqlx::query(
            "SELECT id, subject, sender, recipient, cc, bcc, body, created_at
             FROM emails
             ORDER BY id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(ApiError::internal)?;

        Ok(rows.iter().map(Self::row_to_email).collect())
    }

    pub async fn get_email(&self, id: i64) -> Result<Option<EmailDetail>, ApiError> {
        let row = sqlx::query(
            "SELECT id, subject, sender, recipient, cc, bcc, body, created_at
             FROM emails
             WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(ApiError::internal)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let sections = sqlx::query(
            "SELECT id, email_id, section_order, content
             FROM email_sections
             WHERE email_id = ?1
             ORDER BY section_order",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(ApiError::internal)?;

        Ok(Some(EmailDetail {
            email: Self::row_to_email(&row),
            sections: sections.iter().map(Self::row_to_section).collect(),
        }))
    }

    /// Ranked similarity retrieval over stored sections.
    ///
    /// When `mailbox_filter` is set, only sections of emails in which that
    /// address appears as sender, recipient, cc or bcc are candidates.
    /// Candidates scoring below `match_threshold` are dropped; the rest are
    /// returned best-first, at most `match_count` of them.
    pub async fn match_sections(
        &self,
        query_embedding: &[f32],
        match_threshold: f32,
        match_count: usize,
        mailbox_filter: Option<&str>,
    ) -> Result<Vec<SectionMatch>, ApiError> {
        let rows = if let Some(address) = mailbox_filter {
            sqlx::query(
                "SELECT s.email_id, s.section_order, s.content, s.embedding
                 FROM email_sections s
                 JOIN emails e ON e.id = s.email_id
                 WHERE e.sender = ?1
                    OR EXISTS (SELECT 1 FROM json_each(e.recipient) AS r WHERE r.value = ?1)
                    OR (e.cc IS NOT NULL
                        AND EXISTS (SELECT 1 FROM json_each(e.cc) AS c WHERE c.value = ?1))
                    OR (e.bcc IS NOT NULL
                        AND EXISTS (SELECT 1 FROM json_each(e.bcc) AS b WHERE b.value = ?1))",
            )
            .bind(address)
            .fetch_all(&self.pool)
            .await
            .map_err(ApiError::internal)?
        } else {
            sqlx::query("SELECT email_id, section_order, content, embedding FROM email_sections")
                .fetch_all(&self.pool)
                .await
                .map_err(ApiError::internal)?
        };

        let mut matches: Vec<SectionMatch> = rows
            .iter()
            .filter_map(|row| {
                let blob: Vec<u8> = row.get("embedding");
                let stored = Self::deserialize_embedding(&blob);
                let similarity = Self::cosine_similarity(query_embedding, &stored);
                if similarity < match_threshold {
                    return None;
                }

                Some(SectionMatch {
                    email_id: row.get("email_id"),
                    section_order: row.get("section_order"),
                    content: row.get("content"),
                    similarity,
                })
            })
            .collect();

        matches.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matches.truncate(match_count);

        Ok(matches)
    }

    pub async fn email_count(&self) -> Result<usize, ApiError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM emails")
            .fetch_one(&self.pool)
            .await
            .map_err(ApiError::internal)?;
        Ok(count as usize)
    }

    pub async fn section_count(&self) -> Result<usize, ApiError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM email_sections")
            .fetch_one(&self.pool)
            .await
            .map_err(ApiError::internal)?;
        Ok(count as usize)
    }

    fn row_to_email(row: &sqlx::sqlite::SqliteRow) -> StoredEmail {
        StoredEmail {
            id: row.get("id"),
            subject: row.get("subject"),
            sender: row.get("sender"),
            recipient: row.get::<Json<Vec<String>>, _>("recipient"),
            cc: row.get::<Option<Json<Vec<String>>>, _>("cc"),
            bcc: row.get::<Option<Json<Vec<String>>>, _>("bcc"),
            body: row.get("body"),
            created_at: row.get("created_at"),
        }
    }

    fn row_to_section(row: &sqlx::sqlite::SqliteRow) -> EmailSection {
        EmailSection {
            id: row.get("id"),
            email_id: row.get("email_id"),
            section_order: row.get("section_order"),
            content: row.get("content"),
        }
    }

    fn serialize_embedding(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    fn deserialize_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect()
    }

    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() || a.is_empty() {
            return 0.0;
        }

        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        let denom = norm_a * norm_b;

        if denom <= f32::EPSILON {
            0.0
        } else {
            dot / denom
        }
    }
}
