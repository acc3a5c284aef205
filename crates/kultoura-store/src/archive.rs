//! Durable score sink backed by the `score_submissions` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use kultoura_scoring::{SaveError, ScoreSink};
use kultoura_types::{ScoreSubmission, ScoringMode};

use crate::postgres::PostgresPool;
use crate::StoreError;

/// Archives every saved score sheet as one row.
#[derive(Debug, Clone)]
pub struct ScoreArchive {
    pool: PgPool,
}

impl ScoreArchive {
    /// Create an archive bound to a connection pool.
    pub fn new(pool: &PostgresPool) -> Self {
        Self {
            pool: pool.pool().clone(),
        }
    }

    /// Insert one submission.
    ///
    /// Re-inserting the same submission id is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Serialization`] if the sheet cannot be encoded
    /// and [`StoreError::Postgres`] if the insert fails.
    pub async fn insert(&self, submission: &ScoreSubmission) -> Result<(), StoreError> {
        let sheet = serde_json::to_value(&submission.sheet)?;
        let totals = serde_json::to_value(&submission.totals)?;

        sqlx::query(
            r"INSERT INTO score_submissions (id, event_id, station, scoring_mode, sheet, totals, submitted_at)
              VALUES ($1, $2, $3, $4, $5, $6, $7)
              ON CONFLICT (id) DO NOTHING",
        )
        .bind(submission.id)
        .bind(submission.event_id.as_str())
        .bind(submission.station.as_deref())
        .bind(mode_to_db(submission.scoring_mode))
        .bind(&sheet)
        .bind(&totals)
        .bind(submission.submitted_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!(
            submission_id = %submission.id,
            event_id = %submission.event_id,
            "Archived score submission"
        );
        Ok(())
    }

    /// Most recent submissions for an event, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Postgres`] if the query fails.
    pub async fn list_for_event(
        &self,
        event_id: &str,
        limit: i64,
    ) -> Result<Vec<SubmissionRow>, StoreError> {
        let rows = sqlx::query_as::<_, SubmissionRow>(
            r"SELECT id, event_id, station, scoring_mode, sheet, totals, submitted_at
              FROM score_submissions
              WHERE event_id = $1
              ORDER BY submitted_at DESC
              LIMIT $2",
        )
        .bind(event_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

impl ScoreSink for ScoreArchive {
    async fn submit(&self, submission: &ScoreSubmission) -> Result<(), SaveError> {
        self.insert(submission)
            .await
            .map_err(|e| SaveError::Backend(e.to_string()))
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}

/// A row from the `score_submissions` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SubmissionRow {
    /// Submission UUID.
    pub id: Uuid,
    /// Event the sheet belongs to.
    pub event_id: String,
    /// Judging station label, if any.
    pub station: Option<String>,
    /// `additive` or `percentage`.
    pub scoring_mode: String,
    /// The raw score sheet.
    pub sheet: serde_json::Value,
    /// Per-team totals.
    pub totals: serde_json::Value,
    /// When the save was requested.
    pub submitted_at: DateTime<Utc>,
}

const fn mode_to_db(mode: ScoringMode) -> &'static str {
    match mode {
        ScoringMode::Additive => "additive",
        ScoringMode::Percentage => "percentage",
    }
}
