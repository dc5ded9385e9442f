use super::Store;
use crate::analysis::engine::AnalysisOutcome;
use crate::error::CoreResult;
use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use serde::Serialize;

/// The stored analysis row for a session. At most one exists per session id.
#[derive(Debug, Clone, Serialize)]
pub struct StoredAnalysis {
    pub session_id: String,
    pub overall_score: Option<f64>,
    pub expression_score: Option<f64>,
    pub comprehension_score: Option<f64>,
    pub delivery_score: Option<f64>,
    pub engagement_score: Option<f64>,
    /// Full engine output; schema owned by the analysis engine.
    pub analysis_data: serde_json::Value,
    pub video_url: Option<String>,
}

impl Store {
    /// Atomic create-or-overwrite of the analysis for a session. A
    /// previously attached video URL survives the overwrite.
    pub fn upsert_analysis(&self, session_id: &str, outcome: &AnalysisOutcome) -> CoreResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn().execute(
            "INSERT INTO analysis_results
                 (session_id, overall_score, expression_score, comprehension_score,
                  delivery_score, engagement_score, analysis_data, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
             ON CONFLICT(session_id) DO UPDATE SET
                 overall_score = excluded.overall_score,
                 expression_score = excluded.expression_score,
                 comprehension_score = excluded.comprehension_score,
                 delivery_score = excluded.delivery_score,
                 engagement_score = excluded.engagement_score,
                 analysis_data = excluded.analysis_data,
                 updated_at = excluded.updated_at",
            params![
                session_id,
                outcome.overall_score,
                outcome.scores.expression,
                outcome.scores.comprehension,
                outcome.scores.delivery,
                outcome.scores.engagement,
                outcome.payload.to_string(),
                now,
            ],
        )?;
        Ok(())
    }

    /// Record a video artifact URL, creating a placeholder result row when
    /// the analysis has not landed yet. No ordering constraint exists
    /// between this and `upsert_analysis`.
    pub fn attach_video_url(&self, session_id: &str, video_url: &str) -> CoreResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn().execute(
            "INSERT INTO analysis_results (session_id, analysis_data, video_url, created_at, updated_at)
             VALUES (?1, '{}', ?2, ?3, ?3)
             ON CONFLICT(session_id) DO UPDATE SET
                 video_url = excluded.video_url,
                 updated_at = excluded.updated_at",
            params![session_id, video_url, now],
        )?;
        Ok(())
    }

    /// `None` before the orchestrator has produced a result; callers must
    /// not treat that as an error while the session is still in flight.
    pub fn get_analysis(&self, session_id: &str) -> CoreResult<Option<StoredAnalysis>> {
        let result = self
            .conn()
            .query_row(
                "SELECT session_id, overall_score, expression_score, comprehension_score,
                        delivery_score, engagement_score, analysis_data, video_url
                 FROM analysis_results WHERE session_id = ?1",
                params![session_id],
                |row| {
                    let analysis_data: String = row.get(6)?;
                    Ok(StoredAnalysis {
                        session_id: row.get(0)?,
                        overall_score: row.get(1)?,
                        expression_score: row.get(2)?,
                        comprehension_score: row.get(3)?,
                        delivery_score: row.get(4)?,
                        engagement_score: row.get(5)?,
                        analysis_data: serde_json::from_str(&analysis_data)
                            .unwrap_or(serde_json::Value::Null),
                        video_url: row.get(7)?,
                    })
                },
            )
            .optional()?;
        Ok(result)
    }

    /// Number of analysis rows for a session; the schema caps it at one.
    pub fn analysis_row_count(&self, session_id: &str) -> CoreResult<i64> {
        let count = self.conn().query_row(
            "SELECT COUNT(*) FROM analysis_results WHERE session_id = ?1",
            params![session_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
