use super::Store;
use crate::error::{CoreError, CoreResult};
use crate::session::types::{SessionRecord, SessionStatus};
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};

fn row_to_session(row: &Row<'_>) -> rusqlite::Result<SessionRecord> {
    let status: String = row.get(8)?;
    let created_at: String = row.get(9)?;
    Ok(SessionRecord {
        id: row.get(0)?,
        owner: row.get(1)?,
        title: row.get(2)?,
        theme: row.get(3)?,
        background_noise: row.get(4)?,
        ai_questions_enabled: row.get(5)?,
        expected_duration: row.get(6)?,
        actual_duration: row.get(7)?,
        status: SessionStatus::parse(&status).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                8,
                rusqlite::types::Type::Text,
                format!("unknown session status '{status}'").into(),
            )
        })?,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    9,
                    rusqlite::types::Type::Text,
                    e.into(),
                )
            })?,
    })
}

const SESSION_COLUMNS: &str = "id, owner, title, theme, background_noise, \
     ai_questions_enabled, expected_duration, actual_duration, status, created_at";

impl Store {
    pub fn insert_session(&self, session: &SessionRecord) -> CoreResult<()> {
        self.conn().execute(
            "INSERT INTO sessions (id, owner, title, theme, background_noise,
                 ai_questions_enabled, expected_duration, actual_duration, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                session.id,
                session.owner,
                session.title,
                session.theme,
                session.background_noise,
                session.ai_questions_enabled,
                session.expected_duration,
                session.actual_duration,
                session.status.as_str(),
                session.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Fetch a session owned by `owner`. A missing row and a row owned by
    /// someone else are both `NotFound`.
    pub fn get_session(&self, session_id: &str, owner: &str) -> CoreResult<SessionRecord> {
        self.conn()
            .query_row(
                &format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?1 AND owner = ?2"),
                params![session_id, owner],
                row_to_session,
            )
            .optional()?
            .ok_or(CoreError::NotFound)
    }

    /// Fetch a session without an ownership check. Internal use only (the
    /// orchestrator already runs on behalf of the owner).
    pub fn get_session_unchecked(&self, session_id: &str) -> CoreResult<SessionRecord> {
        self.conn()
            .query_row(
                &format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?1"),
                params![session_id],
                row_to_session,
            )
            .optional()?
            .ok_or(CoreError::NotFound)
    }

    /// `created | active → active`. Zero affected rows (absent, foreign
    /// owner, or ineligible state) reports `NotFound`.
    pub fn mark_active(&self, session_id: &str, owner: &str) -> CoreResult<()> {
        let changed = self.conn().execute(
            "UPDATE sessions SET status = 'active'
             WHERE id = ?1 AND owner = ?2 AND status IN ('created', 'active')",
            params![session_id, owner],
        )?;
        if changed == 0 {
            return Err(CoreError::NotFound);
        }
        Ok(())
    }

    /// `created | active → processing`. The guard makes a second concurrent
    /// end-session attempt lose the race and see `NotFound`.
    pub fn mark_processing(&self, session_id: &str, owner: &str) -> CoreResult<()> {
        let changed = self.conn().execute(
            "UPDATE sessions SET status = 'processing'
             WHERE id = ?1 AND owner = ?2 AND status IN ('created', 'active')",
            params![session_id, owner],
        )?;
        if changed == 0 {
            return Err(CoreError::NotFound);
        }
        Ok(())
    }

    /// `processing → completed`, recording the measured duration. Only the
    /// orchestrator calls this; the guard keeps terminal states absorbing.
    pub fn mark_completed(&self, session_id: &str, actual_duration: i64) -> CoreResult<()> {
        let changed = self.conn().execute(
            "UPDATE sessions SET status = 'completed', actual_duration = ?2
             WHERE id = ?1 AND status = 'processing'",
            params![session_id, actual_duration],
        )?;
        if changed == 0 {
            return Err(CoreError::NotFound);
        }
        Ok(())
    }

    /// `processing → failed`.
    pub fn mark_failed(&self, session_id: &str) -> CoreResult<()> {
        let changed = self.conn().execute(
            "UPDATE sessions SET status = 'failed'
             WHERE id = ?1 AND status = 'processing'",
            params![session_id],
        )?;
        if changed == 0 {
            return Err(CoreError::NotFound);
        }
        Ok(())
    }
}
