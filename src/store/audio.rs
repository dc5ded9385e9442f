use super::Store;
use crate::error::CoreResult;
use chrono::Utc;
use rusqlite::{params, OptionalExtension};

/// A captured audio artifact for a session. Written by the upload
/// collaborator; the core only ever reads the most recent one.
#[derive(Debug, Clone)]
pub struct AudioRecord {
    pub session_id: String,
    pub file_path: String,
    /// Opaque transcription payload (text + duration + word detail).
    pub transcription: Option<serde_json::Value>,
    pub duration: Option<f64>,
}

impl Store {
    pub fn insert_audio(
        &self,
        session_id: &str,
        file_path: &str,
        transcription: Option<&serde_json::Value>,
        duration: Option<f64>,
    ) -> CoreResult<()> {
        let transcription_text = transcription.map(|t| t.to_string());
        self.conn().execute(
            "INSERT INTO audio_data (session_id, file_path, transcription, duration, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                session_id,
                file_path,
                transcription_text,
                duration,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// The most recently created audio row for a session, if any.
    pub fn latest_audio(&self, session_id: &str) -> CoreResult<Option<AudioRecord>> {
        let record = self
            .conn()
            .query_row(
                "SELECT session_id, file_path, transcription, duration
                 FROM audio_data
                 WHERE session_id = ?1
                 ORDER BY created_at DESC, id DESC
                 LIMIT 1",
                params![session_id],
                |row| {
                    let transcription: Option<String> = row.get(2)?;
                    Ok(AudioRecord {
                        session_id: row.get(0)?,
                        file_path: row.get(1)?,
                        transcription: transcription
                            .and_then(|t| serde_json::from_str(&t).ok()),
                        duration: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }
}
