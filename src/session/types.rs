use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Session lifecycle states.
///
/// Transitions only move forward along
/// `created → active → processing → {completed | failed}`; the last two are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Created,
    Active,
    Processing,
    Completed,
    Failed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Created => "created",
            SessionStatus::Active => "active",
            SessionStatus::Processing => "processing",
            SessionStatus::Completed => "completed",
            SessionStatus::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "created" => Some(SessionStatus::Created),
            "active" => Some(SessionStatus::Active),
            "processing" => Some(SessionStatus::Processing),
            "completed" => Some(SessionStatus::Completed),
            "failed" => Some(SessionStatus::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Failed)
    }
}

/// Creation-time configuration for a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDraft {
    pub title: String,
    pub theme: String,
    pub background_noise: String,
    pub ai_questions_enabled: bool,
    /// Planned length of the talk, in seconds.
    pub expected_duration: i64,
}

impl Default for SessionDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            theme: "informative".to_string(),
            background_noise: "none".to_string(),
            ai_questions_enabled: true,
            expected_duration: 300,
        }
    }
}

/// A durable session row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: String,
    pub owner: String,
    pub title: String,
    pub theme: String,
    pub background_noise: String,
    pub ai_questions_enabled: bool,
    pub expected_duration: i64,
    /// Measured length of the talk, in seconds. Set when the session reaches
    /// `processing` or later.
    pub actual_duration: Option<i64>,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
}
