use super::types::{SessionDraft, SessionRecord, SessionStatus};
use crate::analysis::engine::AnalysisEngine;
use crate::analysis::orchestrator;
use crate::error::{CoreError, CoreResult};
use crate::store::{Store, StoredAnalysis};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Returned by session creation: the new id plus where to connect for live
/// feedback.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedSession {
    pub session_id: String,
    /// Path the viewer/presenter WebSocket must connect to.
    pub websocket_path: String,
}

/// Acknowledgement for ending a session. `estimated_completion` is advisory
/// only; a session may legitimately stay in `processing` past it.
#[derive(Debug, Clone, Serialize)]
pub struct EndAck {
    pub analysis_job_id: String,
    pub estimated_completion: DateTime<Utc>,
}

/// Session record together with its analysis result, if one exists yet.
#[derive(Debug, Clone, Serialize)]
pub struct SessionDetail {
    pub session: SessionRecord,
    pub analysis: Option<StoredAnalysis>,
}

/// Guarded session lifecycle operations plus result access.
///
/// All status writes go through the store's single-UPDATE transitions, so
/// concurrent calls on the same session cannot interleave. Ending a session
/// schedules the analysis orchestrator and returns without waiting on it.
pub struct SessionService {
    store: Arc<Store>,
    engine: Arc<dyn AnalysisEngine>,
    estimated_completion_secs: u64,
}

impl SessionService {
    pub fn new(
        store: Arc<Store>,
        engine: Arc<dyn AnalysisEngine>,
        estimated_completion_secs: u64,
    ) -> Self {
        Self {
            store,
            engine,
            estimated_completion_secs,
        }
    }

    pub fn create_session(&self, owner: &str, draft: SessionDraft) -> CoreResult<CreatedSession> {
        if draft.title.trim().is_empty() {
            return Err(CoreError::InvalidConfig("title must not be empty".into()));
        }
        if draft.expected_duration <= 0 {
            return Err(CoreError::InvalidConfig(
                "expected_duration must be positive".into(),
            ));
        }

        let session_id = generate_session_id();
        let record = SessionRecord {
            id: session_id.clone(),
            owner: owner.to_string(),
            title: draft.title,
            theme: draft.theme,
            background_noise: draft.background_noise,
            ai_questions_enabled: draft.ai_questions_enabled,
            expected_duration: draft.expected_duration,
            actual_duration: None,
            status: SessionStatus::Created,
            created_at: Utc::now(),
        };
        self.store.insert_session(&record)?;
        info!(session_id, owner, "session created");

        Ok(CreatedSession {
            websocket_path: format!("/ws/{session_id}"),
            session_id,
        })
    }

    /// Move a session to `active`. Ownership failures and ineligible states
    /// are indistinguishable from a missing session.
    pub fn start_session(&self, session_id: &str, caller: &str) -> CoreResult<()> {
        self.store.mark_active(session_id, caller)?;
        info!(session_id, "session started");
        Ok(())
    }

    /// Move a session to `processing` and schedule its analysis. Returns
    /// immediately; the orchestrator alone drives the terminal transition.
    /// A concurrent duplicate call loses the guarded UPDATE and gets
    /// `NotFound`, so at most one analysis runs per session.
    pub fn end_session(&self, session_id: &str, caller: &str) -> CoreResult<EndAck> {
        self.store.mark_processing(session_id, caller)?;
        info!(session_id, "session ended, scheduling analysis");

        orchestrator::spawn(
            Arc::clone(&self.store),
            Arc::clone(&self.engine),
            session_id.to_string(),
        );

        Ok(EndAck {
            analysis_job_id: format!("analysis_{session_id}"),
            estimated_completion: Utc::now()
                + Duration::seconds(self.estimated_completion_secs as i64),
        })
    }

    pub fn session_detail(&self, session_id: &str, caller: &str) -> CoreResult<SessionDetail> {
        let session = self.store.get_session(session_id, caller)?;
        let analysis = self.store.get_analysis(session_id)?;
        Ok(SessionDetail { session, analysis })
    }

    /// The stored analysis, ownership-checked. `Ok(None)` while the session
    /// has not completed (or its analysis failed) is a normal answer.
    pub fn get_analysis(
        &self,
        session_id: &str,
        caller: &str,
    ) -> CoreResult<Option<StoredAnalysis>> {
        self.store.get_session(session_id, caller)?;
        self.store.get_analysis(session_id)
    }

    /// Record a video artifact URL for a session, before or after its
    /// analysis lands.
    pub fn attach_video_url(&self, session_id: &str, caller: &str, url: &str) -> CoreResult<()> {
        self.store.get_session(session_id, caller)?;
        self.store.attach_video_url(session_id, url)?;
        info!(session_id, url, "video url attached");
        Ok(())
    }

    /// Surface for the upload collaborator: a transcribed audio artifact
    /// landed at `file_path` for this session.
    pub fn record_audio(
        &self,
        session_id: &str,
        caller: &str,
        file_path: &str,
        transcription: Option<&serde_json::Value>,
        duration: Option<f64>,
    ) -> CoreResult<()> {
        self.store.get_session(session_id, caller)?;
        self.store
            .insert_audio(session_id, file_path, transcription, duration)
    }
}

fn generate_session_id() -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("session_{}", &hex[..8])
}
