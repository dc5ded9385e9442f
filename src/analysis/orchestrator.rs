//! Background analysis of an ended session.
//!
//! Spawned detached when a session moves to `processing`; the caller that
//! ended the session has already been answered. The contract with the rest
//! of the system is narrow: exactly one terminal status write per run.

use super::engine::{AnalysisContext, AnalysisEngine, RealtimeMetrics, SessionMetadata};
use crate::error::{CoreError, CoreResult};
use crate::store::Store;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Launch the analysis for one session. Returns the outer task handle;
/// production callers drop it, tests await it.
///
/// The work itself runs in an inner task so that the terminal status write
/// happens no matter how the inner task ends — an engine panic surfaces
/// here as a `JoinError` and still lands the session in `failed` instead of
/// leaving it stuck in `processing`.
pub fn spawn(
    store: Arc<Store>,
    engine: Arc<dyn AnalysisEngine>,
    session_id: String,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(session_id, "starting comprehensive analysis");
        let inner = tokio::spawn(run(Arc::clone(&store), engine, session_id.clone()));

        match inner.await {
            Ok(Ok(actual_duration)) => {
                match store.mark_completed(&session_id, actual_duration) {
                    Ok(()) => info!(session_id, actual_duration, "analysis completed"),
                    Err(e) => error!(session_id, error = %e, "failed to record completion"),
                }
            }
            Ok(Err(e)) => {
                warn!(session_id, error = %e, "analysis failed");
                if let Err(e) = store.mark_failed(&session_id) {
                    error!(session_id, error = %e, "failed to record failure");
                }
            }
            Err(join_err) => {
                error!(session_id, error = %join_err, "analysis task crashed");
                if let Err(e) = store.mark_failed(&session_id) {
                    error!(session_id, error = %e, "failed to record failure");
                }
            }
        }
    })
}

/// Gather context, call the engine, persist the result. Returns the derived
/// actual duration for the completion write.
async fn run(
    store: Arc<Store>,
    engine: Arc<dyn AnalysisEngine>,
    session_id: String,
) -> CoreResult<i64> {
    let session = store.get_session_unchecked(&session_id)?;
    let audio = store.latest_audio(&session_id)?;

    // Missing audio is fine: the text-only path analyzes an empty
    // transcript rather than aborting.
    let (transcribed_text, actual_duration) = match &audio {
        Some(audio) => {
            let transcription = audio.transcription.as_ref();
            let text = transcription
                .and_then(|t| t["text"].as_str())
                .unwrap_or_default()
                .to_string();
            let duration = transcription
                .and_then(|t| t["duration"].as_f64())
                .or(audio.duration)
                .unwrap_or(0.0);
            (text, duration.round() as i64)
        }
        None => (String::new(), 0),
    };

    let metadata_duration = if actual_duration > 0 {
        actual_duration
    } else {
        session.actual_duration.unwrap_or(0)
    };

    let ctx = AnalysisContext {
        // Script storage is a pending feature; the engine handles an empty
        // script.
        script_text: String::new(),
        transcribed_text,
        session_metadata: SessionMetadata {
            title: session.title,
            theme: session.theme,
            expected_duration: session.expected_duration,
            actual_duration: metadata_duration,
        },
        realtime_metrics: RealtimeMetrics::default(),
    };

    let outcome = engine
        .analyze(&ctx)
        .await
        .map_err(|e| CoreError::AnalysisFailure(e.to_string()))?;

    store.upsert_analysis(&session_id, &outcome)?;
    Ok(actual_duration)
}
