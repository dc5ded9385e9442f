// Integration tests for the durable store: guarded status transitions and
// idempotent analysis upserts.

use chrono::Utc;
use podium::analysis::AnalysisOutcome;
use podium::{CoreError, SessionRecord, SessionStatus, Store};
use serde_json::json;

fn make_session(id: &str, owner: &str) -> SessionRecord {
    SessionRecord {
        id: id.to_string(),
        owner: owner.to_string(),
        title: "Quarterly review".to_string(),
        theme: "informative".to_string(),
        background_noise: "none".to_string(),
        ai_questions_enabled: true,
        expected_duration: 300,
        actual_duration: None,
        status: SessionStatus::Created,
        created_at: Utc::now(),
    }
}

fn store_with_session(id: &str, owner: &str) -> Store {
    let store = Store::open_in_memory().unwrap();
    store.insert_session(&make_session(id, owner)).unwrap();
    store
}

#[test]
fn insert_and_fetch_roundtrip() {
    let store = store_with_session("session_0001", "alice");
    let session = store.get_session("session_0001", "alice").unwrap();
    assert_eq!(session.title, "Quarterly review");
    assert_eq!(session.status, SessionStatus::Created);
    assert_eq!(session.actual_duration, None);
}

#[test]
fn foreign_owner_and_missing_id_are_the_same_not_found() {
    let store = store_with_session("session_0001", "alice");

    let foreign = store.get_session("session_0001", "mallory").unwrap_err();
    let missing = store.get_session("session_nope", "alice").unwrap_err();
    assert!(matches!(foreign, CoreError::NotFound));
    assert!(matches!(missing, CoreError::NotFound));
    assert_eq!(foreign.to_string(), missing.to_string());
}

#[test]
fn transitions_move_forward_only() {
    let store = store_with_session("session_0001", "alice");

    store.mark_active("session_0001", "alice").unwrap();
    store.mark_processing("session_0001", "alice").unwrap();
    store.mark_completed("session_0001", 245).unwrap();

    let session = store.get_session("session_0001", "alice").unwrap();
    assert_eq!(session.status, SessionStatus::Completed);
    assert_eq!(session.actual_duration, Some(245));

    // Terminal state is absorbing: nothing moves it.
    assert!(matches!(
        store.mark_active("session_0001", "alice"),
        Err(CoreError::NotFound)
    ));
    assert!(matches!(
        store.mark_processing("session_0001", "alice"),
        Err(CoreError::NotFound)
    ));
    assert!(matches!(
        store.mark_failed("session_0001"),
        Err(CoreError::NotFound)
    ));
    let session = store.get_session("session_0001", "alice").unwrap();
    assert_eq!(session.status, SessionStatus::Completed);
}

#[test]
fn end_is_allowed_without_start() {
    let store = store_with_session("session_0001", "alice");
    store.mark_processing("session_0001", "alice").unwrap();
    let session = store.get_session("session_0001", "alice").unwrap();
    assert_eq!(session.status, SessionStatus::Processing);
}

#[test]
fn second_processing_attempt_loses_the_race() {
    let store = store_with_session("session_0001", "alice");
    store.mark_processing("session_0001", "alice").unwrap();
    assert!(matches!(
        store.mark_processing("session_0001", "alice"),
        Err(CoreError::NotFound)
    ));
}

#[test]
fn start_is_idempotent_from_active() {
    let store = store_with_session("session_0001", "alice");
    store.mark_active("session_0001", "alice").unwrap();
    store.mark_active("session_0001", "alice").unwrap();
    let session = store.get_session("session_0001", "alice").unwrap();
    assert_eq!(session.status, SessionStatus::Active);
}

#[test]
fn analysis_upsert_is_idempotent() {
    let store = store_with_session("session_0001", "alice");

    let first = AnalysisOutcome::from_payload(json!({
        "overall_score": 70.0,
        "detailed_scores": { "delivery": 68.0 }
    }));
    let second = AnalysisOutcome::from_payload(json!({
        "overall_score": 85.0,
        "detailed_scores": { "delivery": 82.0 }
    }));

    store.upsert_analysis("session_0001", &first).unwrap();
    store.upsert_analysis("session_0001", &second).unwrap();

    assert_eq!(store.analysis_row_count("session_0001").unwrap(), 1);
    let stored = store.get_analysis("session_0001").unwrap().unwrap();
    assert_eq!(stored.overall_score, Some(85.0));
    assert_eq!(stored.delivery_score, Some(82.0));
}

#[test]
fn video_url_before_analysis_creates_placeholder() {
    let store = store_with_session("session_0001", "alice");

    store
        .attach_video_url("session_0001", "/uploads/videos/talk.mp4")
        .unwrap();
    let stored = store.get_analysis("session_0001").unwrap().unwrap();
    assert_eq!(stored.video_url.as_deref(), Some("/uploads/videos/talk.mp4"));
    assert_eq!(stored.overall_score, None);
    assert_eq!(stored.analysis_data, json!({}));

    // The later analysis write keeps the video URL.
    let outcome = AnalysisOutcome::from_payload(json!({ "overall_score": 91.0 }));
    store.upsert_analysis("session_0001", &outcome).unwrap();

    assert_eq!(store.analysis_row_count("session_0001").unwrap(), 1);
    let stored = store.get_analysis("session_0001").unwrap().unwrap();
    assert_eq!(stored.overall_score, Some(91.0));
    assert_eq!(stored.video_url.as_deref(), Some("/uploads/videos/talk.mp4"));
}

#[test]
fn video_url_after_analysis_updates_in_place() {
    let store = store_with_session("session_0001", "alice");

    let outcome = AnalysisOutcome::from_payload(json!({ "overall_score": 77.0 }));
    store.upsert_analysis("session_0001", &outcome).unwrap();
    store
        .attach_video_url("session_0001", "/uploads/videos/talk.mp4")
        .unwrap();

    assert_eq!(store.analysis_row_count("session_0001").unwrap(), 1);
    let stored = store.get_analysis("session_0001").unwrap().unwrap();
    assert_eq!(stored.overall_score, Some(77.0));
    assert_eq!(stored.video_url.as_deref(), Some("/uploads/videos/talk.mp4"));
}

#[test]
fn missing_analysis_is_none_not_error() {
    let store = store_with_session("session_0001", "alice");
    assert!(store.get_analysis("session_0001").unwrap().is_none());
}

#[test]
fn latest_audio_picks_most_recent_row() {
    let store = store_with_session("session_0001", "alice");

    store
        .insert_audio(
            "session_0001",
            "/uploads/audio/take1.wav",
            Some(&json!({"text": "first take", "duration": 30.0})),
            Some(30.0),
        )
        .unwrap();
    store
        .insert_audio(
            "session_0001",
            "/uploads/audio/take2.wav",
            Some(&json!({"text": "second take", "duration": 45.0})),
            Some(45.0),
        )
        .unwrap();

    let latest = store.latest_audio("session_0001").unwrap().unwrap();
    assert_eq!(latest.file_path, "/uploads/audio/take2.wav");
    assert_eq!(latest.transcription.unwrap()["text"], "second take");
}

#[test]
fn no_audio_is_none() {
    let store = store_with_session("session_0001", "alice");
    assert!(store.latest_audio("session_0001").unwrap().is_none());
}

#[test]
fn store_survives_reopen() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("podium.db");

    {
        let store = Store::open(&path)?;
        store.insert_session(&make_session("session_0001", "alice"))?;
        store.mark_processing("session_0001", "alice")?;
    }

    let store = Store::open(&path)?;
    let session = store.get_session("session_0001", "alice")?;
    assert_eq!(session.status, SessionStatus::Processing);
    Ok(())
}
