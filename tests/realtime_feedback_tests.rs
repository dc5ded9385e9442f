// Live feedback fan-out: telemetry frames in, realtime_feedback events out
// to exactly the viewers of the target session.

use podium::registry::{ViewerHandle, ViewerRegistry, SEND_QUEUE};
use podium::telemetry::route_frame;
use serde_json::Value;
use tokio::sync::mpsc;

fn audio_chunk(volume: f64) -> String {
    format!(
        r#"{{"type":"audio_chunk","timestamp":1700000000000,"volume_level":{volume},"speaking_pace":150}}"#
    )
}

#[tokio::test]
async fn low_volume_reaches_all_session_viewers_and_nobody_else() {
    let registry = ViewerRegistry::new();

    let (tx1, mut rx1) = mpsc::channel(SEND_QUEUE);
    let (tx2, mut rx2) = mpsc::channel(SEND_QUEUE);
    let (tx3, mut rx3) = mpsc::channel(SEND_QUEUE);
    registry
        .join("session_aaaa0001", ViewerHandle::new("v1".into(), tx1))
        .await;
    registry
        .join("session_aaaa0001", ViewerHandle::new("v2".into(), tx2))
        .await;
    registry
        .join("session_bbbb0002", ViewerHandle::new("v3".into(), tx3))
        .await;

    // A third channel (the presenter) reports low volume for session A.
    route_frame(&registry, "session_aaaa0001", &audio_chunk(0.1)).await;

    for rx in [&mut rx1, &mut rx2] {
        let raw = rx.try_recv().expect("viewer should receive feedback");
        let event: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(event["type"], "realtime_feedback");
        assert_eq!(event["feedback_type"], "volume_low");
        // Exactly one event per evaluated chunk.
        assert!(rx.try_recv().is_err());
    }
    assert!(rx3.try_recv().is_err());
}

#[tokio::test]
async fn normal_volume_broadcasts_nothing() {
    let registry = ViewerRegistry::new();
    let (tx, mut rx) = mpsc::channel(SEND_QUEUE);
    registry
        .join("session_aaaa0001", ViewerHandle::new("v1".into(), tx))
        .await;

    route_frame(&registry, "session_aaaa0001", &audio_chunk(0.5)).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn malformed_and_unknown_frames_are_ignored() {
    let registry = ViewerRegistry::new();
    let (tx, mut rx) = mpsc::channel(SEND_QUEUE);
    registry
        .join("session_aaaa0001", ViewerHandle::new("v1".into(), tx))
        .await;

    route_frame(&registry, "session_aaaa0001", "{{{ not json").await;
    route_frame(
        &registry,
        "session_aaaa0001",
        r#"{"type":"heartbeat","timestamp":1}"#,
    )
    .await;
    route_frame(
        &registry,
        "session_aaaa0001",
        r#"{"type":"page_turn","timestamp":1,"page":2}"#,
    )
    .await;

    assert!(rx.try_recv().is_err());
    // The channel survives all of it.
    assert_eq!(registry.viewer_count("session_aaaa0001").await, 1);
}

#[tokio::test]
async fn feedback_to_session_without_viewers_is_silent() {
    let registry = ViewerRegistry::new();
    // No viewers at all; must not error or panic.
    route_frame(&registry, "session_aaaa0001", &audio_chunk(0.1)).await;
}
