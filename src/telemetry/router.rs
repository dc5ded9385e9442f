use super::messages::{FeedbackEvent, TelemetryMessage};
use crate::registry::ViewerRegistry;
use tracing::{debug, warn};

/// Volume below this level triggers a low-volume advisory.
pub const LOW_VOLUME_THRESHOLD: f64 = 0.3;

/// Decide whether a telemetry message warrants a feedback broadcast.
///
/// At most one event per evaluated message; no history is accumulated here,
/// which keeps viewers from being flooded. Page turns and gaze samples are
/// recorded by the aggregation collaborator, not by this router.
pub fn derive_feedback(msg: &TelemetryMessage) -> Option<FeedbackEvent> {
    match msg {
        TelemetryMessage::AudioChunk { volume_level, .. } if *volume_level < LOW_VOLUME_THRESHOLD => {
            Some(FeedbackEvent::low_volume())
        }
        _ => None,
    }
}

/// Handle one raw inbound frame for a session: parse, derive feedback, and
/// fan it out. Malformed frames are dropped with a log line; they never
/// terminate the channel. Performs no blocking I/O.
pub async fn route_frame(registry: &ViewerRegistry, session_id: &str, raw: &str) {
    let msg = match serde_json::from_str::<TelemetryMessage>(raw) {
        Ok(msg) => msg,
        Err(e) => {
            warn!(session_id, error = %e, "dropping unparsable telemetry frame");
            return;
        }
    };

    match &msg {
        TelemetryMessage::PageTurn { page, .. } => {
            debug!(session_id, ?page, "page turn");
        }
        TelemetryMessage::GazeData { .. } => {
            debug!(session_id, "gaze sample");
        }
        TelemetryMessage::Other => {
            debug!(session_id, "ignoring unknown telemetry type");
        }
        TelemetryMessage::AudioChunk { .. } => {}
    }

    if let Some(event) = derive_feedback(&msg) {
        registry.publish(session_id, &event).await;
    }
}
