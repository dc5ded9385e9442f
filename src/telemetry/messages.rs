use serde::{Deserialize, Serialize};

/// Inbound telemetry frame from a presenter or viewer channel.
///
/// Every frame carries a `type` discriminator and a millisecond timestamp.
/// Unrecognized types deserialize into `Other` so that future telemetry
/// kinds pass through without being treated as protocol errors.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum TelemetryMessage {
    #[serde(rename = "audio_chunk")]
    AudioChunk {
        timestamp: f64,
        /// Microphone level, normalized to [0, 1].
        volume_level: f64,
        /// Words per minute, when the client computes it.
        #[serde(default)]
        speaking_pace: Option<f64>,
    },

    #[serde(rename = "page_turn")]
    PageTurn {
        timestamp: f64,
        #[serde(default)]
        page: Option<u32>,
    },

    #[serde(rename = "gaze_data")]
    GazeData { timestamp: f64 },

    #[serde(other)]
    Other,
}

/// Feedback broadcast to every viewer of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub feedback_type: String,
}

impl FeedbackEvent {
    pub fn low_volume() -> Self {
        Self {
            kind: "realtime_feedback".to_string(),
            message: "Try speaking a little louder".to_string(),
            feedback_type: "volume_low".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_audio_chunk() {
        let raw = r#"{"type":"audio_chunk","timestamp":1700000000000,"volume_level":0.25,"speaking_pace":140}"#;
        let msg: TelemetryMessage = serde_json::from_str(raw).unwrap();
        match msg {
            TelemetryMessage::AudioChunk {
                volume_level,
                speaking_pace,
                ..
            } => {
                assert!((volume_level - 0.25).abs() < f64::EPSILON);
                assert_eq!(speaking_pace, Some(140.0));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn parses_page_turn_and_gaze() {
        let page: TelemetryMessage =
            serde_json::from_str(r#"{"type":"page_turn","timestamp":1,"page":3}"#).unwrap();
        assert!(matches!(page, TelemetryMessage::PageTurn { page: Some(3), .. }));

        let gaze: TelemetryMessage =
            serde_json::from_str(r#"{"type":"gaze_data","timestamp":2}"#).unwrap();
        assert!(matches!(gaze, TelemetryMessage::GazeData { .. }));
    }

    #[test]
    fn unknown_type_parses_as_other() {
        let msg: TelemetryMessage =
            serde_json::from_str(r#"{"type":"heartbeat","timestamp":5}"#).unwrap();
        assert!(matches!(msg, TelemetryMessage::Other));
    }

    #[test]
    fn malformed_frame_is_an_error() {
        assert!(serde_json::from_str::<TelemetryMessage>("not json").is_err());
        assert!(serde_json::from_str::<TelemetryMessage>(r#"{"timestamp":5}"#).is_err());
    }

    #[test]
    fn feedback_event_wire_shape() {
        let event = FeedbackEvent::low_volume();
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "realtime_feedback");
        assert_eq!(value["feedback_type"], "volume_low");
        assert!(value["message"].is_string());
    }
}
