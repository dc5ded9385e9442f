pub mod messages;
pub mod router;

pub use messages::{FeedbackEvent, TelemetryMessage};
pub use router::{derive_feedback, route_frame, LOW_VOLUME_THRESHOLD};
