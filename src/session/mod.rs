pub mod service;
pub mod types;

pub use service::{CreatedSession, EndAck, SessionDetail, SessionService};
pub use types::{SessionDraft, SessionRecord, SessionStatus};
