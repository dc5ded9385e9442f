pub mod analysis;
pub mod config;
pub mod error;
pub mod http;
pub mod registry;
pub mod session;
pub mod store;
pub mod telemetry;
pub mod ws;

pub use analysis::{AnalysisContext, AnalysisEngine, AnalysisOutcome, HttpAnalysisEngine};
pub use config::Config;
pub use error::{CoreError, CoreResult};
pub use http::{create_router, AppState};
pub use registry::{ViewerHandle, ViewerRegistry};
pub use session::{SessionDraft, SessionRecord, SessionService, SessionStatus};
pub use store::{Store, StoredAnalysis};
pub use telemetry::{FeedbackEvent, TelemetryMessage};
