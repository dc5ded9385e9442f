pub mod engine;
pub mod orchestrator;

pub use engine::{
    AnalysisContext, AnalysisEngine, AnalysisOutcome, HttpAnalysisEngine, RealtimeMetrics,
    SessionMetadata, SubScores,
};
