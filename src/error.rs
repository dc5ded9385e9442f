use thiserror::Error;

/// Errors surfaced by the session core.
///
/// `NotFound` deliberately covers both "no such session" and "session owned
/// by someone else" so that callers cannot probe for the existence of
/// sessions they do not own.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Session absent, owned by another caller, or not in an eligible state
    /// for the requested transition.
    #[error("session not found")]
    NotFound,

    /// Malformed session creation input.
    #[error("invalid session config: {0}")]
    InvalidConfig(String),

    /// Underlying storage failure.
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Analysis engine call or its persistence failed. Internal to the
    /// background path; never returned to a synchronous caller.
    #[error("analysis failed: {0}")]
    AnalysisFailure(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
