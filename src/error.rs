use thiserror::Error;

/// Recoverable failures produced while processing a single profile cycle.
/// All of these are caught at the pipeline boundary and converted into a
/// `Failed` outcome; none of them should crash the scheduler.
#[derive(Debug, Error)]
pub enum EngageError {
    #[error("failed to navigate to profile {profile} after {attempts} attempts")]
    Navigation { profile: String, attempts: u32 },

    #[error("timed out waiting for {what} after {timeout_ms}ms")]
    ExtractionTimeout { what: String, timeout_ms: u64 },

    #[error("completion service error: {0}")]
    Service(String),

    #[error("comment submission failed: {0}")]
    Submission(String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}
