use thiserror::Error;

/// Failures at the library boundary. Problems found in a script are never
/// errors; they are reported as [`crate::Issue`]s.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown strictness: {0}. Use permissive, standard, or strict")]
    UnknownStrictness(String),

    #[error("unknown format: {0}. Use text or json")]
    UnknownFormat(String),

    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}
