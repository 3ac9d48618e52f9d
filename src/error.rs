use thiserror::Error;

/// Errors that can occur while constructing a generator or its collaborators.
///
/// Per-request faults (context fetch, generative call, overlay parse) are
/// recovered inside the generators and never surface through this type:
/// `generate`/`analyze` always return a usable record.
#[derive(Debug, Error)]
pub enum InsightError {
    #[error("OPENAI_API_KEY environment variable is not set")]
    MissingApiKey,

    #[error("prompt template error: {0}")]
    Template(String),

    #[error("baseline table error: {0}")]
    InvalidBaseline(String),

    #[error("conversation store error: {0}")]
    Storage(#[from] rusqlite::Error),
}
