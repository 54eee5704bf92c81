use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Review score outside 1..=5; rejected when records are ingested.
    #[error("review score {0} is outside the 1-5 range")]
    InvalidScore(i64),

    /// Aggregate requested over an empty group.
    #[error("cannot aggregate an empty record set")]
    EmptyInput,

    /// The responder rule table was exhausted without a match.
    #[error("no responder rule matched the query")]
    NoMatchingRule,

    #[error("chat message is empty")]
    EmptyMessage,

    #[error("invalid filter value: {0}")]
    InvalidCriteria(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
