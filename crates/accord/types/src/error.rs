use thiserror::Error;

/// Parse failures for the shared vocabulary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("Unknown role code: {0}")]
    UnknownRole(u8),

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Unknown decision: {0}")]
    UnknownDecision(String),

    #[error("Unknown resource table: {0}")]
    UnknownTable(String),
}
