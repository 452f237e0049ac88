use thiserror::Error;

/// Failure taxonomy for store access. Domain-expected outcomes (invalid
/// guess, missing leaderboard, not authorized) are typed result variants on
/// their own types, not errors; these variants cover everything else.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepoError {
    #[error("entity not found")]
    NotFound,
    #[error("concurrent write conflict")]
    Conflict,
    #[error("operation cancelled")]
    Cancelled,
    #[error("repository failure: {0}")]
    Failure(String),
}
