use thiserror::Error;

/// Errors surfaced by the ranking core.
///
/// Configuration and identifier errors are fatal at the call site;
/// `EmptyNegativePool` is prevented structurally during training (users
/// without negative candidates are never drawn as the positive-pair
/// source) but remains reachable when a caller feeds such a user directly
/// to the sampler or to exclusion-based recommendation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecError {
    #[error("user {user} has no negative candidates (every item is a known positive)")]
    EmptyNegativePool { user: u64 },

    #[error("unknown user id {0}")]
    UnknownUser(u64),

    #[error("unknown item id {0}")]
    UnknownItem(u64),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

pub type Result<T> = std::result::Result<T, RecError>;
