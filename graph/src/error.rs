use thiserror::Error;

/// Errors raised while building or extending a commit graph
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// A commit id was supplied twice, either within one batch or across batches.
    /// The caller must deduplicate its source data.
    #[error("duplicate commit id `{id}`")]
    DuplicateCommitId { id: String },

    #[error("invalid graph configuration: {reason}")]
    InvalidConfig { reason: String },
}

pub type Result<T> = std::result::Result<T, GraphError>;
