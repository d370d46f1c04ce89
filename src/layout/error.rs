use thiserror::Error;

/// Structural problems in the input tree. Raised before any geometry is
/// computed; a layout call that fails this way returns no partial result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedTreeError {
    #[error("node id must not be empty")]
    EmptyId,
    #[error("duplicate node id `{id}`")]
    DuplicateId { id: String },
    #[error("root `{id}` must have level 0, found {level}")]
    RootLevel { id: String, level: usize },
    #[error("node `{id}` under `{parent}` has level {found}, expected {expected}")]
    LevelMismatch {
        id: String,
        parent: String,
        expected: usize,
        found: usize,
    },
    #[error("cross-link endpoint `{id}` is not in the tree")]
    UnknownLinkEndpoint { id: String },
}
